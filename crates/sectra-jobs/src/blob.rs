//! Filesystem blob store for uploaded input files.
//!
//! Files land under `<root>/<job_id>/<sanitized name>`. Refs are released
//! individually on cancel; the per-job directory is removed with its last
//! blob.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use sectra_core::{BlobRef, BlobStore, Error, FileUpload, Result};

/// Strip path separators and parent-dir components from an uploaded file
/// name. A name that sanitizes to nothing is rejected at submission
/// validation, before this store is reached.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .collect::<String>()
        .replace("..", "_")
}

/// `BlobStore` writing uploads to a directory tree on local disk.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.root.join(job_id.to_string())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, files: &[FileUpload], job_id: Uuid) -> Result<Vec<BlobRef>> {
        let dir = self.job_dir(job_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Storage(format!("creating {}: {e}", dir.display())))?;

        let mut refs = Vec::with_capacity(files.len());
        for file in files {
            let name = sanitize_file_name(&file.file_name);
            let path = dir.join(&name);
            tokio::fs::write(&path, &file.content)
                .await
                .map_err(|e| Error::Storage(format!("writing {}: {e}", path.display())))?;

            debug!(job_id = %job_id, file = %name, bytes = file.content.len(), "Stored input blob");
            refs.push(BlobRef {
                document_id: name,
                location: path.to_string_lossy().into_owned(),
            });
        }
        Ok(refs)
    }

    async fn delete(&self, blob: &BlobRef) -> Result<()> {
        let path = Path::new(&blob.location);
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| Error::Storage(format!("deleting {}: {e}", path.display())))?;

        // Drop the job directory once its last blob is gone.
        if let Some(dir) = path.parent() {
            let mut entries = tokio::fs::read_dir(dir)
                .await
                .map_err(|e| Error::Storage(format!("reading {}: {e}", dir.display())))?;
            if entries
                .next_entry()
                .await
                .map_err(|e| Error::Storage(e.to_string()))?
                .is_none()
            {
                let _ = tokio::fs::remove_dir(dir).await;
            }
        }
        Ok(())
    }
}
