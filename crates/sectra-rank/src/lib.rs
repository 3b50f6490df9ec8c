//! # sectra-rank
//!
//! Relevance ranking engine and related-section discovery for sectra.
//!
//! Both operations are CPU-bound and fully deterministic: identical inputs
//! yield identical scores and ordering, with ties resolved by the
//! `(document_id, page_number, id)` total order.

pub mod discovery;
pub mod lexical;
pub mod ranking;

pub use discovery::discover;
pub use ranking::{rank, RankingConfig};
