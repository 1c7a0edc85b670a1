//! review-labeler adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `store`: CSV review store and result sink
//! - `llm`: LLM provider adapters (OpenAI, Ollama, stub)

mod csv_store;

pub mod llm;

/// Re-exports for storage adapters
pub mod store {
    pub use crate::csv_store::{CsvResultSink, CsvReviewStore};
}
