//! review-labeler domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Review, label and output records plus the model-boundary request types
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Fixture generation, prompting, two-pass labeling and the batch runner
//! - `policy`: Word counting and the reasoning length guard

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;
