//! Application use cases / business logic

pub mod batch;
pub mod fixture;
pub mod label;
pub mod prompt;

pub use batch::{BatchConfig, BatchError, BatchRunner, accuracy};
pub use fixture::{FixtureConfig, FixtureOutcome, ensure_dataset, generate_reviews};
pub use label::{LabelConfig, LabelError, Labeler, parse_label_reply};
pub use prompt::{PromptBuilder, PromptConfig};
