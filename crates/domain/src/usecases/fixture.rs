//! Synthetic review dataset for offline runs and demos

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::{
    model::{PoliticalFlag, ReviewRecord},
    ports::{ReviewStore, StoreError},
};

const POLITICAL_REVIEWS: [&str; 6] = [
    "This is woke propaganda dressed as a movie.",
    "Another SJW agenda push. Hard pass.",
    "Left/right culture-war nonsense ruined the plot.",
    "Pure identity politics. Not cinema.",
    "Party politics in superhero form. Obvious agenda.",
    "This felt like partisan messaging, not storytelling.",
];

const NON_POLITICAL_REVIEWS: [&str; 6] = [
    "Bad pacing and weak dialogue.",
    "The acting was fine but the plot was messy.",
    "Great visuals, mediocre script.",
    "Too long; the third act dragged.",
    "Sound mixing was awful in my theater.",
    "Fun movie, not perfect, but enjoyable.",
];

const SUFFIXES: [&str; 3] = ["Seriously.", "LOL.", "Just my opinion."];

const POLITICAL_PROBABILITY: f64 = 0.35;
const SUFFIX_PROBABILITY: f64 = 0.25;

/// Fixture parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureConfig {
    /// Number of reviews to generate
    pub size: usize,
    /// RNG seed
    pub seed: u64,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self { size: 30, seed: 7 }
    }
}

/// Generate `size` labeled reviews with ids 1..=size.
///
/// The same seed always yields the same records.
pub fn generate_reviews(config: FixtureConfig) -> Vec<ReviewRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    (1..=config.size as u64)
        .map(|review_id| {
            let political = rng.gen_bool(POLITICAL_PROBABILITY);
            let pool: &[&str] = if political {
                &POLITICAL_REVIEWS
            } else {
                &NON_POLITICAL_REVIEWS
            };
            let mut text = pool.choose(&mut rng).copied().unwrap_or_default().to_string();

            if rng.gen_bool(SUFFIX_PROBABILITY) {
                if let Some(suffix) = SUFFIXES.choose(&mut rng) {
                    text.push(' ');
                    text.push_str(suffix);
                }
            }

            ReviewRecord {
                review_id,
                review_text: text.trim().to_string(),
                true_is_political: PoliticalFlag::from(political),
            }
        })
        .collect()
}

/// What `ensure_dataset` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureOutcome {
    /// The store already held data and was left alone
    Existing,
    /// A new dataset of this many rows was written
    Generated(usize),
}

/// Write a generated dataset unless the store already holds data
pub async fn ensure_dataset<S: ReviewStore + ?Sized>(
    store: &S,
    config: FixtureConfig,
) -> Result<FixtureOutcome, StoreError> {
    if store.has_data().await? {
        tracing::debug!("Dataset already present, skipping fixture generation");
        return Ok(FixtureOutcome::Existing);
    }

    let records = generate_reviews(config);
    store.save(&records).await?;

    tracing::info!(
        size = config.size,
        seed = config.seed,
        "Generated fixture dataset"
    );

    Ok(FixtureOutcome::Generated(records.len()))
}
