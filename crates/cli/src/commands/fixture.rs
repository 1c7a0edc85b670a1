//! Fixture command - generate the synthetic review dataset

use anyhow::{Context, Result};
use review_labeler_adapters::store::CsvReviewStore;
use review_labeler_domain::ReviewStore;
use review_labeler_domain::usecases::{
    FixtureConfig, FixtureOutcome, ensure_dataset, generate_reviews,
};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::args::FixtureArgs;
use crate::config::AppConfig;

pub async fn execute(args: FixtureArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let path = args.path.unwrap_or(config.general.data_path);
    let fixture = FixtureConfig {
        size: args.size.unwrap_or(config.fixture.size),
        seed: args.seed.unwrap_or(config.fixture.seed),
    };

    let store = CsvReviewStore::new(&path);

    let outcome = if args.force {
        let records = generate_reviews(fixture);
        store
            .save(&records)
            .await
            .with_context(|| format!("Failed to write dataset: {}", path.display()))?;
        FixtureOutcome::Generated(records.len())
    } else {
        ensure_dataset(&store, fixture)
            .await
            .with_context(|| format!("Failed to prepare dataset: {}", path.display()))?
    };

    match outcome {
        FixtureOutcome::Existing => {
            println!(
                "Dataset already exists: {} (use --force to regenerate)",
                path.display()
            );
        }
        FixtureOutcome::Generated(count) => {
            println!(
                "Wrote {} reviews to {} (seed {})",
                count,
                path.display(),
                fixture.seed
            );
        }
    }

    println!("SHA-256: {}", fingerprint(&path)?);

    Ok(())
}

/// Hex digest of the dataset file, for comparing fixtures across runs
fn fingerprint(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "review_id,review_text,true_is_political\n").unwrap();

        let first = fingerprint(&path).unwrap();
        let second = fingerprint(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }
}
