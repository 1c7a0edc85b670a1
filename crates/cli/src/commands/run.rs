//! Run command - prepare the dataset, label every review, write the results

use anyhow::{Context, Result, bail};
use review_labeler_adapters::store::{CsvResultSink, CsvReviewStore};
use review_labeler_domain::usecases::{BatchRunner, FixtureConfig, FixtureOutcome, ensure_dataset};
use review_labeler_domain::{OutputRecord, ReviewRecord, ReviewStore};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RunArgs;
use crate::commands::label::{batch_config_from_config, build_model};
use crate::config::AppConfig;

const PREVIEW_TEXT_CHARS: usize = 60;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let data_path = args.data.unwrap_or_else(|| config.general.data_path.clone());
    let output_path = args
        .output
        .unwrap_or_else(|| config.general.output_path.clone());
    let batch_config = batch_config_from_config(&config, args.max_words);
    let preview_rows = config.general.preview_rows;

    tracing::info!(
        data = %data_path.display(),
        output = %output_path.display(),
        provider = %config.llm.provider,
        model = %config.llm.model,
        max_words = batch_config.max_words,
        "Starting review-labeler run"
    );

    let store = CsvReviewStore::new(&data_path);

    if args.no_fixture {
        let present = store
            .has_data()
            .await
            .context("Failed to inspect dataset")?;
        if !present {
            bail!(
                "Dataset not found: {} (run without --no-fixture to generate one)",
                data_path.display()
            );
        }
    } else {
        let fixture = FixtureConfig {
            size: config.fixture.size,
            seed: config.fixture.seed,
        };
        let outcome = ensure_dataset(&store, fixture)
            .await
            .with_context(|| format!("Failed to prepare dataset: {}", data_path.display()))?;
        if let FixtureOutcome::Generated(count) = outcome {
            println!(
                "Generated fixture dataset: {} ({} reviews)",
                data_path.display(),
                count
            );
        }
    }

    let reviews = store
        .load()
        .await
        .with_context(|| format!("Failed to load dataset: {}", data_path.display()))?;

    println!("Loaded {} reviews", reviews.len());
    print_review_preview(&reviews, preview_rows);

    // Build the model first so a missing API key fails before any work
    let model = build_model(&config)?;
    let sink = Arc::new(CsvResultSink::new(&output_path));
    let runner = BatchRunner::new(model, sink, batch_config);

    let report = runner.run(&reviews).await.context("Labeling run failed")?;

    println!();
    println!("Labeled reviews:");
    print_output_preview(&report.records, preview_rows);

    println!();
    match report.accuracy {
        Some(accuracy) => println!("Accuracy: {:.2}%", accuracy * 100.0),
        None => println!("Accuracy: n/a (no reviews)"),
    }
    println!("Wrote {}", output_path.display());

    Ok(())
}

fn print_review_preview(reviews: &[ReviewRecord], rows: usize) {
    for review in reviews.iter().take(rows) {
        println!(
            "  [{}] truth={} {}",
            review.review_id,
            review.true_is_political,
            shorten(&review.review_text)
        );
    }
}

fn print_output_preview(records: &[OutputRecord], rows: usize) {
    for record in records.iter().take(rows) {
        let mark = if record.is_correct() { "ok" } else { "miss" };
        println!(
            "  [{}] truth={} pred={} ({}) words={} {}",
            record.review_id,
            record.true_is_political,
            record.pred_is_political,
            mark,
            record.reasoning_words,
            shorten(&record.reasoning)
        );
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= PREVIEW_TEXT_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_TEXT_CHARS).collect();
    format!("{}...", head)
}
