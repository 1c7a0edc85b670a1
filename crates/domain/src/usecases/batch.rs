//! Batch runner - labels every review in order and persists the results

use std::sync::Arc;

use crate::{
    model::{BatchReport, OutputRecord, ReviewRecord},
    policy::word_count,
    ports::{LanguageModel, ResultSink, StoreError},
    usecases::label::{LabelConfig, LabelError, Labeler},
};

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Hard cap on reasoning length
    pub max_words: usize,
    /// Labeler configuration
    pub label: LabelConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_words: 50,
            label: LabelConfig::default(),
        }
    }
}

/// Errors that abort a batch run
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Labeling review {review_id} failed: {source}")]
    Label {
        review_id: u64,
        #[source]
        source: LabelError,
    },
    #[error("Failed to write results: {0}")]
    Store(#[from] StoreError),
}

/// Sequential batch runner
pub struct BatchRunner<M: ?Sized, S: ?Sized> {
    labeler: Labeler<M>,
    sink: Arc<S>,
    config: BatchConfig,
}

impl<M, S> BatchRunner<M, S>
where
    M: LanguageModel + ?Sized,
    S: ResultSink + ?Sized,
{
    pub fn new(model: Arc<M>, sink: Arc<S>, config: BatchConfig) -> Self {
        let labeler = Labeler::new(model, config.label.clone());
        Self {
            labeler,
            sink,
            config,
        }
    }

    /// Label every record, compute accuracy, then write the results.
    ///
    /// The first failure aborts the run and nothing is written.
    pub async fn run(&self, records: &[ReviewRecord]) -> Result<BatchReport, BatchError> {
        tracing::info!(
            count = records.len(),
            max_words = self.config.max_words,
            "Starting batch"
        );

        let mut outputs = Vec::with_capacity(records.len());
        for record in records {
            let output = self
                .process_record(record)
                .await
                .map_err(|source| BatchError::Label {
                    review_id: record.review_id,
                    source,
                })?;
            outputs.push(output);
        }

        let accuracy = accuracy(&outputs);

        self.sink.write(&outputs).await?;

        tracing::info!(
            count = outputs.len(),
            accuracy = ?accuracy,
            "Batch complete"
        );

        Ok(BatchReport {
            records: outputs,
            accuracy,
        })
    }

    async fn process_record(&self, record: &ReviewRecord) -> Result<OutputRecord, LabelError> {
        let first = self.labeler.label(&record.review_text).await?;
        let result = self
            .labeler
            .enforce_word_limit(&first, self.config.max_words)
            .await?;

        let reasoning_words = word_count(&result.reasoning);

        tracing::info!(
            review_id = record.review_id,
            pred = %result.is_political,
            truth = %record.true_is_political,
            reasoning_words = reasoning_words,
            "Labeled review"
        );

        Ok(OutputRecord {
            review_id: record.review_id,
            review_text: record.review_text.clone(),
            true_is_political: record.true_is_political,
            pred_is_political: result.is_political,
            reasoning: result.reasoning,
            reasoning_words,
        })
    }
}

/// Fraction of records whose prediction matches the ground truth.
///
/// Returns `None` for an empty slice.
pub fn accuracy(records: &[OutputRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let correct = records.iter().filter(|r| r.is_correct()).count();
    Some(correct as f64 / records.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelReply, PoliticalFlag, StructuredRequest};
    use crate::ports::ModelError;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Answers with a fixed prediction per review text and echoes the rewrite turn
    struct LookupModel {
        predictions: HashMap<String, PoliticalFlag>,
        reasoning: String,
        refuse_on: Option<String>,
    }

    impl LookupModel {
        fn new(predictions: &[(&str, PoliticalFlag)]) -> Self {
            Self {
                predictions: predictions
                    .iter()
                    .map(|(text, flag)| (text.to_string(), *flag))
                    .collect(),
                reasoning: "Short reason.".to_string(),
                refuse_on: None,
            }
        }
    }

    #[async_trait]
    impl LanguageModel for LookupModel {
        async fn complete(&self, request: &StructuredRequest) -> Result<ModelReply, ModelError> {
            if let Some(prior) = request.last_assistant_content() {
                return Ok(ModelReply::Content(prior.to_string()));
            }

            let prompt = request.last_user_content().unwrap_or_default();
            let text = prompt.rsplit("Review: ").next().unwrap_or_default();

            if self.refuse_on.as_deref() == Some(text) {
                return Ok(ModelReply::Refusal("Declined".to_string()));
            }

            let flag = self
                .predictions
                .get(text)
                .copied()
                .ok_or_else(|| ModelError::Api(format!("unexpected text {}", text)))?;

            Ok(ModelReply::Content(
                serde_json::json!({"is_political": flag.as_u8(), "reasoning": self.reasoning})
                    .to_string(),
            ))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Option<Vec<OutputRecord>>>,
    }

    #[async_trait]
    impl ResultSink for MemorySink {
        async fn write(&self, records: &[OutputRecord]) -> Result<(), StoreError> {
            *self.written.lock().unwrap() = Some(records.to_vec());
            Ok(())
        }
    }

    fn review(id: u64, text: &str, truth: PoliticalFlag) -> ReviewRecord {
        ReviewRecord {
            review_id: id,
            review_text: text.to_string(),
            true_is_political: truth,
        }
    }

    fn sample_reviews() -> Vec<ReviewRecord> {
        vec![
            review(1, "Pure identity politics. Not cinema.", PoliticalFlag::Political),
            review(2, "Bad pacing and weak dialogue.", PoliticalFlag::NonPolitical),
            review(3, "Another SJW agenda push. Hard pass.", PoliticalFlag::Political),
        ]
    }

    fn sample_model() -> LookupModel {
        LookupModel::new(&[
            ("Pure identity politics. Not cinema.", PoliticalFlag::Political),
            ("Bad pacing and weak dialogue.", PoliticalFlag::NonPolitical),
            ("Another SJW agenda push. Hard pass.", PoliticalFlag::NonPolitical),
        ])
    }

    #[tokio::test]
    async fn test_accuracy_two_of_three() {
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(Arc::new(sample_model()), sink.clone(), BatchConfig::default());

        let report = runner.run(&sample_reviews()).await.unwrap();

        let accuracy = report.accuracy.unwrap();
        assert!((accuracy - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}%", accuracy * 100.0), "66.67%");
    }

    #[tokio::test]
    async fn test_output_matches_input_order_and_ids() {
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(Arc::new(sample_model()), sink.clone(), BatchConfig::default());
        let reviews = sample_reviews();

        let report = runner.run(&reviews).await.unwrap();

        assert_eq!(report.records.len(), reviews.len());
        let input_ids: Vec<u64> = reviews.iter().map(|r| r.review_id).collect();
        let output_ids: Vec<u64> = report.records.iter().map(|r| r.review_id).collect();
        assert_eq!(input_ids, output_ids);
        assert_eq!(
            output_ids.iter().collect::<HashSet<_>>().len(),
            output_ids.len()
        );

        let written = sink.written.lock().unwrap().clone().unwrap();
        assert_eq!(written, report.records);
        assert_eq!(written[0].reasoning_words, 2);
    }

    #[tokio::test]
    async fn test_refusal_aborts_without_writing() {
        let mut model = sample_model();
        model.refuse_on = Some("Bad pacing and weak dialogue.".to_string());
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(Arc::new(model), sink.clone(), BatchConfig::default());

        let err = runner.run(&sample_reviews()).await.unwrap_err();

        assert!(matches!(
            err,
            BatchError::Label {
                review_id: 2,
                source: LabelError::Refusal(_)
            }
        ));
        assert!(sink.written.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_long_reasoning_is_capped() {
        let mut model = sample_model();
        model.reasoning = (0..120).map(|_| "verbose").collect::<Vec<_>>().join(" ");
        let sink = Arc::new(MemorySink::default());
        let config = BatchConfig {
            max_words: 10,
            ..Default::default()
        };
        let runner = BatchRunner::new(Arc::new(model), sink, config);

        let report = runner.run(&sample_reviews()).await.unwrap();

        for record in &report.records {
            assert!(record.reasoning_words <= 10);
            assert_eq!(record.reasoning_words, word_count(&record.reasoning));
        }
    }

    #[tokio::test]
    async fn test_empty_batch_has_no_accuracy() {
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(Arc::new(sample_model()), sink.clone(), BatchConfig::default());

        let report = runner.run(&[]).await.unwrap();

        assert!(report.records.is_empty());
        assert!(report.accuracy.is_none());
        assert_eq!(sink.written.lock().unwrap().as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_accuracy_function() {
        let make = |truth: PoliticalFlag, pred: PoliticalFlag| OutputRecord {
            review_id: 1,
            review_text: String::new(),
            true_is_political: truth,
            pred_is_political: pred,
            reasoning: String::new(),
            reasoning_words: 0,
        };
        use PoliticalFlag::{NonPolitical as N, Political as P};

        let records = vec![make(P, P), make(N, N), make(P, N)];

        assert_eq!(accuracy(&records), Some(2.0 / 3.0));
        assert_eq!(accuracy(&[]), None);
    }
}
