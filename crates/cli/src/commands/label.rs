//! Label command - one-shot two-pass labeling of a single text

use anyhow::{Context, Result, bail};
use review_labeler_adapters::llm::{
    LlmConfig as AdapterLlmConfig, OllamaModel, OpenAiModel, StubModel,
};
use review_labeler_domain::LanguageModel;
use review_labeler_domain::policy::word_count;
use review_labeler_domain::usecases::{BatchConfig, LabelConfig, Labeler, PromptConfig};
use secrecy::SecretString;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::LabelArgs;
use crate::config::AppConfig;

pub async fn execute(args: LabelArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let text = get_input_text(&args)?;

    if text.trim().is_empty() {
        bail!("No text provided for labeling");
    }

    let batch_config = batch_config_from_config(&config, args.max_words);
    let max_words = batch_config.max_words;

    tracing::info!(
        provider = %config.llm.provider,
        text_length = text.len(),
        max_words = max_words,
        "Labeling text"
    );

    let model = build_model(&config)?;
    let labeler = Labeler::new(model, batch_config.label);

    let first = labeler
        .label(text.trim())
        .await
        .context("Labeling failed")?;
    let result = labeler
        .enforce_word_limit(&first, max_words)
        .await
        .context("Word limit rewrite failed")?;
    let reasoning_words = word_count(&result.reasoning);

    if args.json {
        let json = serde_json::json!({
            "is_political": result.is_political,
            "reasoning": result.reasoning,
            "reasoning_words": reasoning_words,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("Label Result");
        println!("============");
        println!();
        println!("is_political: {}", result.is_political);
        println!("Reasoning: {}", result.reasoning);
        println!("Words: {} (limit {})", reasoning_words, max_words);
    }

    Ok(())
}

pub(crate) fn build_model(config: &AppConfig) -> Result<Arc<dyn LanguageModel>> {
    let llm_config = adapter_llm_config(&config.llm);

    match config.llm.provider.as_str() {
        "openai" => {
            let api_key = load_api_key(&config.llm.openai.api_key_env, "openai")?;
            let model = OpenAiModel::with_base_url(
                api_key,
                config.llm.openai.base_url.clone(),
                llm_config,
            )
            .context("Failed to configure OpenAI provider")?;
            Ok(Arc::new(model))
        }
        "ollama" => {
            let base_url = config.llm.ollama.base_url.trim();
            let model = if base_url.is_empty() {
                OllamaModel::new(llm_config)
            } else {
                OllamaModel::with_base_url(base_url.to_string(), llm_config)
            }
            .context("Failed to configure Ollama provider")?;
            Ok(Arc::new(model))
        }
        "stub" => match config.llm.stub.refusal.as_deref() {
            Some(reason) => Ok(Arc::new(StubModel::refusing(reason))),
            None => Ok(Arc::new(StubModel::keywords())),
        },
        other => bail!("Unknown LLM provider: {}", other),
    }
}

fn adapter_llm_config(config: &crate::config::LlmConfig) -> AdapterLlmConfig {
    AdapterLlmConfig {
        model: config.model.clone(),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
        timeout_secs: config.timeout_secs,
    }
}

pub(crate) fn batch_config_from_config(
    config: &AppConfig,
    max_words_override: Option<usize>,
) -> BatchConfig {
    let mut prompt = PromptConfig {
        soft_word_target: config.labeling.soft_word_target,
        ..PromptConfig::default()
    };
    if let Some(rubric) = config
        .labeling
        .rubric
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        prompt.rubric = rubric.to_string();
    }

    BatchConfig {
        max_words: max_words_override.unwrap_or(config.labeling.max_words),
        label: LabelConfig { prompt },
    }
}

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

fn get_input_text(args: &LabelArgs) -> Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }

    if let Some(ref path) = args.file {
        if path.as_os_str() != "-" {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()));
        }
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_model_selects_stub() {
        let mut config = AppConfig::default();
        config.llm.provider = "stub".to_string();

        assert!(build_model(&config).is_ok());
    }

    #[tokio::test]
    async fn test_build_model_stub_refusal() {
        let mut config = AppConfig::default();
        config.llm.provider = "stub".to_string();
        config.llm.stub.refusal = Some("Declined".to_string());

        let labeler = Labeler::new(build_model(&config).unwrap(), LabelConfig::default());
        let err = labeler.label("Great movie.").await.unwrap_err();

        assert!(err.to_string().contains("Declined"));
    }

    #[test]
    fn test_build_model_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "carrier_pigeon".to_string();

        let err = build_model(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }

    #[test]
    fn test_build_model_requires_openai_key_env() {
        let mut config = AppConfig::default();
        config.llm.openai.api_key_env = "REVIEW_LABELER_TEST_UNSET_KEY".to_string();

        assert!(build_model(&config).is_err());
    }

    #[test]
    fn test_batch_config_overrides() {
        let mut config = AppConfig::default();
        config.labeling.rubric = Some("Only label explicit party politics.".to_string());
        config.labeling.soft_word_target = 30;

        let batch = batch_config_from_config(&config, Some(12));

        assert_eq!(batch.max_words, 12);
        assert_eq!(batch.label.prompt.rubric, "Only label explicit party politics.");
        assert_eq!(batch.label.prompt.soft_word_target, 30);
    }

    #[test]
    fn test_batch_config_blank_rubric_keeps_default() {
        let mut config = AppConfig::default();
        config.labeling.rubric = Some("   ".to_string());

        let batch = batch_config_from_config(&config, None);

        assert_eq!(batch.max_words, 50);
        assert_eq!(batch.label.prompt, PromptConfig::default());
    }
}
