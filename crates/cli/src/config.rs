//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub fixture: FixtureSection,

    #[serde(default)]
    pub labeling: LabelingConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSection {
    #[serde(default = "default_fixture_size")]
    pub size: usize,

    #[serde(default = "default_fixture_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelingConfig {
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    #[serde(default = "default_max_words")]
    pub soft_word_target: usize,

    #[serde(default)]
    pub rubric: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub stub: StubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
}

/// Offline stub provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubConfig {
    /// When set, every call is refused with this message
    #[serde(default)]
    pub refusal: Option<String>,
}

// Default value functions
fn default_data_path() -> PathBuf {
    PathBuf::from("./fake_movie_reviews.csv")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./labeled_reviews_output.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_preview_rows() -> usize {
    5
}

fn default_fixture_size() -> usize {
    30
}

fn default_fixture_seed() -> u64 {
    7
}

fn default_max_words() -> usize {
    50
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.0
}

fn default_timeout() -> u64 {
    45
}

fn default_max_output_tokens() -> u32 {
    300
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            output_path: default_output_path(),
            log_level: default_log_level(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Default for FixtureSection {
    fn default() -> Self {
        Self {
            size: default_fixture_size(),
            seed: default_fixture_seed(),
        }
    }
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            soft_word_target: default_max_words(),
            rubric: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
            max_output_tokens: default_max_output_tokens(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
            stub: StubConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_api_key_env(),
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("REVIEW_LABELER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# review-labeler configuration

[general]
data_path = "./fake_movie_reviews.csv"
output_path = "./labeled_reviews_output.csv"
log_level = "info"
preview_rows = 5

[fixture]
# Used only when data_path does not exist yet
size = 30
seed = 7

[labeling]
max_words = 50
soft_word_target = 50
# rubric = "Label is_political=1 ONLY if ..."

[llm]
provider = "openai"  # openai, ollama, stub
model = "gpt-4o-mini"
temperature = 0.0
timeout_secs = 45
max_output_tokens = 300

[llm.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[llm.ollama]
base_url = "http://localhost:11434"

[llm.stub]
# Offline provider; set refusal to make every call refuse
# refusal = "I can't help with that."
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.general.data_path, defaults.general.data_path);
        assert_eq!(parsed.general.output_path, defaults.general.output_path);
        assert_eq!(parsed.fixture.size, 30);
        assert_eq!(parsed.fixture.seed, 7);
        assert_eq!(parsed.labeling.max_words, 50);
        assert!(parsed.labeling.rubric.is_none());
        assert_eq!(parsed.llm.provider, "openai");
        assert_eq!(parsed.llm.model, "gpt-4o-mini");
        assert_eq!(parsed.llm.openai.api_key_env, "OPENAI_API_KEY");
        assert!(parsed.llm.stub.refusal.is_none());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/review-labeler.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[labeling]\nmax_words = 25\n\n[llm]\nprovider = \"stub\"\n")
            .unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();

        assert_eq!(config.labeling.max_words, 25);
        assert_eq!(config.labeling.soft_word_target, 50);
        assert_eq!(config.llm.provider, "stub");
        assert_eq!(config.fixture.seed, 7);
    }
}
