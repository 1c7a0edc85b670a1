//! Doctor command - validate configuration and show status

use anyhow::Result;
use review_labeler_adapters::store::CsvReviewStore;
use review_labeler_domain::ReviewStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    dataset: CheckResult,
    labeling: CheckResult,
    llm: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        dataset: CheckResult::error("Not checked"),
        labeling: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.dataset = check_dataset(&config.general.data_path).await;
        report.labeling = check_labeling(config);
        report.llm = check_llm(config);
    }

    let checks = [
        &report.config,
        &report.dataset,
        &report.labeling,
        &report.llm,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_dataset(path: &Path) -> CheckResult {
    let store = CsvReviewStore::new(path);

    match store.has_data().await {
        Ok(false) => CheckResult::warn(format!(
            "Dataset not found: {} (a fixture will be generated on run)",
            path.display()
        )),
        Ok(true) => match store.load().await {
            Ok(reviews) => {
                let political = reviews
                    .iter()
                    .filter(|r| r.true_is_political.as_u8() == 1)
                    .count();
                CheckResult::ok(format!(
                    "{} reviews loaded from {}",
                    reviews.len(),
                    path.display()
                ))
                .with_details(serde_json::json!({
                    "count": reviews.len(),
                    "political": political,
                }))
            }
            Err(e) => CheckResult::error(format!("Invalid dataset: {}", e)),
        },
        Err(e) => CheckResult::error(format!("Failed to inspect dataset: {}", e)),
    }
}

fn check_labeling(config: &AppConfig) -> CheckResult {
    let labeling = &config.labeling;

    if labeling.max_words == 0 {
        return CheckResult::error("labeling.max_words must be at least 1");
    }

    if labeling.soft_word_target > labeling.max_words {
        return CheckResult::warn(format!(
            "soft_word_target ({}) exceeds max_words ({}); expect rewrites",
            labeling.soft_word_target, labeling.max_words
        ));
    }

    let rubric = if labeling.rubric.is_some() {
        "custom"
    } else {
        "default"
    };
    CheckResult::ok(format!(
        "max_words: {}, soft target: {}, rubric: {}",
        labeling.max_words, labeling.soft_word_target, rubric
    ))
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let provider = &config.llm.provider;
    let model = &config.llm.model;

    let api_key_env = match provider.as_str() {
        "openai" => &config.llm.openai.api_key_env,
        "ollama" => {
            return check_base_url("ollama", model, &config.llm.ollama.base_url);
        }
        "stub" => {
            return match config.llm.stub.refusal.as_deref() {
                Some(reason) => CheckResult::warn(format!(
                    "Provider: stub (offline), refusing every call: {}",
                    reason
                )),
                None => CheckResult::ok("Provider: stub (offline)".to_string()),
            };
        }
        other => return CheckResult::error(format!("Unknown provider: {}", other)),
    };

    if api_key_env.is_empty() {
        return CheckResult::error(format!("No API key env var configured for {}", provider));
    }

    // Never reveal the key itself
    match std::env::var(api_key_env) {
        Ok(val) if !val.is_empty() => CheckResult::ok(format!(
            "Provider: {}, Model: {}, API key: {} (set)",
            provider, model, api_key_env
        )),
        _ => CheckResult::warn(format!(
            "Provider: {}, Model: {}, API key: {} (not set)",
            provider, model, api_key_env
        )),
    }
}

fn check_base_url(provider: &str, model: &str, base_url: &str) -> CheckResult {
    if base_url.trim().is_empty() {
        return CheckResult::warn(format!(
            "Provider: {}, Model: {}, base_url empty (using default)",
            provider, model
        ));
    }

    CheckResult::ok(format!(
        "Provider: {}, Model: {}, base_url: {}",
        provider, model, base_url
    ))
}

fn print_report(report: &DoctorReport) {
    println!("review-labeler Doctor Report");
    println!("============================");
    println!();

    print_check("Config", &report.config);
    print_check("Dataset", &report.dataset);
    print_check("Labeling", &report.labeling);
    print_check("LLM Provider", &report.llm);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: review-labeler run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
