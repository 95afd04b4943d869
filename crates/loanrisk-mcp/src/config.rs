//! Environment-driven configuration for `loanriskd`.
//!
//! | variable | meaning |
//! |---|---|
//! | `LOANRISK_TRANSPORT` | `stdio` (default) or `http` |
//! | `LOANRISK_HTTP_ADDR` | listen address for `http`, default `127.0.0.1:8787` |
//! | `LOANRISK_CLASSIFIER` | `logistic` (default) or `http` |
//! | `LOANRISK_MODEL_FILE` | logistic model JSON |
//! | `LOANRISK_CLASSIFIER_URL` | base url of a remote classifier |
//! | `LOANRISK_CLASSIFIER_API_KEY` | bearer token for the remote classifier |
//! | `LOANRISK_CLASSIFIER_MODEL` | model name forwarded to the remote classifier |
//! | `LOANRISK_CLASSIFIER_TIMEOUT_MS` | request timeout, 100..=120000, default 15000 |
//! | `LOANRISK_LOG` | tracing filter, default `info` |

use std::sync::Arc;
use std::time::Duration;

use loanrisk_model::{
    build_classifier_provider, ClassifierProvider, ClassifierProviderConfig,
    HttpClassifierConfig, LogisticConfig, ProviderError,
};

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub transport: Transport,
    pub http_addr: String,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, String> {
        let transport = match env_trimmed("LOANRISK_TRANSPORT")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("stdio") => Transport::Stdio,
            Some("http") => Transport::Http,
            Some(other) => {
                return Err(format!(
                    "LOANRISK_TRANSPORT must be stdio or http, got `{other}`"
                ))
            }
        };
        let http_addr =
            env_trimmed("LOANRISK_HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        Ok(Self {
            transport,
            http_addr,
        })
    }
}

pub fn classifier_config_from_env() -> Result<ClassifierProviderConfig, String> {
    let kind = env_trimmed("LOANRISK_CLASSIFIER")
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_else(|| "logistic".to_string());

    match kind.as_str() {
        "logistic" => {
            let path = env_trimmed("LOANRISK_MODEL_FILE").ok_or_else(|| {
                "LOANRISK_MODEL_FILE is not configured. Risk assessment is disabled.".to_string()
            })?;
            LogisticConfig::from_path(&path)
                .map(ClassifierProviderConfig::Logistic)
                .map_err(|e| format!("failed to load logistic model {path}: {e}"))
        }
        "http" => {
            let url = env_trimmed("LOANRISK_CLASSIFIER_URL").ok_or_else(|| {
                "LOANRISK_CLASSIFIER_URL is not configured. Remote classifier is disabled."
                    .to_string()
            })?;
            let mut cfg = HttpClassifierConfig::new(url);
            cfg.api_key = env_trimmed("LOANRISK_CLASSIFIER_API_KEY");
            cfg.model = env_trimmed("LOANRISK_CLASSIFIER_MODEL");
            cfg.timeout = Duration::from_millis(env_u64(
                "LOANRISK_CLASSIFIER_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
                100,
                120_000,
            ));
            Ok(ClassifierProviderConfig::Http(cfg))
        }
        _ => Err("Unsupported classifier. Use logistic or http.".to_string()),
    }
}

pub fn build_classifier_from_env() -> Result<Arc<dyn ClassifierProvider>, String> {
    let cfg = classifier_config_from_env()?;
    build_classifier_provider(cfg)
        .map_err(|e| format!("classifier initialization failed: {}", describe_provider_error(&e)))
}

fn describe_provider_error(err: &ProviderError) -> String {
    sanitize_sensitive(&err.to_string())
}

/// Strips the configured classifier token from text sent back to clients.
pub fn sanitize_sensitive(input: &str) -> String {
    match env_trimmed("LOANRISK_CLASSIFIER_API_KEY") {
        Some(secret) => input.replace(&secret, "[REDACTED]"),
        None => input.to_string(),
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(name: &str, default: u64, min: u64, max: u64) -> u64 {
    clamped_u64(std::env::var(name).ok().as_deref(), default, min, max)
}

fn clamped_u64(raw: Option<&str>, default: u64, min: u64, max: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}
