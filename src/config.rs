//! Environment configuration
//!
//! Provider credentials and endpoints come from the environment (optionally a
//! `.env` file). A provider with no API key is left unregistered.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::llm::{ProviderId, ProviderSettings};

const DEFAULT_TIMEOUT_SECS: u64 = 5;

struct ProviderVars {
  id: ProviderId,
  key_var: &'static str,
  url_var: &'static str,
  model_var: &'static str,
  default_url: &'static str,
  default_model: &'static str,
}

const PROVIDERS: [ProviderVars; 3] = [
  ProviderVars {
    id: ProviderId::Reasoning,
    key_var: "DEEPSEEK_API_KEY",
    url_var: "DEEPSEEK_BASE_URL",
    model_var: "DEEPSEEK_MODEL",
    default_url: "https://api.deepseek.com/v1",
    default_model: "deepseek-chat",
  },
  ProviderVars {
    id: ProviderId::Chat,
    key_var: "GROQ_API_KEY",
    url_var: "GROQ_BASE_URL",
    model_var: "GROQ_MODEL",
    default_url: "https://api.groq.com/openai/v1",
    default_model: "llama-3.3-70b-versatile",
  },
  ProviderVars {
    id: ProviderId::Multimodal,
    key_var: "GEMINI_API_KEY",
    url_var: "GEMINI_BASE_URL",
    model_var: "GEMINI_MODEL",
    default_url: "https://generativelanguage.googleapis.com/v1beta/openai",
    default_model: "gemini-1.5-flash",
  },
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{var} is not a valid URL: {reason}")]
  InvalidUrl { var: String, reason: String },

  #[error("{var} must be a whole number of seconds, got {value:?}")]
  InvalidTimeout { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachConfig {
  pub providers: BTreeMap<ProviderId, ProviderSettings>,
  /// Deadline for provider calls made inside a decision cycle
  pub provider_timeout: Duration,
  /// SQLite snapshot file; `None` keeps everything in memory
  pub database_path: Option<PathBuf>,
}

impl Default for CoachConfig {
  fn default() -> Self {
    Self {
      providers: BTreeMap::new(),
      provider_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      database_path: None,
    }
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl CoachConfig {
  /// Load `.env` if present, then read the process environment
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_process_env()
  }

  pub fn from_process_env() -> Result<Self, ConfigError> {
    let mut providers = BTreeMap::new();

    for vars in &PROVIDERS {
      let Some(api_key) = non_empty_var(vars.key_var) else {
        debug!(provider = %vars.id, "No API key, provider disabled");
        continue;
      };

      let raw_url = non_empty_var(vars.url_var).unwrap_or_else(|| vars.default_url.to_string());
      let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
        var: vars.url_var.to_string(),
        reason: e.to_string(),
      })?;

      providers.insert(
        vars.id,
        ProviderSettings {
          api_key,
          base_url,
          model: non_empty_var(vars.model_var).unwrap_or_else(|| vars.default_model.to_string()),
        },
      );
    }

    let provider_timeout = match non_empty_var("COACH_PROVIDER_TIMEOUT_SECS") {
      None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      Some(value) => value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidTimeout {
          var: "COACH_PROVIDER_TIMEOUT_SECS".to_string(),
          value,
        })?,
    };

    Ok(Self {
      providers,
      provider_timeout,
      database_path: non_empty_var("COACH_DATABASE_PATH").map(PathBuf::from),
    })
  }
}
