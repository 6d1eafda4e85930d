use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Pipeline configuration loaded from environment variables.
/// Everything is optional; a missing `OPENAI_API_KEY` switches analysis to
/// the simulated profile rather than failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub public_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub cache_enabled: bool,
    pub llm_timeout_secs: u64,
    pub debug_logging: bool,
    pub rust_log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            public_dir: PathBuf::from("public"),
            cache_dir: PathBuf::from(".cache").join("openai"),
            cache_enabled: true,
            llm_timeout_secs: 120,
            debug_logging: false,
            rust_log: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            public_dir: get("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            cache_dir: get("ANALYSIS_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            cache_enabled: match get("ANALYSIS_CACHE_ENABLED") {
                Some(v) => parse_bool(&v)
                    .context("ANALYSIS_CACHE_ENABLED must be true/false")?,
                None => defaults.cache_enabled,
            },
            llm_timeout_secs: match get("LLM_TIMEOUT_SECS") {
                Some(v) => v
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
                None => defaults.llm_timeout_secs,
            },
            debug_logging: match get("DEBUG_LOGGING") {
                Some(v) => parse_bool(&v).context("DEBUG_LOGGING must be true/false")?,
                None => defaults.debug_logging,
            },
            rust_log: get("RUST_LOG"),
        })
    }

    /// Filter level for this crate's log output.
    pub fn log_level(&self) -> &str {
        match (&self.rust_log, self.debug_logging) {
            (Some(level), _) => level,
            (None, true) => "debug",
            (None, false) => "info",
        }
    }

    /// `EnvFilter` directive scoping the level to this crate, so `RUST_LOG`
    /// never turns on dependency logs.
    pub fn log_filter(&self) -> String {
        format!("{}={}", env!("CARGO_CRATE_NAME"), self.log_level())
    }

    pub fn has_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("'{other}' is not a boolean"),
    }
}
