pub mod api_key;
pub mod toml_config;

use crate::adapters::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::core::pacing::{RateLimitConfig, MAX_WAIT};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_duration, validate_non_empty_string, validate_path, validate_url, Validate,
};
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_OUTPUT_PATH: &str = "gemini_log.txt";
pub const DEFAULT_ENV_FILE: &str = ".env";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "company-infosearcher")]
#[command(version, about = "Company AI Infosearcher: describe and tag companies per country")]
pub struct CliConfig {
    /// Text file listing companies per country ("Country:" then "1- Name" lines)
    #[arg(short, long)]
    pub file: String,

    /// Run log to write [default: gemini_log.txt]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Key/value file holding GEMINI_API_KEY [default: .env]
    #[arg(long)]
    pub env_file: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Model name [default: gemini-2.5-flash-lite]
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the Gemini REST API
    #[arg(long)]
    pub api_base: Option<String>,

    /// Requests per quota window before pausing [default: 15]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause after each full window, in seconds [default: 60]
    #[arg(long)]
    pub batch_pause_secs: Option<u64>,

    /// Delay between requests, in seconds [default: 2]
    #[arg(long)]
    pub request_delay_secs: Option<u64>,

    /// Attempts per company, first one included [default: 3]
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// First retry backoff, in seconds; doubles on each retry [default: 5]
    #[arg(long)]
    pub initial_backoff_secs: Option<u64>,

    /// HTTP request timeout, in seconds [default: 60]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Parse the input and show the plan without calling the API
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Layers the optional TOML file and the command line flags over the
    /// defaults.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::new(self.file.clone());

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            settings.apply_toml(&TomlConfig::from_file(path)?);
        }

        if let Some(output) = &self.output {
            settings.output_path = output.clone();
        }
        if let Some(env_file) = &self.env_file {
            settings.env_file = env_file.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(api_base) = &self.api_base {
            settings.api_base = api_base.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }

        let rate_limit = &mut settings.rate_limit;
        if let Some(batch_size) = self.batch_size {
            rate_limit.batch_size = batch_size;
        }
        if let Some(secs) = self.batch_pause_secs {
            rate_limit.batch_pause = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_delay_secs {
            rate_limit.request_delay = Duration::from_secs(secs);
        }
        if let Some(max_attempts) = self.max_attempts {
            rate_limit.retry.max_attempts = max_attempts;
        }
        if let Some(secs) = self.initial_backoff_secs {
            rate_limit.retry.initial_backoff = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_file: String,
    pub output_path: String,
    pub env_file: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub rate_limit: RateLimitConfig,
}

impl Settings {
    pub fn new(input_file: String) -> Self {
        Self {
            input_file,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            env_file: DEFAULT_ENV_FILE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: RateLimitConfig::default(),
        }
    }

    pub fn apply_toml(&mut self, config: &TomlConfig) {
        if let Some(model) = &config.model {
            if let Some(name) = &model.name {
                self.model = name.clone();
            }
            if let Some(api_base) = &model.api_base {
                self.api_base = api_base.clone();
            }
            if let Some(secs) = model.timeout_seconds {
                self.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(section) = &config.rate_limit {
            let rate_limit = &mut self.rate_limit;
            if let Some(batch_size) = section.batch_size {
                rate_limit.batch_size = batch_size;
            }
            if let Some(secs) = section.batch_pause_seconds {
                rate_limit.batch_pause = Duration::from_secs(secs);
            }
            if let Some(secs) = section.request_delay_seconds {
                rate_limit.request_delay = Duration::from_secs(secs);
            }
            if let Some(max_attempts) = section.max_attempts {
                rate_limit.retry.max_attempts = max_attempts;
            }
            if let Some(secs) = section.initial_backoff_seconds {
                rate_limit.retry.initial_backoff = Duration::from_secs(secs);
            }
        }

        if let Some(output) = &config.output {
            if let Some(path) = &output.path {
                self.output_path = path.clone();
            }
            if let Some(env_file) = &output.env_file {
                self.env_file = env_file.clone();
            }
        }
    }
}

impl ConfigProvider for Settings {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn rate_limit(&self) -> RateLimitConfig {
        self.rate_limit.clone()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("file", &self.input_file)?;
        validate_path("output", &self.output_path)?;
        validate_path("env_file", &self.env_file)?;
        validate_non_empty_string("model", &self.model)?;
        validate_url("api_base", &self.api_base)?;
        validate_duration("timeout", self.timeout, MAX_WAIT)?;
        self.rate_limit.validate()
    }
}
