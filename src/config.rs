use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the API server
    #[serde(default = "default_host")]
    pub host: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Directory for persisted model artifacts
    #[serde(default = "default_model_dir")]
    pub dir: String,
    /// Boosting rounds for the classifier
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// Shrinkage applied to each boosting round
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_model_dir() -> String {
    "models".to_string()
}

fn default_rounds() -> usize {
    100
}

fn default_learning_rate() -> f64 {
    0.05
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            rounds: default_rounds(),
            learning_rate: default_learning_rate(),
        }
    }
}

/// Classification thresholds.
///
/// These are inherited domain heuristics, reproduced exactly; changing them
/// changes what "promising" and "success" mean across the whole pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Probability above which a token is called promising
    #[serde(default = "default_probability_threshold")]
    pub probability_threshold: f64,
    /// Final market cap (SOL) a token must reach to count as a success
    #[serde(default = "default_success_mcap")]
    pub success_mcap: f64,
    /// Drop from all-time-high (%) that marks a rugpull
    #[serde(default = "default_rugpull_drawdown_pct")]
    pub rugpull_drawdown_pct: f64,
    /// Holder retention (final/peak) below which the token is a holder dump
    #[serde(default = "default_holder_retention_floor")]
    pub holder_retention_floor: f64,
    /// Peak growth (%) below which the token never took off
    #[serde(default = "default_min_growth_pct")]
    pub min_growth_pct: f64,
    /// Peak growth (%) a success must have reached
    #[serde(default = "default_success_growth_pct")]
    pub success_growth_pct: f64,
}

fn default_probability_threshold() -> f64 {
    0.7
}

fn default_success_mcap() -> f64 {
    400.0
}

fn default_rugpull_drawdown_pct() -> f64 {
    60.0
}

fn default_holder_retention_floor() -> f64 {
    0.5
}

fn default_min_growth_pct() -> f64 {
    30.0
}

fn default_success_growth_pct() -> f64 {
    100.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            probability_threshold: default_probability_threshold(),
            success_mcap: default_success_mcap(),
            rugpull_drawdown_pct: default_rugpull_drawdown_pct(),
            holder_retention_floor: default_holder_retention_floor(),
            min_growth_pct: default_min_growth_pct(),
            success_growth_pct: default_success_growth_pct(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MINTSCORE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (MINTSCORE_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("MINTSCORE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let s = &self.scoring;
        if s.probability_threshold <= 0.0 || s.probability_threshold >= 1.0 {
            errors.push("probability_threshold must be between 0 and 1".to_string());
        }
        if s.success_mcap <= 0.0 {
            errors.push("success_mcap must be positive".to_string());
        }
        if s.rugpull_drawdown_pct <= 0.0 || s.rugpull_drawdown_pct > 100.0 {
            errors.push("rugpull_drawdown_pct must be in (0, 100]".to_string());
        }
        if s.holder_retention_floor <= 0.0 || s.holder_retention_floor >= 1.0 {
            errors.push("holder_retention_floor must be between 0 and 1".to_string());
        }
        if s.min_growth_pct < 0.0 {
            errors.push("min_growth_pct must be non-negative".to_string());
        }
        if s.success_growth_pct < s.min_growth_pct {
            errors.push("success_growth_pct must be at least min_growth_pct".to_string());
        }

        if self.model.rounds == 0 {
            errors.push("model.rounds must be positive".to_string());
        }
        if self.model.learning_rate <= 0.0 || self.model.learning_rate > 1.0 {
            errors.push("model.learning_rate must be in (0, 1]".to_string());
        }
        if self.model.dir.trim().is_empty() {
            errors.push("model.dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
