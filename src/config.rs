//! Configuration management for the `Tripplanr` backend
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and validates all settings before the services are wired up.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Root configuration structure for the `Tripplanr` backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripplanrConfig {
    /// Travel-search upstream (flights + hotels)
    pub amadeus: AmadeusConfig,
    /// Conversational reasoning backend used for ranking
    pub assistant: AssistantConfig,
    /// Geocoding and nearby-places provider
    pub maps: MapsConfig,
    /// Currency conversion provider
    pub currency: CurrencyConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Travel-search upstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    #[serde(default = "default_amadeus_base_url")]
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Request timeout in seconds
    #[serde(default = "default_amadeus_timeout")]
    pub timeout_seconds: u32,
    /// Maximum flight offers requested per search
    #[serde(default = "default_max_flight_results")]
    pub max_flight_results: u32,
    /// Hotel ids per upstream batch call
    #[serde(default = "default_hotel_chunk_size")]
    pub hotel_chunk_size: usize,
    /// Longest stay span (nights) one hotel search call may cover
    #[serde(default = "default_max_segment_nights")]
    pub max_segment_nights: i64,
}

/// Reasoning backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,
    pub api_key: String,
    /// Pre-provisioned assistant bound to per-run instruction overrides
    pub assistant_id: String,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    /// Run polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Give up polling a run after this many seconds
    #[serde(default = "default_run_timeout")]
    pub run_timeout_seconds: u64,
    /// Minimum spacing between reasoning calls (shared quota)
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    /// Longer spacing before the detail stage of hotel ranking
    #[serde(default = "default_stage_pause_ms")]
    pub stage_pause_ms: u64,
}

/// Geocoding / nearby-places provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
    pub api_key: String,
    /// Nearby-search radius in meters
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_m: u32,
    /// Request timeout in seconds
    #[serde(default = "default_maps_timeout")]
    pub timeout_seconds: u32,
}

/// Currency conversion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_currency_base_url")]
    pub base_url: String,
    /// Currency every hotel offer is normalized to before ranking
    #[serde(default = "default_target_currency")]
    pub target: String,
    /// Transient-failure retries for conversion lookups
    #[serde(default = "default_currency_retries")]
    pub max_retries: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_amadeus_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_amadeus_timeout() -> u32 {
    30
}

fn default_max_flight_results() -> u32 {
    50
}

fn default_hotel_chunk_size() -> usize {
    20
}

fn default_max_segment_nights() -> i64 {
    30
}

fn default_assistant_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_assistant_model() -> String {
    "gpt-4o".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_run_timeout() -> u64 {
    120
}

fn default_pause_ms() -> u64 {
    2000
}

fn default_stage_pause_ms() -> u64 {
    10_000
}

fn default_maps_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_nearby_radius() -> u32 {
    5000
}

fn default_maps_timeout() -> u32 {
    10
}

fn default_currency_base_url() -> String {
    "https://api.exchangerate.host".to_string()
}

fn default_target_currency() -> String {
    "USD".to_string()
}

fn default_currency_retries() -> u32 {
    3
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TripplanrConfig {
    /// Load configuration from `config.toml` (if present) and environment
    /// variables with the `TRIPPLANR_` prefix.
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        let mut builder = Config::builder();
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANR")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TripplanrConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_credentials(&self) -> Result<()> {
        if self.amadeus.api_key.is_empty() || self.amadeus.api_secret.is_empty() {
            return Err(Error::Config(
                "Travel-search API key and secret must be set".to_string(),
            )
            .into());
        }
        if self.assistant.api_key.is_empty() {
            return Err(
                Error::Config("Assistant API key must be set".to_string()).into(),
            );
        }
        if self.maps.api_key.is_empty() {
            return Err(Error::Config("Maps API key must be set".to_string()).into());
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.amadeus.timeout_seconds == 0 || self.amadeus.timeout_seconds > 300 {
            return Err(Error::Config(
                "Travel-search timeout must be between 1 and 300 seconds".to_string(),
            )
            .into());
        }
        if self.amadeus.hotel_chunk_size == 0 || self.amadeus.hotel_chunk_size > 100 {
            return Err(Error::Config(
                "Hotel chunk size must be between 1 and 100".to_string(),
            )
            .into());
        }
        if self.amadeus.max_segment_nights <= 0 {
            return Err(Error::Config(
                "Max segment nights must be positive".to_string(),
            )
            .into());
        }
        if self.assistant.poll_interval_ms == 0 {
            return Err(Error::Config(
                "Assistant poll interval must be positive".to_string(),
            )
            .into());
        }
        if self.maps.nearby_radius_m == 0 || self.maps.nearby_radius_m > 50_000 {
            return Err(Error::Config(
                "Nearby-search radius must be between 1 and 50000 meters".to_string(),
            )
            .into());
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("amadeus", &self.amadeus.base_url),
            ("assistant", &self.assistant.base_url),
            ("maps", &self.maps.base_url),
            ("currency", &self.currency.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.currency.target.len() != 3 {
            return Err(Error::Config(
                "Target currency must be a 3-letter code".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
