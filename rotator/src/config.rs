//! Configuration management

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    /// Overrides the endpoint of every AWS client, e.g. a local emulator
    #[serde(default)]
    pub endpoint_url: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// IAM is a global service served from us-east-1
    #[serde(default = "default_iam_region")]
    pub iam_region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            region: None,
            iam_region: default_iam_region(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

fn default_iam_region() -> String {
    "us-east-1".to_string()
}

fn default_call_timeout_ms() -> u64 {
    2000
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path, `rotator.toml` in the working directory is
    /// read if present. `ROTATOR__AWS__REGION` style variables override it.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::with_name("rotator").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("ROTATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml(toml: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }
}
