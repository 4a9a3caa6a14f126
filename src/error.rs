//! Error types. Only configuration loading and the external question source can fail;
//! everything else in the engine degrades instead of erroring.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse TOML config: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("invalid config value for {field}: {reason}")]
  Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("question source unavailable: {0}")]
  Unavailable(String),
  #[error("question source timed out after {0} ms")]
  Timeout(u64),
  #[error("question source returned malformed payload: {0}")]
  Malformed(String),
}
