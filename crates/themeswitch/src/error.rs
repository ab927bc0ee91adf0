//! Configuration errors.

use std::path::PathBuf;

/// Error returned when loading a [`Config`](crate::Config) fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid YAML or has unexpected keys
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// An appearance setting other than auto, light, dark or unknown
    #[error("invalid appearance '{0}' (expected auto, light, dark or unknown)")]
    InvalidAppearance(String),
}
