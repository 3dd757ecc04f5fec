//! Shared types and configuration for the makershop catalog pipeline.

use thiserror::Error;

pub mod app_config;
pub mod attrs;
mod config;
pub mod jobs;
pub mod links;
pub mod num;
pub mod pricing_config;
pub mod staging;

pub use app_config::{AppConfig, Environment};
pub use attrs::{merge_attributes, AttributeMap};
pub use config::{load_app_config, load_app_config_from_env};
pub use jobs::{ImportCsvJob, ImportUrlJob, MediaJob};
pub use num::parse_flexible_number;
pub use pricing_config::{load_pricing_config, PricingConfig, RoundingStrategy};
pub use staging::{RowError, StagingRow};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("cannot read pricing config at {path}: {source}")]
    PricingFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse pricing config at {path}: {source}")]
    PricingFileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("pricing config validation failed: {0}")]
    Validation(String),
}
