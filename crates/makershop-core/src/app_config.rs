use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level configuration, derived from environment variables.
///
/// The pricing configuration is a separate document (see
/// [`crate::pricing_config`]) loaded from `pricing_config_path`.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Root directory that all local media candidates must resolve inside.
    pub media_root: PathBuf,
    /// Base URL prepended to media-root-relative paths when building
    /// externally servable image links, e.g. `https://shop.example.com`.
    pub public_base_url: String,
    /// Directory (or bucket mount) that import error reports are written to.
    pub report_dir: PathBuf,
    pub pricing_config_path: PathBuf,
    /// Staging rows merged per transaction during `merge_batch`.
    pub merge_chunk_size: usize,
    /// Concurrent media-sync jobs drained from the media queue.
    pub media_concurrency: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("media_root", &self.media_root)
            .field("public_base_url", &self.public_base_url)
            .field("report_dir", &self.report_dir)
            .field("pricing_config_path", &self.pricing_config_path)
            .field("merge_chunk_size", &self.merge_chunk_size)
            .field("media_concurrency", &self.media_concurrency)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
