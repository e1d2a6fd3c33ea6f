//! Configuration module

use std::env;

/// Default origins of the local frontend dev server
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:8080", "http://127.0.0.1:8080"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,

    /// Per-file upload limit in megabytes
    pub max_upload_mb: usize,

    /// Number of dominant colors extracted per image
    pub palette_size: usize,

    /// Histogram bins per RGB channel
    pub histogram_bins: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            max_upload_mb: 5,
            palette_size: 8,
            histogram_bins: 32,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.cors_origins),

            max_upload_mb: lookup("MAX_UPLOAD_MB")
                .and_then(|m| m.parse().ok())
                .filter(|m| *m > 0 && body_limit_for(*m).is_some())
                .unwrap_or(defaults.max_upload_mb),

            palette_size: lookup("PALETTE_SIZE")
                .and_then(|p| p.parse::<usize>().ok())
                .map(|p| p.clamp(2, 256))
                .unwrap_or(defaults.palette_size),

            histogram_bins: lookup("HISTOGRAM_BINS")
                .and_then(|b| b.parse::<usize>().ok())
                .map(|b| b.max(1))
                .unwrap_or(defaults.histogram_bins),

            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Per-file upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(MB)
    }

    /// Whole request body limit: three uploads plus multipart framing
    pub fn body_limit_bytes(&self) -> usize {
        body_limit_for(self.max_upload_mb).unwrap_or(usize::MAX)
    }
}

const MB: usize = 1024 * 1024;
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn body_limit_for(max_upload_mb: usize) -> Option<usize> {
    max_upload_mb
        .checked_mul(MB)?
        .checked_mul(3)?
        .checked_add(MULTIPART_OVERHEAD)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
