use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of jobs, got {0}")]
    NotAnArray(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("permission to read the current position was denied")]
    PermissionDenied,

    #[error("current position is unavailable")]
    Unavailable,

    #[error("timed out waiting for the current position")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read gazetteer {path}: {reason}")]
    Gazetteer { path: String, reason: String },
}
