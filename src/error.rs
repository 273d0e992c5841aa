//! Error types for the bridge.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Backend request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Translation error: {message}")]
    Translation { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ProxyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
        }
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation {
            message: msg.into(),
        }
    }

    /// Map a transport failure, keeping timeouts distinguishable.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64, context: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout_secs,
            }
        } else {
            Self::backend(format!("{context}: {err}"))
        }
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } | Self::Toml(_) => "config",
            Self::Backend { .. } | Self::Http(_) => "backend",
            Self::Timeout { .. } => "timeout",
            Self::Translation { .. } | Self::Json(_) => "translation",
            Self::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
