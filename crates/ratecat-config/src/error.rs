use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration bundle {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no configuration bundle for business line {name:?} (available: {available})")]
    UnknownBusinessLine { name: String, available: String },

    #[error("business line {name:?} is defined by more than one bundle")]
    DuplicateBusinessLine { name: String },

    #[error("invalid configuration for {business_line}: {message}")]
    Invalid {
        business_line: String,
        message: String,
    },

    #[error("invalid pattern {pattern:?} in {business_line}: {source}")]
    InvalidPattern {
        business_line: String,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("invalid locale profile for {business_line}: {message}")]
    InvalidLocale {
        business_line: String,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(business_line: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            business_line: business_line.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
