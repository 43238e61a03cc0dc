use thiserror::Error;

/// Caller-supplied input that the core refuses to act on.
///
/// Surfaced immediately and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown window: {0}")]
    UnknownWindow(String),

    #[error("unknown lookback: {0}")]
    UnknownLookback(String),

    #[error("item {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("item {id} has invalid `{field}`: {reason}")]
    InvalidField {
        id: String,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("invalid sources configuration: {0}")]
    Validation(String),
}
