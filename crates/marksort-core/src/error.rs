use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarksortError {
    #[error("Bookmark file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("No bookmark file given and {found} candidates in current directory: {candidates:?}")]
    AmbiguousInput {
        found: usize,
        candidates: Vec<PathBuf>,
    },

    #[error("Invalid rule set: {message}")]
    InvalidRuleSet { message: String },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("Claude CLI not found. Install it or use --mode rules")]
    ClaudeNotFound,

    #[error("Claude CLI execution failed: {message}")]
    ClaudeExecutionFailed { message: String },

    #[error("Malformed LLM response: {message}")]
    MalformedLlmResponse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarksortError>;

impl MarksortError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } => 2,
            Self::AmbiguousInput { .. } => 3,
            Self::InvalidRuleSet { .. } => 4,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::InvalidConfigValue { .. } => 5,
            Self::ClaudeNotFound => 6,
            _ => 1,
        }
    }
}
