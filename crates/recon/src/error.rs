use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty name, duplicate field key, etc.).
    ConfigValidation(String),
    /// An input file could not be opened or read.
    InputAccess { source: String, path: String, message: String },
    /// Input content is not a JSON array of record-shaped objects.
    Parse { source: String, message: String },
}

impl ReconError {
    pub fn parse(source: &str, message: impl Into<String>) -> Self {
        Self::Parse { source: source.into(), message: message.into() }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InputAccess { source, path, message } => {
                write!(f, "{source}: cannot read {path}: {message}")
            }
            Self::Parse { source, message } => write!(f, "{source}: malformed input: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}
