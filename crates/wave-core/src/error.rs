use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FetchFailed,
    ParseFailed,
    GenerationFailed,
    ValidationFailed,
    ConfigParseError,
    PostNotFound,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FetchFailed => "E1001",
            Self::ParseFailed => "E1002",
            Self::GenerationFailed => "E2001",
            Self::ValidationFailed => "E2002",
            Self::ConfigParseError => "E3001",
            Self::PostNotFound => "E4001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FetchFailed => "Failed to load data source",
            Self::ParseFailed => "Malformed JSON document",
            Self::GenerationFailed => "Summary generation failed",
            Self::ValidationFailed => "Schema validation failed",
            Self::ConfigParseError => "Config file parse error",
            Self::PostNotFound => "Post not found",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::FetchFailed => Some("Check the source path or URL and retry (`r` in the TUI)."),
            Self::ParseFailed => {
                Some("Make sure the file is a JSON document of the expected shape.")
            }
            Self::GenerationFailed => {
                Some("Check that the API key environment variable is set and the model is reachable.")
            }
            Self::ValidationFailed => None,
            Self::ConfigParseError => Some("Fix syntax in .wave/config.toml and retry."),
            Self::PostNotFound => Some("Run `wave list` to see the available post ids."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures surfaced by the fetch, parse, summarize and config layers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaveError {
    /// Network/HTTP failure or unreadable local file while loading a source.
    #[error("failed to fetch {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    /// Body was not JSON, or not the expected document shape.
    #[error("failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Backend call failed (transport, provider error, missing credentials).
    #[error("generation failed: {0}")]
    Generation(String),

    /// Input or output did not match the declared schema.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Config file exists but could not be read or parsed.
    #[error("config error in {path}: {message}")]
    Config { path: String, message: String },

    /// No post with the given id in the loaded collection.
    #[error("post '{0}' not found")]
    NotFound(String),
}

impl WaveError {
    pub fn fetch(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Fetch { .. } => ErrorCode::FetchFailed,
            Self::Parse { .. } => ErrorCode::ParseFailed,
            Self::Generation(_) => ErrorCode::GenerationFailed,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Config { .. } => ErrorCode::ConfigParseError,
            Self::NotFound(_) => ErrorCode::PostNotFound,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// Generation and validation failures are handled the same way by callers:
    /// the card shows the fallback summary.
    #[must_use]
    pub const fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Validation(_))
    }
}
