use std::io;
use thiserror::Error;

/// Configuration error type.
///
/// Every variant renders as a human-readable message; the host reports it
/// verbatim and aborts the configuration pass.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A directive was used in a position where it is not allowed.
    #[error("{directive} {message}")]
    Context {
        /// Name of the offending directive.
        directive: String,
        /// Why the position is not allowed.
        message: String,
    },

    /// A value does not match the grammar of its parser.
    #[error("{0}")]
    Format(String),

    /// A value is well-formed but violates a domain rule.
    #[error("{0}")]
    Semantic(String),

    /// Structural problem in configuration text (unclosed container etc).
    #[error("Syntax error on line {line} of {file}: {message}")]
    Syntax {
        /// File the text came from.
        file: String,
        /// 1-based line number.
        line: usize,
        /// Problem description.
        message: String,
    },

    /// A directive handler failed; carries the directive's provenance.
    #[error("Syntax error on line {line} of {file}: {directive}: {source}")]
    Directive {
        /// Directive name as written.
        directive: String,
        /// File the directive was declared in.
        file: String,
        /// 1-based line number.
        line: usize,
        /// The handler's error.
        #[source]
        source: Box<ConfigError>,
    },

    /// Failed to read a configuration file.
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A scope handle from another (or torn-down) configuration pass was used.
    #[error("scope {scope} does not belong to the current configuration pass")]
    StaleScope {
        /// Display form of the stale handle.
        scope: String,
    },
}

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Directive used in a disallowed position.
    Context,
    /// Value failed a parser's grammar.
    Format,
    /// Value violates a domain rule.
    Semantic,
    /// Malformed configuration text.
    Syntax,
    /// File could not be read.
    Io,
    /// Handle from a stale pass.
    Stale,
}

impl ConfigError {
    /// Classify the error, looking through [`ConfigError::Directive`] wrappers.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Context { .. } => ErrorKind::Context,
            Self::Format(_) => ErrorKind::Format,
            Self::Semantic(_) => ErrorKind::Semantic,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Directive { source, .. } => source.kind(),
            Self::Read { .. } => ErrorKind::Io,
            Self::StaleScope { .. } => ErrorKind::Stale,
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub(crate) fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic(message.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
