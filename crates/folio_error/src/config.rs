//! Configuration error types.

/// Kinds of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration source could not be read or merged
    #[display("Failed to read configuration: {}", _0)]
    Read(String),
    /// Merged configuration did not match the expected shape
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// A value was well-formed but unusable
    #[display("Invalid configuration value: {}", _0)]
    Invalid(String),
    /// Built-in pattern failed to compile
    #[display("Invalid pattern: {}", _0)]
    Pattern(String),
    /// Log subscriber could not be installed
    #[display("Failed to initialize logging: {}", _0)]
    Logging(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use folio_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Invalid("batch_size = 0".into()));
/// assert!(format!("{}", err).contains("batch_size"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error at the caller's location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
