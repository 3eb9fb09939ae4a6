//! Top-level error wrapper types.

use crate::{ConfigError, GatewayError, StorageError};

/// Every error family the Folio crates can produce.
///
/// # Examples
///
/// ```
/// use folio_error::{ConfigError, ConfigErrorKind, FolioError};
///
/// let err: FolioError = ConfigError::new(ConfigErrorKind::Invalid("batch_size".into())).into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FolioErrorKind {
    /// Tier, blob store or handle error
    #[from(StorageError)]
    Storage(StorageError),
    /// Secure access gateway error
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Folio error with kind discrimination.
///
/// # Examples
///
/// ```
/// use folio_error::{FolioErrorKind, FolioResult, StorageError, StorageErrorKind};
///
/// fn might_fail() -> FolioResult<()> {
///     Err(StorageError::new(StorageErrorKind::Unavailable("offline".into())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), FolioErrorKind::Storage(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Folio Error: {}", _0)]
pub struct FolioError(Box<FolioErrorKind>);

impl FolioError {
    /// Create a new error from a kind.
    pub fn new(kind: FolioErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FolioErrorKind {
        &self.0
    }

    /// Storage error, if this is one.
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self.kind() {
            FolioErrorKind::Storage(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to FolioErrorKind
impl<T> From<T> for FolioError
where
    T: Into<FolioErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Folio operations.
pub type FolioResult<T> = std::result::Result<T, FolioError>;
