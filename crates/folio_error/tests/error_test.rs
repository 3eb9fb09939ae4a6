//! Tests for error construction and conversion.

use folio_core::UsageReport;
use folio_error::{
    ConfigError, ConfigErrorKind, FolioError, FolioErrorKind, GatewayError, GatewayErrorKind,
    StorageError, StorageErrorKind,
};

#[test]
fn test_location_is_tracked() {
    let err = StorageError::new(StorageErrorKind::BlobNotFound("42".to_string()));
    assert!(err.file.ends_with("error_test.rs"));
    assert!(err.line > 0);
}

#[test]
fn test_exhaustion_exposes_usage() {
    let usage = UsageReport::new(std::iter::empty(), 10, 100);
    let err = StorageError::new(StorageErrorKind::Exhausted(Box::new(usage.clone())));
    assert_eq!(err.usage(), Some(&usage));
    assert!(err.is_capacity());

    let err = StorageError::new(StorageErrorKind::InvalidFile("empty name".to_string()));
    assert!(err.usage().is_none());
    assert!(!err.is_capacity());
}

#[test]
fn test_conversion_into_folio_error() {
    let err: FolioError = GatewayError::new(GatewayErrorKind::AccessDenied("k".into())).into();
    assert!(matches!(err.kind(), FolioErrorKind::Gateway(_)));
    assert!(err.as_storage().is_none());

    let err: FolioError = ConfigError::new(ConfigErrorKind::Parse("bad".into())).into();
    assert!(format!("{}", err).contains("Failed to parse configuration: bad"));
}
