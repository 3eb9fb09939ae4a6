//! Secure access gateway error types.

/// Kinds of gateway errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GatewayErrorKind {
    /// The remote gateway refused to mint a URL
    #[display("Remote access denied: {}", _0)]
    AccessDenied(String),
    /// The request itself was malformed (empty key, non-remote descriptor)
    #[display("Invalid access request: {}", _0)]
    InvalidRequest(String),
}

/// Gateway error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    line: u32,
    file: &'static str,
}

impl GatewayError {
    /// Create a new gateway error with caller location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GatewayErrorKind {
        &self.kind
    }
}
