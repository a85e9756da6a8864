//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping portal client errors and
/// adding per-policy and input validation failures.
#[derive(Debug)]
pub enum SlayerError {
    /// An error from the underlying portal client.
    Api(iscslayer_api::Error),
    /// The advanced search returned no row for the policy number.
    PolicyNotFound(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl SlayerError {
    /// True when the failure was a missing search-results row rather than a
    /// transport or authentication problem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PolicyNotFound(_))
    }
}

impl fmt::Display for SlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "Portal error: {}", e),
            Self::PolicyNotFound(policy) => write!(f, "No search results for policy {}", policy),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for SlayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<iscslayer_api::Error> for SlayerError {
    fn from(e: iscslayer_api::Error) -> Self {
        Self::Api(e)
    }
}
