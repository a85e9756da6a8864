//! Error types for the portal client.

/// Errors that can occur when talking to the portal.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The portal rejected the credentials or never left the login page.
    /// Fatal: nothing else can be fetched without a session.
    #[error("Authentication failed")]
    AuthFailed,
    /// An HTTP request failed (network error, timeout, or unexpected response).
    #[error("Request failed")]
    RequestFailed,
    /// The portal returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
}
