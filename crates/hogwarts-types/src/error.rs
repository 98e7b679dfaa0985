use thiserror::Error;

/// Errors raised while preparing, dispatching or relaying a chat request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Malformed body or missing credential; nothing was sent upstream.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The envelope or game state could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The inference service could not be reached.
    #[error("failed to reach inference service: {0}")]
    UpstreamConnect(String),

    /// The inference service answered with a non-success status.
    #[error("inference service returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The upstream body broke mid-stream.
    #[error("inference stream interrupted: {0}")]
    UpstreamRead(String),

    /// The client went away; not a failure.
    #[error("client disconnected")]
    ClientDisconnected,
}

/// Errors related to user accounts and sessions.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("password hashing failed")]
    Hashing,

    #[error("token error: {0}")]
    Token(String),
}

/// Errors related to character operations.
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("character not found")]
    NotFound,

    #[error("invalid character: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from session token verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed token")]
    Malformed,

    #[error("token signature mismatch")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

/// Errors from repository operations (used by trait definitions in hogwarts-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
