use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The node holds no data for the requested feed yet.
    #[error("feed not found on node")]
    NotFound,

    /// The exact (index, payload) was already committed. Recoverable:
    /// the writer treats this as success.
    #[error("update already committed at this index")]
    Conflict,

    /// The postage stamp no longer covers the publish.
    #[error("stamp exhausted")]
    StampExhausted,

    /// The node rejected the update's signature or credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other node-side rejection.
    #[error("node error (status {status}): {message}")]
    Node { status: u16, message: String },

    /// The node answered with a body the client could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
