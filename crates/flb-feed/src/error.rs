use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The node has no update for this feed yet. Transient under eventual
    /// consistency; the convergence loop absorbs it.
    #[error("no update found for feed")]
    NotFound,

    #[error("client error: {0}")]
    Client(#[from] flb_client::ClientError),

    #[error("signature error: {0}")]
    Signature(#[from] flb_crypto::SignatureError),
}

pub type FeedResult<T> = Result<T, FeedError>;
