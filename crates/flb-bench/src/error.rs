use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// The sync tag never reported full replication within its trial
    /// budget. Fatal; not retried further up the stack.
    #[error("sync tag {tag} incomplete after {trials} trials")]
    SyncTagTimeout { tag: u64, trials: u32 },

    /// The convergence loop exhausted its optional poll budget. Only
    /// raised when a bound is configured.
    #[error("readers did not converge after {polls} polls")]
    ConvergenceTimeout { polls: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("feed error: {0}")]
    Feed(#[from] flb_feed::FeedError),

    #[error("client error: {0}")]
    Client(#[from] flb_client::ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;
