use thiserror::Error;

pub type IterGraphResult<T> = Result<T, IterGraphError>;

#[derive(Debug, Error)]
pub enum IterGraphError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown aggregator: {0}")]
    UnknownAggregator(String),

    #[error("computation failed in superstep {iteration}: {message}")]
    Compute { iteration: u64, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl IterGraphError {
    pub fn compute(iteration: u64, message: impl Into<String>) -> Self {
        Self::Compute {
            iteration,
            message: message.into(),
        }
    }
}
