use thiserror::Error;

/// Failure of a retried operation, carrying its last error
#[derive(Error, Debug)]
pub enum RetryError<E> {
    #[error("Operation failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    #[error("Operation failed with a non-retryable error after {attempts} attempts: {source}")]
    NotRetryable {
        attempts: u32,
        #[source]
        source: E,
    },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::NotRetryable { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The error returned by the last attempt
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::NotRetryable { source, .. } => source,
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::NotRetryable { source, .. } => source,
        }
    }
}
