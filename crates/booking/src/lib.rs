use std::{error, fmt};

pub mod client;
pub mod denormalize;
pub mod gateway;
pub mod store;
pub mod validate;

use validate::ValidationError;

/// Errors surfaced to the caller of the data-access layer. Transport
/// failures never appear here; those are recovered internally by falling
/// back to the local store.
#[derive(Debug)]
pub enum RequestError {
    NotFound,
    Validation(ValidationError),
    Other(Box<dyn error::Error + Send + Sync>),
}

impl RequestError {
    pub fn other<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Other(Box::new(why))
    }
}

impl error::Error for RequestError {}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NotFound => write!(f, "record not found"),
            RequestError::Validation(why) => write!(f, "{}", why),
            RequestError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(why: ValidationError) -> Self {
        Self::Validation(why)
    }
}

impl From<store::StoreError> for RequestError {
    fn from(why: store::StoreError) -> Self {
        match why {
            store::StoreError::NotFound => Self::NotFound,
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
