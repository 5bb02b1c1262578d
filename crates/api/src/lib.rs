use std::error;
use std::fmt;
use std::sync::Arc;

use booking::gateway::GatewayError;

pub mod client;

pub use client::{ApiClient, ApiConfig};

/// How long a request may take before the backend counts as unreachable.
/// The fallback must not wait on a slow backend, only on a failed one, so
/// the default stays short.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    NotFound {
        url: String,
    },
    InvalidConfig(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, url, text)
                }
                None => write!(f, "Invalid Response ({}) {}", status_code, url),
            },
            ApiError::NotFound { url } => write!(f, "Not Found: {}", url),
            ApiError::InvalidConfig(why) => write!(f, "Invalid configuration: {}", why),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<ApiError> for GatewayError {
    fn from(why: ApiError) -> Self {
        match why {
            ApiError::NotFound { .. } => GatewayError::NotFound,
            other => GatewayError::unavailable(other),
        }
    }
}
