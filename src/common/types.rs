use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single workout record as returned by the vendor. The fields are vendor
/// defined and passed through untouched.
pub type Workout = Value;

/// One page of the workout list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Workout>,
    /// Pagination metadata (`page`, `limit`, `total`, `page_count`, ...).
    #[serde(flatten)]
    pub pagination: Map<String, Value>,
}

impl WorkoutPage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Workout>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Workout>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, thiserror::Error)]
pub enum PelotonError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not authenticated. Call login() first.")]
    NotAuthenticated,
    #[error("Not connected. Call connect() first.")]
    NotConnected,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("HTTP {status} for {endpoint}")]
    Http { status: StatusCode, endpoint: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest_middleware::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for PelotonError {
    fn from(err: reqwest::Error) -> Self {
        PelotonError::Network(reqwest_middleware::Error::Reqwest(err))
    }
}

impl PelotonError {
    /// Usage errors are programmer mistakes, not runtime conditions.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, PelotonError::NotAuthenticated | PelotonError::NotConnected)
    }
}

pub type PelotonResult<T> = Result<T, PelotonError>;
