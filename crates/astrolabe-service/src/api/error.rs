use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use astrolabe::chart::ChartError;

use crate::geocode::GeocodeError;
use crate::store::StoreError;

const INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Stored in the signs-only schema; migrate before computing with it
    #[error("Chart {0} uses the legacy schema and must be migrated first")]
    LegacyChart(Uuid),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

/// `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::LegacyChart(_) => 422,
            ApiError::Upstream(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }

    /// Response body. Internal detail is logged here and never rendered.
    pub fn body(&self) -> ErrorBody {
        let error = match self {
            ApiError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        ErrorBody { error }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound("Chart not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ChartError> for ApiError {
    fn from(e: ChartError) -> Self {
        match e {
            ChartError::InvalidCoordinates { .. } => ApiError::Validation(e.to_string()),
            ChartError::MissingBodies { .. } | ChartError::Ephemeris(_) => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::QueryTooShort => ApiError::Validation(e.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_not_rendered() {
        let err = ApiError::Internal("sqlite: disk I/O error at /var/db".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body().error, "Internal Server Error");
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.body().error, "Chart not found");
    }
}
