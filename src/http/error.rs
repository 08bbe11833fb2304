use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::PipelineError;

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can surface, each with a stage-appropriate status
#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    Unauthorized(&'static str),
    NotFound(&'static str),
    Database(sqlx::Error),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err)
    }
}

/// Convert JSON body deserialization failures into a 400 in our error shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Pipeline(PipelineError::Validation(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Resolution(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(PipelineError::Download(_))
            | ApiError::Pipeline(PipelineError::Transcription(_))
            | ApiError::Pipeline(PipelineError::Generation(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::Storage(_)) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Pipeline(err) => err.to_string(),
            ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => (*msg).to_string(),
            // Do not leak database details to callers
            ApiError::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let stage = match &self {
            ApiError::Pipeline(err) => err.stage(),
            ApiError::Unauthorized(_) => "auth",
            ApiError::NotFound(_) => "lookup",
            ApiError::Database(_) => "storage",
        };

        if status.is_server_error() {
            tracing::error!(status = %status, stage = stage, error = ?self, "Request failed");
        } else {
            tracing::debug!(status = %status, stage = stage, error = ?self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor that returns our error shape on deserialization failure
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ApiError::from)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_per_stage() {
        let cases = [
            (
                ApiError::Pipeline(PipelineError::Validation("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Pipeline(PipelineError::Resolution("x".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Pipeline(PipelineError::Download("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Pipeline(PipelineError::Transcription("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Pipeline(PipelineError::Generation("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::Unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("x"), StatusCode::NOT_FOUND),
            (
                ApiError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = ApiError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_pipeline_error_message_passes_through() {
        let err = ApiError::Pipeline(PipelineError::Generation("rate limited".into()));
        assert!(err.message().contains("rate limited"));
    }
}
