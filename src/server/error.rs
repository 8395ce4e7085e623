//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; every
//! [`splitforge_common::Error`] is mapped to a status code here and nowhere else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use splitforge_common::Error;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in split handler"
            );
        }

        let body = json!({
            "detail": self.inner.to_string(),
            "code": self.inner.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn not_found_produces_404() {
        let response = AppError::new(Error::not_found("uploads/x.m4a")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_produces_400() {
        let response = AppError::new(Error::validation("chunkSeconds must be positive")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn tool_errors_produce_500() {
        let errors = [
            Error::tool_not_found("ffmpeg"),
            Error::processing("ffmpeg", "Invalid data found when processing input"),
            Error::NoOutput("check input format or ffmpeg install".into()),
            Error::transient("connection reset"),
        ];
        for err in errors {
            assert_eq!(
                AppError::new(err).into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[tokio::test]
    async fn body_carries_detail_and_code() {
        let response = AppError::new(Error::processing("ffmpeg", "bad input")).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "ffmpeg failed: bad input");
        assert_eq!(json["code"], "processing_error");
    }
}
