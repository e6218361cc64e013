use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures a request can end in. Each maps to one HTTP status.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Connection failed")]
    ConnectionFailed,

    #[error("{0}")]
    NotFound(&'static str),

    /// The detail is logged, never sent to the client.
    #[error("Internal Server Error")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConnectionFailed => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// The body of every response, successful or not.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status_code: u16,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct NoData {}

impl Envelope<NoData> {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Envelope {
            status_code: status.as_u16(),
            message: message.into(),
            data: NoData {},
        }
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Envelope {
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal(detail) => error!("Unhandled failure: {}", detail),
            AppError::Validation(detail) => error!("Validation error: {}", detail),
            _ => {}
        }

        (status, Json(Envelope::status(status, self.to_string()))).into_response()
    }
}
