use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use surrealdb::Error as SError;

use thiserror::Error;
use tracing::error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SurrealDb Error: {0}")]
    SurrealError(#[from] SError),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Axum Error: {0}")]
    AxumError(#[from] axum::Error),

    #[error("Http client Error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Validator Error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Not Found")]
    NotFound,

    // Portal lookups render missing, malformed and unknown tokens identically
    // so a prober learns nothing from the response shape.
    #[error("Invalid or expired portal token")]
    TokenNotFound,

    #[error("This link is no longer valid for this action")]
    Conflict,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payment not completed")]
    PaymentNotCompleted,

    #[error("Payment provider error: {0}")]
    Upstream(String),

    #[error("unknown Error")]
    Unknown,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Error::SurrealError(error) => {
                error!("SurrealDb Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::IoError(error) => {
                error!("Io Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::AxumError(error) => {
                error!("Axum Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::ReqwestError(error) => {
                error!("Http client Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::Upstream(detail) => {
                error!("Payment provider Error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::ValidationError(error) => {
                let message = format!("Input validation error: [{}]", error).replace('\n', ", ");
                error!("Validation Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, message)
            }
            Error::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            Error::PaymentNotCompleted => {
                (StatusCode::BAD_REQUEST, "Payment not completed".to_string())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            Error::TokenNotFound => (
                StatusCode::NOT_FOUND,
                "Invalid or expired portal token".to_string(),
            ),
            Error::Conflict => (
                StatusCode::CONFLICT,
                "This link is no longer valid for this action".to_string(),
            ),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Error::Unknown => (StatusCode::BAD_REQUEST, "Unknown".to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
