use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Edge error code returned when a prepaid developer cannot cover a plan's fees.
pub const EDGE_INSUFFICIENT_FUNDS: &str = "mint.insufficientFunds";
/// Edge error code returned when a new purchase overlaps an existing one.
pub const EDGE_OVERLAPPING_PLANS: &str = "mint.developerHasFollowingOverlapRatePlans";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Overlapping purchased plans: {0}")]
    OverlappingPlans(String),

    #[error("Apigee Edge error {code} ({status}): {message}")]
    Edge {
        status: u16,
        code: String,
        message: String,
    },

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// The Edge error code carried by this error, if it came from Edge.
    pub fn edge_code(&self) -> Option<&str> {
        match self {
            AppError::Edge { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::OverlappingPlans(_) => StatusCode::CONFLICT,
            AppError::Edge { status: 404, .. } => StatusCode::NOT_FOUND,
            AppError::Edge { .. } | AppError::ExternalApiError(_) | AppError::ReqwestError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message): (&str, String) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                ("FORBIDDEN", "Forbidden".to_string())
            }
            AppError::InsufficientFunds(msg) => {
                log::warn!("Insufficient funds: {msg}");
                ("INSUFFICIENT_FUNDS", msg.clone())
            }
            AppError::OverlappingPlans(msg) => {
                log::warn!("Overlapping plans: {msg}");
                ("OVERLAPPING_PLANS", msg.clone())
            }
            AppError::Edge {
                status,
                code,
                message,
            } => {
                log::error!("Apigee Edge error {code} ({status}): {message}");
                if *status == 404 {
                    ("NOT_FOUND", message.clone())
                } else {
                    ("EDGE_ERROR", message.clone())
                }
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                ("EXTERNAL_API_ERROR", msg.clone())
            }
            AppError::ReqwestError(err) => {
                log::error!("HTTP request error: {err}");
                ("EXTERNAL_API_ERROR", "Apigee Edge is unreachable".to_string())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            _ => {
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
