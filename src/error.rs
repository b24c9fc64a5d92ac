use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use validator::ValidationErrors;

use crate::models::mood::UnknownMood;
use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidFields(#[from] ValidationErrors),

    #[error("Failed to get insights")]
    Upstream(Option<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<UnknownMood> for AppError {
    fn from(err: UnknownMood) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Internal failure text carried on 500 responses. Only rendered into the
/// body by [`expose_error_detail`] when running in development.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut detail = None;
        let mut details = None;

        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidFields(errors) => {
                details = Some(field_errors(errors));
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Upstream(upstream) => {
                if let Some(msg) = upstream {
                    details = Some(json!({ "upstream": msg }));
                }
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                detail = Some(e.to_string());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                detail = Some(e.to_string());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let mut error = json!({
            "message": message,
            "code": status.as_u16(),
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let mut response = (status, Json(json!({ "error": error }))).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// `{field: [message, ...]}` for every failing field.
fn field_errors(errors: &ValidationErrors) -> Value {
    let fields: Map<String, Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();
    Value::Object(fields)
}

/// Response mapper: in development, copy the hidden [`ErrorDetail`] of a 500
/// into the error body.
pub async fn expose_error_detail(State(state): State<AppState>, response: Response) -> Response {
    if !state.config.is_development() {
        return response;
    }

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let status = response.status();
    let body = json!({
        "error": {
            "message": "Internal server error",
            "code": status.as_u16(),
            "detail": detail,
        }
    });
    (status, Json(body)).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
