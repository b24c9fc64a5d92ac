use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::AppState;

/// POST /api/insights. `mood` is free text here; it is only echoed into
/// the prompt.
#[derive(Debug, Deserialize, Validate)]
pub struct InsightRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Mood required"))]
    pub mood: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightResponse {
    pub insight: String,
}

pub async fn generate_insight(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<InsightRequest>,
) -> AppResult<Json<InsightResponse>> {
    let insight = state
        .insights
        .generate(&state.config.insight, &body.mood, body.notes.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Insight provider failed");
            AppError::Upstream(e.upstream_message())
        })?;

    Ok(Json(InsightResponse { insight }))
}
