use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::auth::ownership::authorize;
use crate::error::{AppError, AppResult};
use crate::extract::{validated_body, ValidatedJson};
use crate::models::mood::{CreateMoodRequest, Mood, MoodEntry, UpdateMoodRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteMoodResponse {
    pub msg: &'static str,
    pub id: Uuid,
}

fn not_found() -> AppError {
    AppError::NotFound("Mood entry not found".into())
}

/// Ids that are not UUIDs cannot name an entry, so they are a 404.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

/// Fetch then ownership check, shared by every entry-specific route.
async fn load_owned(state: &AppState, id: Uuid, caller: &AuthUser) -> AppResult<MoodEntry> {
    let entry = state.store.find(id).await?.ok_or_else(not_found)?;
    authorize(&entry, caller)?;
    Ok(entry)
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let entries = state.store.list_for_owner(auth_user.id).await?;
    Ok(Json(entries))
}

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    let mood: Mood = body.mood.as_deref().unwrap_or_default().parse()?;

    let entry = state
        .store
        .insert(MoodEntry::new(auth_user.id, mood, body.notes))
        .await?;

    tracing::info!(user_id = %auth_user.id, mood_id = %entry.id, mood = %entry.mood, "Mood entry created");
    Ok(Json(entry))
}

pub async fn get_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<MoodEntry>> {
    let entry = load_owned(&state, parse_id(&id)?, &auth_user).await?;
    Ok(Json(entry))
}

pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MoodEntry>> {
    let id = parse_id(&id)?;
    load_owned(&state, id, &auth_user).await?;

    let changes = validated_body::<UpdateMoodRequest>(&body)?.into_changes()?;

    // Gone between the ownership check and the write.
    let entry = state
        .store
        .update(id, auth_user.id, &changes)
        .await?
        .ok_or_else(not_found)?;

    tracing::debug!(user_id = %auth_user.id, mood_id = %entry.id, "Mood entry updated");
    Ok(Json(entry))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteMoodResponse>> {
    let id = parse_id(&id)?;
    load_owned(&state, id, &auth_user).await?;

    if !state.store.delete(id, auth_user.id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %auth_user.id, mood_id = %id, "Mood entry removed");
    Ok(Json(DeleteMoodResponse {
        msg: "Mood entry removed",
        id,
    }))
}
