use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{
        ContentKind, Favorite, FavoriteInput, FavoriteToggle, RateInput, Rating,
        WatchHistoryEntry, WatchInput,
    },
};

/// Identifies one catalog item in query strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    movie_id: i64,
    movie_type: ContentKind,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFavoriteResponse {
    is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    count: u64,
}

pub async fn rate(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<RateInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let Json(input) = payload?;

    if !input.rating_in_range() {
        return Err(AppError::InvalidInput(
            "Rating must be between 1 and 10".to_string(),
        ));
    }

    let rating = state.interactions.upsert_rating(user.user_id, &input).await?;

    tracing::debug!(
        user_id = %user.user_id,
        movie_id = input.movie_id,
        kind = %input.movie_type,
        rating = input.rating,
        "Rating saved"
    );

    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn ratings(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.interactions.list_ratings(user.user_id).await?))
}

/// The caller's rating of one item, `null` when unrated
pub async fn rating(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> AppResult<Json<Option<Rating>>> {
    let Query(item) = query?;
    let rating = state
        .interactions
        .get_rating(user.user_id, item.movie_id, item.movie_type)
        .await?;
    Ok(Json(rating))
}

/// Removes the caller's rating; deleting a missing rating is not an error
pub async fn delete_rating(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> AppResult<Json<Option<Rating>>> {
    let Query(item) = query?;
    let removed = state
        .interactions
        .delete_rating(user.user_id, item.movie_id, item.movie_type)
        .await?;
    Ok(Json(removed))
}

pub async fn toggle_favorite(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<FavoriteInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<FavoriteToggle>)> {
    let Json(input) = payload?;
    let toggle = state.interactions.toggle_favorite(user.user_id, &input).await?;

    tracing::debug!(
        user_id = %user.user_id,
        movie_id = input.movie_id,
        action = ?toggle.action,
        "Favorite toggled"
    );

    Ok((StatusCode::CREATED, Json(toggle)))
}

pub async fn favorites(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Favorite>>> {
    Ok(Json(state.interactions.list_favorites(user.user_id).await?))
}

pub async fn is_favorite(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> AppResult<Json<IsFavoriteResponse>> {
    let Query(item) = query?;
    let is_favorite = state
        .interactions
        .is_favorite(user.user_id, item.movie_id, item.movie_type)
        .await?;
    Ok(Json(IsFavoriteResponse { is_favorite }))
}

pub async fn watch(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<WatchInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchHistoryEntry>)> {
    let Json(input) = payload?;
    let entry = state.interactions.append_watch(user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn history(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<Vec<WatchHistoryEntry>>> {
    let Query(query) = query?;

    if query.limit == Some(0) {
        return Err(AppError::InvalidInput(
            "limit must be at least 1".to_string(),
        ));
    }

    Ok(Json(state.interactions.list_watch(user.user_id, query.limit).await?))
}

pub async fn clear_history(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ClearedResponse>> {
    let count = state.interactions.clear_watch(user.user_id).await?;
    tracing::info!(user_id = %user.user_id, count, "Watch history cleared");
    Ok(Json(ClearedResponse { count }))
}
