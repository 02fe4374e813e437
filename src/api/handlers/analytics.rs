use axum::{extract::State, Json};

use crate::{
    api::AppState,
    error::AppResult,
    middleware::AuthUser,
    models::{GenrePreferences, Insights, RatingPatterns, UserStats, ViewingTrends},
    services::analytics,
};

pub async fn stats(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserStats>> {
    let stats = analytics::user_stats(state.interactions.as_ref(), user.user_id).await?;
    Ok(Json(stats))
}

pub async fn genres(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<GenrePreferences>> {
    let genres = analytics::genre_preferences(state.interactions.as_ref(), user.user_id).await?;
    Ok(Json(genres))
}

pub async fn ratings(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<RatingPatterns>> {
    let patterns = analytics::rating_patterns(state.interactions.as_ref(), user.user_id).await?;
    Ok(Json(patterns))
}

pub async fn trends(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ViewingTrends>> {
    let trends = analytics::viewing_trends(state.interactions.as_ref(), user.user_id).await?;
    Ok(Json(trends))
}

pub async fn insights(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Insights>> {
    let insights = analytics::insights(state.interactions.as_ref(), user.user_id).await?;
    Ok(Json(insights))
}
