use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::RecommendationSet,
    services::recommendations::{recommend_for_user, DEFAULT_LIMIT},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    limit: Option<usize>,
}

/// Catalog trouble never fails this endpoint; it shows up in the
/// `algorithm` tag and the size of the list instead.
pub async fn recommend(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationSet>> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if limit == 0 {
        return Err(AppError::InvalidInput(
            "limit must be at least 1".to_string(),
        ));
    }

    let set = recommend_for_user(
        state.interactions.as_ref(),
        state.recommender.as_ref(),
        user.user_id,
        limit,
    )
    .await?;

    Ok(Json(set))
}
