//! Catalog proxy endpoints. Bodies are relayed from the catalog as-is.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::{ContentKind, DiscoverParams, DEFAULT_DISCOVER_SORT},
};

fn page_or_default(page: Option<u32>) -> u32 {
    page.unwrap_or(1).max(1)
}

/// Drops blank query values so `?genre=` means "no genre filter"
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    genre: Option<String>,
    year: Option<String>,
    sort_by: Option<String>,
    page: Option<u32>,
    #[serde(rename = "releaseDateLte")]
    release_date_lte: Option<String>,
    #[serde(rename = "releaseDateGte")]
    release_date_gte: Option<String>,
    country: Option<String>,
}

impl From<DiscoverQuery> for DiscoverParams {
    fn from(query: DiscoverQuery) -> Self {
        Self {
            kind: ContentKind::from_query(query.kind.as_deref()),
            genre: non_blank(query.genre),
            year: non_blank(query.year),
            sort_by: non_blank(query.sort_by).unwrap_or_else(|| DEFAULT_DISCOVER_SORT.to_string()),
            page: page_or_default(query.page),
            release_date_lte: non_blank(query.release_date_lte),
            release_date_gte: non_blank(query.release_date_gte),
            country: non_blank(query.country),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KindPageQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    page: Option<u32>,
}

pub async fn discover(
    State(state): State<AppState>,
    query: Result<Query<DiscoverQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(query) = query?;
    let params = DiscoverParams::from(query);
    Ok(Json(state.catalog.discover(&params).await?))
}

pub async fn trending(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(query) = query?;
    let page = page_or_default(query.page);
    Ok(Json(state.catalog.trending(ContentKind::Movie, page).await?))
}

pub async fn tv_trending(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(query) = query?;
    let page = page_or_default(query.page);
    Ok(Json(state.catalog.trending(ContentKind::Tv, page).await?))
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(query) = query?;

    let text = non_blank(query.query)
        .ok_or_else(|| AppError::InvalidInput("Search query is required".to_string()))?;
    let kind = ContentKind::from_query(query.kind.as_deref());
    let page = page_or_default(query.page);

    Ok(Json(state.catalog.search(text.trim(), kind, page).await?))
}

pub async fn by_genre(
    State(state): State<AppState>,
    genre_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<KindPageQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Path(genre_id) = genre_id?;
    let Query(query) = query?;
    let kind = ContentKind::from_query(query.kind.as_deref());
    let page = page_or_default(query.page);

    Ok(Json(state.catalog.by_genre(genre_id, kind, page).await?))
}

pub async fn details(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<KindQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let kind = ContentKind::from_query(query.kind.as_deref());

    Ok(Json(state.catalog.details(id, kind).await?))
}

pub async fn similar(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<KindPageQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let kind = ContentKind::from_query(query.kind.as_deref());
    let page = page_or_default(query.page);

    Ok(Json(state.catalog.similar(id, kind, page).await?))
}

pub async fn watch_providers(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<KindQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let kind = ContentKind::from_query(query.kind.as_deref());

    Ok(Json(state.catalog.watch_providers(id, kind).await?))
}
