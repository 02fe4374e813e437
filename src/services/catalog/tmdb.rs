//! TMDB catalog provider
//!
//! Translates gateway operations into TMDB v3 requests. The API key travels as
//! the `api_key` query parameter. Response bodies are relayed as JSON; any
//! transport error, timeout, non-2xx status or undecodable body becomes
//! `AppError::ServiceUnavailable` with a fixed per-operation message.

use crate::{
    error::{AppError, AppResult},
    models::{ContentKind, DiscoverParams},
    services::catalog::CatalogProvider,
};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;

const TRENDING_FAILED: &str = "Failed to fetch trending content";
const DISCOVER_FAILED: &str = "Failed to discover content";
const SEARCH_FAILED: &str = "Failed to search content";
const DETAILS_FAILED: &str = "Failed to fetch content details";
const SIMILAR_FAILED: &str = "Failed to fetch similar content";
const GENRE_FAILED: &str = "Failed to fetch content by genre";
const PROVIDERS_FAILED: &str = "Failed to fetch watch providers";

const GENRE_SORT: &str = "popularity.desc";

type QueryParams = Vec<(&'static str, String)>;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbProvider {
    /// Builds the provider with a per-request timeout.
    ///
    /// A missing API key is accepted here so the service can still start;
    /// every call then fails as unavailable.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Maps discover filters onto TMDB's kind-specific parameter names
    pub(crate) fn discover_query(params: &DiscoverParams) -> QueryParams {
        let (year_param, lte_param, gte_param) = match params.kind {
            ContentKind::Movie => (
                "primary_release_year",
                "primary_release_date.lte",
                "primary_release_date.gte",
            ),
            ContentKind::Tv => (
                "first_air_date_year",
                "first_air_date.lte",
                "first_air_date.gte",
            ),
        };

        let mut query = vec![
            ("sort_by", params.sort_by.clone()),
            ("page", params.page.to_string()),
        ];

        let optional = [
            ("with_genres", &params.genre),
            (year_param, &params.year),
            (lte_param, &params.release_date_lte),
            (gte_param, &params.release_date_gte),
            ("with_origin_country", &params.country),
        ];

        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((name, value.to_string()));
            }
        }

        query
    }

    /// Issues a GET against `path` and relays the decoded body
    async fn get_json(
        &self,
        path: &str,
        query: QueryParams,
        failure: &'static str,
    ) -> AppResult<Value> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(path, "TMDB API key is not configured");
            return Err(AppError::ServiceUnavailable(failure.to_string()));
        };

        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(path, error = %e, "TMDB request failed");
                AppError::ServiceUnavailable(failure.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path, status = %status, body = %body, "TMDB returned an error status");
            return Err(AppError::ServiceUnavailable(failure.to_string()));
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::error!(path, error = %e, "Failed to decode TMDB response");
            AppError::ServiceUnavailable(failure.to_string())
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn discover(&self, params: &DiscoverParams) -> AppResult<Value> {
        let path = format!("/discover/{}", params.kind);
        self.get_json(&path, Self::discover_query(params), DISCOVER_FAILED)
            .await
    }

    async fn trending(&self, kind: ContentKind, page: u32) -> AppResult<Value> {
        let path = format!("/trending/{}/week", kind);
        self.get_json(&path, vec![("page", page.to_string())], TRENDING_FAILED)
            .await
    }

    async fn search(&self, query: &str, kind: ContentKind, page: u32) -> AppResult<Value> {
        let path = format!("/search/{}", kind);
        let params = vec![("query", query.to_string()), ("page", page.to_string())];
        self.get_json(&path, params, SEARCH_FAILED).await
    }

    async fn details(&self, id: i64, kind: ContentKind) -> AppResult<Value> {
        let path = format!("/{}/{}", kind, id);
        let params = vec![(
            "append_to_response",
            "credits,videos,similar".to_string(),
        )];
        self.get_json(&path, params, DETAILS_FAILED).await
    }

    async fn similar(&self, id: i64, kind: ContentKind, page: u32) -> AppResult<Value> {
        let path = format!("/{}/{}/similar", kind, id);
        self.get_json(&path, vec![("page", page.to_string())], SIMILAR_FAILED)
            .await
    }

    async fn by_genre(&self, genre_id: i64, kind: ContentKind, page: u32) -> AppResult<Value> {
        let path = format!("/discover/{}", kind);
        let params = vec![
            ("with_genres", genre_id.to_string()),
            ("page", page.to_string()),
            ("sort_by", GENRE_SORT.to_string()),
        ];
        self.get_json(&path, params, GENRE_FAILED).await
    }

    async fn watch_providers(&self, id: i64, kind: ContentKind) -> AppResult<Value> {
        let path = format!("/{}/{}/watch/providers", kind, id);
        self.get_json(&path, Vec::new(), PROVIDERS_FAILED).await
    }

    fn name(&self) -> &'static str {
        "TMDB"
    }
}
