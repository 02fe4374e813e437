//! External catalog abstraction
//!
//! The gateway relays catalog payloads (movie/tv metadata from TMDB) to the
//! client mostly untouched, so every operation returns the upstream JSON
//! document. Implementations must collapse any upstream failure into
//! `AppError::ServiceUnavailable` so callers only ever see one error category.

use serde_json::Value;

use crate::{
    error::AppResult,
    models::{ContentKind, DiscoverParams},
};

pub mod cached;
pub mod tmdb;

pub use cached::CachedCatalog;
pub use tmdb::TmdbProvider;

/// Trait for catalog data providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Filtered listing (genre, year, release window, origin country)
    async fn discover(&self, params: &DiscoverParams) -> AppResult<Value>;

    /// Weekly trending titles of one kind
    async fn trending(&self, kind: ContentKind, page: u32) -> AppResult<Value>;

    async fn search(&self, query: &str, kind: ContentKind, page: u32) -> AppResult<Value>;

    /// Full record with credits, videos and similar titles in one call
    async fn details(&self, id: i64, kind: ContentKind) -> AppResult<Value>;

    async fn similar(&self, id: i64, kind: ContentKind, page: u32) -> AppResult<Value>;

    /// Most popular titles of one genre
    async fn by_genre(&self, genre_id: i64, kind: ContentKind, page: u32) -> AppResult<Value>;

    async fn watch_providers(&self, id: i64, kind: ContentKind) -> AppResult<Value>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
