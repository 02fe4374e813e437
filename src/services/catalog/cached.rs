use serde_json::Value;
use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{ContentKind, DiscoverParams},
    services::catalog::CatalogProvider,
};

const TRENDING_CACHE_TTL: u64 = 120; // 2 minutes
const DISCOVER_CACHE_TTL: u64 = 300; // 5 minutes
const SEARCH_CACHE_TTL: u64 = 600; // 10 minutes
const SIMILAR_CACHE_TTL: u64 = 900; // 15 minutes
const DETAILS_CACHE_TTL: u64 = 1800; // 30 minutes
const PROVIDERS_CACHE_TTL: u64 = 86400; // 1 day

/// Read-through Redis cache in front of another catalog provider.
///
/// Only successful responses are stored, and a Redis failure degrades to a
/// direct upstream call.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogProvider>,
    cache: Cache,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogProvider>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for CachedCatalog {
    async fn discover(&self, params: &DiscoverParams) -> AppResult<Value> {
        cached!(
            self.cache,
            CacheKey::Discover(params.canonical()),
            DISCOVER_CACHE_TTL,
            self.inner.discover(params)
        )
    }

    async fn trending(&self, kind: ContentKind, page: u32) -> AppResult<Value> {
        cached!(
            self.cache,
            CacheKey::Trending { kind, page },
            TRENDING_CACHE_TTL,
            self.inner.trending(kind, page)
        )
    }

    async fn search(&self, query: &str, kind: ContentKind, page: u32) -> AppResult<Value> {
        let key = CacheKey::Search {
            kind,
            query: query.to_string(),
            page,
        };
        cached!(self.cache, key, SEARCH_CACHE_TTL, self.inner.search(query, kind, page))
    }

    async fn details(&self, id: i64, kind: ContentKind) -> AppResult<Value> {
        cached!(
            self.cache,
            CacheKey::Details { kind, id },
            DETAILS_CACHE_TTL,
            self.inner.details(id, kind)
        )
    }

    async fn similar(&self, id: i64, kind: ContentKind, page: u32) -> AppResult<Value> {
        cached!(
            self.cache,
            CacheKey::Similar { kind, id, page },
            SIMILAR_CACHE_TTL,
            self.inner.similar(id, kind, page)
        )
    }

    async fn by_genre(&self, genre_id: i64, kind: ContentKind, page: u32) -> AppResult<Value> {
        cached!(
            self.cache,
            CacheKey::ByGenre {
                kind,
                genre_id,
                page
            },
            DISCOVER_CACHE_TTL,
            self.inner.by_genre(genre_id, kind, page)
        )
    }

    async fn watch_providers(&self, id: i64, kind: ContentKind) -> AppResult<Value> {
        cached!(
            self.cache,
            CacheKey::WatchProviders { kind, id },
            PROVIDERS_CACHE_TTL,
            self.inner.watch_providers(id, kind)
        )
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
