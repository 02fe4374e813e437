use std::{collections::HashSet, sync::Arc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    db::InteractionStore,
    error::AppResult,
    models::{
        Algorithm, CatalogItem, CatalogPage, ContentKind, Recommendation, RecommendationSet,
        UserContext,
    },
    services::{analytics::compute_genre_preferences, catalog::CatalogProvider},
};

/// Below this many ratings a user gets trending titles instead
pub const MIN_RATINGS_FOR_PERSONALIZATION: usize = 3;
pub const DEFAULT_LIMIT: usize = 10;

const HIGH_RATING_THRESHOLD: f64 = 8.0;
const GENRES_CONSIDERED: usize = 3;
const ITEMS_PER_GENRE: usize = 2;
const HIGH_RATINGS_CONSIDERED: usize = 3;
const ITEMS_PER_SIMILAR: usize = 2;
const CONTENT_TYPE_ITEMS: usize = 3;

const GENRE_BASE_SCORE: f64 = 0.8;
const GENRE_VOTE_WEIGHT: f64 = 0.2;
const SIMILAR_SCORE: f64 = 0.9;
const CONTENT_TYPE_SCORE: f64 = 0.7;

const SIMILAR_REASON: &str = "Similar to your highly rated content";
const FALLBACK_REASON: &str = "Trending now - Rate more content for personalized recommendations";

/// Catalog genre ids by display name
const GENRE_IDS: &[(&str, i64)] = &[
    ("Action", 28),
    ("Adventure", 12),
    ("Animation", 16),
    ("Comedy", 35),
    ("Crime", 80),
    ("Documentary", 99),
    ("Drama", 18),
    ("Family", 10751),
    ("Fantasy", 14),
    ("History", 36),
    ("Horror", 27),
    ("Music", 10402),
    ("Mystery", 9648),
    ("Romance", 10749),
    ("Science Fiction", 878),
    ("Thriller", 53),
    ("War", 10752),
    ("Western", 37),
];

pub fn genre_id(name: &str) -> Option<i64> {
    GENRE_IDS
        .iter()
        .find(|(genre, _)| *genre == name)
        .map(|(_, id)| *id)
}

/// Strategy interface for producing recommendations.
///
/// Engines never fail: catalog problems are logged and reflected in the
/// returned set (partial results, or an `error` algorithm tag).
#[async_trait::async_trait]
pub trait RecommendationEngine: Send + Sync {
    async fn score(&self, context: &UserContext, limit: usize) -> RecommendationSet;

    /// Engine name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Rule-based pipeline: genre affinity, similarity to highly rated titles and
/// content-type preference, merged and ranked by score.
#[derive(Clone)]
pub struct RuleBasedEngine {
    catalog: Arc<dyn CatalogProvider>,
}

fn recommendation(
    item: &CatalogItem,
    kind: ContentKind,
    score: f64,
    reason: &str,
) -> Recommendation {
    Recommendation {
        movie_id: item.id,
        movie_type: kind,
        score,
        reason: reason.to_string(),
        title: item.display_title(),
        poster_path: item.poster_path.clone(),
        vote_average: item.vote_average,
    }
}

fn vote_fraction(item: &CatalogItem) -> f64 {
    item.vote_average.unwrap_or(0.0) / 10.0
}

/// Awaits spawned catalog fetches in spawn order, dropping failures
async fn collect_pages<C>(
    tasks: Vec<(C, JoinHandle<AppResult<serde_json::Value>>)>,
) -> Vec<(C, CatalogPage)> {
    let mut pages = Vec::with_capacity(tasks.len());

    for (context, task) in tasks {
        match task.await {
            Ok(Ok(value)) => pages.push((context, CatalogPage::from_value(&value))),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Catalog fetch failed inside recommendation strategy");
            }
            Err(e) => {
                tracing::error!(error = %e, "Recommendation task join error");
            }
        }
    }

    pages
}

impl RuleBasedEngine {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    /// Top genres of the watch history mapped to popular titles of that genre
    async fn genre_based(&self, context: &UserContext) -> Vec<Recommendation> {
        let top_genres = compute_genre_preferences(&context.watch_history)
            .preferences
            .into_iter()
            .take(GENRES_CONSIDERED);

        let mut tasks = Vec::new();
        for preference in top_genres {
            let Some(id) = genre_id(&preference.genre) else {
                tracing::debug!(genre = %preference.genre, "No catalog id for genre, skipping");
                continue;
            };
            let catalog = Arc::clone(&self.catalog);
            let task =
                tokio::spawn(async move { catalog.by_genre(id, ContentKind::Movie, 1).await });
            tasks.push((preference.genre, task));
        }

        collect_pages(tasks)
            .await
            .into_iter()
            .flat_map(|(genre, page)| {
                let reason = format!("You've watched many {} movies", genre);
                page.results
                    .into_iter()
                    .take(ITEMS_PER_GENRE)
                    .map(|item| {
                        let score = GENRE_BASE_SCORE + vote_fraction(&item) * GENRE_VOTE_WEIGHT;
                        recommendation(&item, ContentKind::Movie, score, &reason)
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Titles similar to the user's best-rated ones, same kind as the source
    async fn similar_to_highly_rated(&self, context: &UserContext) -> Vec<Recommendation> {
        let sources = context
            .ratings
            .iter()
            .filter(|r| r.rating >= HIGH_RATING_THRESHOLD)
            .take(HIGH_RATINGS_CONSIDERED);

        let mut tasks = Vec::new();
        for rating in sources {
            let catalog = Arc::clone(&self.catalog);
            let (id, kind) = (rating.movie_id, rating.movie_type);
            let task = tokio::spawn(async move { catalog.similar(id, kind, 1).await });
            tasks.push((kind, task));
        }

        collect_pages(tasks)
            .await
            .into_iter()
            .flat_map(|(kind, page)| {
                page.results
                    .into_iter()
                    .take(ITEMS_PER_SIMILAR)
                    .map(move |item| recommendation(&item, kind, SIMILAR_SCORE, SIMILAR_REASON))
            })
            .collect()
    }

    /// Trending titles of whichever kind dominates the watch history
    async fn content_type_preference(&self, context: &UserContext) -> Vec<Recommendation> {
        let movies = context
            .watch_history
            .iter()
            .filter(|e| e.movie_type == ContentKind::Movie)
            .count();
        let tv_shows = context.watch_history.len() - movies;

        let (kind, reason) = if movies >= tv_shows {
            (ContentKind::Movie, "Popular movie you might enjoy")
        } else {
            (ContentKind::Tv, "Popular TV show you might enjoy")
        };

        match self.catalog.trending(kind, 1).await {
            Ok(value) => CatalogPage::from_value(&value)
                .results
                .iter()
                .take(CONTENT_TYPE_ITEMS)
                .map(|item| recommendation(item, kind, CONTENT_TYPE_SCORE, reason))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, kind = %kind, "Content-type strategy failed");
                Vec::new()
            }
        }
    }

    async fn trending_fallback(&self, context: &UserContext, limit: usize) -> RecommendationSet {
        let user_data_points = context.data_points();

        match self.catalog.trending(ContentKind::Movie, 1).await {
            Ok(value) => {
                let recommendations = CatalogPage::from_value(&value)
                    .results
                    .iter()
                    .take(limit)
                    .map(|item| {
                        let score = vote_fraction(item);
                        recommendation(item, ContentKind::Movie, score, FALLBACK_REASON)
                    })
                    .collect();

                RecommendationSet {
                    recommendations,
                    algorithm: Algorithm::TrendingFallback,
                    user_data_points,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Trending fallback failed");
                RecommendationSet {
                    recommendations: Vec::new(),
                    algorithm: Algorithm::Error,
                    user_data_points,
                }
            }
        }
    }
}

/// Keeps the first occurrence of every (id, kind) pair
fn dedupe(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    recommendations
        .into_iter()
        .filter(|r| seen.insert((r.movie_id, r.movie_type)))
        .collect()
}

#[async_trait::async_trait]
impl RecommendationEngine for RuleBasedEngine {
    async fn score(&self, context: &UserContext, limit: usize) -> RecommendationSet {
        if context.ratings.len() < MIN_RATINGS_FOR_PERSONALIZATION {
            tracing::debug!(
                ratings = context.ratings.len(),
                "Not enough ratings, using trending fallback"
            );
            return self.trending_fallback(context, limit).await;
        }

        let (by_genre, similar, by_type) = tokio::join!(
            self.genre_based(context),
            self.similar_to_highly_rated(context),
            self.content_type_preference(context),
        );

        tracing::debug!(
            genre = by_genre.len(),
            similar = similar.len(),
            content_type = by_type.len(),
            "Recommendation strategies finished"
        );

        let combined = by_genre.into_iter().chain(similar).chain(by_type).collect();
        let mut recommendations = dedupe(combined);
        // Stable: equal scores keep strategy order
        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
        recommendations.truncate(limit);

        RecommendationSet {
            recommendations,
            algorithm: Algorithm::RuleBasedV1,
            user_data_points: context.data_points(),
        }
    }

    fn name(&self) -> &'static str {
        "rule-based-v1"
    }
}

/// Loads the user's interactions and runs them through `engine`
pub async fn recommend_for_user(
    store: &dyn InteractionStore,
    engine: &dyn RecommendationEngine,
    user_id: Uuid,
    limit: usize,
) -> AppResult<RecommendationSet> {
    let (mut ratings, watch_history, favorites) = tokio::try_join!(
        store.list_ratings(user_id),
        store.list_watch(user_id, None),
        store.list_favorites(user_id),
    )?;

    ratings.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    let context = UserContext {
        ratings,
        watch_history,
        favorites,
    };

    let set = engine.score(&context, limit).await;

    tracing::info!(
        user_id = %user_id,
        engine = engine.name(),
        algorithm = ?set.algorithm,
        count = set.recommendations.len(),
        "Generated recommendations"
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        error::AppError,
        models::{RateInput, Rating, WatchHistoryEntry},
        services::catalog::MockCatalogProvider,
    };
    use chrono::Utc;
    use serde_json::{json, Value};

    fn page(items: &[(i64, f64)]) -> Value {
        let results: Vec<Value> = items
            .iter()
            .map(|(id, vote)| {
                json!({ "id": id, "title": format!("Title {}", id), "vote_average": vote })
            })
            .collect();
        json!({ "page": 1, "results": results })
    }

    fn unavailable() -> AppError {
        AppError::ServiceUnavailable("Failed to fetch content".to_string())
    }

    fn rated(movie_id: i64, kind: ContentKind, score: f64) -> Rating {
        Rating {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            movie_id,
            movie_type: kind,
            rating: score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn watched(kind: ContentKind, genres: &str) -> WatchHistoryEntry {
        WatchHistoryEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            movie_id: 1,
            movie_type: kind,
            movie_title: None,
            genres: genres.to_string(),
            watched_at: Utc::now(),
        }
    }

    #[test]
    fn test_genre_table() {
        assert_eq!(genre_id("Science Fiction"), Some(878));
        assert_eq!(genre_id("Western"), Some(37));
        assert_eq!(genre_id("Sci-Fi & Fantasy"), None);
    }

    #[tokio::test]
    async fn test_fallback_with_few_ratings_regardless_of_history() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_trending()
            .withf(|kind, page| *kind == ContentKind::Movie && *page == 1)
            .times(1)
            .returning(|_, _| Ok(page(&[(1, 8.0), (2, 6.5), (3, 7.0)])));
        catalog.expect_by_genre().never();
        catalog.expect_similar().never();

        let context = UserContext {
            ratings: vec![rated(10, ContentKind::Movie, 9.0)],
            watch_history: (0..50).map(|_| watched(ContentKind::Movie, "Drama")).collect(),
            favorites: Vec::new(),
        };

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = engine.score(&context, 2).await;

        assert_eq!(set.algorithm, Algorithm::TrendingFallback);
        assert_eq!(set.recommendations.len(), 2);
        assert_eq!(set.recommendations[0].movie_id, 1);
        assert_eq!(set.recommendations[0].score, 0.8);
        assert_eq!(set.recommendations[0].reason, FALLBACK_REASON);
        assert_eq!(set.user_data_points.ratings, 1);
        assert_eq!(set.user_data_points.watch_history, 50);
    }

    #[tokio::test]
    async fn test_failed_fallback_reports_error_tag() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_trending()
            .returning(|_, _| Err(unavailable()));

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = engine.score(&UserContext::default(), DEFAULT_LIMIT).await;

        assert_eq!(set.algorithm, Algorithm::Error);
        assert!(set.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_three_high_ratings_switch_to_rule_based() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_similar()
            .times(3)
            .returning(|id, _, _| Ok(page(&[(id + 1, 7.0), (id + 2, 7.0), (id + 3, 7.0)])));
        catalog
            .expect_trending()
            .withf(|kind, _| *kind == ContentKind::Movie)
            .times(1)
            .returning(|_, _| Ok(page(&[(100, 9.0), (101, 8.0), (102, 7.0), (103, 6.0)])));
        catalog.expect_by_genre().never();

        let context = UserContext {
            ratings: vec![
                rated(550, ContentKind::Movie, 9.0),
                rated(238, ContentKind::Movie, 9.0),
                rated(680, ContentKind::Movie, 9.0),
            ],
            ..UserContext::default()
        };

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = engine.score(&context, DEFAULT_LIMIT).await;

        assert_eq!(set.algorithm, Algorithm::RuleBasedV1);
        assert_eq!(set.recommendations.len(), 9);
        // Similar items (0.9) outrank content-type items (0.7)
        let ids: Vec<i64> = set.recommendations.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![551, 552, 239, 240, 681, 682, 100, 101, 102]);
        assert!(set.recommendations[..6]
            .iter()
            .all(|r| r.reason == SIMILAR_REASON));
        assert_eq!(set.recommendations[6].reason, "Popular movie you might enjoy");
    }

    #[tokio::test]
    async fn test_duplicate_keeps_genre_reason() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_by_genre()
            .withf(|genre_id, kind, _| *genre_id == 28 && *kind == ContentKind::Movie)
            .times(1)
            .returning(|_, _, _| Ok(page(&[(550, 5.0)])));
        catalog
            .expect_trending()
            .returning(|_, _| Ok(page(&[(550, 9.0), (603, 8.0)])));
        catalog.expect_similar().never();

        let context = UserContext {
            ratings: vec![
                rated(1, ContentKind::Movie, 5.0),
                rated(2, ContentKind::Movie, 5.0),
                rated(3, ContentKind::Movie, 5.0),
            ],
            watch_history: vec![watched(ContentKind::Movie, "Action")],
            favorites: Vec::new(),
        };

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = engine.score(&context, DEFAULT_LIMIT).await;

        let matches: Vec<&Recommendation> = set
            .recommendations
            .iter()
            .filter(|r| r.movie_id == 550 && r.movie_type == ContentKind::Movie)
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reason, "You've watched many Action movies");
        assert_eq!(matches[0].score, 0.8 + 0.5 * 0.2);
        assert_eq!(set.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_strategy_failures_are_swallowed() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_by_genre()
            .returning(|_, _, _| Err(unavailable()));
        catalog
            .expect_similar()
            .returning(|_, _, _| Err(unavailable()));
        catalog
            .expect_trending()
            .withf(|kind, _| *kind == ContentKind::Tv)
            .returning(|_, _| Ok(page(&[(1396, 9.5)])));

        let context = UserContext {
            ratings: vec![
                rated(1, ContentKind::Tv, 10.0),
                rated(2, ContentKind::Tv, 9.0),
                rated(3, ContentKind::Tv, 8.0),
            ],
            watch_history: vec![
                watched(ContentKind::Tv, "Drama"),
                watched(ContentKind::Tv, "Crime"),
            ],
            favorites: Vec::new(),
        };

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = engine.score(&context, DEFAULT_LIMIT).await;

        assert_eq!(set.algorithm, Algorithm::RuleBasedV1);
        assert_eq!(set.recommendations.len(), 1);
        assert_eq!(set.recommendations[0].movie_type, ContentKind::Tv);
        assert_eq!(set.recommendations[0].reason, "Popular TV show you might enjoy");
    }

    #[tokio::test]
    async fn test_only_high_ratings_seed_similar_and_limit_applies() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_similar()
            .withf(|id, _, _| *id == 10)
            .times(1)
            .returning(|_, _, _| Ok(page(&[(11, 7.0), (12, 7.0), (13, 7.0)])));
        catalog
            .expect_trending()
            .returning(|_, _| Ok(page(&[(20, 7.0), (21, 7.0), (22, 7.0)])));

        let context = UserContext {
            ratings: vec![
                rated(10, ContentKind::Movie, 8.0),
                rated(30, ContentKind::Movie, 7.5),
                rated(31, ContentKind::Movie, 2.0),
            ],
            ..UserContext::default()
        };

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = engine.score(&context, 3).await;

        let ids: Vec<i64> = set.recommendations.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![11, 12, 20]);
    }

    #[tokio::test]
    async fn test_recommend_for_user_sorts_ratings_by_score() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for (movie_id, score) in [(1, 2.0), (2, 9.0), (3, 8.5), (4, 10.0)] {
            let input = RateInput {
                movie_id,
                movie_type: ContentKind::Movie,
                rating: score,
            };
            store.upsert_rating(user, &input).await.unwrap();
        }

        let mut catalog = MockCatalogProvider::new();
        // Only the top three ratings (4, 2, 3) seed the similar strategy
        catalog
            .expect_similar()
            .withf(|id, _, _| [4, 2, 3].contains(id))
            .times(3)
            .returning(|_, _, _| Ok(page(&[])));
        catalog.expect_trending().returning(|_, _| Ok(page(&[])));

        let engine = RuleBasedEngine::new(Arc::new(catalog));
        let set = recommend_for_user(&store, &engine, user, DEFAULT_LIMIT)
            .await
            .unwrap();

        assert_eq!(set.algorithm, Algorithm::RuleBasedV1);
        assert_eq!(set.user_data_points.ratings, 4);
        assert!(set.recommendations.is_empty());
    }
}
