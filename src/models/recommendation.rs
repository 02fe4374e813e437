use serde::Serialize;

use super::{ContentKind, Favorite, Rating, WatchHistoryEntry};

/// A suggested item. Built per request, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    #[serde(rename = "movieType")]
    pub movie_type: ContentKind,
    /// In [0, 1]
    pub score: f64,
    pub reason: String,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

/// Tag describing which pipeline produced a recommendation set
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    #[serde(rename = "rule-based-v1")]
    RuleBasedV1,
    #[serde(rename = "trending-fallback")]
    TrendingFallback,
    /// The fallback itself could not reach the catalog
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDataPoints {
    pub ratings: usize,
    pub watch_history: usize,
    pub favorites: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    pub algorithm: Algorithm,
    pub user_data_points: UserDataPoints,
}

/// Snapshot of a user's interactions handed to a recommendation engine.
///
/// `ratings` are sorted by score descending, `watch_history` newest first.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub ratings: Vec<Rating>,
    pub watch_history: Vec<WatchHistoryEntry>,
    pub favorites: Vec<Favorite>,
}

impl UserContext {
    pub fn data_points(&self) -> UserDataPoints {
        UserDataPoints {
            ratings: self.ratings.len(),
            watch_history: self.watch_history.len(),
            favorites: self.favorites.len(),
        }
    }
}
