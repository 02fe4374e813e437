use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ContentKind;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

/// A user's score for one catalog item. Unique per (user, movie_id, movie_type).
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: i64,
    #[sqlx(try_from = "String")]
    pub movie_type: ContentKind,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A favorited item, with title and poster captured when it was favorited
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: i64,
    #[sqlx(try_from = "String")]
    pub movie_type: ContentKind,
    pub movie_title: Option<String>,
    pub poster_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One watch event. Entries are append-only.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: i64,
    #[sqlx(try_from = "String")]
    pub movie_type: ContentKind,
    pub movie_title: Option<String>,
    /// Comma-joined genre names
    pub genres: String,
    pub watched_at: DateTime<Utc>,
}

impl WatchHistoryEntry {
    /// Trimmed, non-empty genre tags of this entry
    pub fn genre_tags(&self) -> impl Iterator<Item = &str> {
        self.genres
            .split(',')
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
    }
}

/// Body of `POST /interactions/rate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateInput {
    pub movie_id: i64,
    pub movie_type: ContentKind,
    pub rating: f64,
}

impl RateInput {
    pub fn rating_in_range(&self) -> bool {
        self.rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

/// Body of `POST /interactions/favorite`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteInput {
    pub movie_id: i64,
    pub movie_type: ContentKind,
    #[serde(default)]
    pub movie_title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Genres may arrive as a list or as an already comma-joined string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GenresInput {
    List(Vec<String>),
    Joined(String),
}

impl GenresInput {
    pub fn joined(&self) -> String {
        match self {
            GenresInput::List(genres) => genres.join(","),
            GenresInput::Joined(genres) => genres.clone(),
        }
    }
}

/// Body of `POST /interactions/watch`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchInput {
    pub movie_id: i64,
    pub movie_type: ContentKind,
    #[serde(default)]
    pub movie_title: Option<String>,
    #[serde(default)]
    pub genres: Option<GenresInput>,
}

impl WatchInput {
    pub fn joined_genres(&self) -> String {
        self.genres.as_ref().map(GenresInput::joined).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Added,
    Removed,
}

/// Result of toggling a favorite
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FavoriteToggle {
    pub action: FavoriteAction,
    pub favorite: Option<Favorite>,
}

/// Row counts of a user's three interaction tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionCounts {
    pub ratings: usize,
    pub favorites: usize,
    pub watch_history: usize,
}
