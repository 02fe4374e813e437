use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        ContentKind, Favorite, FavoriteAction, FavoriteInput, FavoriteToggle, InteractionCounts,
        RateInput, Rating, WatchHistoryEntry, WatchInput,
    },
};

const RATING_COLUMNS: &str =
    "id, user_id, movie_id, movie_type, rating, created_at, updated_at";

const FAVORITE_COLUMNS: &str =
    "id, user_id, movie_id, movie_type, movie_title, poster_path, created_at";

const WATCH_COLUMNS: &str =
    "id, user_id, movie_id, movie_type, movie_title, genres, watched_at";

/// Row cap for `LIMIT $n`; values past `i64::MAX` saturate instead of wrapping
fn sql_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
}

/// Per-user ratings, favorites and watch history
///
/// Every operation is scoped to one user; no query crosses users. Lists are
/// returned newest first. Missing rows are reported as `None`/`false`, never
/// as errors.
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    /// Creates the rating or replaces the score of the existing one
    async fn upsert_rating(&self, user_id: Uuid, input: &RateInput) -> AppResult<Rating>;

    async fn get_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<Option<Rating>>;

    async fn list_ratings(&self, user_id: Uuid) -> AppResult<Vec<Rating>>;

    /// Returns the removed row, if there was one
    async fn delete_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<Option<Rating>>;

    /// Removes the favorite if present, inserts it otherwise
    async fn toggle_favorite(&self, user_id: Uuid, input: &FavoriteInput)
        -> AppResult<FavoriteToggle>;

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<Favorite>>;

    async fn is_favorite(&self, user_id: Uuid, movie_id: i64, kind: ContentKind)
        -> AppResult<bool>;

    /// Always inserts a new entry stamped with the current time
    async fn append_watch(&self, user_id: Uuid, input: &WatchInput)
        -> AppResult<WatchHistoryEntry>;

    async fn list_watch(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> AppResult<Vec<WatchHistoryEntry>>;

    /// Deletes every watch entry of the user, returning how many were removed
    async fn clear_watch(&self, user_id: Uuid) -> AppResult<u64>;

    async fn interaction_counts(&self, user_id: Uuid) -> AppResult<InteractionCounts>;
}

/// PostgreSQL-backed interaction store
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionStore for PgInteractionStore {
    async fn upsert_rating(&self, user_id: Uuid, input: &RateInput) -> AppResult<Rating> {
        // The unique (user_id, movie_id, movie_type) constraint makes this
        // atomic against concurrent requests from the same user.
        let query = format!(
            "INSERT INTO ratings (id, user_id, movie_id, movie_type, rating) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, movie_id, movie_type) \
             DO UPDATE SET rating = EXCLUDED.rating, updated_at = NOW() \
             RETURNING {RATING_COLUMNS}"
        );

        let rating = sqlx::query_as::<_, Rating>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(input.movie_id)
            .bind(input.movie_type.as_str())
            .bind(input.rating)
            .fetch_one(&self.pool)
            .await?;

        Ok(rating)
    }

    async fn get_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<Option<Rating>> {
        let query = format!(
            "SELECT {RATING_COLUMNS} FROM ratings \
             WHERE user_id = $1 AND movie_id = $2 AND movie_type = $3"
        );

        let rating = sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .bind(movie_id)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(rating)
    }

    async fn list_ratings(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let query = format!(
            "SELECT {RATING_COLUMNS} FROM ratings \
             WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let ratings = sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ratings)
    }

    async fn delete_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<Option<Rating>> {
        let query = format!(
            "DELETE FROM ratings \
             WHERE user_id = $1 AND movie_id = $2 AND movie_type = $3 \
             RETURNING {RATING_COLUMNS}"
        );

        let deleted = sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .bind(movie_id)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(deleted)
    }

    async fn toggle_favorite(
        &self,
        user_id: Uuid,
        input: &FavoriteInput,
    ) -> AppResult<FavoriteToggle> {
        let removed: Option<(Uuid,)> = sqlx::query_as(
            "DELETE FROM favorites \
             WHERE user_id = $1 AND movie_id = $2 AND movie_type = $3 \
             RETURNING id",
        )
        .bind(user_id)
        .bind(input.movie_id)
        .bind(input.movie_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if removed.is_some() {
            return Ok(FavoriteToggle {
                action: FavoriteAction::Removed,
                favorite: None,
            });
        }

        let query = format!(
            "INSERT INTO favorites (id, user_id, movie_id, movie_type, movie_title, poster_path) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id, movie_id, movie_type) DO NOTHING \
             RETURNING {FAVORITE_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Favorite>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(input.movie_id)
            .bind(input.movie_type.as_str())
            .bind(input.movie_title.as_deref())
            .bind(input.poster_path.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        let favorite = match inserted {
            Some(favorite) => Some(favorite),
            None => {
                // A concurrent toggle inserted the row between our delete and insert
                let query = format!(
                    "SELECT {FAVORITE_COLUMNS} FROM favorites \
                     WHERE user_id = $1 AND movie_id = $2 AND movie_type = $3"
                );
                sqlx::query_as::<_, Favorite>(&query)
                    .bind(user_id)
                    .bind(input.movie_id)
                    .bind(input.movie_type.as_str())
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(FavoriteToggle {
            action: FavoriteAction::Added,
            favorite,
        })
    }

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        let query = format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites \
             WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let favorites = sqlx::query_as::<_, Favorite>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(favorites)
    }

    async fn is_favorite(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (\
                SELECT 1 FROM favorites \
                WHERE user_id = $1 AND movie_id = $2 AND movie_type = $3\
             )",
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn append_watch(
        &self,
        user_id: Uuid,
        input: &WatchInput,
    ) -> AppResult<WatchHistoryEntry> {
        let query = format!(
            "INSERT INTO watch_history (id, user_id, movie_id, movie_type, movie_title, genres) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {WATCH_COLUMNS}"
        );

        let entry = sqlx::query_as::<_, WatchHistoryEntry>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(input.movie_id)
            .bind(input.movie_type.as_str())
            .bind(input.movie_title.as_deref())
            .bind(input.joined_genres())
            .fetch_one(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn list_watch(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> AppResult<Vec<WatchHistoryEntry>> {
        // LIMIT NULL means no limit in PostgreSQL
        let query = format!(
            "SELECT {WATCH_COLUMNS} FROM watch_history \
             WHERE user_id = $1 ORDER BY watched_at DESC LIMIT $2"
        );

        let entries = sqlx::query_as::<_, WatchHistoryEntry>(&query)
            .bind(user_id)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn clear_watch(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM watch_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn interaction_counts(&self, user_id: Uuid) -> AppResult<InteractionCounts> {
        let (ratings, favorites, watch_history): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM ratings WHERE user_id = $1), \
                (SELECT COUNT(*) FROM favorites WHERE user_id = $1), \
                (SELECT COUNT(*) FROM watch_history WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(InteractionCounts {
            ratings: ratings as usize,
            favorites: favorites as usize,
            watch_history: watch_history as usize,
        })
    }
}
