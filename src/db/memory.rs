use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{InteractionStore, UserStore},
    error::{AppError, AppResult},
    models::{
        ContentKind, Favorite, FavoriteAction, FavoriteInput, FavoriteToggle, InteractionCounts,
        NewUser, RateInput, Rating, User, WatchHistoryEntry, WatchInput,
    },
};

/// In-process store implementing both [`InteractionStore`] and [`UserStore`]
///
/// Rows are kept in insertion order, so iterating in reverse yields newest
/// first. Used by tests and for running the API without PostgreSQL.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    users: HashMap<Uuid, User>,
    ratings: Vec<Rating>,
    favorites: Vec<Favorite>,
    watch_history: Vec<WatchHistoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_rating(user_id: Uuid, movie_id: i64, kind: ContentKind) -> impl Fn(&&Rating) -> bool {
    move |r: &&Rating| r.user_id == user_id && r.movie_id == movie_id && r.movie_type == kind
}

#[async_trait::async_trait]
impl InteractionStore for MemoryStore {
    async fn upsert_rating(&self, user_id: Uuid, input: &RateInput) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(existing) = inner.ratings.iter_mut().find(|r| {
            r.user_id == user_id && r.movie_id == input.movie_id && r.movie_type == input.movie_type
        }) {
            existing.rating = input.rating;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            user_id,
            movie_id: input.movie_id,
            movie_type: input.movie_type,
            rating: input.rating,
            created_at: now,
            updated_at: now,
        };
        inner.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn get_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<Option<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .iter()
            .find(same_rating(user_id, movie_id, kind))
            .cloned())
    }

    async fn list_ratings(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<Option<Rating>> {
        let mut inner = self.inner.write().await;
        let position = inner
            .ratings
            .iter()
            .position(|r| same_rating(user_id, movie_id, kind)(&r));
        Ok(position.map(|index| inner.ratings.remove(index)))
    }

    async fn toggle_favorite(
        &self,
        user_id: Uuid,
        input: &FavoriteInput,
    ) -> AppResult<FavoriteToggle> {
        let mut inner = self.inner.write().await;

        let position = inner.favorites.iter().position(|f| {
            f.user_id == user_id && f.movie_id == input.movie_id && f.movie_type == input.movie_type
        });

        if let Some(index) = position {
            inner.favorites.remove(index);
            return Ok(FavoriteToggle {
                action: FavoriteAction::Removed,
                favorite: None,
            });
        }

        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id,
            movie_id: input.movie_id,
            movie_type: input.movie_type,
            movie_title: input.movie_title.clone(),
            poster_path: input.poster_path.clone(),
            created_at: Utc::now(),
        };
        inner.favorites.push(favorite.clone());

        Ok(FavoriteToggle {
            action: FavoriteAction::Added,
            favorite: Some(favorite),
        })
    }

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn is_favorite(
        &self,
        user_id: Uuid,
        movie_id: i64,
        kind: ContentKind,
    ) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.movie_id == movie_id && f.movie_type == kind))
    }

    async fn append_watch(
        &self,
        user_id: Uuid,
        input: &WatchInput,
    ) -> AppResult<WatchHistoryEntry> {
        let entry = WatchHistoryEntry {
            id: Uuid::new_v4(),
            user_id,
            movie_id: input.movie_id,
            movie_type: input.movie_type,
            movie_title: input.movie_title.clone(),
            genres: input.joined_genres(),
            watched_at: Utc::now(),
        };

        self.inner.write().await.watch_history.push(entry.clone());
        Ok(entry)
    }

    async fn list_watch(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> AppResult<Vec<WatchHistoryEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .watch_history
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn clear_watch(&self, user_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.watch_history.len();
        inner.watch_history.retain(|w| w.user_id != user_id);
        Ok((before - inner.watch_history.len()) as u64)
    }

    async fn interaction_counts(&self, user_id: Uuid) -> AppResult<InteractionCounts> {
        let inner = self.inner.read().await;
        Ok(InteractionCounts {
            ratings: inner.ratings.iter().filter(|r| r.user_id == user_id).count(),
            favorites: inner.favorites.iter().filter(|f| f.user_id == user_id).count(),
            watch_history: inner
                .watch_history
                .iter()
                .filter(|w| w.user_id == user_id)
                .count(),
        })
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }
}
