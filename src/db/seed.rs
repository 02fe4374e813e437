//! Demo account with a small, realistic interaction history
//!
//! Seeding is idempotent: an existing demo user, rating or favorite is left as
//! it is, and watch history is only written while the demo user has none.

use crate::{
    auth::hash_password,
    db::{InteractionStore, UserStore},
    error::{AppError, AppResult},
    models::{ContentKind, FavoriteInput, GenresInput, NewUser, RateInput, WatchInput},
};

pub const DEMO_EMAIL: &str = "demo@pflix.com";
pub const DEMO_PASSWORD: &str = "password123";
const DEMO_NAME: &str = "Demo User";

const RATINGS: &[(i64, ContentKind, f64)] = &[
    (550, ContentKind::Movie, 9.5),
    (238, ContentKind::Movie, 9.0),
    (680, ContentKind::Movie, 8.5),
    (155, ContentKind::Movie, 9.2),
    (13, ContentKind::Movie, 8.0),
    (122, ContentKind::Movie, 8.8),
    (1396, ContentKind::Tv, 9.5),
    (1399, ContentKind::Tv, 9.0),
];

const FAVORITES: &[(i64, ContentKind, &str, &str)] = &[
    (550, ContentKind::Movie, "Fight Club", "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg"),
    (155, ContentKind::Movie, "The Dark Knight", "/qJ2tW6WMUDux911r6m7haRef0WH.jpg"),
    (1396, ContentKind::Tv, "Breaking Bad", "/ggFHVNu6YYI5L9pCfOacjizRGt.jpg"),
];

const WATCH_HISTORY: &[(i64, ContentKind, &str, &[&str])] = &[
    (550, ContentKind::Movie, "Fight Club", &["Drama", "Thriller"]),
    (238, ContentKind::Movie, "The Godfather", &["Drama", "Crime"]),
    (680, ContentKind::Movie, "Pulp Fiction", &["Crime", "Drama"]),
    (155, ContentKind::Movie, "The Dark Knight", &["Action", "Crime", "Drama"]),
    (13, ContentKind::Movie, "Forrest Gump", &["Drama", "Romance"]),
    (122, ContentKind::Movie, "The Lord of the Rings", &["Adventure", "Fantasy"]),
    (98, ContentKind::Movie, "Gladiator", &["Action", "Drama"]),
    (497, ContentKind::Movie, "The Green Mile", &["Drama", "Fantasy"]),
    (1396, ContentKind::Tv, "Breaking Bad", &["Drama", "Crime"]),
    (1399, ContentKind::Tv, "Game of Thrones", &["Drama", "Fantasy"]),
];

/// What a seeding run actually wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub user_created: bool,
    pub ratings: usize,
    pub favorites: usize,
    pub watch_history: usize,
}

pub async fn seed_demo_data(
    users: &dyn UserStore,
    interactions: &dyn InteractionStore,
) -> AppResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    let user = match users.find_by_email(DEMO_EMAIL).await? {
        Some(user) => user,
        None => {
            let password_hash = hash_password(DEMO_PASSWORD)
                .map_err(|e| AppError::Internal(format!("Failed to hash demo password: {}", e)))?;
            summary.user_created = true;
            users
                .create_user(NewUser {
                    email: DEMO_EMAIL.to_string(),
                    password_hash,
                    name: DEMO_NAME.to_string(),
                })
                .await?
        }
    };

    for &(movie_id, movie_type, rating) in RATINGS {
        if interactions.get_rating(user.id, movie_id, movie_type).await?.is_some() {
            continue;
        }
        let input = RateInput {
            movie_id,
            movie_type,
            rating,
        };
        interactions.upsert_rating(user.id, &input).await?;
        summary.ratings += 1;
    }

    for &(movie_id, movie_type, title, poster) in FAVORITES {
        if interactions.is_favorite(user.id, movie_id, movie_type).await? {
            continue;
        }
        let input = FavoriteInput {
            movie_id,
            movie_type,
            movie_title: Some(title.to_string()),
            poster_path: Some(poster.to_string()),
        };
        interactions.toggle_favorite(user.id, &input).await?;
        summary.favorites += 1;
    }

    if interactions.list_watch(user.id, Some(1)).await?.is_empty() {
        for &(movie_id, movie_type, title, genres) in WATCH_HISTORY {
            let input = WatchInput {
                movie_id,
                movie_type,
                movie_title: Some(title.to_string()),
                genres: Some(GenresInput::List(
                    genres.iter().map(|g| g.to_string()).collect(),
                )),
            };
            interactions.append_watch(user.id, &input).await?;
            summary.watch_history += 1;
        }
    }

    tracing::info!(
        email = DEMO_EMAIL,
        user_created = summary.user_created,
        ratings = summary.ratings,
        favorites = summary.favorites,
        watch_history = summary.watch_history,
        "Demo data seeded"
    );

    Ok(summary)
}
