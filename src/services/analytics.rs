use chrono::{Datelike, Utc};
use std::collections::HashMap;

use crate::{
    db::InteractionStore,
    error::AppResult,
    models::{
        ContentKind, ContentTypePreference, DayOfWeekCounts, GenrePreference, GenrePreferences,
        Insights, InteractionCounts, MinimumRequired, Rating, RatingDistribution, RatingPatterns,
        UserStats, ViewingTrends, WatchHistoryEntry,
    },
};
use uuid::Uuid;

/// Ratings a user needs before insights are considered meaningful
pub const MIN_RATINGS: usize = 5;
/// Watch entries a user needs before insights are considered meaningful
pub const MIN_WATCHED: usize = 3;

const TOP_GENRE_COUNT: usize = 5;
const RECENT_WINDOW: usize = 30;

/// Rounded share of `part` in `whole`; 0 when `whole` is 0
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

pub fn compute_user_stats(counts: InteractionCounts) -> UserStats {
    UserStats {
        total_ratings: counts.ratings,
        total_favorites: counts.favorites,
        total_watched: counts.watch_history,
        has_sufficient_data: counts.ratings >= MIN_RATINGS && counts.watch_history >= MIN_WATCHED,
        minimum_required: MinimumRequired {
            ratings: MIN_RATINGS,
            watch_history: MIN_WATCHED,
        },
    }
}

/// Counts genre tags over the whole watch history.
///
/// Percentages are taken against the number of watch entries, so an entry
/// tagged with two genres counts toward both and the sum may exceed 100.
/// Equal counts keep the order in which the genres were first seen.
pub fn compute_genre_preferences(history: &[WatchHistoryEntry]) -> GenrePreferences {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tag in history.iter().flat_map(WatchHistoryEntry::genre_tags) {
        match index.get(tag) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(tag.to_string(), order.len());
                order.push((tag.to_string(), 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));

    let total = history.len();
    let preferences: Vec<GenrePreference> = order
        .into_iter()
        .map(|(genre, count)| GenrePreference {
            genre,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let top_genres = preferences.iter().take(TOP_GENRE_COUNT).cloned().collect();

    GenrePreferences {
        preferences,
        top_genres,
    }
}

/// Score bands: low [1,4), medium [4,7), high [7,9), excellent [9,10]
fn bucket(distribution: &mut RatingDistribution, score: f64) {
    let slot = if score < 4.0 {
        &mut distribution.low
    } else if score < 7.0 {
        &mut distribution.medium
    } else if score < 9.0 {
        &mut distribution.high
    } else {
        &mut distribution.excellent
    };
    *slot += 1;
}

pub fn compute_rating_patterns(ratings: &[Rating]) -> RatingPatterns {
    let mut distribution = RatingDistribution::default();
    for rating in ratings {
        bucket(&mut distribution, rating.rating);
    }

    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        let sum: f64 = ratings.iter().map(|r| r.rating).sum();
        (sum / ratings.len() as f64 * 10.0).round() / 10.0
    };

    RatingPatterns {
        average_rating,
        total_ratings: ratings.len(),
        distribution,
    }
}

/// Tallies weekday (UTC) and content kind over already-windowed entries
pub fn compute_viewing_trends(recent: &[WatchHistoryEntry]) -> ViewingTrends {
    let mut days = DayOfWeekCounts::default();
    let mut movies = 0;
    let mut tv_shows = 0;

    for entry in recent {
        days.record(entry.watched_at.weekday().num_days_from_sunday());
        match entry.movie_type {
            ContentKind::Movie => movies += 1,
            ContentKind::Tv => tv_shows += 1,
        }
    }

    let total = recent.len();

    ViewingTrends {
        day_of_week_preference: days,
        content_type_preference: ContentTypePreference {
            movies,
            tv_shows,
            movie_percentage: percentage(movies, total),
            tv_percentage: percentage(tv_shows, total),
        },
        recent_activity: total,
    }
}

pub async fn user_stats(store: &dyn InteractionStore, user_id: Uuid) -> AppResult<UserStats> {
    let counts = store.interaction_counts(user_id).await?;
    Ok(compute_user_stats(counts))
}

pub async fn genre_preferences(
    store: &dyn InteractionStore,
    user_id: Uuid,
) -> AppResult<GenrePreferences> {
    // Stores list newest first; ties go to the genre watched earliest
    let mut history = store.list_watch(user_id, None).await?;
    history.reverse();
    Ok(compute_genre_preferences(&history))
}

pub async fn rating_patterns(
    store: &dyn InteractionStore,
    user_id: Uuid,
) -> AppResult<RatingPatterns> {
    let ratings = store.list_ratings(user_id).await?;
    Ok(compute_rating_patterns(&ratings))
}

pub async fn viewing_trends(
    store: &dyn InteractionStore,
    user_id: Uuid,
) -> AppResult<ViewingTrends> {
    let recent = store.list_watch(user_id, Some(RECENT_WINDOW)).await?;
    Ok(compute_viewing_trends(&recent))
}

/// All four facets, fetched concurrently
pub async fn insights(store: &dyn InteractionStore, user_id: Uuid) -> AppResult<Insights> {
    let (stats, genres, ratings, trends) = tokio::try_join!(
        user_stats(store, user_id),
        genre_preferences(store, user_id),
        rating_patterns(store, user_id),
        viewing_trends(store, user_id),
    )?;

    tracing::debug!(user_id = %user_id, "Computed insights");

    Ok(Insights {
        stats,
        genres,
        ratings,
        trends,
        timestamp: Utc::now(),
    })
}
