use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MinimumRequired {
    pub ratings: usize,
    pub watch_history: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_ratings: usize,
    pub total_favorites: usize,
    pub total_watched: usize,
    pub has_sufficient_data: bool,
    pub minimum_required: MinimumRequired,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenrePreference {
    pub genre: String,
    pub count: usize,
    /// Share of watch entries carrying this genre, rounded
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenrePreferences {
    pub preferences: Vec<GenrePreference>,
    pub top_genres: Vec<GenrePreference>,
}

/// Rating counts per fixed score band
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RatingDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub excellent: usize,
}

impl RatingDistribution {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.excellent
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingPatterns {
    pub average_rating: f64,
    pub total_ratings: usize,
    pub distribution: RatingDistribution,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DayOfWeekCounts {
    pub sunday: usize,
    pub monday: usize,
    pub tuesday: usize,
    pub wednesday: usize,
    pub thursday: usize,
    pub friday: usize,
    pub saturday: usize,
}

impl DayOfWeekCounts {
    /// Increments the counter for a day index, 0 = Sunday .. 6 = Saturday
    pub fn record(&mut self, day_from_sunday: u32) {
        let slot = match day_from_sunday {
            0 => &mut self.sunday,
            1 => &mut self.monday,
            2 => &mut self.tuesday,
            3 => &mut self.wednesday,
            4 => &mut self.thursday,
            5 => &mut self.friday,
            _ => &mut self.saturday,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypePreference {
    pub movies: usize,
    pub tv_shows: usize,
    pub movie_percentage: u32,
    pub tv_percentage: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewingTrends {
    pub day_of_week_preference: DayOfWeekCounts,
    pub content_type_preference: ContentTypePreference,
    pub recent_activity: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub stats: UserStats,
    pub genres: GenrePreferences,
    pub ratings: RatingPatterns,
    pub trends: ViewingTrends,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_week_serializes_with_day_names() {
        let mut days = DayOfWeekCounts::default();
        days.record(0);
        days.record(6);
        days.record(6);

        let json = serde_json::to_value(days).unwrap();
        assert_eq!(json["Sunday"], 1);
        assert_eq!(json["Saturday"], 2);
        assert_eq!(json["Wednesday"], 0);
    }
}
