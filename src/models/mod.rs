use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod analytics;
pub mod interaction;
pub mod recommendation;
pub mod user;

pub use analytics::*;
pub use interaction::*;
pub use recommendation::*;
pub use user::*;

/// Kind discriminator for a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown content kind '{0}', expected 'movie' or 'tv'")]
pub struct InvalidContentKind(pub String);

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        }
    }

    /// Lenient parse used for the `type` query parameter: only `tv` selects
    /// tv, anything else (including absence) selects movie.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("tv") => ContentKind::Tv,
            _ => ContentKind::Movie,
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = InvalidContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(ContentKind::Movie),
            "tv" => Ok(ContentKind::Tv),
            other => Err(InvalidContentKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for ContentKind {
    type Error = InvalidContentKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Catalog (TMDB) Types
// ============================================================================

/// Filters accepted by the discover endpoint, in our own vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverParams {
    pub kind: ContentKind,
    pub genre: Option<String>,
    pub year: Option<String>,
    pub sort_by: String,
    pub page: u32,
    pub release_date_lte: Option<String>,
    pub release_date_gte: Option<String>,
    pub country: Option<String>,
}

pub const DEFAULT_DISCOVER_SORT: &str = "primary_release_date.desc";

impl Default for DiscoverParams {
    fn default() -> Self {
        Self {
            kind: ContentKind::Movie,
            genre: None,
            year: None,
            sort_by: DEFAULT_DISCOVER_SORT.to_string(),
            page: 1,
            release_date_lte: None,
            release_date_gte: None,
            country: None,
        }
    }
}

impl DiscoverParams {
    /// Stable textual form of every filter, used as a cache key fragment
    pub fn canonical(&self) -> String {
        let opt = |value: &Option<String>| value.clone().unwrap_or_default();
        format!(
            "{}:{}:{}:g={}:y={}:lte={}:gte={}:c={}",
            self.kind,
            self.sort_by,
            self.page,
            opt(&self.genre),
            opt(&self.year),
            opt(&self.release_date_lte),
            opt(&self.release_date_gte),
            opt(&self.country),
        )
    }
}

/// One entry of a catalog result page. Movies carry `title`, tv shows `name`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl CatalogItem {
    pub fn display_title(&self) -> Option<String> {
        self.title.clone().or_else(|| self.name.clone())
    }
}

/// Paged catalog response, reduced to the fields the engine reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<CatalogItem>,
}

impl CatalogPage {
    /// Parses a relayed catalog payload. Entries that do not look like
    /// catalog items are dropped rather than failing the whole page.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let results = value["results"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<CatalogItem>(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_kind_from_query_defaults_to_movie() {
        assert_eq!(ContentKind::from_query(Some("tv")), ContentKind::Tv);
        assert_eq!(ContentKind::from_query(Some("movie")), ContentKind::Movie);
        assert_eq!(ContentKind::from_query(Some("series")), ContentKind::Movie);
        assert_eq!(ContentKind::from_query(None), ContentKind::Movie);
    }

    #[test]
    fn test_content_kind_strict_parse() {
        assert_eq!("tv".parse::<ContentKind>(), Ok(ContentKind::Tv));
        assert_eq!(
            "anime".parse::<ContentKind>(),
            Err(InvalidContentKind("anime".to_string()))
        );
    }

    #[test]
    fn test_content_kind_serde() {
        assert_eq!(serde_json::to_string(&ContentKind::Tv).unwrap(), "\"tv\"");
        let kind: ContentKind = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(kind, ContentKind::Movie);
        assert!(serde_json::from_str::<ContentKind>("\"book\"").is_err());
    }

    #[test]
    fn test_catalog_page_title_falls_back_to_name() {
        let page = CatalogPage::from_value(&json!({
            "page": 1,
            "results": [
                { "id": 550, "title": "Fight Club", "poster_path": "/a.jpg", "vote_average": 8.4 },
                { "id": 1396, "name": "Breaking Bad" },
                { "title": "missing id" }
            ]
        }));

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].display_title().as_deref(), Some("Fight Club"));
        assert_eq!(page.results[1].display_title().as_deref(), Some("Breaking Bad"));
        assert_eq!(page.results[1].vote_average, None);
    }

    #[test]
    fn test_discover_canonical_distinguishes_filters() {
        let base = DiscoverParams::default();
        let with_year = DiscoverParams {
            year: Some("1999".to_string()),
            ..DiscoverParams::default()
        };
        assert_eq!(
            base.canonical(),
            "movie:primary_release_date.desc:1:g=:y=:lte=:gte=:c="
        );
        assert_ne!(base.canonical(), with_year.canonical());
    }

    #[test]
    fn test_catalog_page_without_results_is_empty() {
        let page = CatalogPage::from_value(&json!({ "status_message": "nope" }));
        assert!(page.results.is_empty());
    }
}
