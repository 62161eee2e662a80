use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type MovieId = u64;
pub type GenreId = u32;

// A movie the user saved. Only `id` and `title` are interpreted by the store; the remaining
// metadata is carried as received from the movie API. Anything the API sent that we do not
// model explicitly lands in `extra` so it is written back unchanged. `extra` never holds a
// modelled key, otherwise a reload would move the value into the named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_ids: Vec<GenreId>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

const FAVORITE_ITEM_FIELDS: [&str; 6] = [
    "id",
    "title",
    "poster_path",
    "vote_average",
    "release_date",
    "genre_ids",
];

impl FavoriteItem {
    /// Creates a favorite with only the identifying fields set.
    #[cfg(test)]
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        FavoriteItem {
            id,
            title: title.into(),
            poster_path: None,
            vote_average: None,
            release_date: None,
            genre_ids: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// Stores an unmodelled attribute. Keys of the named fields are refused with `false`.
    pub fn insert_extra(&mut self, key: &str, value: serde_json::Value) -> bool {
        if FAVORITE_ITEM_FIELDS.contains(&key) {
            log::warn!("FavoriteItem: Refusing extra key '{key}' that shadows a field.");
            return false;
        }
        self.extra.insert(key.to_string(), value);
        true
    }
}

impl From<&MovieSummary> for FavoriteItem {
    fn from(movie: &MovieSummary) -> Self {
        let mut item = FavoriteItem {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: Some(movie.vote_average),
            release_date: movie.release_date.clone(),
            genre_ids: movie.genre_ids.clone(),
            extra: serde_json::Map::new(),
        };
        if let Some(backdrop) = &movie.backdrop_path {
            item.insert_extra("backdrop_path", backdrop.clone().into());
        }
        if let Some(overview) = &movie.overview {
            item.insert_extra("overview", overview.clone().into());
        }
        item
    }
}

impl From<&MovieDetails> for FavoriteItem {
    fn from(details: &MovieDetails) -> Self {
        let mut item = FavoriteItem::from(&details.summary());
        item.genre_ids = details.genres.iter().map(|g| g.id).collect();
        item
    }
}

// The three optional search-narrowing constraints. `None` means "no constraint".
// On disk every field is a string and the empty string stands for `None`, which keeps the
// persisted layout `{genre: '', year: '2020', rating: ''}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, with = "blank_as_none")]
    pub genre: Option<GenreId>,
    #[serde(default, with = "blank_as_none")]
    pub year: Option<i32>,
    #[serde(default, with = "blank_as_none")]
    pub rating: Option<f64>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.year.is_none() && self.rating.is_none()
    }
}

/*
 * A partial update for a `FilterSet`. The outer `Option` says whether the field takes part
 * in the update at all; the inner one is the new value, where `None` clears the field.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterPatch {
    pub genre: Option<Option<GenreId>>,
    pub year: Option<Option<i32>>,
    pub rating: Option<Option<f64>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genre(mut self, genre: Option<GenreId>) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = Some(year);
        self
    }

    pub fn rating(mut self, rating: Option<f64>) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.year.is_none() && self.rating.is_none()
    }

    /*
     * Shallow-merges the patch into `filters`. Fields absent from the patch are left alone.
     * A non-finite rating floor clears the rating constraint.
     */
    pub fn apply_to(&self, filters: &mut FilterSet) {
        if let Some(genre) = self.genre {
            filters.genre = genre;
        }
        if let Some(year) = self.year {
            filters.year = year;
        }
        if let Some(rating) = self.rating {
            filters.rating = rating.filter(|r| r.is_finite());
        }
    }
}

// The complete persisted client state. Serialized with the keys `favorites`, `lastSearch`
// and `filters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub favorites: Vec<FavoriteItem>,
    #[serde(default)]
    pub last_search: String,
    #[serde(default)]
    pub filters: FilterSet,
}

// One movie as it appears in list endpoints (popular, trending, search, discover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
}

impl MovieSummary {
    #[cfg(test)]
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        MovieSummary {
            id,
            title: title.into(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            overview: None,
            genre_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

// The detail record, requested with credits and videos embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
}

impl MovieDetails {
    /// The list-view projection of this record.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            overview: self.overview.clone(),
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
        }
    }

    pub fn cast(&self) -> &[CastMember] {
        self.credits.as_ref().map(|c| c.cast.as_slice()).unwrap_or(&[])
    }

    pub fn videos(&self) -> &[Video] {
        self.videos.as_ref().map(|v| v.results.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            other => Err(format!("Unknown time window: {other}")),
        }
    }
}

// Reads a string, number or null into `Option<T>`; blank strings and null become `None`.
// Writes `None` as "" and values through their `Display` form.
mod blank_as_none {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawField {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = match Option::<RawField>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(RawField::Text(s)) => s,
            Some(RawField::Number(n)) => n.to_string(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse::<T>().map(Some).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_app_state_serializes_to_empty_layout() {
        let value = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "favorites": [],
                "lastSearch": "",
                "filters": { "genre": "", "year": "", "rating": "" }
            })
        );
    }

    #[test]
    fn test_filter_set_reads_strings_numbers_and_blanks() {
        let filters: FilterSet =
            serde_json::from_value(json!({ "genre": 28, "year": "2020", "rating": "" })).unwrap();
        assert_eq!(filters.genre, Some(28));
        assert_eq!(filters.year, Some(2020));
        assert_eq!(filters.rating, None);

        let filters: FilterSet = serde_json::from_value(json!({ "rating": null })).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_filter_set_rejects_garbage_year() {
        let result: Result<FilterSet, _> = serde_json::from_value(json!({ "year": "soon" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_patch_merges_only_present_fields() {
        let mut filters = FilterSet {
            genre: Some(18),
            year: Some(1999),
            rating: None,
        };
        FilterPatch::new().year(None).rating(Some(7.0)).apply_to(&mut filters);
        assert_eq!(filters.genre, Some(18));
        assert_eq!(filters.year, None);
        assert_eq!(filters.rating, Some(7.0));
    }

    #[test]
    fn test_filter_patch_drops_non_finite_rating() {
        let mut filters = FilterSet {
            genre: None,
            year: None,
            rating: Some(6.0),
        };
        FilterPatch::new().rating(Some(f64::NAN)).apply_to(&mut filters);
        assert_eq!(filters.rating, None);

        FilterPatch::new().rating(Some(f64::INFINITY)).apply_to(&mut filters);
        assert_eq!(filters, FilterSet::default());
    }

    #[test]
    fn test_favorite_item_keeps_unknown_fields() {
        let raw = json!({
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/matrix.jpg",
            "vote_average": 8.2,
            "popularity": 81.5,
            "adult": false
        });
        let item: FavoriteItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.id, 603);
        assert_eq!(item.extra.get("popularity"), Some(&json!(81.5)));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_extra_refuses_keys_of_named_fields() {
        let mut item = FavoriteItem::new(603, "The Matrix");

        assert!(!item.insert_extra("poster_path", json!("/x.jpg")));
        assert!(item.insert_extra("popularity", json!(81.5)));

        let reloaded: FavoriteItem =
            serde_json::from_value(serde_json::to_value(&item).unwrap()).unwrap();
        assert_eq!(reloaded, item);
        assert_eq!(reloaded.poster_path, None);
        assert_eq!(reloaded.extra().len(), 1);
    }

    #[test]
    fn test_favorite_from_summary_keeps_overview_as_extra() {
        let mut movie = MovieSummary::new(1, "One");
        movie.overview = Some("Plot".into());
        let item = FavoriteItem::from(&movie);
        assert_eq!(item.extra().get("overview"), Some(&json!("Plot")));
        assert_eq!(item.vote_average, Some(0.0));
    }

    #[test]
    fn test_favorite_from_details_uses_genre_objects() {
        let details: MovieDetails = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "genres": [{ "id": 28, "name": "Action" }, { "id": 878, "name": "Science Fiction" }],
            "runtime": 148
        }))
        .unwrap();
        let item = FavoriteItem::from(&details);
        assert_eq!(item.genre_ids, vec![28, 878]);
        assert_eq!(item.title, "Inception");
    }

    #[test]
    fn test_time_window_parse() {
        assert_eq!("Week".parse::<TimeWindow>(), Ok(TimeWindow::Week));
        assert!("month".parse::<TimeWindow>().is_err());
    }
}
