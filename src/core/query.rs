/*
 * Read-only views derived from store state for the presentation layer: local narrowing of a
 * candidate movie list by the active filters, favorite membership, and the genre ranking
 * that drives recommendations.
 *
 * Genre filtering is not done here; a genre constraint is applied upstream by asking the
 * movie API for genre-scoped results.
 */
use crate::core::formatting::{UNKNOWN, year_from_date};
use crate::core::models::{FavoriteItem, FilterSet, GenreId, MovieSummary};
use crate::core::state_store::StateStoreOperations;
use std::collections::HashMap;

/*
 * Keeps the candidates that satisfy the year and minimum-rating constraints, in that order,
 * preserving upstream ordering. With a year constraint, movies without a parseable release
 * date are dropped.
 */
pub fn filter_movies(candidates: Vec<MovieSummary>, filters: &FilterSet) -> Vec<MovieSummary> {
    let mut movies = candidates;
    if let Some(year) = filters.year {
        movies.retain(|m| m.release_date.as_deref().and_then(year_from_date) == Some(year));
    }
    if let Some(min_rating) = filters.rating {
        movies.retain(|m| m.vote_average >= min_rating);
    }
    movies
}

/// Pairs each movie with whether it is currently a favorite.
pub fn with_favorite_flags<'a>(
    movies: &'a [MovieSummary],
    store: &dyn StateStoreOperations,
) -> Vec<(&'a MovieSummary, bool)> {
    movies.iter().map(|m| (m, store.is_favorite(m.id))).collect()
}

/*
 * Genre ids carried by the favorites, most frequent first. Equal counts keep the order in
 * which the genres were first seen.
 */
pub fn rank_favorite_genres(favorites: &[FavoriteItem]) -> Vec<GenreId> {
    let mut counts: HashMap<GenreId, usize> = HashMap::new();
    let mut first_seen: Vec<GenreId> = Vec::new();
    for genre_id in favorites.iter().flat_map(|f| f.genre_ids.iter().copied()) {
        let count = counts.entry(genre_id).or_insert(0);
        if *count == 0 {
            first_seen.push(genre_id);
        }
        *count += 1;
    }
    // Stable sort keeps first-seen order among ties.
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen
}

// TMDB's movie genre table; it changes rarely enough to ship with the binary.
const GENRE_NAMES: &[(GenreId, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub fn genre_name(id: GenreId) -> &'static str {
    GENRE_NAMES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::InMemoryStatePersistence;
    use crate::core::state_store::CoreStateStore;
    use std::sync::Arc;

    fn movie(id: u64, release_date: Option<&str>, vote_average: f64) -> MovieSummary {
        let mut m = MovieSummary::new(id, format!("Movie {id}"));
        m.release_date = release_date.map(str::to_string);
        m.vote_average = vote_average;
        m
    }

    fn favorite(id: u64, genres: &[GenreId]) -> FavoriteItem {
        let mut f = FavoriteItem::new(id, format!("Fav {id}"));
        f.genre_ids = genres.to_vec();
        f
    }

    #[test]
    fn test_filter_by_year_keeps_matching_items() {
        // Arrange
        let candidates = vec![
            movie(1, Some("2019-01-01"), 5.0),
            movie(2, Some("2020-02-02"), 6.0),
            movie(3, Some("2020-12-31"), 7.0),
            movie(4, Some("2021-06-15"), 8.0),
        ];
        let filters = FilterSet {
            genre: None,
            year: Some(2020),
            rating: None,
        };

        // Act
        let result = filter_movies(candidates, &filters);

        // Assert
        let ids: Vec<u64> = result.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_filter_by_year_drops_undated_movies() {
        let candidates = vec![movie(1, None, 9.0), movie(2, Some(""), 9.0)];
        let filters = FilterSet {
            year: Some(2020),
            ..Default::default()
        };
        assert!(filter_movies(candidates, &filters).is_empty());
    }

    #[test]
    fn test_filter_by_rating_is_inclusive_floor() {
        let candidates = vec![
            movie(1, None, 6.9),
            movie(2, None, 7.0),
            movie(3, None, 8.4),
        ];
        let filters = FilterSet {
            rating: Some(7.0),
            ..Default::default()
        };
        let ids: Vec<u64> = filter_movies(candidates, &filters)
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_empty_filters_keep_everything_in_order() {
        let candidates = vec![movie(3, None, 1.0), movie(1, None, 2.0)];
        let filters = FilterSet {
            genre: Some(28),
            ..Default::default()
        };
        let result = filter_movies(candidates.clone(), &filters);
        assert_eq!(result, candidates);
    }

    #[test]
    fn test_rank_favorite_genres_by_count_then_first_seen() {
        let favorites = vec![
            favorite(1, &[18, 35]),
            favorite(2, &[28, 35]),
            favorite(3, &[28]),
            favorite(4, &[]),
        ];
        assert_eq!(rank_favorite_genres(&favorites), vec![35, 28, 18]);
        assert!(rank_favorite_genres(&[]).is_empty());
    }

    #[test]
    fn test_genre_name_lookup() {
        assert_eq!(genre_name(878), "Science Fiction");
        assert_eq!(genre_name(1), "Unknown");
    }

    #[test]
    fn test_with_favorite_flags() {
        let mut store = CoreStateStore::new(Arc::new(InMemoryStatePersistence::new()));
        store.add_favorite(FavoriteItem::new(2, "B"));
        let movies = vec![movie(1, None, 0.0), movie(2, None, 0.0)];

        let flags: Vec<bool> = with_favorite_flags(&movies, &store)
            .into_iter()
            .map(|(_, fav)| fav)
            .collect();

        assert_eq!(flags, vec![false, true]);
    }
}
