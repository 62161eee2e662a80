/*
 * Composes the plain-text rendering of the explorer views for the terminal front-end.
 * Everything here is a pure function of the view data and the favorite membership, so the
 * layout can be tested without a terminal.
 */
use crate::app_logic::handler::{DetailView, MovieListing, RecommendationView};
use crate::app_logic::ui_constants::*;
use crate::core::formatting::{
    POSTER_SIZE, format_date, format_money, format_runtime, format_text_or_unknown,
    full_image_path, language_name, pick_trailer, truncate_text, year_from_date, youtube_url,
};
use crate::core::query::with_favorite_flags;
use crate::core::{FavoriteItem, FilterSet, Genre, MovieSummary, StateStoreOperations};
use std::fmt::Write;

fn favorite_marker(is_favorite: bool) -> &'static str {
    if is_favorite { "♥" } else { " " }
}

fn year_label(release_date: Option<&str>) -> String {
    release_date
        .and_then(year_from_date)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".to_string())
}

pub fn compose_movie_row(movie: &MovieSummary, is_favorite: bool) -> String {
    format!(
        "{} [{:>7}] {} ({}) ★ {:.1}",
        favorite_marker(is_favorite),
        movie.id,
        movie.title,
        year_label(movie.release_date.as_deref()),
        movie.vote_average
    )
}

pub fn compose_listing(listing: &MovieListing, store: &dyn StateStoreOperations) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "== {} ==", listing.title);
    if let Some(error) = &listing.error {
        let _ = writeln!(text, "! {error} (type 'retry')");
    }
    if listing.movies.is_empty() && listing.error.is_none() {
        let _ = writeln!(text, "No movies found.");
    }
    for (movie, is_favorite) in with_favorite_flags(&listing.movies, store) {
        let _ = writeln!(text, "{}", compose_movie_row(movie, is_favorite));
        if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
            let _ = writeln!(
                text,
                "            {}",
                truncate_text(overview, OVERVIEW_PREVIEW_CHARS)
            );
        }
    }
    if listing.has_more() {
        let _ = writeln!(
            text,
            "-- page {} of {}, type 'more' for the next page --",
            listing.page, listing.total_pages
        );
    }
    text
}

pub fn compose_details(view: &DetailView, is_favorite: bool) -> String {
    let mut text = String::new();
    if let Some(error) = &view.error {
        let _ = writeln!(text, "! {error} (type 'retry')");
        return text;
    }
    let Some(movie) = &view.movie else {
        return text;
    };

    let _ = writeln!(
        text,
        "{} {} ({})",
        favorite_marker(is_favorite),
        movie.title,
        year_label(movie.release_date.as_deref())
    );
    if let Some(tagline) = movie.tagline.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(text, "  \"{tagline}\"");
    }
    let genres: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
    let _ = writeln!(text, "  Genres: {}", genres.join(", "));
    let _ = writeln!(text, "  Rating: {:.1}/10", movie.vote_average);
    let poster = full_image_path(movie.poster_path.as_deref(), POSTER_SIZE);
    let _ = writeln!(text, "  Poster: {poster}");
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "  {}",
        movie.overview.as_deref().filter(|o| !o.is_empty()).unwrap_or(UNKNOWN_OVERVIEW)
    );
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "  Release Date:      {}",
        format_date(movie.release_date.as_deref())
    );
    let _ = writeln!(text, "  Runtime:           {}", format_runtime(movie.runtime));
    let _ = writeln!(
        text,
        "  Status:            {}",
        format_text_or_unknown(movie.status.as_deref())
    );
    let _ = writeln!(
        text,
        "  Original Language: {}",
        language_name(movie.original_language.as_deref())
    );
    let _ = writeln!(text, "  Budget:            {}", format_money(movie.budget));
    let _ = writeln!(text, "  Revenue:           {}", format_money(movie.revenue));

    let _ = writeln!(text, "  Cast:");
    if movie.cast().is_empty() {
        let _ = writeln!(text, "    {NO_CAST_MSG}");
    }
    for person in movie.cast().iter().take(DETAIL_CAST_LIMIT) {
        match person.character.as_deref().filter(|c| !c.is_empty()) {
            Some(character) => {
                let _ = writeln!(text, "    {} as {character}", person.name);
            }
            None => {
                let _ = writeln!(text, "    {}", person.name);
            }
        }
    }
    if let Some(trailer) = pick_trailer(movie.videos()) {
        let _ = writeln!(text, "  Trailer: {}", youtube_url(&trailer.key));
    }
    text
}

const UNKNOWN_OVERVIEW: &str = "No overview available.";

pub fn compose_favorites(favorites: &[FavoriteItem]) -> String {
    if favorites.is_empty() {
        return "You have no favorite movies yet.\n".to_string();
    }
    let mut text = format!("== Your Favorites ({}) ==\n", favorites.len());
    for item in favorites {
        let rating = item
            .vote_average
            .map(|v| format!("★ {v:.1}"))
            .unwrap_or_default();
        let _ = writeln!(
            text,
            "♥ [{:>7}] {} ({}) {rating}",
            item.id,
            item.title,
            year_label(item.release_date.as_deref())
        );
        let overview = item.extra().get("overview").and_then(|v| v.as_str());
        if let Some(overview) = overview.filter(|o| !o.is_empty()) {
            let _ = writeln!(
                text,
                "            {}",
                truncate_text(overview, OVERVIEW_PREVIEW_CHARS)
            );
        }
    }
    text
}

pub fn compose_recommendations(
    view: &RecommendationView,
    favorites_count: usize,
    store: &dyn StateStoreOperations,
) -> String {
    if favorites_count == 0 || view.genre.is_none() {
        return format!("No Recommendations Yet\n{NO_RECOMMENDATIONS_MSG}\n");
    }
    format!(
        "Based on your interest in {} movies\n{}",
        view.genre_name(),
        compose_listing(&view.listing, store)
    )
}

pub fn compose_filters(filters: &FilterSet) -> String {
    if filters.is_empty() {
        return "Filters: none".to_string();
    }
    let show = |value: Option<String>| value.unwrap_or_else(|| "any".to_string());
    format!(
        "Filters: genre={} year={} rating>={}",
        show(filters.genre.map(|g| g.to_string())),
        show(filters.year.map(|y| y.to_string())),
        show(filters.rating.map(|r| r.to_string()))
    )
}

pub fn compose_genres(genres: &[Genre]) -> String {
    let mut text = String::new();
    for genre in genres {
        let _ = writeln!(text, "{:>6}  {}", genre.id, genre.name);
    }
    text
}
