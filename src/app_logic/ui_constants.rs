/*
 * Shared user-facing strings and limits used by the application logic and the views that
 * render it. Error messages are deliberately generic; the underlying cause only goes to the
 * log.
 */

pub const APP_NAME: &str = "MovieExplorer";

pub const SEARCH_FAILED_MSG: &str = "Failed to search movies. Please try again.";
pub const SEARCH_MORE_FAILED_MSG: &str = "Failed to load more movies. Please try again.";

pub const TRENDING_FAILED_MSG: &str = "Failed to fetch trending movies. Please try again later.";
pub const TRENDING_MORE_FAILED_MSG: &str =
    "Failed to load more trending movies. Please try again.";

pub const DETAILS_FAILED_MSG: &str = "Failed to fetch movie details. Please try again later.";

pub const RECOMMENDATIONS_FAILED_MSG: &str =
    "Failed to fetch recommendations. Please try again later.";
pub const RECOMMENDATIONS_MORE_FAILED_MSG: &str =
    "Failed to load more recommendations. Please try again.";

pub const NO_CAST_MSG: &str = "No cast information available.";
pub const NO_RECOMMENDATIONS_MSG: &str =
    "Add movies to your favorites to see personalized recommendations based on your taste.";

// Cast entries shown on the detail view.
pub const DETAIL_CAST_LIMIT: usize = 6;

// Overview length on list rows before it is cut with "...".
pub const OVERVIEW_PREVIEW_CHARS: usize = 150;
