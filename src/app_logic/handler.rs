use crate::app_logic::ui_constants::*;
use crate::core::query::{filter_movies, genre_name, rank_favorite_genres};
use crate::core::{
    ApiError, FavoriteItem, FilterPatch, FilterSet, Genre, GenreId, MovieApiOperations,
    MovieDetails, MovieId, MoviePage, MovieSummary, RequestChannel, RequestGenerations,
    RequestTicket, StateStoreOperations, TimeWindow,
};
use std::sync::Arc;

// What the user asked the search view for.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub filters: FilterSet,
}

// Which list endpoint feeds a listing.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    Popular,
    Search(String),
    Genre(GenreId),
    Trending(TimeWindow),
}

impl PageSource {
    /*
     * Chooses the upstream endpoint for a search. A genre constraint can only be honoured by
     * genre discovery, which takes no text, so it is used when the query is blank. A blank
     * query with no genre browses popular titles.
     */
    pub fn for_search(params: &SearchParams) -> Self {
        let query = params.query.trim();
        match (query.is_empty(), params.filters.genre) {
            (true, Some(genre)) => PageSource::Genre(genre),
            (true, None) => PageSource::Popular,
            (false, _) => PageSource::Search(query.to_string()),
        }
    }

    fn fetch(&self, api: &dyn MovieApiOperations, page: u32) -> Result<MoviePage, ApiError> {
        match self {
            PageSource::Popular => api.popular(page),
            PageSource::Search(query) => api.search(query, page),
            PageSource::Genre(genre) => api.discover_by_genre(*genre, page),
            PageSource::Trending(window) => api.trending(*window, page),
        }
    }
}

// A page request that has been issued but whose response is not applied yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPage {
    pub ticket: RequestTicket,
    pub source: PageSource,
    pub page: u32,
    pub append: bool,
    pub filters: Option<FilterSet>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDetails {
    pub ticket: RequestTicket,
    pub id: MovieId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieListing {
    pub title: String,
    pub movies: Vec<MovieSummary>,
    pub page: u32,
    pub total_pages: u32,
    pub error: Option<String>,
}

impl MovieListing {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    pub requested_id: Option<MovieId>,
    pub movie: Option<MovieDetails>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationView {
    pub genre: Option<GenreId>,
    pub listing: MovieListing,
}

impl RecommendationView {
    pub fn genre_name(&self) -> &'static str {
        self.genre.map(genre_name).unwrap_or("")
    }
}

/*
 * Drives the movie explorer views: search, trending, movie details, favorites and
 * recommendations. It owns the client state store (injected as `StateStoreOperations`) and
 * talks to the movie API only through `MovieApiOperations`.
 *
 * Every network-backed operation is split into `begin_*` (issue a ticket and record what was
 * asked) and `complete_*` (apply the response if its ticket is still the latest). The
 * convenience methods run both halves back to back; a front-end that receives responses
 * asynchronously can call the halves itself and stale responses are dropped.
 */
pub struct ExplorerLogic {
    store: Box<dyn StateStoreOperations>,
    api: Arc<dyn MovieApiOperations>,
    generations: RequestGenerations,
    // Latest requested search, and the one whose first page is still outstanding.
    search_params: Option<SearchParams>,
    pending_search: Option<SearchParams>,
    // Parameters of the search whose results are shown; paging continues from these.
    shown_search: Option<SearchParams>,
    search: Option<MovieListing>,
    trending_window: TimeWindow,
    pending_trending: Option<TimeWindow>,
    trending: MovieListing,
    details: DetailView,
    recommendations: RecommendationView,
    genre_cache: Option<Vec<Genre>>,
    logged_in_user: Option<String>,
}

impl ExplorerLogic {
    pub fn new(store: Box<dyn StateStoreOperations>, api: Arc<dyn MovieApiOperations>) -> Self {
        ExplorerLogic {
            store,
            api,
            generations: RequestGenerations::new(),
            search_params: None,
            pending_search: None,
            shown_search: None,
            search: None,
            trending_window: TimeWindow::Day,
            pending_trending: None,
            trending: MovieListing::default(),
            details: DetailView::default(),
            recommendations: RecommendationView::default(),
            genre_cache: None,
            logged_in_user: None,
        }
    }

    pub fn store(&self) -> &dyn StateStoreOperations {
        self.store.as_ref()
    }

    /// The most recently requested search, answered or not.
    pub fn search_params(&self) -> Option<&SearchParams> {
        self.search_params.as_ref()
    }

    /// The search results, or `None` while no search has been made this session.
    pub fn search_listing(&self) -> Option<&MovieListing> {
        self.search.as_ref()
    }

    /// The window of the trending list currently shown.
    pub fn trending_window(&self) -> TimeWindow {
        self.trending_window
    }

    pub fn trending_listing(&self) -> &MovieListing {
        &self.trending
    }

    pub fn details_view(&self) -> &DetailView {
        &self.details
    }

    pub fn recommendations_view(&self) -> &RecommendationView {
        &self.recommendations
    }

    pub fn logged_in_user(&self) -> Option<&str> {
        self.logged_in_user.as_deref()
    }

    /*
     * Restores the home view: the trending list, plus the stored search (with the stored
     * filters) when one exists.
     */
    pub fn on_startup(&mut self) {
        let restored = self.store.snapshot();
        log::info!(
            "ExplorerLogic: Starting with {} favorites.",
            restored.favorites.len()
        );
        self.show_trending(self.trending_window);
        if !restored.last_search.is_empty() {
            self.run_search(SearchParams {
                query: restored.last_search,
                filters: restored.filters,
            });
        }
    }

    // --- Search ---

    /// Remembers `query` as the last search and runs it with the stored filters.
    pub fn submit_search(&mut self, query: &str) {
        self.store.set_last_search(query);
        let filters = self.store.filters();
        self.run_search(SearchParams {
            query: query.to_string(),
            filters,
        });
    }

    pub fn run_search(&mut self, params: SearchParams) {
        let pending = self.begin_search(params);
        let result = pending.source.fetch(self.api.as_ref(), pending.page);
        self.complete_search(&pending, result);
    }

    pub fn begin_search(&mut self, params: SearchParams) -> PendingPage {
        let ticket = self.generations.issue(RequestChannel::Search);
        let source = PageSource::for_search(&params);
        log::debug!("ExplorerLogic: Search {params:?} via {source:?}");
        let filters = params.filters;
        self.search_params = Some(params.clone());
        self.pending_search = Some(params);
        PendingPage {
            ticket,
            source,
            page: 1,
            append: false,
            filters: Some(filters),
        }
    }

    /// Returns `false` when the response was stale and ignored.
    pub fn complete_search(
        &mut self,
        pending: &PendingPage,
        result: Result<MoviePage, ApiError>,
    ) -> bool {
        if !self.is_current(pending) {
            return false;
        }
        if !pending.append {
            self.shown_search = self.pending_search.take();
        }
        let title = self.search_title();
        let listing = self.search.get_or_insert_with(MovieListing::default);
        listing.title = title;
        apply_page(
            listing,
            pending,
            result,
            SEARCH_FAILED_MSG,
            SEARCH_MORE_FAILED_MSG,
        );
        true
    }

    /// Fetches the next page of the current search. Returns `false` if there is none.
    pub fn load_more_search(&mut self) -> bool {
        let Some(pending) = self.begin_load_more_search() else {
            return false;
        };
        let result = pending.source.fetch(self.api.as_ref(), pending.page);
        self.complete_search(&pending, result)
    }

    /*
     * Requests the page after the shown one, for the parameters that produced it. Refused
     * while a new search is outstanding: its first page would replace the listing anyway.
     */
    pub fn begin_load_more_search(&mut self) -> Option<PendingPage> {
        if self.pending_search.is_some() {
            return None;
        }
        let listing = self.search.as_ref()?;
        if !listing.has_more() {
            return None;
        }
        let next_page = listing.page + 1;
        let params = self.shown_search.clone()?;
        Some(PendingPage {
            ticket: self.generations.issue(RequestChannel::Search),
            source: PageSource::for_search(&params),
            page: next_page,
            append: true,
            filters: Some(params.filters),
        })
    }

    /// Runs the last search parameters again from the first page.
    pub fn retry_search(&mut self) -> bool {
        match self.search_params.clone() {
            Some(params) => {
                self.run_search(params);
                true
            }
            None => false,
        }
    }

    fn search_title(&self) -> String {
        match &self.shown_search {
            Some(params) if !params.query.trim().is_empty() => {
                format!("Search Results for \"{}\"", params.query)
            }
            _ => "Search Results".to_string(),
        }
    }

    // The query an active search view should be refreshed with.
    fn active_query(&self) -> Option<String> {
        match &self.search_params {
            Some(params) => Some(params.query.clone()),
            None if !self.store.last_search().is_empty() => {
                Some(self.store.last_search().to_string())
            }
            None => None,
        }
    }

    /// Merges `patch` into the stored filters and refreshes an active search.
    pub fn update_filters(&mut self, patch: FilterPatch) {
        self.store.set_filters(patch);
        if let Some(query) = self.active_query() {
            let filters = self.store.filters();
            self.run_search(SearchParams { query, filters });
        }
    }

    /// Clears the stored filters and refreshes an active search without constraints.
    pub fn reset_filters(&mut self) {
        self.store.reset_filters();
        if let Some(query) = self.active_query() {
            self.run_search(SearchParams {
                query,
                filters: FilterSet::default(),
            });
        }
    }

    // --- Trending ---

    pub fn show_trending(&mut self, window: TimeWindow) {
        let pending = self.begin_trending(window);
        let result = pending.source.fetch(self.api.as_ref(), pending.page);
        self.complete_trending(&pending, result);
    }

    pub fn begin_trending(&mut self, window: TimeWindow) -> PendingPage {
        self.pending_trending = Some(window);
        PendingPage {
            ticket: self.generations.issue(RequestChannel::Trending),
            source: PageSource::Trending(window),
            page: 1,
            append: false,
            filters: None,
        }
    }

    pub fn load_more_trending(&mut self) -> bool {
        if self.pending_trending.is_some() || !self.trending.has_more() {
            return false;
        }
        let pending = PendingPage {
            ticket: self.generations.issue(RequestChannel::Trending),
            source: PageSource::Trending(self.trending_window),
            page: self.trending.page + 1,
            append: true,
            filters: None,
        };
        let result = pending.source.fetch(self.api.as_ref(), pending.page);
        self.complete_trending(&pending, result)
    }

    pub fn complete_trending(
        &mut self,
        pending: &PendingPage,
        result: Result<MoviePage, ApiError>,
    ) -> bool {
        if !self.is_current(pending) {
            return false;
        }
        if !pending.append {
            if let Some(window) = self.pending_trending.take() {
                self.trending_window = window;
            }
        }
        self.trending.title = match self.trending_window {
            TimeWindow::Day => "Trending Today".to_string(),
            TimeWindow::Week => "Trending This Week".to_string(),
        };
        apply_page(
            &mut self.trending,
            pending,
            result,
            TRENDING_FAILED_MSG,
            TRENDING_MORE_FAILED_MSG,
        );
        true
    }

    // --- Details ---

    pub fn show_details(&mut self, id: MovieId) {
        let pending = self.begin_details(id);
        let result = self.api.details(pending.id);
        self.complete_details(&pending, result);
    }

    pub fn begin_details(&mut self, id: MovieId) -> PendingDetails {
        self.details.requested_id = Some(id);
        PendingDetails {
            ticket: self.generations.issue(RequestChannel::Details),
            id,
        }
    }

    pub fn complete_details(
        &mut self,
        pending: &PendingDetails,
        result: Result<MovieDetails, ApiError>,
    ) -> bool {
        if !self.generations.is_current(&pending.ticket) {
            log::debug!("ExplorerLogic: Dropping stale details for {}", pending.id);
            return false;
        }
        match result {
            Ok(movie) => {
                self.details.movie = Some(movie);
                self.details.error = None;
            }
            Err(e) => {
                log::warn!("ExplorerLogic: Details for {} failed: {e}", pending.id);
                self.details.movie = None;
                self.details.error = Some(DETAILS_FAILED_MSG.to_string());
            }
        }
        true
    }

    pub fn retry_details(&mut self) -> bool {
        match self.details.requested_id {
            Some(id) => {
                self.show_details(id);
                true
            }
            None => false,
        }
    }

    // --- Favorites ---

    /// Favorite button of the detail view. `None` when no movie is shown.
    pub fn toggle_favorite_for_details(&mut self) -> Option<bool> {
        let item = self.details.movie.as_ref().map(FavoriteItem::from)?;
        Some(self.store.toggle_favorite(item))
    }

    /*
     * Toggles the favorite state of a movie by id. Removing works for any stored favorite;
     * adding needs the movie's record, which is looked up in the loaded views.
     * Returns the new membership, or `None` when the movie is unknown.
     */
    pub fn toggle_favorite(&mut self, id: MovieId) -> Option<bool> {
        if self.store.is_favorite(id) {
            self.store.remove_favorite(id);
            return Some(false);
        }
        let item = self.find_loaded_movie(id)?;
        self.store.add_favorite(item);
        Some(true)
    }

    fn find_loaded_movie(&self, id: MovieId) -> Option<FavoriteItem> {
        if let Some(movie) = self.details.movie.as_ref().filter(|m| m.id == id) {
            return Some(FavoriteItem::from(movie));
        }
        self.search
            .iter()
            .chain(std::iter::once(&self.trending))
            .chain(std::iter::once(&self.recommendations.listing))
            .flat_map(|listing| listing.movies.iter())
            .find(|m| m.id == id)
            .map(FavoriteItem::from)
    }

    pub fn favorites(&self) -> &[FavoriteItem] {
        self.store.favorites()
    }

    pub fn clear_favorites(&mut self) {
        log::info!(
            "ExplorerLogic: Clearing {} favorites.",
            self.store.favorites().len()
        );
        self.store.set_favorites(Vec::new());
    }

    // --- Recommendations ---

    /*
     * Recommends movies from the genre that occurs most often among the favorites. With no
     * favorites, or favorites without genre data, the view is left empty.
     */
    pub fn show_recommendations(&mut self) {
        match self.begin_recommendations() {
            Some(pending) => {
                let result = pending.source.fetch(self.api.as_ref(), pending.page);
                self.complete_recommendations(&pending, result);
            }
            None => log::debug!("ExplorerLogic: No genre to recommend from."),
        }
    }

    pub fn begin_recommendations(&mut self) -> Option<PendingPage> {
        let ticket = self.generations.issue(RequestChannel::Recommendations);
        let top_genre = rank_favorite_genres(self.store.favorites()).first().copied();
        self.recommendations = RecommendationView {
            genre: top_genre,
            listing: MovieListing::default(),
        };
        let genre = top_genre?;
        Some(PendingPage {
            ticket,
            source: PageSource::Genre(genre),
            page: 1,
            append: false,
            filters: None,
        })
    }

    pub fn load_more_recommendations(&mut self) -> bool {
        let Some(genre) = self.recommendations.genre else {
            return false;
        };
        if !self.recommendations.listing.has_more() {
            return false;
        }
        let pending = PendingPage {
            ticket: self.generations.issue(RequestChannel::Recommendations),
            source: PageSource::Genre(genre),
            page: self.recommendations.listing.page + 1,
            append: true,
            filters: None,
        };
        let result = pending.source.fetch(self.api.as_ref(), pending.page);
        self.complete_recommendations(&pending, result)
    }

    pub fn complete_recommendations(
        &mut self,
        pending: &PendingPage,
        result: Result<MoviePage, ApiError>,
    ) -> bool {
        if !self.is_current(pending) {
            return false;
        }
        let listing = &mut self.recommendations.listing;
        listing.title = match self.recommendations.genre {
            Some(genre) => format!("{} Movies You Might Like", genre_name(genre)),
            None => String::new(),
        };
        apply_page(
            listing,
            pending,
            result,
            RECOMMENDATIONS_FAILED_MSG,
            RECOMMENDATIONS_MORE_FAILED_MSG,
        );
        true
    }

    // --- Genres ---

    /// The API's genre list, fetched once and then served from memory.
    pub fn genres(&mut self) -> Result<&[Genre], ApiError> {
        if self.genre_cache.is_none() {
            let list = self.api.genres().inspect_err(|e| {
                log::warn!("ExplorerLogic: Genre list unavailable: {e}");
            })?;
            log::debug!("ExplorerLogic: Cached {} genres.", list.genres.len());
            self.genre_cache = Some(list.genres);
        }
        Ok(self.genre_cache.as_deref().unwrap_or(&[]))
    }

    // --- Session ---

    /// Cosmetic login: any non-blank username is accepted, the password is not checked.
    pub fn login(&mut self, username: &str, _password: &str) -> bool {
        let username = username.trim();
        if username.is_empty() {
            return false;
        }
        log::info!("ExplorerLogic: '{username}' logged in.");
        self.logged_in_user = Some(username.to_string());
        true
    }

    pub fn logout(&mut self) {
        self.logged_in_user = None;
    }

    fn is_current(&self, pending: &PendingPage) -> bool {
        let current = self.generations.is_current(&pending.ticket);
        if !current {
            log::debug!(
                "ExplorerLogic: Dropping stale {:?} response for page {}",
                pending.source,
                pending.page
            );
        }
        current
    }
}

/*
 * Writes a page response into `listing`. A first page replaces the listing; a follow-up page
 * is appended. Failures keep already shown movies when loading more, and clear the listing
 * otherwise. The pending filters, if any, are applied to the fetched results.
 */
fn apply_page(
    listing: &mut MovieListing,
    pending: &PendingPage,
    result: Result<MoviePage, ApiError>,
    first_page_error: &str,
    more_error: &str,
) {
    match result {
        Ok(page) => {
            let movies = match &pending.filters {
                Some(filters) => filter_movies(page.results, filters),
                None => page.results,
            };
            if pending.append {
                listing.movies.extend(movies);
            } else {
                listing.movies = movies;
            }
            listing.page = pending.page;
            listing.total_pages = page.total_pages;
            listing.error = None;
        }
        Err(e) => {
            log::warn!(
                "ExplorerLogic: {:?} page {} failed: {e}",
                pending.source,
                pending.page
            );
            if pending.append {
                listing.error = Some(more_error.to_string());
            } else {
                listing.movies.clear();
                listing.page = 0;
                listing.total_pages = 0;
                listing.error = Some(first_page_error.to_string());
            }
        }
    }
}
