/*
 * The single source of truth for favorites, the last search query and the active filters.
 *
 * Every change is expressed as a `StoreAction` and run through `reduce`, a pure function from
 * (state, action) to the next state. `CoreStateStore` commits the result, keeps a companion
 * id index for constant-time membership checks, and then hands the committed snapshot to the
 * persistence adapter. Transitions that leave the state unchanged (adding a favorite that is
 * already there, removing one that is not) commit nothing and write nothing.
 *
 * Callers receive the store explicitly, typed as `StateStoreOperations`.
 */
use crate::core::models::{AppState, FavoriteItem, FilterPatch, FilterSet, MovieId};
use crate::core::persistence::StatePersistenceOperations;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetFavorites(Vec<FavoriteItem>),
    AddFavorite(FavoriteItem),
    RemoveFavorite(MovieId),
    SetLastSearch(String),
    SetFilters(FilterPatch),
    ResetFilters,
}

/*
 * Computes the state that follows `state` under `action`. Never mutates its input.
 * `SetFavorites` drops later duplicates of an id so the uniqueness invariant holds for
 * wholesale replacement too.
 */
pub fn reduce(state: &AppState, action: StoreAction) -> AppState {
    match action {
        StoreAction::SetFavorites(items) => {
            let mut seen = HashSet::new();
            let favorites = items
                .into_iter()
                .filter(|item| seen.insert(item.id))
                .collect();
            AppState {
                favorites,
                ..state.clone()
            }
        }
        StoreAction::AddFavorite(item) => {
            if state.favorites.iter().any(|f| f.id == item.id) {
                return state.clone();
            }
            let mut next = state.clone();
            next.favorites.push(item);
            next
        }
        StoreAction::RemoveFavorite(id) => {
            let mut next = state.clone();
            next.favorites.retain(|f| f.id != id);
            next
        }
        StoreAction::SetLastSearch(query) => AppState {
            last_search: query,
            ..state.clone()
        },
        StoreAction::SetFilters(patch) => {
            let mut next = state.clone();
            patch.apply_to(&mut next.filters);
            next
        }
        StoreAction::ResetFilters => AppState {
            filters: FilterSet::default(),
            ..state.clone()
        },
    }
}

pub trait StateStoreOperations {
    fn add_favorite(&mut self, item: FavoriteItem);
    fn remove_favorite(&mut self, id: MovieId);
    fn set_favorites(&mut self, items: Vec<FavoriteItem>);
    /// Removes the favorite if present, adds it otherwise. Returns the new membership.
    fn toggle_favorite(&mut self, item: FavoriteItem) -> bool;
    fn is_favorite(&self, id: MovieId) -> bool;
    fn set_last_search(&mut self, query: &str);
    fn set_filters(&mut self, patch: FilterPatch);
    fn reset_filters(&mut self);

    fn favorites(&self) -> &[FavoriteItem];
    fn last_search(&self) -> &str;
    fn filters(&self) -> FilterSet;
    fn snapshot(&self) -> AppState;
}

pub struct CoreStateStore {
    state: AppState,
    favorite_ids: HashSet<MovieId>,
    persistence: Arc<dyn StatePersistenceOperations>,
}

impl CoreStateStore {
    /// Rehydrates from `persistence`, falling back to the empty state.
    pub fn new(persistence: Arc<dyn StatePersistenceOperations>) -> Self {
        let loaded = persistence.load();
        // A hand-edited blob may repeat ids; normalize through the reducer.
        let state = reduce(&loaded, StoreAction::SetFavorites(loaded.favorites.clone()));
        if state.favorites.len() != loaded.favorites.len() {
            log::warn!(
                "CoreStateStore: Dropped {} duplicate favorites from stored state.",
                loaded.favorites.len() - state.favorites.len()
            );
        }
        log::debug!(
            "CoreStateStore: Initialized with {} favorites, last search '{}'.",
            state.favorites.len(),
            state.last_search
        );
        let favorite_ids = Self::index_of(&state);
        CoreStateStore {
            state,
            favorite_ids,
            persistence,
        }
    }

    fn index_of(state: &AppState) -> HashSet<MovieId> {
        state.favorites.iter().map(|f| f.id).collect()
    }

    /*
     * Applies `action`, commits the resulting snapshot and persists it. Returns whether the
     * state changed.
     */
    pub fn dispatch(&mut self, action: StoreAction) -> bool {
        log::trace!("CoreStateStore: Dispatching {action:?}");
        let next = reduce(&self.state, action);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.favorite_ids = Self::index_of(&self.state);
        self.persistence.save(&self.state);
        true
    }
}

impl StateStoreOperations for CoreStateStore {
    fn add_favorite(&mut self, item: FavoriteItem) {
        let id = item.id;
        if self.dispatch(StoreAction::AddFavorite(item)) {
            log::debug!("CoreStateStore: Added favorite {id}.");
        }
    }

    fn remove_favorite(&mut self, id: MovieId) {
        if self.dispatch(StoreAction::RemoveFavorite(id)) {
            log::debug!("CoreStateStore: Removed favorite {id}.");
        }
    }

    fn set_favorites(&mut self, items: Vec<FavoriteItem>) {
        self.dispatch(StoreAction::SetFavorites(items));
    }

    fn toggle_favorite(&mut self, item: FavoriteItem) -> bool {
        if self.is_favorite(item.id) {
            self.remove_favorite(item.id);
            false
        } else {
            self.add_favorite(item);
            true
        }
    }

    fn is_favorite(&self, id: MovieId) -> bool {
        self.favorite_ids.contains(&id)
    }

    fn set_last_search(&mut self, query: &str) {
        self.dispatch(StoreAction::SetLastSearch(query.to_string()));
    }

    fn set_filters(&mut self, patch: FilterPatch) {
        self.dispatch(StoreAction::SetFilters(patch));
    }

    fn reset_filters(&mut self) {
        self.dispatch(StoreAction::ResetFilters);
    }

    fn favorites(&self) -> &[FavoriteItem] {
        &self.state.favorites
    }

    fn last_search(&self) -> &str {
        &self.state.last_search
    }

    fn filters(&self) -> FilterSet {
        self.state.filters
    }

    fn snapshot(&self) -> AppState {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::{InMemoryStatePersistence, PersistenceError, Result};
    use std::sync::Mutex;

    // Records every write and can be told to fail them.
    struct RecordingPersistence {
        initial: Option<AppState>,
        saved: Mutex<Vec<AppState>>,
        fail_writes: bool,
    }

    impl RecordingPersistence {
        fn new(initial: Option<AppState>) -> Self {
            RecordingPersistence {
                initial,
                saved: Mutex::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn save_count(&self) -> usize {
            self.saved.lock().unwrap().len()
        }

        fn last_saved(&self) -> Option<AppState> {
            self.saved.lock().unwrap().last().cloned()
        }
    }

    impl StatePersistenceOperations for RecordingPersistence {
        fn read_state(&self) -> Result<Option<AppState>> {
            Ok(self.initial.clone())
        }

        fn write_state(&self, state: &AppState) -> Result<()> {
            if self.fail_writes {
                return Err(PersistenceError::NoStorageLocation);
            }
            self.saved.lock().unwrap().push(state.clone());
            Ok(())
        }
    }

    fn new_store() -> (CoreStateStore, Arc<RecordingPersistence>) {
        let persistence = Arc::new(RecordingPersistence::new(None));
        (CoreStateStore::new(persistence.clone()), persistence)
    }

    #[test]
    fn test_add_favorite_is_idempotent() {
        // Arrange
        let (mut store, persistence) = new_store();
        assert!(store.favorites().is_empty());

        // Act
        store.add_favorite(FavoriteItem::new(1, "A"));
        store.add_favorite(FavoriteItem::new(1, "A"));

        // Assert
        assert_eq!(store.favorites().len(), 1);
        assert_eq!(store.favorites()[0].id, 1);
        assert_eq!(persistence.save_count(), 1);
    }

    #[test]
    fn test_add_favorite_keeps_insertion_order() {
        let (mut store, _) = new_store();
        store.add_favorite(FavoriteItem::new(3, "C"));
        store.add_favorite(FavoriteItem::new(1, "A"));
        store.add_favorite(FavoriteItem::new(2, "B"));

        let ids: Vec<MovieId> = store.favorites().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_favorite_then_not_favorite() {
        let (mut store, persistence) = new_store();
        store.add_favorite(FavoriteItem::new(1, "A"));
        store.add_favorite(FavoriteItem::new(2, "B"));
        assert!(store.is_favorite(1));

        store.remove_favorite(1);

        assert!(!store.is_favorite(1));
        assert!(store.is_favorite(2));
        assert_eq!(persistence.last_saved().unwrap().favorites.len(), 1);
    }

    #[test]
    fn test_remove_absent_favorite_writes_nothing() {
        let (mut store, persistence) = new_store();
        store.remove_favorite(42);
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn test_toggle_favorite_flips_membership() {
        let (mut store, _) = new_store();
        assert!(store.toggle_favorite(FavoriteItem::new(5, "E")));
        assert!(store.is_favorite(5));
        assert!(!store.toggle_favorite(FavoriteItem::new(5, "E")));
        assert!(!store.is_favorite(5));
    }

    #[test]
    fn test_set_favorites_replaces_and_dedupes() {
        let (mut store, _) = new_store();
        store.add_favorite(FavoriteItem::new(9, "Old"));

        store.set_favorites(vec![
            FavoriteItem::new(1, "A"),
            FavoriteItem::new(2, "B"),
            FavoriteItem::new(1, "A again"),
        ]);

        assert_eq!(store.favorites().len(), 2);
        assert_eq!(store.favorites()[0].title, "A");
        assert!(!store.is_favorite(9));
        assert!(store.is_favorite(2));
    }

    #[test]
    fn test_set_last_search_is_verbatim() {
        let (mut store, persistence) = new_store();
        store.set_last_search("  the matrix ");
        assert_eq!(store.last_search(), "  the matrix ");

        store.set_last_search("");
        assert_eq!(store.last_search(), "");
        assert_eq!(persistence.last_saved().unwrap().last_search, "");
    }

    #[test]
    fn test_set_filters_merges() {
        let (mut store, _) = new_store();
        store.set_filters(FilterPatch::new().genre(Some(28)).year(Some(2020)));
        store.set_filters(FilterPatch::new().rating(Some(6.0)));

        let filters = store.filters();
        assert_eq!(filters.genre, Some(28));
        assert_eq!(filters.year, Some(2020));
        assert_eq!(filters.rating, Some(6.0));
    }

    #[test]
    fn test_non_finite_rating_is_not_stored() {
        let (mut store, persistence) = new_store();
        store.set_filters(FilterPatch::new().rating(Some(7.0)));
        assert_eq!(persistence.save_count(), 1);

        store.set_filters(FilterPatch::new().rating(Some(f64::NAN)));
        store.set_filters(FilterPatch::new().rating(Some(f64::NAN)));

        assert_eq!(store.filters().rating, None);
        assert_eq!(persistence.save_count(), 2);
        assert_eq!(persistence.last_saved().unwrap().filters, FilterSet::default());
    }

    #[test]
    fn test_reset_filters_clears_all_fields() {
        let (mut store, persistence) = new_store();
        store.set_filters(
            FilterPatch::new()
                .genre(Some(35))
                .year(Some(1994))
                .rating(Some(8.0)),
        );

        store.reset_filters();

        assert!(store.filters().is_empty());
        assert!(persistence.last_saved().unwrap().filters.is_empty());
    }

    #[test]
    fn test_store_rehydrates_and_dedupes_stored_state() {
        let stored = AppState {
            favorites: vec![
                FavoriteItem::new(1, "A"),
                FavoriteItem::new(1, "A"),
                FavoriteItem::new(2, "B"),
            ],
            last_search: "alien".into(),
            filters: FilterSet::default(),
        };
        let persistence = Arc::new(RecordingPersistence::new(Some(stored)));

        let store = CoreStateStore::new(persistence);

        assert_eq!(store.favorites().len(), 2);
        assert_eq!(store.last_search(), "alien");
        assert!(store.is_favorite(2));
    }

    #[test]
    fn test_failed_writes_do_not_block_transitions() {
        let mut failing = RecordingPersistence::new(None);
        failing.fail_writes = true;
        let mut store = CoreStateStore::new(Arc::new(failing));

        store.add_favorite(FavoriteItem::new(7, "G"));

        assert!(store.is_favorite(7));
    }

    #[test]
    fn test_store_survives_restart_through_persistence() {
        let persistence = Arc::new(InMemoryStatePersistence::new());
        {
            let mut store = CoreStateStore::new(persistence.clone());
            store.add_favorite(FavoriteItem::new(11, "K"));
            store.set_last_search("heat");
        }

        let store = CoreStateStore::new(persistence);

        assert!(store.is_favorite(11));
        assert_eq!(store.last_search(), "heat");
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let state = AppState::default();
        let next = reduce(&state, StoreAction::AddFavorite(FavoriteItem::new(1, "A")));
        assert!(state.favorites.is_empty());
        assert_eq!(next.favorites.len(), 1);
    }
}
