/*
 * This module consolidates the core, presentation-agnostic logic of the application: the
 * persisted client state (favorites, last search, filters) with its store and persistence
 * adapter, the read-only query helpers, the movie API client, request generation tracking,
 * configuration and display formatting. Abstractions (`StatePersistenceOperations`,
 * `StateStoreOperations`, `MovieApiOperations`, `ConfigManagerOperations`) are re-exported so
 * the application logic can be wired against them.
 */
pub mod config;
pub mod formatting;
pub mod models;
pub mod path_utils;
pub mod persistence;
pub mod query;
pub mod request_tracker;
pub mod state_store;
pub mod tmdb_client;

// Re-export key structures and enums
pub use models::{
    FavoriteItem, FilterPatch, FilterSet, Genre, GenreId, MovieDetails, MovieId, MoviePage,
    MovieSummary, TimeWindow,
};

pub use config::{ConfigManagerOperations, CoreConfigManager};

pub use persistence::{CoreStatePersistence, InMemoryStatePersistence, StatePersistenceOperations};

pub use state_store::{CoreStateStore, StateStoreOperations};

pub use tmdb_client::{ApiError, CoreTmdbClient, MovieApiOperations};

pub use request_tracker::{RequestChannel, RequestGenerations, RequestTicket};
