/*
 * This module provides the application logic layer, centered around `ExplorerLogic`, which
 * acts as the presenter for the movie explorer views. `view_text` renders those views for
 * the terminal front-end and `ui_constants` holds the shared user-facing strings.
 * Unit tests for `ExplorerLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod ui_constants;
pub mod view_text;


pub use handler::ExplorerLogic;
