// src/main.rs

mod app_logic;
mod core;

use crate::app_logic::ExplorerLogic;
use crate::app_logic::ui_constants::APP_NAME;
use crate::app_logic::view_text;
use crate::core::{
    ConfigManagerOperations, CoreConfigManager, CoreStatePersistence, CoreStateStore,
    CoreTmdbClient, FilterPatch, InMemoryStatePersistence, MovieId, StatePersistenceOperations,
    TimeWindow, path_utils,
};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

const LOG_FILENAME: &str = "movie_explorer.log";

/*
 * Warnings and errors go to the terminal; the full debug log goes to a file in the
 * application's config directory when that directory is available.
 */
fn initialize_app_logging() {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(log_path) = path_utils::app_file_path(APP_NAME, LOG_FILENAME) {
        match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file)),
            Err(e) => eprintln!("Could not open log file {}: {e}", log_path.display()),
        }
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Logger already initialized: {e}");
    }
}

#[cfg(test)]
pub(crate) fn initialize_logging() {
    use simplelog::SimpleLogger;
    // Several tests call this; only the first registration succeeds.
    let _ = SimpleLogger::init(LevelFilter::Debug, Config::default());
}

const HELP_TEXT: &str = "\
Commands:
  search <query>          search movies (uses the active filters)
  more                    next page of the current view
  retry                   repeat the last failed request
  filter genre=<id> year=<yyyy> rating=<min>   (an empty value clears a field)
  reset                   clear all filters
  trending [day|week]     trending movies
  details <id>            movie details
  fav [<id>]              toggle favorite (the shown movie when no id is given)
  favorites [clear]       list favorites, or remove them all
  recommend               recommendations from your favorite genres
  genres                  list genre ids
  login <user> <pass>     sign in
  logout                  sign out
  help                    this text
  quit                    leave";

// Which view `more` and `retry` apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveView {
    Home,
    Search,
    Details,
    Recommendations,
}

/*
 * Parses `genre=28 year=2020 rating=` style arguments into a filter patch. A field given
 * with an empty value is cleared; fields not mentioned are left alone.
 */
fn parse_filter_patch(args: &str) -> Result<FilterPatch, String> {
    fn parse_field<T: FromStr>(name: &str, value: &str) -> Result<Option<T>, String> {
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid value for {name}: '{value}'"))
    }

    let mut patch = FilterPatch::new();
    for token in args.split_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{token}'"))?;
        patch = match key.to_ascii_lowercase().as_str() {
            "genre" => patch.genre(parse_field("genre", value)?),
            "year" => patch.year(parse_field("year", value)?),
            "rating" => {
                let rating: Option<f64> = parse_field("rating", value)?;
                if rating.is_some_and(|r| !r.is_finite()) {
                    return Err(format!("Invalid value for rating: '{value}'"));
                }
                patch.rating(rating)
            }
            other => return Err(format!("Unknown filter '{other}'")),
        };
    }
    if patch.is_empty() {
        return Err("No filter given".to_string());
    }
    Ok(patch)
}

struct Terminal {
    logic: ExplorerLogic,
    active_view: ActiveView,
}

impl Terminal {
    fn print_home(&self) {
        println!(
            "{}",
            view_text::compose_listing(self.logic.trending_listing(), self.logic.store())
        );
        if let Some(listing) = self.logic.search_listing() {
            println!("{}", view_text::compose_listing(listing, self.logic.store()));
        }
    }

    fn print_search(&self) {
        println!("{}", view_text::compose_filters(&self.logic.store().filters()));
        match (self.logic.search_params(), self.logic.search_listing()) {
            (Some(_), Some(listing)) => {
                println!("{}", view_text::compose_listing(listing, self.logic.store()))
            }
            _ => println!("No search yet. Type 'search <query>'."),
        }
    }

    fn print_details(&self) {
        let view = self.logic.details_view();
        let is_favorite = view
            .movie
            .as_ref()
            .is_some_and(|m| self.logic.store().is_favorite(m.id));
        println!("{}", view_text::compose_details(view, is_favorite));
    }

    fn print_recommendations(&self) {
        println!(
            "{}",
            view_text::compose_recommendations(
                self.logic.recommendations_view(),
                self.logic.favorites().len(),
                self.logic.store()
            )
        );
    }

    fn print_active_view(&self) {
        match self.active_view {
            ActiveView::Home => self.print_home(),
            ActiveView::Search => self.print_search(),
            ActiveView::Details => self.print_details(),
            ActiveView::Recommendations => self.print_recommendations(),
        }
    }

    /// Handles one input line. Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (command, args) = line.split_once(' ').unwrap_or((line, ""));
        let args = args.trim();
        match command {
            "" => {}
            "quit" | "exit" => return false,
            "help" => println!("{HELP_TEXT}"),
            "search" => {
                self.logic.submit_search(args);
                self.active_view = ActiveView::Search;
                self.print_search();
            }
            "filter" => match parse_filter_patch(args) {
                Ok(patch) => {
                    self.logic.update_filters(patch);
                    self.active_view = ActiveView::Search;
                    self.print_search();
                }
                Err(message) => println!("{message}"),
            },
            "reset" => {
                self.logic.reset_filters();
                self.active_view = ActiveView::Search;
                self.print_search();
            }
            "trending" => {
                let window = if args.is_empty() {
                    Ok(self.logic.trending_window())
                } else {
                    args.parse::<TimeWindow>()
                };
                match window {
                    Ok(window) => {
                        self.logic.show_trending(window);
                        self.active_view = ActiveView::Home;
                        self.print_home();
                    }
                    Err(message) => println!("{message}"),
                }
            }
            "more" => {
                let loaded = match self.active_view {
                    ActiveView::Home => self.logic.load_more_trending(),
                    ActiveView::Search => self.logic.load_more_search(),
                    ActiveView::Recommendations => self.logic.load_more_recommendations(),
                    ActiveView::Details => false,
                };
                if loaded {
                    self.print_active_view();
                } else {
                    println!("Nothing more to load.");
                }
            }
            "retry" => {
                match self.active_view {
                    ActiveView::Home => {
                        let window = self.logic.trending_window();
                        self.logic.show_trending(window);
                    }
                    ActiveView::Search => {
                        self.logic.retry_search();
                    }
                    ActiveView::Details => {
                        self.logic.retry_details();
                    }
                    ActiveView::Recommendations => self.logic.show_recommendations(),
                }
                self.print_active_view();
            }
            "details" => match args.parse::<MovieId>() {
                Ok(id) => {
                    self.logic.show_details(id);
                    self.active_view = ActiveView::Details;
                    self.print_details();
                }
                Err(_) => println!("Usage: details <id>"),
            },
            "fav" => {
                let toggled = if args.is_empty() {
                    self.logic.toggle_favorite_for_details()
                } else {
                    match args.parse::<MovieId>() {
                        Ok(id) => self.logic.toggle_favorite(id),
                        Err(_) => {
                            println!("Usage: fav [<id>]");
                            return true;
                        }
                    }
                };
                match toggled {
                    Some(true) => println!("Added to favorites."),
                    Some(false) => println!("Removed from favorites."),
                    None => println!("Open the movie first (details <id>) to add it."),
                }
            }
            "favorites" if args == "clear" => {
                self.logic.clear_favorites();
                println!("Favorites cleared.");
            }
            "favorites" => println!("{}", view_text::compose_favorites(self.logic.favorites())),
            "recommend" => {
                self.logic.show_recommendations();
                self.active_view = ActiveView::Recommendations;
                self.print_recommendations();
            }
            "genres" => match self.logic.genres() {
                Ok(genres) => println!("{}", view_text::compose_genres(genres)),
                Err(_) => println!("Failed to load genres. Please try again."),
            },
            "login" => {
                let mut parts = args.splitn(2, ' ');
                let username = parts.next().unwrap_or("");
                let password = parts.next().unwrap_or("");
                if self.logic.login(username, password) {
                    println!("Welcome, {}!", username.trim());
                } else {
                    println!("Please enter a username.");
                }
            }
            "logout" => match self.logic.logged_in_user() {
                Some(user) => {
                    println!("Goodbye, {user}.");
                    self.logic.logout();
                }
                None => println!("Not signed in."),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
        true
    }
}

fn main() -> ExitCode {
    initialize_app_logging();
    log::info!("Starting {APP_NAME}");

    let api_config = match CoreConfigManager::new().load_api_config(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let api = match CoreTmdbClient::new(api_config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not create the HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let file_persistence = CoreStatePersistence::new(APP_NAME);
    let persistence: Arc<dyn StatePersistenceOperations> = if file_persistence.file_path().is_some()
    {
        Arc::new(file_persistence)
    } else {
        log::warn!("No config directory; favorites will not be remembered.");
        Arc::new(InMemoryStatePersistence::new())
    };
    let store = CoreStateStore::new(persistence);

    let mut terminal = Terminal {
        logic: ExplorerLogic::new(Box::new(store), Arc::new(api)),
        active_view: ActiveView::Home,
    };
    terminal.logic.on_startup();
    if terminal.logic.search_listing().is_some() {
        terminal.active_view = ActiveView::Search;
    }
    terminal.print_active_view();
    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        match terminal.logic.logged_in_user() {
            Some(user) => print!("{user}> "),
            None => print!("> "),
        }
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                if !terminal.handle_line(&line) {
                    break;
                }
            }
            Err(e) => {
                log::error!("Failed to read input: {e}");
                break;
            }
        }
    }
    log::info!("Exiting {APP_NAME}");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_patch_sets_and_clears() {
        let patch = parse_filter_patch("genre=28 year= rating=7.5").unwrap();
        assert_eq!(patch.genre, Some(Some(28)));
        assert_eq!(patch.year, Some(None));
        assert_eq!(patch.rating, Some(Some(7.5)));
    }

    #[test]
    fn test_parse_filter_patch_rejects_bad_input() {
        assert!(parse_filter_patch("").is_err());
        assert!(parse_filter_patch("year").is_err());
        assert!(parse_filter_patch("year=soon").is_err());
        assert!(parse_filter_patch("decade=1990").is_err());
    }

    #[test]
    fn test_parse_filter_patch_rejects_non_finite_rating() {
        assert!(parse_filter_patch("rating=NaN").is_err());
        assert!(parse_filter_patch("rating=inf").is_err());
        assert!(parse_filter_patch("rating=-infinity").is_err());
        assert_eq!(
            parse_filter_patch("rating=0").unwrap().rating,
            Some(Some(0.0))
        );
    }
}
