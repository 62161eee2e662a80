/*
 * Client for the TMDB v3 REST API, the external source of every movie, genre and credit
 * record. Only read endpoints are used. Each request carries the configured API key and
 * response language as query parameters.
 *
 * The application logic depends on `MovieApiOperations`, not on this concrete client, so
 * tests substitute canned responses.
 */
use crate::core::config::ApiConfig;
use crate::core::models::{GenreId, GenreList, MovieDetails, MovieId, MoviePage, TimeWindow};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Status { code: u16, message: String },
    Decode(serde_json::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP request failed: {e}"),
            ApiError::Status { code, message } => {
                write!(f, "Movie API answered {code}: {message}")
            }
            ApiError::Decode(e) => write!(f, "Unexpected movie API response: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            ApiError::Status { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

pub trait MovieApiOperations: Send + Sync {
    fn popular(&self, page: u32) -> Result<MoviePage>;
    fn trending(&self, window: TimeWindow, page: u32) -> Result<MoviePage>;
    fn search(&self, query: &str, page: u32) -> Result<MoviePage>;
    fn details(&self, id: MovieId) -> Result<MovieDetails>;
    fn discover_by_genre(&self, genre: GenreId, page: u32) -> Result<MoviePage>;
    fn genres(&self) -> Result<GenreList>;
}

pub struct CoreTmdbClient {
    client: Client,
    config: ApiConfig,
}

impl CoreTmdbClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(CoreTmdbClient { client, config })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        log::debug!("CoreTmdbClient: GET {path} {params:?}");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .query(params)
            .send()
            .inspect_err(|e| log::error!("CoreTmdbClient: Request to {path} failed: {e}"))?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let message = status_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            log::error!("CoreTmdbClient: {path} answered {status}: {message}");
            return Err(ApiError::Status {
                code: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&body).map_err(|e| {
            log::error!("CoreTmdbClient: Could not decode response from {path}: {e}");
            ApiError::Decode(e)
        })
    }
}

// TMDB error bodies look like `{"status_code": 7, "status_message": "Invalid API key"}`.
fn status_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("status_message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

impl MovieApiOperations for CoreTmdbClient {
    fn popular(&self, page: u32) -> Result<MoviePage> {
        self.get("/movie/popular", &[("page", page.to_string())])
    }

    fn trending(&self, window: TimeWindow, page: u32) -> Result<MoviePage> {
        self.get(
            &format!("/trending/movie/{}", window.as_str()),
            &[("page", page.to_string())],
        )
    }

    fn search(&self, query: &str, page: u32) -> Result<MoviePage> {
        self.get(
            "/search/movie",
            &[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("include_adult", "false".to_string()),
            ],
        )
    }

    fn details(&self, id: MovieId) -> Result<MovieDetails> {
        self.get(
            &format!("/movie/{id}"),
            &[("append_to_response", "credits,videos".to_string())],
        )
    }

    fn discover_by_genre(&self, genre: GenreId, page: u32) -> Result<MoviePage> {
        self.get(
            "/discover/movie",
            &[("with_genres", genre.to_string()), ("page", page.to_string())],
        )
    }

    fn genres(&self) -> Result<GenreList> {
        self.get("/genre/movie/list", &[])
    }
}
