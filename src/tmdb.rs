use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use jiff::civil::Date;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::models::{MovieCandidate, NewMovie};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("TMDB request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("TMDB responded with {0}")]
    Status(StatusCode),
    #[error("TMDB has no movie with id {0}")]
    NotFound(i32),
    #[error("TMDB movie {id} has no {field}")]
    Incomplete { id: i32, field: &'static str },
}

pub type LookupResult<T> = Result<T, LookupError>;

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    language: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        image_base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, movie lookups will be rejected upstream");
        }

        let rps = NonZeroU32::new(rps.max(1)).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, image_base_url, language, limiter }
    }

    pub fn image_base_url(&self) -> &str {
        &self.image_base_url
    }

    /// Candidates for a free-text title. No matches is an empty list.
    pub async fn search_by_title(&self, query: &str) -> LookupResult<Vec<MovieCandidate>> {
        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("include_adult", "false"),
                ("query", query),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body: SearchResponse = resp.json().await?;
        debug!(query, results = body.results.len(), "TMDB search");

        Ok(body
            .results
            .into_iter()
            .map(|m| MovieCandidate {
                id: m.id,
                title: m.title,
                year: m.release_date.as_deref().and_then(release_year),
                poster_url: m.poster_path.map(|p| self.poster_url(&p)),
            })
            .collect())
    }

    pub async fn fetch_by_id(&self, id: i32) -> LookupResult<MovieDetails> {
        self.limiter.until_ready().await;

        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), id);
        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(id));
        }
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let details: MovieDetails = resp.json().await?;
        debug!(id, title = %details.title, "TMDB movie details");
        Ok(details)
    }

    fn poster_url(&self, path: &str) -> String {
        format!("{}{}", self.image_base_url.trim_end_matches('/'), path)
    }
}

/// Full record from `GET /movie/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct MovieDetails {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl MovieDetails {
    /// Converts to an insertable movie: the poster path becomes an absolute
    /// URL and only the year of the release date is kept.
    pub fn into_new_movie(self, image_base_url: &str) -> LookupResult<NewMovie> {
        let id = self.id;
        let year = self
            .release_date
            .as_deref()
            .and_then(release_year)
            .ok_or(LookupError::Incomplete { id, field: "release date" })?;
        let poster = self
            .poster_path
            .filter(|p| !p.trim().is_empty())
            .ok_or(LookupError::Incomplete { id, field: "poster" })?;

        Ok(NewMovie {
            id,
            title: self.title,
            year,
            description: self.overview.unwrap_or_default(),
            rating: self.vote_average,
            img_url: format!("{}{}", image_base_url.trim_end_matches('/'), poster),
        })
    }
}

fn release_year(date: &str) -> Option<i32> {
    let date: Date = date.trim().parse().ok()?;
    Some(i32::from(date.year()))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    id: i32,
    title: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}
