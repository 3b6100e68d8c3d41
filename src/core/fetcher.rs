use crate::domain::model::{FetchOutcome, Movie, SortMode};
use crate::domain::ports::MovieFetcher;
use crate::utils::error::{MoviesError, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3/movie";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w185";

const API_KEY_PARAM: &str = "api_key";

/// 組出 `<base>/<sort-segment>?api_key=<key>`，query 中只會有一個 api_key
pub fn build_request_url(base_url: &str, sort: SortMode, api_key: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    url.path_segments_mut()
        .map_err(|_| MoviesError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: "URL cannot be used as a base for path segments".to_string(),
        })?
        .pop_if_empty()
        .push(sort.segment());

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != API_KEY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(API_KEY_PARAM, api_key);

    Ok(url)
}

/// 解析 `{"results": [...]}`，無法解析的單筆記錄直接略過
pub fn parse_results(body: serde_json::Value) -> Result<Vec<Movie>> {
    let results = match body {
        serde_json::Value::Object(mut obj) => obj.remove("results"),
        _ => None,
    };

    let Some(serde_json::Value::Array(items)) = results else {
        return Err(MoviesError::MalformedResponseError {
            message: "response has no \"results\" array".to_string(),
        });
    };

    let total = items.len();
    let movies: Vec<Movie> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Movie>(item) {
            Ok(movie) => Some(movie),
            Err(e) => {
                tracing::warn!("Skipping movie record #{}: {}", index, e);
                None
            }
        })
        .collect();

    if movies.len() < total {
        tracing::debug!("Parsed {} of {} movie records", movies.len(), total);
    }

    Ok(movies)
}

#[derive(Debug, Clone)]
pub struct TmdbFetcher {
    base_url: String,
    client: Client,
}

impl TmdbFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub async fn fetch_movies(&self, sort: SortMode, api_key: &str) -> Result<Vec<Movie>> {
        let url = build_request_url(&self.base_url, sort, api_key)?;

        // 不要把 api_key 寫進日誌
        tracing::debug!("Making API request to: {}{}", url.origin().ascii_serialization(), url.path());
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(MoviesError::HttpStatusError {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| MoviesError::MalformedResponseError {
                    message: e.without_url().to_string(),
                })?;

        parse_results(body)
    }
}

#[async_trait]
impl MovieFetcher for TmdbFetcher {
    async fn fetch(&self, sort: SortMode, api_key: &str) -> FetchOutcome {
        match self.fetch_movies(sort, api_key).await {
            Ok(movies) => {
                tracing::info!("Fetched {} {} movies", movies.len(), sort);
                FetchOutcome::from_movies(movies)
            }
            Err(e) => {
                tracing::warn!("Fetching {} movies failed: {}", sort, e);
                FetchOutcome::NoData
            }
        }
    }
}
