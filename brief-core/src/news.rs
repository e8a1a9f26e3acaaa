//! NewsAPI top headlines.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    cache::TtlCache,
    config::NEWS_API_KEY_ENV,
    error::FetchError,
    http::{build_client, fetch_json},
    model::Headline,
};

pub const NEWS_TTL: Duration = Duration::from_secs(20 * 60);

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// NewsAPI rejects page sizes above this.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug)]
pub struct NewsClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    cache: TtlCache<(String, usize), Vec<Headline>>,
}

impl NewsClient {
    pub fn new(api_key: Option<String>) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, NEWS_TTL)
    }

    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_client()?,
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            cache: TtlCache::new(ttl),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// First `limit` headlines for `country`, in the order NewsAPI ranks them.
    ///
    /// Without a credential this returns [`FetchError::MissingCredential`]
    /// before any request is made.
    #[instrument(skip(self))]
    pub async fn top_headlines(
        &self,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Headline>, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("no news credential configured");
            return Err(FetchError::MissingCredential {
                hint: format!("Set {NEWS_API_KEY_ENV} in your environment or .env file, or run `brief configure`."),
            });
        };

        let headlines = self
            .cache
            .get_or_fetch((country.to_string(), limit), || self.fetch(api_key, country, limit))
            .await?;

        if headlines.is_empty() {
            return Err(FetchError::NoData("no headlines were returned".to_string()));
        }
        Ok(headlines)
    }

    async fn fetch(
        &self,
        api_key: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Headline>, FetchError> {
        let url = format!("{}/top-headlines", self.base_url.trim_end_matches('/'));
        let request = self.http.get(url).header("X-Api-Key", api_key).query(&[
            ("country", country.to_string()),
            ("pageSize", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
        ]);

        let payload: NewsResponse = fetch_json(request, "NewsAPI").await?;

        if payload.status != "ok" {
            let reason = payload
                .message
                .unwrap_or_else(|| format!("NewsAPI reported status '{}'", payload.status));
            return Err(FetchError::Unavailable { reason });
        }

        Ok(payload.articles.into_iter().take(limit).map(Headline::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: ArticleSource,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

impl From<Article> for Headline {
    fn from(article: Article) -> Self {
        Self {
            title: article.title.unwrap_or_default(),
            description: article
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            source_name: article.source.name.unwrap_or_else(|| "Unknown".to_string()),
            published_at: article
                .published_at
                .and_then(|raw| raw.parse::<DateTime<Utc>>().ok()),
            url: article.url.unwrap_or_default(),
        }
    }
}
