//! GitHub REST API client with connection pooling and rate limiting
//!
//! Provides the event source for star history charts: repository metadata,
//! per-user repository listings, and the paginated stargazer timeline
//! (fetched with the `star+json` media type so each entry carries its
//! `starred_at` timestamp). Includes client-side rate limiting and retry
//! with exponential backoff.

use crate::error::{Result, StarGraphError};
use crate::types::RepoTarget;
use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, error, info, instrument, trace, warn};

/// Media type for plain REST responses
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
/// Media type that adds `starred_at` to stargazer listings
const ACCEPT_STAR: &str = "application/vnd.github.v3.star+json";
/// GitHub serves at most 400 stargazer pages (40 000 stars); requests past
/// that return 422, so pagination stops there with a truncation warning
const MAX_STARGAZER_PAGES: u32 = 400;

/// Configuration for the GitHub API client
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Base URL of the GitHub API (default: "https://api.github.com")
    pub api_base: String,
    /// Personal access token; empty sends unauthenticated requests
    pub token: String,
    /// User-Agent header value, required by the GitHub API
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 5)
    pub rate_limit_per_sec: u32,
    /// Maximum number of retry attempts (default: 3)
    pub max_retries: usize,
    /// Items per page for paginated endpoints (GitHub caps this at 100)
    pub page_size: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: String::new(),
            user_agent: "stargraph".to_string(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 5,
            max_retries: 3,
            page_size: 100,
        }
    }
}

impl GithubConfig {
    /// Create a new configuration with the given access token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Set the API base URL (useful for GitHub Enterprise installs)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the page size for paginated endpoints
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// GitHub API client with connection pooling and rate limiting
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl GithubClient {
    /// Create a new GitHub client with the given configuration
    pub fn new(config: GithubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| StarGraphError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| StarGraphError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a new client with default configuration and the given token
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        Self::new(GithubConfig::new(token))
    }

    /// Build a request URL for an API path
    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Query parameters for one page of a paginated listing
    fn page_params(&self, page: u32) -> [(&'static str, String); 2] {
        [
            ("per_page", self.config.page_size.to_string()),
            ("page", page.to_string()),
        ]
    }

    /// Make a request with rate limiting and retry; 4xx responses are
    /// surfaced immediately, 5xx and transport errors are retried with
    /// exponential backoff
    #[instrument(skip(self, params), fields(path = %path))]
    async fn make_request(
        &self,
        path: &str,
        accept: &'static str,
        params: &[(&str, String)],
    ) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let url = self.build_url(path);
        debug!("Making request to: {}", url);

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let response = RetryIf::spawn(
            retry_strategy,
            || async {
                let mut request = self
                    .client
                    .get(&url)
                    .header(header::ACCEPT, accept)
                    .header(header::USER_AGENT, &self.config.user_agent)
                    .query(params);
                if !self.config.token.is_empty() {
                    request = request.bearer_auth(&self.config.token);
                }

                match request.send().await {
                    Ok(response) => {
                        if response.status().is_success() {
                            debug!("Request successful: {}", response.status());
                            Ok(response)
                        } else if response.status().is_client_error() {
                            error!("Client error: {}", response.status());
                            Err(StarGraphError::github_with_status(
                                format!("API returned client error: {}", response.status()),
                                response.status().as_u16(),
                            ))
                        } else {
                            warn!("Server error, will retry: {}", response.status());
                            Err(StarGraphError::github_with_status(
                                format!("API returned server error: {}", response.status()),
                                response.status().as_u16(),
                            ))
                        }
                    }
                    Err(e) if e.is_timeout() => {
                        warn!("Request timeout, will retry: {}", e);
                        Err(StarGraphError::network_with_source("Request timeout", e))
                    }
                    Err(e) if e.is_connect() => {
                        warn!("Connection error, will retry: {}", e);
                        Err(StarGraphError::network_with_source("Connection error", e))
                    }
                    Err(e) => {
                        error!("Request failed: {}", e);
                        Err(StarGraphError::network_with_source("Request failed", e))
                    }
                }
            },
            is_retryable,
        )
        .await?;

        Ok(response)
    }

    /// Parse a JSON response into the specified type
    async fn parse_response<T>(&self, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let text = response
            .text()
            .await
            .map_err(|e| StarGraphError::network_with_source("Failed to read response body", e))?;

        trace!("Response body: {} bytes", text.len());

        serde_json::from_str(&text).map_err(StarGraphError::from)
    }

    /// Make a request and parse the JSON response
    async fn request_json<T>(
        &self,
        path: &str,
        accept: &'static str,
        params: &[(&str, String)],
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.make_request(path, accept, params).await?;
        self.parse_response(response).await
    }

    // ============================================================================
    // Public API Methods
    // ============================================================================

    /// Fetch metadata for a single repository
    ///
    /// Returns the fields the aggregation pipeline needs, most importantly
    /// `created_at` (the aggregation window origin) and `stargazers_count`.
    #[instrument(skip(self), fields(repo = %target))]
    pub async fn get_repo(&self, target: &RepoTarget) -> Result<Repo> {
        info!("Fetching repository {}", target);
        let path = format!("repos/{}/{}", target.owner, target.name);
        self.request_json(&path, ACCEPT_JSON, &[]).await
    }

    /// List all public repositories owned by a user
    ///
    /// Follows pagination until a page comes back shorter than the
    /// configured page size.
    #[instrument(skip(self))]
    pub async fn list_user_repos(&self, username: &str) -> Result<Vec<Repo>> {
        if username.trim().is_empty() {
            crate::bail!("GitHub username is empty");
        }

        info!("Fetching repositories for user {}", username);
        let path = format!("users/{}/repos", username);

        let mut repos = Vec::new();
        let mut page: u32 = 1;
        loop {
            let batch: Vec<Repo> = self
                .request_json(&path, ACCEPT_JSON, &self.page_params(page))
                .await?;
            let fetched = batch.len() as u32;
            repos.extend(batch);
            if fetched < self.config.page_size {
                break;
            }
            page += 1;
        }

        info!("Found {} repositories for {}", repos.len(), username);
        Ok(repos)
    }

    /// Fetch every stargazer timestamp for a repository
    ///
    /// Uses the `star+json` media type so each entry carries `starred_at`,
    /// and flattens all pages into a single timestamp list for aggregation.
    #[instrument(skip(self), fields(repo = %target))]
    pub async fn fetch_stargazers(&self, target: &RepoTarget) -> Result<Vec<DateTime<Utc>>> {
        info!("Fetching stargazers for {}", target);
        let path = format!("repos/{}/{}/stargazers", target.owner, target.name);

        let mut stars = Vec::new();
        let mut page: u32 = 1;
        loop {
            let batch: Vec<Stargazer> = self
                .request_json(&path, ACCEPT_STAR, &self.page_params(page))
                .await?;
            let fetched = batch.len() as u32;
            stars.extend(batch.into_iter().map(|s| s.starred_at));
            if fetched < self.config.page_size {
                break;
            }
            if page >= MAX_STARGAZER_PAGES {
                warn!(
                    "Stargazer listing for {} truncated at {} pages",
                    target, MAX_STARGAZER_PAGES
                );
                break;
            }
            page += 1;
        }

        info!("Collected {} stargazer timestamps for {}", stars.len(), target);
        Ok(stars)
    }

    /// Get metrics about the client configuration and state
    pub fn metrics(&self) -> ClientMetrics {
        ClientMetrics {
            api_base: self.config.api_base.clone(),
            authenticated: !self.config.token.is_empty(),
            timeout_secs: self.config.timeout_secs,
            rate_limit_per_sec: self.config.rate_limit_per_sec,
            max_retries: self.config.max_retries,
            page_size: self.config.page_size,
            has_rate_limit_capacity: self.rate_limiter.check().is_ok(),
        }
    }
}

/// Retry predicate: transport failures and 5xx responses are worth
/// retrying, anything else is surfaced to the caller as-is
fn is_retryable(err: &StarGraphError) -> bool {
    match err {
        StarGraphError::Github {
            status_code: Some(status),
            ..
        } => *status >= 500,
        StarGraphError::Network { .. } => true,
        _ => false,
    }
}

/// Client metrics for startup logging and debugging
#[derive(Debug, Clone, Serialize)]
pub struct ClientMetrics {
    /// API base URL being used
    pub api_base: String,
    /// Whether requests carry an Authorization header
    pub authenticated: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Rate limit requests per second
    pub rate_limit_per_sec: u32,
    /// Maximum retry attempts
    pub max_retries: usize,
    /// Page size for paginated endpoints
    pub page_size: u32,
    /// Whether we currently have rate limit capacity
    pub has_rate_limit_capacity: bool,
}

// ============================================================================
// API Response Models
// ============================================================================

/// Repository metadata returned by the GitHub API
///
/// Unknown fields in the response are ignored; only what the chart
/// pipeline consumes is modeled here.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    /// Short repository name
    pub name: String,
    /// `owner/name` form
    pub full_name: String,
    /// Creation time; lower bound of the aggregation window
    pub created_at: DateTime<Utc>,
    /// Star total as reported by GitHub
    pub stargazers_count: u64,
}

impl Repo {
    /// The repository reference for follow-up API calls
    pub fn target(&self) -> Result<RepoTarget> {
        self.full_name.parse()
    }
}

/// One stargazer entry from the `star+json` media type
#[derive(Debug, Clone, Deserialize)]
pub struct Stargazer {
    /// When the star was given
    pub starred_at: DateTime<Utc>,
}
