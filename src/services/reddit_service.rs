use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fmt;

const AUTH_URL: &str = "https://www.reddit.com";
const API_URL: &str = "https://oauth.reddit.com";
const SUBREDDIT: &str = "travel";

#[derive(Debug)]
pub enum RedditError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    AuthError(String),
    ResponseError(String),
}

impl fmt::Display for RedditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedditError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            RedditError::HttpError(err) => write!(f, "HTTP error: {}", err),
            RedditError::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            RedditError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for RedditError {}

impl From<reqwest::Error> for RedditError {
    fn from(err: reqwest::Error) -> Self {
        RedditError::HttpError(err)
    }
}

/// A forum searchable for posts about a location.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Up to `limit` posts matching `keyword`, each as `title + " " + body`.
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<String>, RedditError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(default)]
    selftext: String,
}

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
    pub subreddit: String,
}

impl RedditConfig {
    pub fn from_env() -> Result<Self, RedditError> {
        let client_id = env::var("REDDIT_CLIENT_ID")
            .map_err(|_| RedditError::EnvironmentError("REDDIT_CLIENT_ID not set".to_string()))?;
        let client_secret = env::var("REDDIT_CLIENT_SECRET").map_err(|_| {
            RedditError::EnvironmentError("REDDIT_CLIENT_SECRET not set".to_string())
        })?;
        let user_agent = env::var("REDDIT_USER_AGENT")
            .map_err(|_| RedditError::EnvironmentError("REDDIT_USER_AGENT not set".to_string()))?;

        Ok(Self {
            client_id,
            client_secret,
            user_agent,
            auth_url: AUTH_URL.to_string(),
            api_url: API_URL.to_string(),
            subreddit: SUBREDDIT.to_string(),
        })
    }
}

/// Application-only OAuth client for Reddit's search listing.
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    config: RedditConfig,
}

impl RedditClient {
    pub fn new() -> Result<Self, RedditError> {
        Ok(Self::with_config(RedditConfig::from_env()?))
    }

    pub fn with_config(config: RedditConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get_access_token(&self) -> Result<String, RedditError> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.config.auth_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header("User-Agent", &self.config.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RedditError::AuthError(format!(
                "Token request failed with status {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RedditError::AuthError(format!("Failed to parse token: {}", e)))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<String>, RedditError> {
        let access_token = self.get_access_token().await?;
        let limit = limit.to_string();

        log::info!("Searching r/{} for '{}'", self.config.subreddit, keyword);

        let response = self
            .client
            .get(format!(
                "{}/r/{}/search",
                self.config.api_url, self.config.subreddit
            ))
            .bearer_auth(access_token)
            .header("User-Agent", &self.config.user_agent)
            .query(&[
                ("q", keyword),
                ("restrict_sr", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RedditError::ResponseError(format!(
                "Search request failed with status {}: {}",
                status, error_text
            )));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| RedditError::ResponseError(format!("Failed to parse listing: {}", e)))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| format!("{} {}", child.data.title, child.data.selftext))
            .collect())
    }
}
