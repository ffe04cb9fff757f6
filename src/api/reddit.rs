//! Reddit API client using the OAuth2 password grant of a "script" app

use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use super::ForumClient;
use super::fetch_utils::{get_json, post_json};
use super::models::{AccessTokenResponse, CommentResponse, Listing, Post};
use crate::config::Config;
use crate::constants::reddit::{
    ACCESS_TOKEN_URL, LINK_PREFIX, OAUTH_BASE_URL, TOKEN_EXPIRY_MARGIN_SECONDS,
};
use crate::error::AppError;

/// Reddit script app credentials.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Takes the credentials out of a validated config.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let field = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| AppError::config_error(format!("{name} is not set")))
        };
        Ok(Self {
            client_id: field(&config.client_id, "client_id")?,
            client_secret: field(&config.client_secret, "client_secret")?,
            username: field(&config.username, "username")?,
            password: field(&config.password, "password")?,
        })
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn from_response(response: AccessTokenResponse, now: Instant) -> Result<Self, AppError> {
        if let Some(error) = response.error {
            return Err(AppError::auth_failed(error));
        }
        let value = response
            .access_token
            .ok_or_else(|| AppError::auth_failed("token response has no access_token"))?;
        let lifetime = response
            .expires_in
            .unwrap_or(0)
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECONDS);
        Ok(Self {
            value,
            expires_at: now + Duration::from_secs(lifetime),
        })
    }

    fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Where the token and OAuth API requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditEndpoints {
    pub token_url: String,
    pub oauth_base_url: String,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            token_url: ACCESS_TOKEN_URL.to_string(),
            oauth_base_url: OAUTH_BASE_URL.to_string(),
        }
    }
}

/// Authenticated client for one subreddit.
pub struct RedditClient {
    http: Client,
    credentials: Credentials,
    subreddit: String,
    endpoints: RedditEndpoints,
    token: Option<AccessToken>,
}

impl RedditClient {
    pub fn new(http: Client, credentials: Credentials, subreddit: impl Into<String>) -> Self {
        Self {
            http,
            credentials,
            subreddit: subreddit.into(),
            endpoints: RedditEndpoints::default(),
            token: None,
        }
    }

    /// Sends requests to `endpoints` instead of reddit.com.
    pub fn with_endpoints(mut self, endpoints: RedditEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Returns a bearer token, requesting a new one when none is cached or it expired.
    async fn bearer(&mut self) -> Result<String, AppError> {
        if let Some(token) = &self.token
            && token.is_valid_at(Instant::now())
        {
            return Ok(token.value.clone());
        }

        info!("Requesting Reddit access token for u/{}", self.credentials.username);
        let request = self
            .http
            .post(&self.endpoints.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ]);
        let response: AccessTokenResponse = post_json(request, &self.endpoints.token_url).await?;
        let token = AccessToken::from_response(response, Instant::now())?;
        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }
}

impl ForumClient for RedditClient {
    #[instrument(skip(self))]
    async fn fetch_new_posts(&mut self, limit: u32) -> Result<Vec<Post>, AppError> {
        let token = self.bearer().await?;
        let url = new_posts_url(&self.endpoints.oauth_base_url, &self.subreddit, limit);
        let request = self.http.get(&url).bearer_auth(token);
        let listing: Listing = get_json(request, &url).await?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();
        debug!("Fetched {} posts from /r/{}", posts.len(), self.subreddit);
        Ok(posts)
    }

    #[instrument(skip(self, body), fields(post_id = %post.id))]
    async fn reply(&mut self, post: &Post, body: &str) -> Result<(), AppError> {
        let token = self.bearer().await?;
        let url = format!("{}/api/comment", self.endpoints.oauth_base_url);
        let thing_id = format!("{LINK_PREFIX}{}", post.id);
        let request = self.http.post(&url).bearer_auth(token).form(&[
            ("api_type", "json"),
            ("thing_id", thing_id.as_str()),
            ("text", body),
        ]);
        let response: CommentResponse = post_json(request, &url).await?;

        match response.json.error_message() {
            Some(message) => Err(AppError::reply_rejected(&post.id, message)),
            None => Ok(()),
        }
    }
}

fn new_posts_url(base_url: &str, subreddit: &str, limit: u32) -> String {
    format!("{base_url}/r/{subreddit}/new?limit={limit}&raw_json=1")
}
