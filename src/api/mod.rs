//! External collaborators: the forum the bot watches and the poll service

pub mod http_client;
pub mod models;
pub mod reddit;
pub mod strawpoll;

mod fetch_utils;

pub use http_client::create_http_client_with_timeout;
pub use models::Post;
pub use reddit::{Credentials, RedditClient, RedditEndpoints};
pub use strawpoll::StrawpollClient;

use crate::error::AppError;

/// Source of new posts and sink for replies.
#[allow(async_fn_in_trait)]
pub trait ForumClient {
    /// Fetches up to `limit` of the newest posts, newest first.
    async fn fetch_new_posts(&mut self, limit: u32) -> Result<Vec<Post>, AppError>;

    /// Posts `body` as a top-level reply to `post`.
    async fn reply(&mut self, post: &Post, body: &str) -> Result<(), AppError>;
}

/// Creates two-option polls and returns their opaque ids.
#[allow(async_fn_in_trait)]
pub trait PollCreator {
    async fn create_poll(
        &self,
        title: &str,
        option_a: &str,
        option_b: &str,
    ) -> Result<String, AppError>;
}
