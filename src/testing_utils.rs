//! Builders and in-memory collaborators for exercising the bot without a network

use std::sync::Mutex;
use std::time::Duration;

use crate::api::{ForumClient, PollCreator, Post};
use crate::bot::BotSettings;
use crate::constants::{DEFAULT_BATTLE_FLAIR, DEFAULT_POLL_BASE_URL};
use crate::error::AppError;

/// Test utilities for creating posts and settings
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// A post carrying the default battle flair
    pub fn battle_post(id: &str, title: &str) -> Post {
        Post::new(id, title, Some(DEFAULT_BATTLE_FLAIR))
    }

    /// Default settings with no delays so tests run instantly
    pub fn settings() -> BotSettings {
        BotSettings {
            battle_flair: DEFAULT_BATTLE_FLAIR.to_string(),
            submission_limit: 50,
            refresh_interval: Duration::ZERO,
            post_delay: Duration::ZERO,
            poll_base_url: DEFAULT_POLL_BASE_URL.to_string(),
        }
    }
}

/// Forum that serves a fixed list of posts and records replies.
#[derive(Debug, Default)]
pub struct FakeForum {
    posts: Vec<Post>,
    replies: Vec<(String, String)>,
    fetches: usize,
    fail_replies: bool,
}

impl FakeForum {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    /// Every reply is rejected as if the thread were locked.
    pub fn failing_replies() -> Self {
        Self {
            fail_replies: true,
            ..Self::default()
        }
    }

    /// `(post_id, body)` for every accepted reply
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches
    }
}

impl ForumClient for FakeForum {
    async fn fetch_new_posts(&mut self, limit: u32) -> Result<Vec<Post>, AppError> {
        self.fetches += 1;
        Ok(self.posts.iter().take(limit as usize).cloned().collect())
    }

    async fn reply(&mut self, post: &Post, body: &str) -> Result<(), AppError> {
        if self.fail_replies {
            return Err(AppError::reply_rejected(
                &post.id,
                "THREAD_LOCKED: comments are locked",
            ));
        }
        self.replies.push((post.id.clone(), body.to_string()));
        Ok(())
    }
}

/// Poll service that hands out sequential ids and records every request.
#[derive(Debug, Default)]
pub struct FakePolls {
    created: Mutex<Vec<(String, String, String)>>,
    fail: bool,
}

impl FakePolls {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(title, option_a, option_b)` for every created poll
    pub fn created(&self) -> Vec<(String, String, String)> {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PollCreator for FakePolls {
    async fn create_poll(
        &self,
        title: &str,
        option_a: &str,
        option_b: &str,
    ) -> Result<String, AppError> {
        if self.fail {
            return Err(AppError::api_service_unavailable(
                503,
                "Service Unavailable",
                "https://polls.invalid",
            ));
        }
        let mut created = self
            .created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        created.push((title.to_string(), option_a.to_string(), option_b.to_string()));
        Ok(format!("poll-{}", created.len()))
    }
}
