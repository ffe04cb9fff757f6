use reqwest::Client;
use tracing::{debug, instrument};

use super::PollCreator;
use super::fetch_utils::post_json;
use super::models::{NewPoll, PollCreated};
use crate::error::AppError;

/// Strawpoll v2 poll creation.
pub struct StrawpollClient {
    http: Client,
    api_url: String,
}

impl StrawpollClient {
    pub fn new(http: Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }
}

impl PollCreator for StrawpollClient {
    #[instrument(skip(self))]
    async fn create_poll(
        &self,
        title: &str,
        option_a: &str,
        option_b: &str,
    ) -> Result<String, AppError> {
        let body = NewPoll {
            title,
            options: [option_a, option_b],
        };
        let request = self.http.post(&self.api_url).json(&body);
        let created: PollCreated = post_json(request, &self.api_url).await?;
        let poll_id = created.id.to_string();
        debug!("Created poll {poll_id}");
        Ok(poll_id)
    }
}
