//! Polling loop: find battle posts, create a poll, reply once per post

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ForumClient, PollCreator, Post};
use crate::config::Config;
use crate::constants::{MIN_REFRESH_INTERVAL_SECONDS, format_reply};
use crate::error::AppError;
use crate::store::{DedupStore, PollRecord};
use crate::title_parser::{self, NotParseable};

/// Settings the loop needs, taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub battle_flair: String,
    pub submission_limit: u32,
    pub refresh_interval: Duration,
    pub post_delay: Duration,
    pub poll_base_url: String,
}

impl BotSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            battle_flair: config.battle_flair.clone(),
            submission_limit: config.submission_limit,
            refresh_interval: Duration::from_secs(config.refresh_interval_seconds),
            post_delay: Duration::from_secs(config.post_delay_seconds),
            poll_base_url: config.poll_base_url.clone(),
        }
    }

    /// Pause between cycles, never shorter than one second.
    pub fn cycle_pause(&self) -> Duration {
        self.refresh_interval
            .max(Duration::from_secs(MIN_REFRESH_INTERVAL_SECONDS))
    }
}

/// What happened to a single post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    NotBattle,
    AlreadyProcessed,
    Unparseable(NotParseable),
    PollPosted { poll_id: String },
}

/// Counts for one fetch cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub fetched: usize,
    pub posted: usize,
    pub already_processed: usize,
    pub unparseable: usize,
    pub not_battle: usize,
}

impl CycleSummary {
    fn record(&mut self, outcome: &PostOutcome) {
        match outcome {
            PostOutcome::NotBattle => self.not_battle += 1,
            PostOutcome::AlreadyProcessed => self.already_processed += 1,
            PostOutcome::Unparseable(_) => self.unparseable += 1,
            PostOutcome::PollPosted { .. } => self.posted += 1,
        }
    }
}

pub struct Bot<F, P, S> {
    forum: F,
    polls: P,
    store: S,
    settings: BotSettings,
}

impl<F, P, S> Bot<F, P, S>
where
    F: ForumClient,
    P: PollCreator,
    S: DedupStore,
{
    pub fn new(forum: F, polls: P, store: S, settings: BotSettings) -> Self {
        Self {
            forum,
            polls,
            store,
            settings,
        }
    }

    pub fn forum(&self) -> &F {
        &self.forum
    }

    pub fn polls(&self) -> &P {
        &self.polls
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles one post.
    ///
    /// The store is written only after the poll was created and the reply
    /// posted, so a failure in between leaves the post eligible on the next
    /// cycle. Such failures are logged with the poll id before being returned.
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    pub async fn process_post(&mut self, post: &Post) -> Result<PostOutcome, AppError> {
        if !post.is_battle(&self.settings.battle_flair) {
            debug!("Skipping non-battle post \"{}\"", post.title);
            return Ok(PostOutcome::NotBattle);
        }

        if self.store.exists(&post.id)? {
            info!("Poll already created for \"{}\"", post.title);
            return Ok(PostOutcome::AlreadyProcessed);
        }

        let matchup = match title_parser::parse(&post.title) {
            Ok(matchup) => matchup,
            Err(reason) => {
                warn!("Could not parse battlers from \"{}\": {reason}", post.title);
                return Ok(PostOutcome::Unparseable(reason));
            }
        };
        info!("Parsed out \"{}\" vs \"{}\"", matchup.left, matchup.right);

        info!("Creating poll for \"{}\"", post.title);
        let poll_id = self
            .polls
            .create_poll(&post.title, &matchup.left, &matchup.right)
            .await?;

        info!("Posting poll (ID: {poll_id}) to submission");
        let reply = format_reply(&self.settings.poll_base_url, &poll_id);
        if let Err(e) = self.forum.reply(post, &reply).await {
            error!(
                "Poll {poll_id} was created but replying to post {} failed: {e}",
                post.id
            );
            return Err(e);
        }

        let record = PollRecord {
            post_id: post.id.clone(),
            title: post.title.clone(),
            poll_id: poll_id.clone(),
        };
        if let Err(e) = self.store.insert(&record) {
            error!(
                "Poll {poll_id} was posted to {} but could not be recorded: {e}",
                post.id
            );
            return Err(e);
        }

        if !self.settings.post_delay.is_zero() {
            tokio::time::sleep(self.settings.post_delay).await;
        }

        Ok(PostOutcome::PollPosted { poll_id })
    }

    /// Fetches the newest posts and processes them in order.
    pub async fn run_cycle(&mut self) -> Result<CycleSummary, AppError> {
        info!("Fetching new submissions");
        let posts = self
            .forum
            .fetch_new_posts(self.settings.submission_limit)
            .await?;

        let mut summary = CycleSummary {
            fetched: posts.len(),
            ..CycleSummary::default()
        };
        for post in &posts {
            let outcome = self.process_post(post).await?;
            summary.record(&outcome);
        }

        info!(
            "Cycle done: {} fetched, {} polls posted, {} already answered, {} unparseable, {} not battles",
            summary.fetched,
            summary.posted,
            summary.already_processed,
            summary.unparseable,
            summary.not_battle
        );
        Ok(summary)
    }

    /// Runs cycles until `shutdown` turns true. A cycle in progress is always
    /// finished first. Returns the number of cycles run.
    pub async fn run_until(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<u64, AppError> {
        let mut cycles = 0u64;
        loop {
            self.run_cycle().await?;
            cycles += 1;

            if *shutdown.borrow() {
                break;
            }

            let pause = self.settings.cycle_pause();
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    // A dropped sender cannot signal shutdown any more.
                    if changed.is_err() {
                        tokio::time::sleep(pause).await;
                    }
                }
            }

            if *shutdown.borrow() {
                break;
            }
        }
        info!("Stopped after {cycles} cycles");
        Ok(cycles)
    }

    /// Runs until Ctrl-C.
    pub async fn run(&mut self) -> Result<(), AppError> {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current cycle");
                let _ = tx.send(true);
            }
        });
        self.run_until(rx).await.map(|_| ())
    }
}
