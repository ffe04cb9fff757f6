use crate::api::{Credentials, RedditClient, StrawpollClient, create_http_client_with_timeout};
use crate::bot::{Bot, BotSettings};
use crate::cli::Args;
use crate::config::Config;
use crate::constants::user_agent;
use crate::error::AppError;
use crate::store::SqliteStore;
use crate::title_parser;
use tracing::info;

/// Handles `--parse`: prints the battlers found in `title`.
pub fn handle_parse_command(title: &str) {
    println!("{}", describe_parse(title));
}

fn describe_parse(title: &str) -> String {
    match title_parser::parse(title) {
        Ok(matchup) => format!("\"{}\" vs \"{}\"", matchup.left, matchup.right),
        Err(reason) => format!("Not parseable: {reason}"),
    }
}

/// Handles `--list-config`.
pub async fn handle_list_config_command(args: &Args) -> Result<(), AppError> {
    Config::display(args.config.as_deref()).await
}

/// Applies command line overrides on top of the loaded config and revalidates.
pub fn apply_arg_overrides(config: &mut Config, args: &Args) -> Result<(), AppError> {
    if let Some(interval) = args.refresh_interval {
        config.refresh_interval_seconds = interval;
    }
    if let Some(limit) = args.limit {
        config.submission_limit = limit;
    }
    let config_path = args.config.clone().unwrap_or_else(Config::get_config_path);
    config.validate(&config_path)
}

/// Wires the Reddit client, poll service and database into a bot and runs it,
/// once with `--once`, otherwise until Ctrl-C.
pub async fn handle_run_command(args: &Args, config: Config) -> Result<(), AppError> {
    let http = create_http_client_with_timeout(
        config.http_timeout_seconds,
        &user_agent(&config.subreddit),
    )?;

    let forum = RedditClient::new(
        http.clone(),
        Credentials::from_config(&config)?,
        config.subreddit.clone(),
    );
    let polls = StrawpollClient::new(http, config.poll_api_url.clone());

    let database_path = config.database_path();
    let store = SqliteStore::open(&database_path)?;
    info!(
        "Using database {database_path} ({} posts answered so far)",
        store.count()?
    );

    info!(
        "Watching /r/{} for \"{}\" posts every {} seconds",
        config.subreddit, config.battle_flair, config.refresh_interval_seconds
    );
    let mut bot = Bot::new(forum, polls, store, BotSettings::from_config(&config));

    if args.once {
        bot.run_cycle().await.map(|_| ())
    } else {
        bot.run().await
    }
}
