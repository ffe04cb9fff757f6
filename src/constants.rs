//! Application-wide constants and default configuration values

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Seconds to sleep between fetching new submissions
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 60;

/// Shortest pause between fetch cycles
pub const MIN_REFRESH_INTERVAL_SECONDS: u64 = 1;

/// Number of newest submissions to examine per cycle
pub const DEFAULT_SUBMISSION_LIMIT: u32 = 50;

/// Reddit caps listing pages at 100 items
pub const MAX_SUBMISSION_LIMIT: u32 = 100;

/// Pause after each posted poll so the forum does not rate limit the account
pub const DEFAULT_POST_DELAY_SECONDS: u64 = 5;

/// Default subreddit to watch
pub const DEFAULT_SUBREDDIT: &str = "rapbattles";

/// Flair substring that marks a battle post. Matching is case-sensitive.
pub const DEFAULT_BATTLE_FLAIR: &str = "BATTLE";

/// Poll creation endpoint
pub const DEFAULT_POLL_API_URL: &str = "https://strawpoll.me/api/v2/polls";

/// Base of the public voting URL, the poll id is appended to it
pub const DEFAULT_POLL_BASE_URL: &str = "http://www.strawpoll.me";

/// Default database file name inside the config directory
pub const DATABASE_FILE_NAME: &str = "battle_poll_bot.db";

/// Default log file name
pub const LOG_FILE_NAME: &str = "battle_poll_bot.log";

/// Environment variable prefix for config overrides
pub const ENV_PREFIX: &str = "BATTLE_BOT_";

/// Reddit endpoints
pub mod reddit {
    /// OAuth2 token endpoint (password grant)
    pub const ACCESS_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

    /// Base for authenticated API calls
    pub const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";

    /// Refresh the bearer token this many seconds before Reddit expires it
    pub const TOKEN_EXPIRY_MARGIN_SECONDS: u64 = 60;

    /// Fullname prefix for link (submission) things
    pub const LINK_PREFIX: &str = "t3_";
}

/// Retry settings for idempotent GET requests
pub mod retry {
    /// Retries after the first attempt
    pub const MAX_RETRIES: u32 = 3;

    /// Initial backoff, doubled after every retry
    pub const INITIAL_BACKOFF_MS: u64 = 250;
}

/// Body posted under each battle thread.
pub const REPLY_TEMPLATE: &str = "Who won?!!

[Submit your vote here]({poll_url})

I'm a robot! Beep boop!";

/// Builds the user agent Reddit requires for API clients.
pub fn user_agent(subreddit: &str) -> String {
    format!(
        "{}/{} (/r/{subreddit})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Builds the public voting URL for a poll.
pub fn poll_url(poll_base_url: &str, poll_id: &str) -> String {
    format!("{}/{poll_id}", poll_base_url.trim_end_matches('/'))
}

/// Renders the reply posted under a battle thread.
pub fn format_reply(poll_base_url: &str, poll_id: &str) -> String {
    REPLY_TEMPLATE.replace("{poll_url}", &poll_url(poll_base_url, poll_id))
}
