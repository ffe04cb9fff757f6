use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Battle poll bot
///
/// Watches a subreddit for posts flaired as battles, reads the two battlers
/// from the title, creates a poll and replies to the post with a voting link.
/// Every post is answered at most once; answered posts are kept in a local
/// SQLite database.
///
/// Posts that fall out of the newest-posts window before they could be
/// parsed are never revisited.
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Run a single fetch cycle and exit instead of polling forever.
    #[arg(short, long)]
    pub once: bool,

    /// Use this config file instead of the default location.
    #[arg(long = "config", short = 'C', value_name = "PATH", help_heading = "Configuration")]
    pub config: Option<String>,

    /// List current configuration settings (secrets masked) and exit.
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Override the number of seconds to sleep between fetch cycles.
    #[arg(long = "refresh-interval", value_name = "SECONDS", help_heading = "Configuration")]
    pub refresh_interval: Option<u64>,

    /// Override the number of newest posts examined per cycle (1-100).
    #[arg(long = "limit", short = 'n', help_heading = "Configuration")]
    pub limit: Option<u32>,

    /// Parse a single title, print the battlers and exit. Needs no config or network.
    #[arg(long = "parse", value_name = "TITLE", help_heading = "Tools")]
    pub parse: Option<String>,

    /// Log at debug level.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["battle_poll_bot"]).unwrap();
        assert!(!args.once);
        assert!(args.config.is_none());
        assert!(args.parse.is_none());
    }

    #[test]
    fn test_overrides_parsed() {
        let args = Args::try_parse_from([
            "battle_poll_bot",
            "--once",
            "--config",
            "/etc/bot.toml",
            "--refresh-interval",
            "120",
            "-n",
            "25",
        ])
        .unwrap();
        assert!(args.once);
        assert_eq!(args.config.as_deref(), Some("/etc/bot.toml"));
        assert_eq!(args.refresh_interval, Some(120));
        assert_eq!(args.limit, Some(25));
    }

    #[test]
    fn test_parse_title_argument() {
        let args =
            Args::try_parse_from(["battle_poll_bot", "--parse", "Rone vs Illmaculate"]).unwrap();
        assert_eq!(args.parse.as_deref(), Some("Rone vs Illmaculate"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
