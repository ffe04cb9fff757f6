//! Battle poll bot library
//!
//! Watches a subreddit for battle posts, parses the two battlers out of each
//! title and replies with a link to a poll asking who won.
//!
//! # Examples
//!
//! ```rust
//! use battle_poll_bot::title_parser::{parse, NotParseable};
//!
//! let matchup = parse("Eminem vs Machine Gun Kelly").unwrap();
//! assert_eq!(matchup.left, "Eminem");
//! assert_eq!(matchup.right, "Machine Gun Kelly");
//!
//! assert_eq!(parse("No separator here"), Err(NotParseable::NoSeparator));
//! ```

pub mod api;
pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod store;
pub mod testing_utils;
pub mod title_parser;

// Re-export commonly used types for convenience
pub use bot::{Bot, BotSettings, CycleSummary, PostOutcome};
pub use config::Config;
pub use error::AppError;
pub use store::{DedupStore, PollRecord, SqliteStore};
pub use title_parser::{Matchup, NotParseable, parse};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
