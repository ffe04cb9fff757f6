//! Battler name extraction from free-form post titles
//!
//! Battle posts are titled by hand, so there is no fixed format. A typical
//! title looks like `[BATTLE] Tsu Surf - Daylyt vs. Charlie Clips | KOTD`.
//! The parser finds a "versus" separator, then trims flair tags, league
//! names and trailing event details from both sides using ordered token
//! lists where the first token found wins.

use thiserror::Error;

/// Versus separators in priority order, matched against the lowercased title.
pub const VS_SEPARATORS: &[&str] = &[" vs ", " vs. ", " v ", " v. "];

/// Tokens that mark the start of the left battler name.
pub const LEFT_BOUNDARIES: &[&str] = &["- ", ": ", ", ", "| ", "] "];

/// Tokens that mark the end of the right battler name.
pub const RIGHT_BOUNDARIES: &[&str] = &[" -", "- ", " |", " :", " ["];

/// Two battler names parsed from a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    pub left: String,
    pub right: String,
}

/// Reason a title could not be split into two battlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotParseable {
    #[error("title has no versus separator")]
    NoSeparator,
    #[error("left battler name is empty")]
    EmptyLeftName,
    #[error("right battler name is empty")]
    EmptyRightName,
}

/// Location of the versus separator inside a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Split {
    index: usize,
    len: usize,
}

/// Parses a post title into two battler names.
///
/// # Arguments
/// * `title` - Raw post title as written by the submitter
///
/// # Returns
/// * `Ok(Matchup)` - Both names found and non-empty
/// * `Err(NotParseable)` - No separator, or one side trimmed to nothing
///
/// # Examples
/// ```
/// use battle_poll_bot::title_parser::parse;
///
/// let matchup = parse("[BATTLE] Tsu Surf - Daylyt vs. Charlie Clips").unwrap();
/// assert_eq!(matchup.left, "Daylyt");
/// assert_eq!(matchup.right, "Charlie Clips");
/// ```
pub fn parse(title: &str) -> Result<Matchup, NotParseable> {
    let split = find_separator(title).ok_or(NotParseable::NoSeparator)?;

    let left = left_name(title, split.index);
    if left.is_empty() {
        return Err(NotParseable::EmptyLeftName);
    }

    let right = right_name(title, split.index + split.len);
    if right.is_empty() {
        return Err(NotParseable::EmptyRightName);
    }

    Ok(Matchup {
        left: left.to_string(),
        right: right.to_string(),
    })
}

/// Finds the first separator in priority order, not the leftmost in the title.
///
/// ASCII lowercasing keeps byte offsets identical to the original title.
fn find_separator(title: &str) -> Option<Split> {
    let lowered = title.to_ascii_lowercase();
    VS_SEPARATORS.iter().find_map(|separator| {
        lowered.find(separator).map(|index| Split {
            index,
            len: separator.len(),
        })
    })
}

fn left_name(title: &str, split_index: usize) -> &str {
    let prefix = &title[..split_index];

    // Boundary tokens start with a one byte punctuation mark.
    let start = LEFT_BOUNDARIES
        .iter()
        .find_map(|token| prefix.find(token))
        .map_or(0, |position| position + 1);

    let mut name = prefix[start..].trim();
    if let Some((_, rest)) = name.split_once("] ") {
        name = rest.trim();
    }
    if let Some((_, rest)) = name.split_once("- ") {
        name = rest.trim();
    }
    name
}

fn right_name(title: &str, start: usize) -> &str {
    let rest = &title[start..];
    let end = RIGHT_BOUNDARIES
        .iter()
        .find_map(|token| rest.find(token))
        .unwrap_or(rest.len());
    rest[..end].trim()
}
