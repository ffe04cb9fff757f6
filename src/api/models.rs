use serde::{Deserialize, Serialize};

/// A forum post as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub flair: Option<String>,
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>, flair: Option<&str>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            flair: flair.map(str::to_string),
        }
    }

    /// True when the flair contains `marker`. Posts without flair never match.
    pub fn is_battle(&self, marker: &str) -> bool {
        self.flair
            .as_deref()
            .is_some_and(|flair| flair.contains(marker))
    }
}

// Reddit OAuth token endpoint. Bad credentials come back as 200 with `error` set.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

/// `GET /r/{subreddit}/new` listing.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub struct ListingChild {
    pub data: LinkData,
}

#[derive(Debug, Deserialize)]
pub struct LinkData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

impl From<LinkData> for Post {
    fn from(link: LinkData) -> Self {
        Post {
            id: link.id,
            title: link.title,
            flair: link.link_flair_text,
        }
    }
}

/// `POST /api/comment` with `api_type=json`.
#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub json: CommentJson,
}

#[derive(Debug, Deserialize)]
pub struct CommentJson {
    /// Each error is an array like `["RATELIMIT", "you are doing that too much", "ratelimit"]`.
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
}

impl CommentJson {
    /// Joins the text parts of every reported error, or `None` when there are none.
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let message = self
            .errors
            .iter()
            .map(|parts| {
                parts
                    .iter()
                    .take(2)
                    .filter_map(|part| part.as_str())
                    .collect::<Vec<_>>()
                    .join(": ")
            })
            .collect::<Vec<_>>()
            .join("; ");
        Some(message)
    }
}

/// Poll creation request body.
#[derive(Debug, Serialize)]
pub struct NewPoll<'a> {
    pub title: &'a str,
    pub options: [&'a str; 2],
}

/// Poll ids are numeric on Strawpoll v2 but other services return strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PollId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for PollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollId::Number(n) => write!(f, "{n}"),
            PollId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PollCreated {
    pub id: PollId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_battle_matches_flair_substring() {
        assert!(Post::new("a", "t", Some("BATTLE")).is_battle("BATTLE"));
        assert!(Post::new("a", "t", Some("[BATTLE] KOTD")).is_battle("BATTLE"));
        assert!(!Post::new("a", "t", Some("battle")).is_battle("BATTLE"));
        assert!(!Post::new("a", "t", Some("DISCUSSION")).is_battle("BATTLE"));
        assert!(!Post::new("a", "t", None).is_battle("BATTLE"));
    }

    #[test]
    fn test_listing_deserialization() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_xyz",
                "children": [
                    {"kind": "t3", "data": {"id": "abc", "name": "t3_abc", "title": "A vs B", "link_flair_text": "BATTLE", "score": 10}},
                    {"kind": "t3", "data": {"id": "def", "name": "t3_def", "title": "Discussion", "link_flair_text": null}}
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0], Post::new("abc", "A vs B", Some("BATTLE")));
        assert_eq!(posts[1].flair, None);
    }

    #[test]
    fn test_comment_errors_joined() {
        let json = r#"{"json": {"errors": [["RATELIMIT", "you are doing that too much", "ratelimit"], ["THREAD_LOCKED", "comments are locked", null]]}}"#;
        let response: CommentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.json.error_message().as_deref(),
            Some("RATELIMIT: you are doing that too much; THREAD_LOCKED: comments are locked")
        );
    }

    #[test]
    fn test_comment_without_errors() {
        let json = r#"{"json": {"errors": [], "data": {"things": []}}}"#;
        let response: CommentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.json.error_message(), None);
    }

    #[test]
    fn test_poll_id_number_or_string() {
        let numeric: PollCreated = serde_json::from_str(r#"{"id": 13461548}"#).unwrap();
        assert_eq!(numeric.id.to_string(), "13461548");
        let text: PollCreated = serde_json::from_str(r#"{"id": "e6Z2AaWa"}"#).unwrap();
        assert_eq!(text.id.to_string(), "e6Z2AaWa");
    }

    #[test]
    fn test_new_poll_body() {
        let body = NewPoll {
            title: "[BATTLE] Rone vs Illmaculate",
            options: ["Rone", "Illmaculate"],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "title": "[BATTLE] Rone vs Illmaculate",
                "options": ["Rone", "Illmaculate"]
            })
        );
    }
}
