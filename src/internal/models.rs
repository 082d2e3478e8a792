use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Monotonically increasing identifier attached to every asynchronous request.
///
/// A response is only applied when its generation matches the one the owning
/// controller is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Lifecycle of the single summary request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub target_url: String,
    pub status: RequestStatus,
    pub generation: Generation,
}

/// A discussion comment. The server sends comments as bare JSON strings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Comment {
    pub content: String,
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Comments shown for one article while the comment modal is in use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentSession {
    pub article_id: String,
    pub comments: Vec<Comment>,
}

impl CommentSession {
    pub fn new(article_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            comments: Vec::new(),
        }
    }
}

/// Body of `POST /comments`.
#[derive(Debug, Serialize)]
pub struct NewComment<'a> {
    pub content: &'a str,
    pub article_id: &'a str,
}

/// Body of a successful `POST /summarize`.
#[derive(Debug, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Body the server sends along with a failed `POST /summarize`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// One article row of a section page, with whichever triggers it carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleEntry {
    pub title: String,
    pub link: Option<String>,
    pub summary_url: Option<String>,
    pub article_id: Option<String>,
}

/// Document model of a loaded site page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub nav_links: Vec<Link>,
    pub sidebar_links: Vec<Link>,
    pub articles: Vec<ArticleEntry>,
    pub has_loading_indicator: bool,
}
