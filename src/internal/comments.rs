//! Comment modal: the active article, its comment list and the input form.

use crate::internal::models::{Comment, CommentSession, Generation};

pub const FETCH_FAILED_ALERT: &str = "Failed to fetch comments";
pub const POST_SUCCEEDED: &str = "Comment posted successfully !";
pub const POST_FAILED: &str = "Failed to post comment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFetchTicket {
    pub generation: Generation,
    pub article_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSubmitTicket {
    /// Document the form belonged to when it was submitted.
    pub epoch: Generation,
    /// Article session the form belonged to when it was submitted.
    pub session: Generation,
    pub article_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Rendered(usize),
    /// The caller must raise the blocking alert.
    Failed,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Posted; the list must be re-fetched with the returned ticket.
    Posted(CommentFetchTicket),
    /// Posted, but the modal has moved on to another article since. Its
    /// input and list are left alone.
    PostedElsewhere,
    Failed,
    /// The document was replaced while the post was in flight.
    Stale,
}

#[derive(Debug, Default)]
pub struct CommentController {
    visible: bool,
    active_article_id: Option<String>,
    session: Option<CommentSession>,
    input: String,
    epoch: Generation,
    session_generation: Generation,
    last_generation: Generation,
    pending_fetch: Option<Generation>,
}

impl CommentController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the modal for `article_id` and fetch its comments.
    ///
    /// Opening a different article starts an empty session so comments of the
    /// previous article are never shown under the new one.
    pub fn on_discussion_triggered(&mut self, article_id: &str) -> CommentFetchTicket {
        self.active_article_id = Some(article_id.to_string());
        if self.session.as_ref().map(|s| s.article_id.as_str()) != Some(article_id) {
            self.session = Some(CommentSession::new(article_id));
            self.session_generation = self.session_generation.next();
        }
        self.visible = true;
        self.refresh_comments(article_id)
    }

    pub fn refresh_comments(&mut self, article_id: &str) -> CommentFetchTicket {
        self.last_generation = self.last_generation.next();
        self.pending_fetch = Some(self.last_generation);
        tracing::debug!(generation = ?self.last_generation, article_id, "comments.fetch");
        CommentFetchTicket {
            generation: self.last_generation,
            article_id: article_id.to_string(),
        }
    }

    /// Replace the rendered list with the fetched comments, in server order.
    pub fn apply_fetch(
        &mut self,
        generation: Generation,
        article_id: &str,
        result: Result<Vec<Comment>, String>,
    ) -> FetchOutcome {
        if self.pending_fetch != Some(generation) {
            tracing::debug!(?generation, article_id, "stale comment list discarded");
            return FetchOutcome::Stale;
        }
        self.pending_fetch = None;

        match result {
            Ok(comments) => {
                let count = comments.len();
                self.session = Some(CommentSession {
                    article_id: article_id.to_string(),
                    comments,
                });
                FetchOutcome::Rendered(count)
            }
            Err(e) => {
                tracing::warn!(article_id, "failed to fetch comments: {}", e);
                FetchOutcome::Failed
            }
        }
    }

    /// Read the form. Submitting never leaves the modal.
    pub fn on_comment_submit(&self) -> Option<CommentSubmitTicket> {
        let article_id = self.active_article_id.clone()?;
        Some(CommentSubmitTicket {
            epoch: self.epoch,
            session: self.session_generation,
            article_id,
            content: self.input.clone(),
        })
    }

    pub fn apply_submit(
        &mut self,
        ticket: &CommentSubmitTicket,
        result: Result<(), String>,
    ) -> SubmitOutcome {
        let article_id = ticket.article_id.as_str();
        if ticket.epoch != self.epoch {
            tracing::debug!(article_id, "comment post from a previous document ignored");
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(()) if ticket.session != self.session_generation => {
                tracing::debug!(article_id, "comment posted for an article no longer shown");
                SubmitOutcome::PostedElsewhere
            }
            Ok(()) => {
                self.input.clear();
                SubmitOutcome::Posted(self.refresh_comments(article_id))
            }
            Err(e) => {
                tracing::warn!(article_id, "failed to post comment: {}", e);
                SubmitOutcome::Failed
            }
        }
    }

    pub fn on_close_requested(&mut self) {
        self.visible = false;
    }

    pub fn reset(&mut self) {
        self.epoch = self.epoch.next();
        self.visible = false;
        self.active_article_id = None;
        self.session = None;
        self.input.clear();
        self.pending_fetch = None;
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_article_id(&self) -> Option<&str> {
        self.active_article_id.as_deref()
    }

    pub fn session(&self) -> Option<&CommentSession> {
        self.session.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        self.session
            .as_ref()
            .map(|s| s.comments.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetch.is_some()
    }
}
