//! State machine behind the single summary modal.
//!
//! Every trigger starts a new generation and cancels the previous request.
//! A settled response is applied only while the modal is open and only if it
//! belongs to the generation currently pending; anything else is discarded.

use tokio_util::sync::CancellationToken;

use crate::internal::models::{Generation, RequestStatus, SummaryRequest};

pub const PROCESSING_TEXT: &str = "Analyzing article, it may take a few seconds...";

pub const DISCLAIMER_NOTE: &str =
    "Note: The contents might be distorted due to issues that lurk in the AI model.";

pub const FAILURE_TEXT: &str = "Oops, something went wrong : (\n\
For New York Times and Economist :  you need to pay for the content.\n\
For POLITICO, its policy do not allow web scrape.\n\
**Since the HTML structure varies, some unexpected errors may happen.**";

/// What the modal's content pane currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummaryContent {
    #[default]
    Empty,
    Processing,
    Summary {
        text: String,
        note: &'static str,
    },
    Error(&'static str),
}

impl SummaryContent {
    pub fn is_processing(&self) -> bool {
        matches!(self, SummaryContent::Processing)
    }
}

/// Handed to the caller so it can run the request off the UI state.
#[derive(Debug, Clone)]
pub struct SummaryTicket {
    pub generation: Generation,
    pub target_url: String,
    pub cancel: CancellationToken,
}

/// Why a settled response was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discarded {
    Closed,
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Applied(RequestStatus),
    Discarded(Discarded),
}

#[derive(Debug, Default)]
pub struct SummaryController {
    visible: bool,
    content: SummaryContent,
    request: Option<SummaryRequest>,
    last_generation: Generation,
    cancel: Option<CancellationToken>,
}

impl SummaryController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the modal in its processing state and start a new request.
    ///
    /// Returns `None` for an empty URL, leaving the modal untouched.
    pub fn on_trigger_clicked(&mut self, target_url: &str) -> Option<SummaryTicket> {
        if target_url.trim().is_empty() {
            tracing::debug!("summary trigger without a url ignored");
            return None;
        }

        self.cancel_pending();
        self.last_generation = self.last_generation.next();
        let generation = self.last_generation;

        self.visible = true;
        self.content = SummaryContent::Processing;
        self.request = Some(SummaryRequest {
            target_url: target_url.to_string(),
            status: RequestStatus::Pending,
            generation,
        });

        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        tracing::debug!(?generation, url = target_url, "summary.request");

        Some(SummaryTicket {
            generation,
            target_url: target_url.to_string(),
            cancel,
        })
    }

    pub fn on_close_requested(&mut self) {
        self.visible = false;
        self.cancel_pending();
        self.request = None;
    }

    pub fn on_backdrop_clicked(&mut self) {
        self.on_close_requested();
    }

    /// Apply the outcome of the request identified by `generation`.
    pub fn settle(&mut self, generation: Generation, result: Result<String, String>) -> SettleOutcome {
        if !self.visible {
            tracing::debug!(?generation, "summary response after close discarded");
            return SettleOutcome::Discarded(Discarded::Closed);
        }

        let Some(request) = self.request.as_mut() else {
            return SettleOutcome::Discarded(Discarded::Closed);
        };
        if request.generation != generation || request.status != RequestStatus::Pending {
            tracing::debug!(
                ?generation,
                current = ?request.generation,
                "stale summary response discarded"
            );
            return SettleOutcome::Discarded(Discarded::Superseded);
        }

        let status = match result {
            Ok(text) => {
                self.content = SummaryContent::Summary {
                    text,
                    note: DISCLAIMER_NOTE,
                };
                RequestStatus::Succeeded
            }
            Err(e) => {
                tracing::warn!(url = %request.target_url, "summary failed: {}", e);
                self.content = SummaryContent::Error(FAILURE_TEXT);
                RequestStatus::Failed
            }
        };
        request.status = status;
        self.cancel = None;
        SettleOutcome::Applied(status)
    }

    /// Forget everything tied to the current document. Generations keep counting
    /// so a response issued before the reset can never match a later request.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.visible = false;
        self.content = SummaryContent::Empty;
        self.request = None;
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> &SummaryContent {
        &self.content
    }

    pub fn request(&self) -> Option<&SummaryRequest> {
        self.request.as_ref()
    }

    pub fn status(&self) -> RequestStatus {
        self.request
            .as_ref()
            .map(|r| r.status)
            .unwrap_or(RequestStatus::Idle)
    }
}
