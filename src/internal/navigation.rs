use tokio_util::sync::CancellationToken;

use crate::internal::models::Generation;

#[derive(Debug, Clone)]
pub struct NavigationTicket {
    pub generation: Generation,
    pub href: String,
    pub cancel: CancellationToken,
}

/// Shows the page-wide loading indicator and hands navigation to the app.
///
/// The indicator is only hidden by a document load. A navigation that fails
/// leaves it on screen.
#[derive(Debug, Default)]
pub struct NavigationInterceptor {
    indicator_present: bool,
    indicator_visible: bool,
    last_generation: Generation,
    pending: Option<Generation>,
    cancel: Option<CancellationToken>,
}

impl NavigationInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A link inside the nav bar or the sidebar was activated.
    pub fn on_nav_link_activated(&mut self, href: &str) -> Option<NavigationTicket> {
        let ticket = self.begin(href)?;
        if self.indicator_present {
            self.indicator_visible = true;
        } else {
            tracing::debug!("document has no loading indicator");
        }
        Some(ticket)
    }

    /// Load a document without going through a link (startup, reload).
    pub fn begin(&mut self, href: &str) -> Option<NavigationTicket> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.last_generation = self.last_generation.next();
        self.pending = Some(self.last_generation);

        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        Some(NavigationTicket {
            generation: self.last_generation,
            href: href.to_string(),
            cancel,
        })
    }

    /// Returns `true` when `generation` is the navigation still in flight.
    pub fn settle(&mut self, generation: Generation) -> bool {
        if self.pending != Some(generation) {
            tracing::debug!(?generation, "stale navigation result discarded");
            return false;
        }
        self.pending = None;
        self.cancel = None;
        true
    }

    /// The new document finished loading.
    pub fn on_document_loaded(&mut self, has_indicator: bool) {
        self.indicator_present = has_indicator;
        self.indicator_visible = false;
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    pub fn is_navigating(&self) -> bool {
        self.pending.is_some()
    }
}
