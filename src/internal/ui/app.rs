use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::ApiService;
use crate::config::AppConfig;
use crate::internal::comments::{
    CommentController, CommentFetchTicket, CommentSubmitTicket, FETCH_FAILED_ALERT, FetchOutcome,
    POST_FAILED, POST_SUCCEEDED, SubmitOutcome,
};
use crate::internal::models::{ArticleEntry, Comment, Generation, Link, Page};
use crate::internal::navigation::{NavigationInterceptor, NavigationTicket};
use crate::internal::notification::NotificationEmitter;
use crate::internal::sidebar::Sidebar;
use crate::internal::summary::{SettleOutcome, SummaryController, SummaryTicket};
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap, default_keybindings};
use crate::utils::html_parser::parse_page;

use ratatui::Frame;
use ratatui::widgets::ListState;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Region of the page that receives navigation keys, in Tab order.
#[derive(Debug, PartialEq, Clone, Copy, EnumIter)]
pub enum Focus {
    Articles,
    Sidebar,
    Nav,
}

/// Actions/messages sent through the app action channel.
///
/// Results of background requests come back as actions too, tagged with the
/// generation they were issued under.
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    NavigateUp,
    NavigateDown,
    CycleFocus,
    Activate,
    RequestSummary,
    OpenDiscussion,
    OpenInBrowser,
    ToggleSidebar,
    Reload,
    CloseModal,
    ToggleHelp,
    DismissAlert,
    CommentInput(char),
    CommentBackspace,
    SubmitComment,
    PageLoaded {
        generation: Generation,
        result: Result<Page, String>,
    },
    SummaryLoaded {
        generation: Generation,
        result: Result<String, String>,
    },
    CommentsLoaded {
        generation: Generation,
        article_id: String,
        result: Result<Vec<Comment>, String>,
    },
    CommentPosted {
        ticket: CommentSubmitTicket,
        result: Result<(), String>,
    },
}

pub struct App {
    pub running: bool,
    pub config: AppConfig,
    api: Arc<ApiService>,

    // Document
    pub page: Option<Page>,
    pub page_error: Option<String>,
    pub focus: Focus,
    pub nav_index: usize,
    pub sidebar_state: ListState,
    pub article_state: ListState,

    // Controllers
    pub sidebar: Sidebar,
    pub navigation: NavigationInterceptor,
    pub summary: SummaryController,
    pub comments: CommentController,
    pub notifications: NotificationEmitter,

    // Overlays
    pub alert: Option<String>,
    pub show_help: bool,
    pub spinner_state: usize,
    last_spinner_update: Option<Instant>,

    keybindings: KeyBindingMap,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let api = ApiService::new(&config.base_url, &config.network)
            .with_context(|| format!("failed to set up client for {}", config.base_url))?;

        tracing::info!(base_url = %config.base_url, "App initialized");

        Ok(Self {
            running: true,
            notifications: NotificationEmitter::new(config.notification_timeout()),
            config,
            api: Arc::new(api),
            page: None,
            page_error: None,
            focus: Focus::Articles,
            nav_index: 0,
            sidebar_state: ListState::default(),
            article_state: ListState::default(),
            sidebar: Sidebar::new(),
            navigation: NavigationInterceptor::new(),
            summary: SummaryController::new(),
            comments: CommentController::new(),
            alert: None,
            show_help: false,
            spinner_state: 0,
            last_spinner_update: None,
            keybindings: default_keybindings(),
            action_tx,
            action_rx,
        })
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        // Initial load
        let start_path = self.config.start_path.clone();
        self.load_document(&start_path);

        let mut event_interval = tokio::time::interval(Duration::from_millis(16));

        loop {
            self.tick(Instant::now());

            tui.draw(|f| self.ui(f))?;

            tokio::select! {
                _ = event_interval.tick() => {
                    if event::poll(Duration::from_millis(0))?
                        && let Event::Key(key) = event::read()?
                        && key.kind == KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                }
            }

            if !self.running {
                break;
            }
        }
        Ok(())
    }

    /// Wait for the next action produced by a background request.
    pub async fn next_action(&mut self) -> Option<Action> {
        self.action_rx.recv().await
    }

    /// Expire notifications and advance the spinner.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);

        match self.last_spinner_update {
            Some(last) if now.duration_since(last) >= Duration::from_millis(100) => {
                self.spinner_state = self.spinner_state.wrapping_add(1);
                self.last_spinner_update = Some(now);
            }
            Some(_) => {}
            None => self.last_spinner_update = Some(now),
        }
    }

    pub fn key_context(&self) -> KeyBindingContext {
        if self.comments.is_visible() {
            KeyBindingContext::CommentModal
        } else if self.summary.is_visible() {
            KeyBindingContext::SummaryModal
        } else {
            KeyBindingContext::Page
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // The alert blocks everything until acknowledged
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.handle_action(Action::DismissAlert);
            }
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        let context = self.key_context();

        if context == KeyBindingContext::CommentModal
            && let KeyCode::Char(c) = key.code
            && !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            self.handle_action(Action::CommentInput(c));
            return;
        }

        let Some(action) = self.keybindings.get_action(&key, context) else {
            return;
        };

        // The loading indicator covers the page; only leaving or reloading gets through.
        if self.navigation.indicator_visible() && !matches!(action, Action::Quit | Action::Reload) {
            return;
        }

        self.handle_action(action);
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NavigateUp => self.move_selection(-1),
            Action::NavigateDown => self.move_selection(1),
            Action::CycleFocus => self.cycle_focus(),
            Action::Activate => match self.focus {
                Focus::Nav | Focus::Sidebar => {
                    if let Some(href) = self.selected_link().map(|l| l.href.clone()) {
                        self.navigate(&href);
                    }
                }
                Focus::Articles => self.handle_action(Action::RequestSummary),
            },
            Action::RequestSummary => {
                let Some(url) = self.selected_article().and_then(|a| a.summary_url.clone()) else {
                    tracing::debug!("selected article has no summary trigger");
                    return;
                };
                if let Some(ticket) = self.summary.on_trigger_clicked(&url) {
                    self.spawn_summary(ticket);
                }
            }
            Action::OpenDiscussion => {
                let Some(article_id) = self.selected_article().and_then(|a| a.article_id.clone())
                else {
                    tracing::debug!("selected article has no discussion trigger");
                    return;
                };
                let ticket = self.comments.on_discussion_triggered(&article_id);
                self.spawn_comment_fetch(ticket);
            }
            Action::OpenInBrowser => self.open_selected_in_browser(),
            Action::ToggleSidebar => {
                self.sidebar.on_toggle_clicked();
                if self.sidebar.is_hidden() && self.focus == Focus::Sidebar {
                    self.focus = Focus::Articles;
                }
            }
            Action::Reload => {
                let href = self
                    .page
                    .as_ref()
                    .map(|p| p.url.clone())
                    .unwrap_or_else(|| self.config.start_path.clone());
                self.load_document(&href);
            }
            Action::CloseModal => {
                if self.comments.is_visible() {
                    self.comments.on_close_requested();
                } else if self.summary.is_visible() {
                    self.summary.on_close_requested();
                }
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::DismissAlert => self.alert = None,
            Action::CommentInput(c) => self.comments.push_input(c),
            Action::CommentBackspace => self.comments.pop_input(),
            Action::SubmitComment => {
                if let Some(ticket) = self.comments.on_comment_submit() {
                    self.spawn_comment_post(ticket);
                }
            }
            Action::PageLoaded { generation, result } => {
                if !self.navigation.settle(generation) {
                    return;
                }
                match result {
                    Ok(page) => self.replace_document(page),
                    Err(e) => {
                        tracing::error!("Navigation failed: {}", e);
                        if self.page.is_none() {
                            self.page_error = Some(e);
                        }
                    }
                }
            }
            Action::SummaryLoaded { generation, result } => {
                if let SettleOutcome::Discarded(reason) = self.summary.settle(generation, result) {
                    tracing::debug!(?generation, ?reason, "summary result dropped");
                }
            }
            Action::CommentsLoaded {
                generation,
                article_id,
                result,
            } => {
                if self.comments.apply_fetch(generation, &article_id, result) == FetchOutcome::Failed {
                    self.alert = Some(FETCH_FAILED_ALERT.to_string());
                }
            }
            Action::CommentPosted { ticket, result } => {
                match self.comments.apply_submit(&ticket, result) {
                    SubmitOutcome::Posted(fetch) => {
                        self.notifications.emit(POST_SUCCEEDED);
                        self.spawn_comment_fetch(fetch);
                    }
                    SubmitOutcome::PostedElsewhere => {
                        self.notifications.emit(POST_SUCCEEDED);
                    }
                    SubmitOutcome::Failed => {
                        self.notifications.emit_error(POST_FAILED);
                    }
                    SubmitOutcome::Stale => {}
                }
            }
        }
    }

    /// Follow a link from the nav bar or sidebar.
    pub fn navigate(&mut self, href: &str) {
        if let Some(ticket) = self.navigation.on_nav_link_activated(href) {
            self.spawn_page_load(ticket);
        }
    }

    /// Load a document directly, as on startup or reload.
    pub fn load_document(&mut self, href: &str) {
        if let Some(ticket) = self.navigation.begin(href) {
            self.spawn_page_load(ticket);
        }
    }

    /// Swap in a freshly loaded document and tear down everything the old one owned.
    pub fn replace_document(&mut self, page: Page) {
        tracing::info!(url = %page.url, articles = page.articles.len(), "Document loaded");

        self.summary.reset();
        self.comments.reset();
        self.sidebar.reset();
        self.notifications.clear();
        self.alert = None;
        self.page_error = None;
        self.navigation.on_document_loaded(page.has_loading_indicator);

        self.focus = Focus::Articles;
        self.nav_index = 0;
        self.sidebar_state
            .select((!page.sidebar_links.is_empty()).then_some(0));
        self.article_state
            .select((!page.articles.is_empty()).then_some(0));
        self.page = Some(page);
    }

    pub fn selected_article(&self) -> Option<&ArticleEntry> {
        let page = self.page.as_ref()?;
        page.articles.get(self.article_state.selected()?)
    }

    pub fn selected_link(&self) -> Option<&Link> {
        let page = self.page.as_ref()?;
        match self.focus {
            Focus::Nav => page.nav_links.get(self.nav_index),
            Focus::Sidebar => page.sidebar_links.get(self.sidebar_state.selected()?),
            Focus::Articles => None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(page) = &self.page else {
            return;
        };
        match self.focus {
            Focus::Nav => {
                self.nav_index = step(Some(self.nav_index), page.nav_links.len(), delta).unwrap_or(0);
            }
            Focus::Sidebar => {
                let next = step(self.sidebar_state.selected(), page.sidebar_links.len(), delta);
                self.sidebar_state.select(next);
            }
            Focus::Articles => {
                let next = step(self.article_state.selected(), page.articles.len(), delta);
                self.article_state.select(next);
            }
        }
    }

    fn cycle_focus(&mut self) {
        let Some(page) = &self.page else {
            return;
        };
        let sidebar_available = !self.sidebar.is_hidden() && !page.sidebar_links.is_empty();
        let nav_available = !page.nav_links.is_empty();

        let order: Vec<Focus> = Focus::iter().collect();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = (1..=order.len())
            .map(|offset| order[(current + offset) % order.len()])
            .find(|focus| match focus {
                Focus::Articles => true,
                Focus::Sidebar => sidebar_available,
                Focus::Nav => nav_available,
            })
            .unwrap_or(Focus::Articles);
    }

    fn open_selected_in_browser(&mut self) {
        let Some(link) = self.selected_article().and_then(|a| a.link.clone()) else {
            return;
        };
        let url = match self.api.resolve(&link) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot open {}: {}", link, e);
                return;
            }
        };
        if let Err(e) = open::that(url.as_str()) {
            tracing::error!("Failed to open browser for {}: {}", url, e);
            self.notifications.emit_error("Failed to open browser");
        }
    }

    fn spawn_page_load(&self, ticket: NavigationTicket) {
        let api = self.api.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = ticket.cancel.cancelled() => {
                    tracing::debug!(href = %ticket.href, "navigation cancelled");
                    return;
                }
                result = api.fetch_page(&ticket.href) => result,
            };
            let result = result
                .map(|(url, html)| parse_page(&html, url.as_str()))
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::PageLoaded {
                generation: ticket.generation,
                result,
            });
        });
    }

    fn spawn_summary(&self, ticket: SummaryTicket) {
        let api = self.api.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = ticket.cancel.cancelled() => {
                    tracing::debug!(url = %ticket.target_url, "summary request cancelled");
                    return;
                }
                result = api.summarize(&ticket.target_url) => result,
            };
            let _ = tx.send(Action::SummaryLoaded {
                generation: ticket.generation,
                result: result.map_err(|e| e.to_string()),
            });
        });
    }

    fn spawn_comment_fetch(&self, ticket: CommentFetchTicket) {
        let api = self.api.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = api
                .fetch_comments(&ticket.article_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::CommentsLoaded {
                generation: ticket.generation,
                article_id: ticket.article_id,
                result,
            });
        });
    }

    fn spawn_comment_post(&self, ticket: CommentSubmitTicket) {
        let api = self.api.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = api
                .post_comment(&ticket.article_id, &ticket.content)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::CommentPosted { ticket, result });
        });
    }

    pub fn spinner_char(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
        FRAMES[self.spinner_state % FRAMES.len()]
    }

    pub fn ui(&mut self, f: &mut Frame) {
        crate::internal::ui::view::draw(self, f);
    }
}

/// Move a list selection by `delta`, clamped to the list bounds.
fn step(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0) as isize;
    Some((current + delta).clamp(0, len as isize - 1) as usize)
}
