use std::time::{Duration, Instant};

/// Delay after which every notification removes itself.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(3500);

/// Type of notification to display. Only affects styling; every kind shares
/// the emitter's timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A transient status message with its own expiry.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl Notification {
    fn new(message: String, kind: NotificationKind, now: Instant, timeout: Duration) -> Self {
        Self {
            message,
            kind,
            created_at: now,
            expires_at: now + timeout,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Get the remaining time before auto-dismiss
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// Emits independently timed notifications.
///
/// Any number may be visible at once; they are never merged or queued. The
/// owner calls [`NotificationEmitter::prune`] on every tick so each one
/// disappears once its own deadline passes.
#[derive(Debug, Clone)]
pub struct NotificationEmitter {
    timeout: Duration,
    active: Vec<Notification>,
}

impl NotificationEmitter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            active: Vec::new(),
        }
    }

    pub fn emit(&mut self, message: impl Into<String>) -> &Notification {
        self.emit_at(message, NotificationKind::Info, Instant::now())
    }

    pub fn emit_error(&mut self, message: impl Into<String>) -> &Notification {
        self.emit_at(message, NotificationKind::Error, Instant::now())
    }

    pub fn emit_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> &Notification {
        let notification = Notification::new(message.into(), kind, now, self.timeout);
        tracing::debug!(message = %notification.message, "notification.emit");
        self.active.push(notification);
        &self.active[self.active.len() - 1]
    }

    /// Drop every notification whose deadline has passed. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| !n.is_expired_at(now));
        before - self.active.len()
    }

    /// Remove everything, used when the document is replaced.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for NotificationEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TIMEOUT)
    }
}
