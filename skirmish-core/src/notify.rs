//! Transient notification log.
//!
//! Every mutating operation reports its outcome here; the view renders the
//! entries and drives their expiry. Removal is explicit and clock-driven:
//! entries carry an expiry instant ([`NotificationLog::ttl`] after creation,
//! 3 seconds by default) and [`NotificationLog::sweep`] removes the ones
//! whose time has passed. [`NotificationLog::dismiss`] cancels an entry
//! early. There are no ambient timers in the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Default lifetime of a notification before [`NotificationLog::sweep`]
/// removes it.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One transient message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
    pub expires_at: Instant,
}

/// Append-only log of transient messages with scheduled removal.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: Vec<Notification>,
    ttl: Duration,
}

impl NotificationLog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            ttl,
        }
    }

    /// Append a message; it expires [`Self::ttl`] from now.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> NotificationId {
        let id = NotificationId::new();
        let now = Instant::now();
        self.entries.push(Notification {
            id,
            message: message.into(),
            severity,
            created_at: now,
            expires_at: now + self.ttl,
        });
        id
    }

    /// All live entries, oldest first.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Remove an entry before its scheduled expiry. Returns false if the id
    /// is unknown (already swept or dismissed).
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Remove every entry whose expiry has passed. Returns how many were
    /// removed. The caller supplies the clock so tests and alternate
    /// surfaces can drive expiry themselves.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| n.expires_at > now);
        before - self.entries.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_removes_only_expired_entries() {
        let mut log = NotificationLog::new(Duration::from_secs(3));
        log.push(Severity::Info, "first");
        log.push(Severity::Success, "second");

        let now = Instant::now();
        assert_eq!(log.sweep(now), 0);
        assert_eq!(log.len(), 2);

        assert_eq!(log.sweep(now + Duration::from_secs(4)), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn dismiss_cancels_a_pending_entry() {
        let mut log = NotificationLog::default();
        let first = log.push(Severity::Error, "oops");
        log.push(Severity::Info, "fine");

        assert!(log.dismiss(first));
        assert!(!log.dismiss(first));
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].message, "fine");
    }

    #[test]
    fn entries_keep_append_order() {
        let mut log = NotificationLog::default();
        log.push(Severity::Info, "a");
        log.push(Severity::Info, "b");
        log.push(Severity::Info, "c");

        let messages: Vec<_> = log.entries().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }
}
