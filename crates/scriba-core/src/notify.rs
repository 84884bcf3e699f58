//! Transient success/error notifications with independent auto-dismiss timers.
//!
//! Each notification carries its own deadline; expired entries drop out of
//! `visible()` on the next read. Durations are configurable per severity.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    posted_at: Instant,
    ttl: Duration,
}

impl Notification {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.posted_at) >= self.ttl
    }
}

/// Stacking notification surface.
///
/// Multiple concurrent notifications coexist; each expires on its own
/// schedule. Nothing here blocks: expiry is evaluated lazily when the surface
/// is read.
#[derive(Debug)]
pub struct Notifier {
    entries: Mutex<Vec<Notification>>,
    error_ttl: Duration,
    success_ttl: Duration,
}

pub const DEFAULT_ERROR_TTL: Duration = Duration::from_secs(5);
pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_secs(3);

impl Notifier {
    pub fn new() -> Self {
        Self::with_durations(DEFAULT_ERROR_TTL, DEFAULT_SUCCESS_TTL)
    }

    pub fn with_durations(error_ttl: Duration, success_ttl: Duration) -> Self {
        Notifier {
            entries: Mutex::new(Vec::new()),
            error_ttl,
            success_ttl,
        }
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(message.into(), Severity::Error, self.error_ttl);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(message.into(), Severity::Success, self.success_ttl);
    }

    fn push(&self, message: String, severity: Severity, ttl: Duration) {
        self.entries.lock().unwrap().push(Notification {
            message,
            severity,
            posted_at: Instant::now(),
            ttl,
        });
    }

    /// Currently visible notifications; expired entries are pruned.
    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }

    fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|n| !n.is_expired_at(now));
        entries.clone()
    }

    /// Remove and return everything still visible, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|n| !n.is_expired_at(now));
        std::mem::take(&mut *entries)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_stack_independently() {
        let notifier = Notifier::new();
        notifier.error("upload failed");
        notifier.success("copied");
        notifier.error("still failing");

        let visible = notifier.visible();
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[0].severity, Severity::Error);
        assert_eq!(visible[1].severity, Severity::Success);
    }

    #[test]
    fn entries_expire_on_their_own_deadline() {
        let notifier = Notifier::with_durations(Duration::from_secs(60), Duration::ZERO);
        notifier.error("slow to fade");
        notifier.success("gone immediately");

        let visible = notifier.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "slow to fade");
    }

    #[test]
    fn warnings_survive_only_when_read_within_their_ttl() {
        let notifier = Notifier::with_durations(Duration::from_millis(10), Duration::from_millis(10));

        // Polled promptly, the warning is delivered.
        notifier.error("microphone permission denied");
        assert_eq!(notifier.drain().len(), 1);

        // Left unread past the deadline, it is gone. Readers that only drain
        // once at the end of a long run therefore miss everything.
        notifier.error("audio capture failed");
        std::thread::sleep(Duration::from_millis(20));
        assert!(notifier.drain().is_empty());
    }

    #[test]
    fn drain_empties_the_surface() {
        let notifier = Notifier::new();
        notifier.success("done");
        assert_eq!(notifier.drain().len(), 1);
        assert!(notifier.visible().is_empty());
    }
}
