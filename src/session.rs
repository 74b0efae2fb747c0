//! Session Store
//!
//! In-memory per-user conversational state. Sessions are created lazily on
//! the first qualifying message, mutated in place by the dispatcher, and
//! removed only by the periodic idle sweep. Nothing here survives a restart;
//! that is accepted behavior, not a defect.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Whether the automated layer answers this user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Bot,
    /// Handed off to a person; automated replies are suspended until the
    /// user sends `bot on`.
    Human,
}

/// Position in the menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    MainMenu,
    SelectCategory,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub mode: Mode,
    pub step: Step,
    pub last_seen: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            mode: Mode::Bot,
            step: Step::MainMenu,
            last_seen: now,
        }
    }
}

/// Map of user JID to session. The host wraps this in a `tokio::sync::Mutex`
/// shared between the dispatch path and the sweeper task.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

pub type SharedStore = Arc<Mutex<SessionStore>>;

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `user`, creating a default one if absent.
    /// Always refreshes `last_seen` so the sweep never drops an active user.
    pub fn get_or_create(&mut self, user: &str, now: Instant) -> &mut Session {
        let session = self
            .sessions
            .entry(user.to_string())
            .or_insert_with(|| Session::new(now));
        session.last_seen = now;
        session
    }

    pub fn get(&self, user: &str) -> Option<&Session> {
        self.sessions.get(user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Evict every session idle longer than `max_idle`. One `now` is used for
    /// the whole pass and the check reads each session's stored `last_seen`,
    /// so an entry refreshed mid-pass is never dropped.
    pub fn sweep(&mut self, now: Instant, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.last_seen) <= max_idle);
        before - self.sessions.len()
    }
}

/// Periodic eviction task. Tests drive `sweep` directly with synthetic
/// instants; this wrapper only supplies the wall clock and the interval.
pub fn run_sweeper(store: SharedStore, period: Duration, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // the first tick completes immediately; skip it
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.lock().await.sweep(Instant::now(), max_idle);
            if evicted > 0 {
                tracing::info!("Session sweep: evicted {} idle user(s)", evicted);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn first_message_creates_default_session() {
        let mut store = SessionStore::new();
        let now = Instant::now();
        let session = store.get_or_create("549261000@s.whatsapp.net", now);
        assert_eq!(session.mode, Mode::Bot);
        assert_eq!(session.step, Step::MainMenu);
        assert_eq!(session.last_seen, now);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_or_create_refreshes_last_seen_and_keeps_state() {
        let mut store = SessionStore::new();
        let t0 = Instant::now();
        store.get_or_create("u", t0).step = Step::SelectCategory;

        let t1 = t0 + Duration::from_secs(300);
        let session = store.get_or_create("u", t1);
        assert_eq!(session.step, Step::SelectCategory);
        assert_eq!(session.last_seen, t1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sweep_evicts_only_sessions_past_the_window() {
        let mut store = SessionStore::new();
        let start = Instant::now();
        store.get_or_create("stale", start);
        store.get_or_create("fresh", start + HOUR + Duration::from_secs(50 * 60));

        // "stale" is 2h idle, "fresh" 10m idle
        let now = start + 2 * HOUR;
        let evicted = store.sweep(now, HOUR);
        assert_eq!(evicted, 1);
        assert!(store.get("stale").is_none());
        assert!(store.get("fresh").is_some());
    }

    #[test]
    fn sweep_keeps_sessions_exactly_at_the_threshold() {
        let mut store = SessionStore::new();
        let start = Instant::now();
        store.get_or_create("edge", start);
        assert_eq!(store.sweep(start + HOUR, HOUR), 0);
        assert_eq!(store.sweep(start + HOUR + Duration::from_secs(1), HOUR), 1);
    }

    #[test]
    fn sweep_on_empty_store_is_a_noop() {
        let mut store = SessionStore::new();
        assert_eq!(store.sweep(Instant::now(), HOUR), 0);
        assert!(store.is_empty());
    }
}
