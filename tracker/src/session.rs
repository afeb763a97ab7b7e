//! Per-page-lifetime session state.
//!
//! One [`SessionContext`] is created at application bootstrap and handed to the
//! mounted [`Tracker`](crate::Tracker) and to every manual [`track`](crate::track)
//! call site. Clones share the same state.

use chrono::{DateTime, Utc};
use log::*;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::browsing::BrowsingContext;
use crate::config::CollectorConfig;
use crate::fingerprint::{self, to_base36};
use crate::transport::{self, Transport};

/// App name reported until a tracker is mounted.
pub const UNKNOWN_APP: &str = "unknown";

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Inner {
    session_id: OnceLock<String>,
    started_at: OnceLock<DateTime<Utc>>,
    app_name: RwLock<String>,
    current_page: RwLock<String>,
    browsing: Option<Arc<dyn BrowsingContext>>,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn Transport>,
}

/// Shared session state for one page lifetime.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &self.session_id())
            .field("started_at", &self.started_at())
            .field("app_name", &self.app_name())
            .field("current_page", &self.current_page())
            .field("browsing", &self.inner.browsing.is_some())
            .finish()
    }
}

impl SessionContext {
    pub fn builder() -> SessionContextBuilder {
        SessionContextBuilder::default()
    }

    /// Returns the session id, generating it on first use.
    /// Every call within one lifetime returns the same value.
    pub fn ensure_session_id(&self) -> &str {
        self.inner.session_id.get_or_init(|| {
            let id = generate_session_id(self.inner.clock.now());
            debug!("Generated tracker session id {id}");
            id
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.inner.session_id.get().map(String::as_str)
    }

    /// Returns the session start time, recording it on first use.
    pub fn ensure_started_at(&self) -> DateTime<Utc> {
        *self
            .inner
            .started_at
            .get_or_init(|| self.inner.clock.now())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.started_at.get().copied()
    }

    pub fn app_name(&self) -> String {
        self.inner
            .app_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_app_name(&self, app_name: String) {
        *self
            .inner
            .app_name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = app_name;
    }

    pub fn current_page(&self) -> String {
        self.inner
            .current_page
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_current_page(&self, page: &str) {
        *self
            .inner
            .current_page
            .write()
            .unwrap_or_else(PoisonError::into_inner) = page.to_string();
    }

    pub fn browsing_context(&self) -> Option<&dyn BrowsingContext> {
        self.inner.browsing.as_deref()
    }

    /// Device fingerprint computed from the current browsing context.
    pub fn fingerprint(&self) -> String {
        fingerprint::fingerprint(self.browsing_context())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Blocks until every event emitted so far has been attempted. Hosts call this
    /// on exit when the context outlives the point where delivery must be done.
    pub fn flush(&self) {
        self.inner.transport.flush();
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }
}

/// Builds a [`SessionContext`]; unset collaborators get production defaults.
#[derive(Default)]
pub struct SessionContextBuilder {
    browsing: Option<Arc<dyn BrowsingContext>>,
    clock: Option<Arc<dyn Clock>>,
    transport: Option<Arc<dyn Transport>>,
    collector: Option<CollectorConfig>,
}

impl SessionContextBuilder {
    pub fn browsing_context(mut self, browsing: Arc<dyn BrowsingContext>) -> Self {
        self.browsing = Some(browsing);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Collection endpoint for the default transport. Ignored when a transport is set.
    pub fn collector(mut self, collector: CollectorConfig) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn build(self) -> SessionContext {
        let transport = self.transport.unwrap_or_else(|| {
            let collector = self.collector.unwrap_or_default();
            transport::default_transport(&collector)
        });

        SessionContext {
            inner: Arc::new(Inner {
                session_id: OnceLock::new(),
                started_at: OnceLock::new(),
                app_name: RwLock::new(UNKNOWN_APP.to_string()),
                current_page: RwLock::new(String::new()),
                browsing: self.browsing,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                transport,
            }),
        }
    }
}

/// Random component followed by the epoch milliseconds, both in base 36.
fn generate_session_id(now: DateTime<Utc>) -> String {
    let random = to_base36(rand::random::<u64>());
    let millis = to_base36(u64::try_from(now.timestamp_millis()).unwrap_or_default());
    format!("{random}{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_context, ManualClock};
    use std::collections::HashSet;

    #[test]
    fn test_session_id_is_generated_once() {
        let (ctx, _, _) = test_context();
        assert_eq!(ctx.session_id(), None);

        let first = ctx.ensure_session_id().to_string();
        for _ in 0..10 {
            assert_eq!(ctx.ensure_session_id(), first);
        }
        assert_eq!(ctx.session_id(), Some(first.as_str()));
    }

    #[test]
    fn test_clones_share_the_session() {
        let (ctx, _, _) = test_context();
        let clone = ctx.clone();

        assert_eq!(clone.ensure_session_id(), ctx.ensure_session_id());
    }

    #[test]
    fn test_concurrent_first_use_yields_one_id() {
        let (ctx, _, _) = test_context();

        let ids: HashSet<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| ctx.ensure_session_id().to_string()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_separate_sessions_get_distinct_ids() {
        let ids: HashSet<String> = (0..100)
            .map(|_| test_context().0.ensure_session_id().to_string())
            .collect();

        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_session_id_ends_with_time_component() {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let id = generate_session_id(clock.now());

        assert!(id.ends_with(&to_base36(1_700_000_000_000)));
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_started_at_is_recorded_once() {
        let (ctx, clock, _) = test_context();

        let started = ctx.ensure_started_at();
        clock.advance_secs(30);

        assert_eq!(ctx.ensure_started_at(), started);
        assert_eq!(ctx.started_at(), Some(started));
    }

    #[test]
    fn test_defaults_before_mount() {
        let (ctx, _, _) = test_context();

        assert_eq!(ctx.app_name(), UNKNOWN_APP);
        assert_eq!(ctx.current_page(), "");
    }
}
