//! Route and page lifecycle integration.
//!
//! A mounted [`Tracker`] turns host navigation and visibility signals into
//! `page_view` and `session_summary` events. Host code that wants extra events
//! calls [`track`] with the same [`SessionContext`].

use chrono::{Duration, Local, Timelike};
use log::*;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::browsing::Visibility;
use crate::event::{self, Metadata, PAGE_VIEW, SESSION_SUMMARY};
use crate::session::SessionContext;

/// Sessions at or below this many seconds are bounces and produce no summary.
pub const MIN_SUMMARY_SECS: i64 = 5;

/// Manual instrumentation: emits `event_name` with optional caller metadata.
pub fn track(ctx: &SessionContext, event_name: &str, metadata: Option<Metadata>) {
    event::emit(ctx, event_name, metadata);
}

/// The mountable tracking unit of one host application.
///
/// Mounting records the app name and starts the session clock; it emits nothing.
/// Dropping the tracker unmounts it. Mounting again with the same context keeps
/// the session id and start time.
#[derive(Debug)]
pub struct Tracker {
    ctx: SessionContext,
    summary_sent: AtomicBool,
}

impl Tracker {
    pub fn mount(ctx: &SessionContext, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        ctx.set_app_name(app_name.clone());
        let session_id = ctx.ensure_session_id();
        ctx.ensure_started_at();
        debug!("Tracker mounted for app {app_name} in session {session_id}");

        Self {
            ctx: ctx.clone(),
            summary_sent: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    /// Records the new path and emits `page_view`.
    pub fn on_route_change(&self, path: &str) {
        self.ctx.set_current_page(path);

        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), Value::String(path.to_string()));
        event::emit(&self.ctx, PAGE_VIEW, Some(metadata));
    }

    /// Hidden runs the teardown; visible again re-arms it.
    pub fn on_visibility_change(&self, visibility: Visibility) {
        match visibility {
            Visibility::Hidden => {
                self.teardown();
            }
            Visibility::Visible => self.summary_sent.store(false, Ordering::SeqCst),
        }
    }

    pub fn on_before_unload(&self) {
        self.teardown();
    }

    /// Emits `session_summary` if the session ran longer than [`MIN_SUMMARY_SECS`].
    ///
    /// When hide and unload both fire for the same teardown only the first one emits.
    /// Returns whether a summary was emitted.
    pub fn teardown(&self) -> bool {
        let now = self.ctx.now();
        let started_at = self.ctx.ensure_started_at();
        let screen_time_seconds = round_to_seconds(now - started_at);

        if screen_time_seconds <= MIN_SUMMARY_SECS {
            trace!("Skipping session summary after {screen_time_seconds}s");
            return false;
        }
        if self.summary_sent.swap(true, Ordering::SeqCst) {
            trace!("Session summary already sent for this teardown");
            return false;
        }

        let mut metadata = Metadata::new();
        metadata.insert(
            "screen_time_seconds".to_string(),
            Value::from(screen_time_seconds),
        );
        metadata.insert(
            "hour_of_day".to_string(),
            Value::from(self.local_hour(now)),
        );
        metadata.insert(
            "exit_page".to_string(),
            Value::String(self.ctx.current_page()),
        );
        event::emit(&self.ctx, SESSION_SUMMARY, Some(metadata));
        true
    }

    /// Hour of day on the host's local clock. Uses the browsing context's timezone
    /// offset when there is one, the process timezone otherwise.
    fn local_hour(&self, now: chrono::DateTime<chrono::Utc>) -> u32 {
        match self.ctx.browsing_context() {
            Some(browsing) => {
                let offset = browsing.device_signals().timezone_offset_minutes;
                (now - Duration::minutes(i64::from(offset))).hour()
            }
            None => now.with_timezone(&Local).hour(),
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        debug!("Tracker unmounted for app {}", self.ctx.app_name());
    }
}

/// Whole seconds, rounding half up. Negative spans count as zero.
fn round_to_seconds(elapsed: Duration) -> i64 {
    (elapsed.num_milliseconds().max(0) + 500) / 1000
}
