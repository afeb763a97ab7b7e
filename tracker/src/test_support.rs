use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use crate::browsing::{DeviceSignals, StaticBrowsingContext};
use crate::session::{Clock, SessionContext};
use crate::transport::MemoryTransport;

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at_millis(millis: i64) -> Self {
        Self {
            now: Mutex::new(DateTime::from_timestamp_millis(millis).unwrap()),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        *self.now.lock().unwrap() = DateTime::from_timestamp_millis(millis).unwrap();
    }

    pub fn advance_millis(&self, millis: i64) {
        *self.now.lock().unwrap() += Duration::milliseconds(millis);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn device_signals() -> DeviceSignals {
    DeviceSignals {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)".to_string(),
        language: "pt-BR".to_string(),
        screen_width: 390,
        screen_height: 844,
        timezone_offset_minutes: 180,
    }
}

pub fn test_context_with(
    browsing: Option<Arc<StaticBrowsingContext>>,
) -> (SessionContext, Arc<ManualClock>, Arc<MemoryTransport>) {
    let clock = Arc::new(ManualClock::at_millis(1_771_236_000_000));
    let transport = Arc::new(MemoryTransport::new());

    let mut builder = SessionContext::builder()
        .clock(clock.clone())
        .transport(transport.clone());
    if let Some(browsing) = browsing {
        builder = builder.browsing_context(browsing);
    }

    (builder.build(), clock, transport)
}

pub fn test_context_at(
    location: &str,
) -> (SessionContext, Arc<ManualClock>, Arc<MemoryTransport>) {
    test_context_with(Some(Arc::new(StaticBrowsingContext::new(
        device_signals(),
        location,
    ))))
}

pub fn test_context() -> (SessionContext, Arc<ManualClock>, Arc<MemoryTransport>) {
    test_context_at("https://app.example.com/")
}

/// No browsing context, as during server-side rendering.
pub fn headless_context() -> (SessionContext, Arc<ManualClock>, Arc<MemoryTransport>) {
    test_context_with(None)
}
