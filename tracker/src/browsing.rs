//! Ambient signals of the browsing context hosting the tracker.
//!
//! The tracker never reaches for globals: whatever embeds it (a webview shell, a
//! wasm host, a test) hands in a [`BrowsingContext`]. Running without one is the
//! server-side rendering case and everything degrades to sentinels.

use std::sync::{PoisonError, RwLock};

/// Page visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Device signals available synchronously from the browsing context.
/// Field order is the order used by the fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSignals {
    pub user_agent: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Minutes to add to local time to get UTC (positive west of Greenwich).
    pub timezone_offset_minutes: i32,
}

/// Read access to the browsing context the tracker runs in.
pub trait BrowsingContext: Send + Sync {
    /// Current device signals.
    fn device_signals(&self) -> DeviceSignals;

    /// Current location, either a full URL or a path with an optional query string.
    fn location(&self) -> String;
}

/// A browsing context backed by plain values the host keeps up to date.
#[derive(Debug, Default)]
pub struct StaticBrowsingContext {
    signals: RwLock<DeviceSignals>,
    location: RwLock<String>,
}

impl StaticBrowsingContext {
    pub fn new(signals: DeviceSignals, location: impl Into<String>) -> Self {
        Self {
            signals: RwLock::new(signals),
            location: RwLock::new(location.into()),
        }
    }

    pub fn set_location(&self, location: impl Into<String>) {
        *self
            .location
            .write()
            .unwrap_or_else(PoisonError::into_inner) = location.into();
    }

    pub fn set_device_signals(&self, signals: DeviceSignals) {
        *self.signals.write().unwrap_or_else(PoisonError::into_inner) = signals;
    }
}

impl BrowsingContext for StaticBrowsingContext {
    fn device_signals(&self) -> DeviceSignals {
        self.signals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn location(&self) -> String {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
