//! Universal tracker: a small analytics beacon shared by every participating app.
//!
//! Host applications create one [`SessionContext`] per page lifetime at bootstrap,
//! mount a [`Tracker`] with their `app_name`, and forward navigation and page
//! lifecycle signals to it. Events go to a central collection endpoint through a
//! fire-and-forget [`Transport`].
//!
//! # Architecture
//!
//! - **SessionContext**: the single per-page-lifetime state (session id, start time,
//!   app name, current page) plus the ambient collaborators (browsing context,
//!   clock, transport)
//! - **Tracker**: the mountable unit, emits `page_view` and `session_summary`
//! - **track**: manual instrumentation entry point for host code
//! - **Transport**: delivery capability; the unload-safe beacon worker is preferred,
//!   a non-waiting spawned request is the fallback
//!
//! Analytics never fails the host application: delivery problems are logged and
//! dropped.

pub mod browsing;
pub mod config;
pub mod event;
pub mod fingerprint;
pub mod lifecycle;
pub mod session;
pub mod transport;
pub mod utm;

#[cfg(test)]
pub(crate) mod test_support;

pub use browsing::{BrowsingContext, DeviceSignals, StaticBrowsingContext, Visibility};
pub use config::CollectorConfig;
pub use event::{Event, Metadata, PAGE_VIEW, SESSION_SUMMARY};
pub use lifecycle::{track, Tracker};
pub use session::{Clock, SessionContext, SessionContextBuilder, SystemClock};
pub use transport::{
    BeaconTransport, FirstAvailable, KeepaliveTransport, MemoryTransport, Transport,
};
