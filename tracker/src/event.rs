//! Tracked events and their emission.

use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::SessionContext;
use crate::utm;

/// Free-form event metadata.
pub type Metadata = serde_json::Map<String, Value>;

/// Emitted on every route change after mount.
pub const PAGE_VIEW: &str = "page_view";
/// Emitted when the page is hidden or unloaded after a long enough session.
pub const SESSION_SUMMARY: &str = "session_summary";

/// One analytics event. Immutable once built.
///
/// Serialized with the field names the collection endpoint already stores:
/// `session_id`, `app`, `event`, `device`, `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    session_id: String,
    #[serde(rename = "app")]
    app_name: String,
    #[serde(rename = "event")]
    event_name: String,
    #[serde(rename = "device")]
    device_fingerprint: String,
    metadata: Metadata,
}

impl Event {
    pub fn new(
        session_id: impl Into<String>,
        app_name: impl Into<String>,
        event_name: impl Into<String>,
        device_fingerprint: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            app_name: app_name.into(),
            event_name: event_name.into(),
            device_fingerprint: device_fingerprint.into(),
            metadata,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn device_fingerprint(&self) -> &str {
        &self.device_fingerprint
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Layers event metadata: `{page}`, then UTM tags, then the caller's values.
/// Later layers override earlier ones key by key.
pub fn merge_metadata(page: &str, utm: Metadata, caller: Option<Metadata>) -> Metadata {
    let mut merged = Metadata::new();
    merged.insert("page".to_string(), Value::String(page.to_string()));
    merged.extend(utm);
    if let Some(caller) = caller {
        merged.extend(caller);
    }
    merged
}

/// Builds one event from the session state and hands it to the transport.
///
/// Never blocks on delivery and never reports failure. Two calls emit two events.
pub fn emit(ctx: &SessionContext, event_name: &str, metadata: Option<Metadata>) {
    let session_id = ctx.ensure_session_id().to_string();
    let utm = ctx
        .browsing_context()
        .map(|browsing| utm::extract_utm(&browsing.location()))
        .unwrap_or_default();

    let event = Event::new(
        session_id,
        ctx.app_name(),
        event_name,
        ctx.fingerprint(),
        merge_metadata(&ctx.current_page(), utm, metadata),
    );

    trace!(
        "Emitting {} for app {} in session {}",
        event.event_name(),
        event.app_name(),
        event.session_id()
    );
    ctx.transport().attempt_delivery(&event);
}
