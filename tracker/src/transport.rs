//! Delivery of tracked events to the collection endpoint.
//!
//! A [`Transport`] only attempts delivery: it never blocks the caller, never
//! retries and never reports failure back. [`BeaconTransport`] is the unload-safe
//! primary; it queues payloads onto a dedicated worker thread that drains the
//! queue before shutdown completes. [`KeepaliveTransport`] is the fallback and
//! spawns one request per event on the ambient tokio runtime.

use log::*;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tokio::runtime::Handle;

use crate::config::CollectorConfig;
use crate::event::Event;

/// Capability to hand one event to the collection endpoint.
pub trait Transport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this transport can attempt delivery right now.
    fn is_available(&self) -> bool {
        true
    }

    /// Attempts delivery without waiting for the outcome.
    fn attempt_delivery(&self, event: &Event);

    /// Waits until every event handed over so far has been attempted.
    fn flush(&self) {}
}

/// Primary transport for the collector configured in `config`, with the fallback behind it.
pub fn default_transport(config: &CollectorConfig) -> Arc<dyn Transport> {
    Arc::new(FirstAvailable::new(vec![
        Arc::new(BeaconTransport::spawn(config.endpoint())) as Arc<dyn Transport>,
        Arc::new(KeepaliveTransport::new(config.endpoint())) as Arc<dyn Transport>,
    ]))
}

/// Delegates each event to the first candidate that is available at that moment.
pub struct FirstAvailable {
    candidates: Vec<Arc<dyn Transport>>,
}

impl FirstAvailable {
    pub fn new(candidates: Vec<Arc<dyn Transport>>) -> Self {
        Self { candidates }
    }
}

impl Transport for FirstAvailable {
    fn name(&self) -> &'static str {
        "first_available"
    }

    fn is_available(&self) -> bool {
        self.candidates.iter().any(|candidate| candidate.is_available())
    }

    fn attempt_delivery(&self, event: &Event) {
        match self
            .candidates
            .iter()
            .find(|candidate| candidate.is_available())
        {
            Some(transport) => {
                trace!("Delivering {} via {}", event.event_name(), transport.name());
                transport.attempt_delivery(event);
            }
            None => warn!(
                "No tracker transport available, dropping {} event",
                event.event_name()
            ),
        }
    }

    fn flush(&self) {
        for candidate in &self.candidates {
            candidate.flush();
        }
    }
}

enum BeaconCommand {
    Deliver(Vec<u8>),
    Flush(Sender<()>),
}

/// Unload-safe delivery through a dedicated worker thread.
///
/// Queuing is synchronous and never waits on the network. [`Transport::flush`] waits
/// for the queue to drain and keeps the worker running. [`BeaconTransport::shutdown`]
/// (also run on drop) closes the queue and waits for the worker to attempt every
/// queued payload, so events emitted during teardown still go out.
pub struct BeaconTransport {
    sender: Mutex<Option<Sender<BeaconCommand>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BeaconTransport {
    pub fn spawn(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let (sender, receiver) = mpsc::channel::<BeaconCommand>();

        let worker = thread::Builder::new()
            .name("tracker-beacon".to_string())
            .spawn(move || {
                let client = match reqwest::blocking::Client::builder()
                    .use_rustls_tls()
                    .build()
                {
                    Ok(client) => client,
                    Err(err) => {
                        warn!("Failed to build beacon client, beacon disabled: {err:?}");
                        return;
                    }
                };

                for command in receiver {
                    let body = match command {
                        BeaconCommand::Deliver(body) => body,
                        BeaconCommand::Flush(ack) => {
                            let _ = ack.send(());
                            continue;
                        }
                    };
                    let result = client
                        .post(&endpoint)
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(body)
                        .send();
                    match result {
                        Ok(response) if !response.status().is_success() => {
                            debug!("Collector answered beacon with {}", response.status())
                        }
                        Ok(_) => {}
                        Err(err) => debug!("Beacon delivery failed: {err}"),
                    }
                }
            });

        match worker {
            Ok(handle) => Self {
                sender: Mutex::new(Some(sender)),
                worker: Mutex::new(Some(handle)),
            },
            Err(err) => {
                warn!("Failed to start beacon worker: {err}");
                Self {
                    sender: Mutex::new(None),
                    worker: Mutex::new(None),
                }
            }
        }
    }

    /// Stops accepting events and waits until every queued one has been attempted.
    pub fn shutdown(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                warn!("Beacon worker panicked during shutdown");
            }
        }
    }
}

impl Transport for BeaconTransport {
    fn name(&self) -> &'static str {
        "beacon"
    }

    fn is_available(&self) -> bool {
        let has_sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        let worker_alive = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|worker| !worker.is_finished());

        has_sender && worker_alive
    }

    fn attempt_delivery(&self, event: &Event) {
        let body = match serde_json::to_vec(event) {
            Ok(body) => body,
            Err(err) => {
                warn!("Failed to serialize {} event: {err}", event.event_name());
                return;
            }
        };

        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(BeaconCommand::Deliver(body)).is_err() {
                    debug!("Beacon worker gone, dropping {} event", event.event_name());
                }
            }
            None => debug!("Beacon shut down, dropping {} event", event.event_name()),
        }
    }

    fn flush(&self) {
        let (ack, done) = mpsc::channel();
        let queued = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|sender| sender.send(BeaconCommand::Flush(ack)).is_ok());

        // The worker answers once everything queued before the marker was attempted
        if queued && done.recv().is_err() {
            debug!("Beacon worker stopped before the queue drained");
        }
    }
}

impl Drop for BeaconTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fallback delivery: one spawned, unawaited request per event.
///
/// Only available inside a tokio runtime.
pub struct KeepaliveTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl KeepaliveTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Transport for KeepaliveTransport {
    fn name(&self) -> &'static str {
        "keepalive"
    }

    fn is_available(&self) -> bool {
        Handle::try_current().is_ok()
    }

    fn attempt_delivery(&self, event: &Event) {
        let Ok(handle) = Handle::try_current() else {
            debug!("No async runtime, dropping {} event", event.event_name());
            return;
        };

        let request = self.client.post(&self.endpoint).json(event);
        let event_name = event.event_name().to_string();
        handle.spawn(async move {
            if let Err(err) = request.send().await {
                debug!("Keepalive delivery of {event_name} failed: {err}");
            }
        });
    }
}

/// Keeps every event in memory. Meant for host application tests.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    events: Mutex<Vec<Event>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn attempt_delivery(&self, event: &Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Metadata, PAGE_VIEW};
    use serde_json::json;
    use std::time::Duration;

    fn page_view() -> Event {
        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), json!("/a"));
        Event::new("sid", "demo", PAGE_VIEW, "fp_1", metadata)
    }

    struct Unavailable;

    impl Transport for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn attempt_delivery(&self, _event: &Event) {
            panic!("unavailable transport must not be used");
        }
    }

    #[test]
    fn test_first_available_skips_unavailable_candidates() {
        let memory = Arc::new(MemoryTransport::new());
        let transport = FirstAvailable::new(vec![
            Arc::new(Unavailable) as Arc<dyn Transport>,
            memory.clone() as Arc<dyn Transport>,
        ]);

        transport.attempt_delivery(&page_view());

        assert!(transport.is_available());
        assert_eq!(memory.events(), vec![page_view()]);
    }

    #[test]
    fn test_first_available_prefers_earlier_candidates() {
        let first = Arc::new(MemoryTransport::new());
        let second = Arc::new(MemoryTransport::new());
        let transport = FirstAvailable::new(vec![
            first.clone() as Arc<dyn Transport>,
            second.clone() as Arc<dyn Transport>,
        ]);

        transport.attempt_delivery(&page_view());

        assert_eq!(first.events().len(), 1);
        assert!(second.events().is_empty());
    }

    #[test]
    fn test_first_available_with_nothing_available_drops_silently() {
        let transport = FirstAvailable::new(vec![Arc::new(Unavailable) as Arc<dyn Transport>]);

        assert!(!transport.is_available());
        transport.attempt_delivery(&page_view());
    }

    #[test]
    fn test_beacon_delivers_queued_events_before_shutdown_returns() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/oracle")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({
                "session_id": "sid",
                "app": "demo",
                "event": "page_view",
                "device": "fp_1",
                "metadata": {"page": "/a"},
            })))
            .with_status(200)
            .expect(2)
            .create();

        let transport = BeaconTransport::spawn(format!("{}/api/oracle", server.url()));
        assert!(transport.is_available());

        transport.attempt_delivery(&page_view());
        transport.attempt_delivery(&page_view());
        transport.shutdown();

        mock.assert();
        assert!(!transport.is_available());
    }

    #[test]
    fn test_beacon_swallows_delivery_failures() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/oracle")
            .with_status(500)
            .expect(1)
            .create();

        let transport = BeaconTransport::spawn(format!("{}/api/oracle", server.url()));
        transport.attempt_delivery(&page_view());
        transport.shutdown();
        mock.assert();

        // Unreachable collector
        let transport = BeaconTransport::spawn("http://127.0.0.1:1/api/oracle");
        transport.attempt_delivery(&page_view());
        transport.shutdown();
    }

    #[test]
    fn test_beacon_flush_drains_queue_and_keeps_running() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/oracle")
            .with_status(200)
            .expect(2)
            .create();

        let transport = BeaconTransport::spawn(format!("{}/api/oracle", server.url()));
        transport.attempt_delivery(&page_view());
        transport.attempt_delivery(&page_view());
        transport.flush();

        assert!(mock.matched());
        assert!(transport.is_available());

        transport.flush();
        transport.shutdown();
    }

    #[test]
    fn test_flush_after_shutdown_returns() {
        let transport = BeaconTransport::spawn("http://127.0.0.1:1/api/oracle");
        transport.shutdown();

        transport.flush();
    }

    #[test]
    fn test_beacon_after_shutdown_drops_events() {
        let transport = BeaconTransport::spawn("http://127.0.0.1:1/api/oracle");
        transport.shutdown();

        transport.attempt_delivery(&page_view());
        assert!(!transport.is_available());
    }

    #[test]
    fn test_keepalive_is_unavailable_outside_a_runtime() {
        let transport = KeepaliveTransport::new("http://127.0.0.1:1/api/oracle");

        assert!(!transport.is_available());
        transport.attempt_delivery(&page_view());
    }

    #[tokio::test]
    async fn test_keepalive_delivers_without_being_awaited() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/oracle")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(json!({
                "event": "page_view",
                "app": "demo",
            })))
            .with_status(200)
            .create_async()
            .await;

        let transport = KeepaliveTransport::new(format!("{}/api/oracle", server.url()));
        assert!(transport.is_available());
        transport.attempt_delivery(&page_view());

        for _ in 0..50 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_memory_transport_records_and_clears() {
        let memory = MemoryTransport::new();
        memory.attempt_delivery(&page_view());

        assert_eq!(memory.count(|e| e.event_name() == PAGE_VIEW), 1);
        memory.clear();
        assert!(memory.events().is_empty());
    }
}
