//! Backend reachability tracking.
//!
//! The monitor is a small state machine over [`ConnectionState`]:
//!
//! ```text
//! Unknown ──probe──► Connected
//!    ▲   └─────────► Disconnected
//!    └──── probe ◄──────┘
//! ```
//!
//! Every probe passes through `Unknown` and settles with exactly one
//! [`ConnectionEvent`]. Nothing retries on a timer; callers probe again when
//! the user asks to.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use docqa_client::DocumentApi;
use docqa_core::{ConnectionState, Notification};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The outcome of a settled probe or a demotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The backend answered; documents should be loaded once.
    Established,
    /// The backend is unreachable; the notification is shown once.
    Lost(Notification),
}

/// Probes backend reachability and publishes the current state.
pub struct ConnectionMonitor {
    api: Arc<dyn DocumentApi>,
    endpoint: String,
    state: watch::Sender<ConnectionState>,
    probing: AtomicBool,
}

impl std::fmt::Debug for ConnectionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMonitor")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight flag when a probe finishes or is dropped.
struct ProbeGuard<'a>(&'a AtomicBool);

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConnectionMonitor {
    /// Create a monitor in the `Unknown` state. `endpoint` is only used in
    /// user-facing messages.
    pub fn new(api: Arc<dyn DocumentApi>, endpoint: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Unknown);
        Self {
            api,
            endpoint: endpoint.into(),
            state,
            probing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Probe the backend once.
    ///
    /// Returns `None` without issuing a request when another probe is
    /// already in flight; that probe reports the event.
    pub async fn probe(&self) -> Option<ConnectionEvent> {
        if self.probing.swap(true, Ordering::AcqRel) {
            debug!("probe already in flight");
            return None;
        }
        let _guard = ProbeGuard(&self.probing);

        self.state.send_replace(ConnectionState::Unknown);
        debug!(endpoint = %self.endpoint, "probing backend");

        if self.api.health_check().await {
            self.state.send_replace(ConnectionState::Connected);
            info!(endpoint = %self.endpoint, "backend connected");
            Some(ConnectionEvent::Established)
        } else {
            self.state.send_replace(ConnectionState::Disconnected);
            warn!(endpoint = %self.endpoint, "backend unreachable");
            Some(ConnectionEvent::Lost(self.lost_notification()))
        }
    }

    /// Demote a connected monitor after an operation failed to reach the
    /// backend. No-op in any other state.
    pub fn report_unreachable(&self) -> Option<ConnectionEvent> {
        let demoted = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
        if demoted {
            warn!(endpoint = %self.endpoint, "backend connection lost");
            Some(ConnectionEvent::Lost(self.lost_notification()))
        } else {
            None
        }
    }

    fn lost_notification(&self) -> Notification {
        Notification::error(
            "Backend Connection Failed",
            format!("Please ensure the backend is running on {}", self.endpoint),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingApi;

    fn monitor(api: &Arc<RecordingApi>) -> ConnectionMonitor {
        ConnectionMonitor::new(api.clone(), "http://localhost:8000")
    }

    #[tokio::test]
    async fn starts_unknown() {
        let api = Arc::new(RecordingApi::new());
        let monitor = monitor(&api);
        assert_eq!(monitor.state(), ConnectionState::Unknown);
        assert_eq!(api.health_calls(), 0);
    }

    #[tokio::test]
    async fn healthy_probe_connects() {
        let api = Arc::new(RecordingApi::new());
        let monitor = monitor(&api);

        let event = monitor.probe().await;
        assert_eq!(event, Some(ConnectionEvent::Established));
        assert_eq!(monitor.state(), ConnectionState::Connected);
        assert_eq!(api.health_calls(), 1);
    }

    #[tokio::test]
    async fn failed_probe_disconnects_with_notification() {
        let api = Arc::new(RecordingApi::new());
        api.set_healthy(false);
        let monitor = monitor(&api);

        let Some(ConnectionEvent::Lost(notification)) = monitor.probe().await else {
            panic!("expected Lost event");
        };
        assert!(notification.is_error());
        assert_eq!(notification.title, "Backend Connection Failed");
        assert!(notification.description.contains("http://localhost:8000"));
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn retry_after_disconnect() {
        let api = Arc::new(RecordingApi::new());
        api.set_healthy(false);
        let monitor = monitor(&api);
        monitor.probe().await;

        api.set_healthy(true);
        let mut rx = monitor.subscribe();
        let event = monitor.probe().await;
        assert_eq!(event, Some(ConnectionEvent::Established));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Connected);
        assert_eq!(api.health_calls(), 2);
    }

    #[tokio::test]
    async fn report_unreachable_demotes_once() {
        let api = Arc::new(RecordingApi::new());
        let monitor = monitor(&api);
        monitor.probe().await;

        assert!(matches!(
            monitor.report_unreachable(),
            Some(ConnectionEvent::Lost(_))
        ));
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
        assert_eq!(monitor.report_unreachable(), None);
    }

    #[tokio::test]
    async fn report_unreachable_ignored_before_probe() {
        let api = Arc::new(RecordingApi::new());
        let monitor = monitor(&api);
        assert_eq!(monitor.report_unreachable(), None);
        assert_eq!(monitor.state(), ConnectionState::Unknown);
    }

    #[tokio::test]
    async fn concurrent_probes_coalesce() {
        let api = Arc::new(RecordingApi::new());
        let monitor = monitor(&api);

        let (a, b) = tokio::join!(monitor.probe(), monitor.probe());
        let events: Vec<_> = [a, b].into_iter().flatten().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(api.health_calls(), 1);
    }
}
