//! Recording render sink for testing.

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::session::SessionId;
use crate::sse::StreamEvent;
use crate::traits::{EndReason, RenderSink};

/// Render sink that records everything it receives.
///
/// Both callbacks wake waiters, so tests can await deliveries instead of
/// sleeping.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(SessionId, StreamEvent)>>,
    ends: Mutex<Vec<(SessionId, EndReason)>>,
    delivered: Notify,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All recorded events, in delivery order.
    pub fn events(&self) -> Vec<(SessionId, StreamEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Events delivered for one session only.
    pub fn events_for(&self, session: SessionId) -> Vec<StreamEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == session)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// All terminal notifications, in delivery order.
    pub fn ends(&self) -> Vec<(SessionId, EndReason)> {
        self.ends.lock().unwrap().clone()
    }

    /// Wait until at least `count` events have been delivered.
    pub async fn wait_for_events(&self, count: usize) {
        loop {
            let notified = self.delivered.notified();
            tokio::pin!(notified);
            // Register before checking, so a notification between the
            // check and the await is not lost.
            notified.as_mut().enable();
            if self.events.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Wait until at least `count` sessions have ended.
    pub async fn wait_for_ends(&self, count: usize) {
        loop {
            let notified = self.delivered.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.ends.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

impl RenderSink for RecordingSink {
    fn on_event(&self, session: SessionId, event: StreamEvent) {
        self.events.lock().unwrap().push((session, event));
        self.delivered.notify_waiters();
    }

    fn session_ended(&self, session: SessionId, reason: EndReason) {
        self.ends.lock().unwrap().push((session, reason));
        self.delivered.notify_waiters();
    }
}
