//! Run event fan-out
//!
//! Every subscriber gets its own unbounded queue, so a slow listener never
//! loses a per-item decision. Progress events are throttled at the source,
//! which keeps the queues short.

use modelgrab_types::RunEvent;
use tokio::sync::mpsc;

#[derive(Clone, Default)]
pub struct EventSink {
    subscribers: Vec<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it sees every event emitted from now on.
    ///
    /// The receiver ends once every clone of this sink is dropped.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&self, event: RunEvent) {
        for tx in &self.subscribers {
            let _ = tx.send(event.clone());
        }
    }
}
