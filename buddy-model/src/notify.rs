//! Change notifications.
//!
//! An entity reports each effective field write (and each bulk merge) to an
//! optional [`ChangeSink`]. Two sinks ship with the crate:
//! - [`ChangeFeed`] — an unbounded channel with a single consumer; events
//!   arrive in the order they were produced
//! - [`BridgeSink`] — runs a handler on the platform's UI thread

use buddy_platform::PlatformBridge;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// One change to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
    pub entity_type: &'static str,
    pub entity_id: Option<String>,
    /// The field that changed, or `None` after a bulk merge ("any field").
    pub field: Option<String>,
}

impl PropertyChanged {
    /// True for the single notification emitted by a merge.
    pub fn is_bulk(&self) -> bool {
        self.field.is_none()
    }

    /// Whether a subscriber watching `name` should refresh.
    pub fn affects(&self, name: &str) -> bool {
        self.field
            .as_deref()
            .is_none_or(|f| f.eq_ignore_ascii_case(name))
    }
}

/// Receives entity change notifications.
pub trait ChangeSink: Send + Sync {
    fn deliver(&self, change: PropertyChanged);
}

/// Channel-backed sink. Clone it to share one feed between entities.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: mpsc::UnboundedSender<PropertyChanged>,
}

impl ChangeFeed {
    /// Creates a feed and the receiver its single consumer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PropertyChanged>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Creates a feed drained by a spawned task that calls `handler` for
    /// each change, in order. The task ends once every clone of the feed is
    /// dropped. Must be called inside a Tokio runtime.
    pub fn dispatch_to<F>(handler: F) -> (Self, JoinHandle<()>)
    where
        F: Fn(PropertyChanged) + Send + 'static,
    {
        let (feed, mut rx) = Self::channel();
        let task = tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                handler(change);
            }
        });
        (feed, task)
    }
}

impl ChangeSink for ChangeFeed {
    fn deliver(&self, change: PropertyChanged) {
        if self.tx.send(change).is_err() {
            trace!("change feed consumer gone, dropping notification");
        }
    }
}

/// Sink that marshals a handler onto the platform UI thread.
pub struct BridgeSink {
    bridge: Arc<dyn PlatformBridge>,
    handler: Arc<dyn Fn(PropertyChanged) + Send + Sync>,
}

impl BridgeSink {
    pub fn new<F>(bridge: Arc<dyn PlatformBridge>, handler: F) -> Self
    where
        F: Fn(PropertyChanged) + Send + Sync + 'static,
    {
        Self {
            bridge,
            handler: Arc::new(handler),
        }
    }
}

impl ChangeSink for BridgeSink {
    fn deliver(&self, change: PropertyChanged) {
        let handler = Arc::clone(&self.handler);
        self.bridge
            .invoke_on_ui_thread(Box::new(move || handler(change)));
    }
}
