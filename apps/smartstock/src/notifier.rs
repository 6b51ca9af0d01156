//! # Notifications
//!
//! Delivery of ledger events (CRUD toasts, low-stock alerts) off the
//! command path.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventoryService::execute                                              │
//! │        │ handle.emit(events)  (try_send, never blocks a command)        │
//! │        ▼                                                                │
//! │  mpsc queue ──► NotificationDispatcher::run (background task)           │
//! │                        │                                                │
//! │                        ├──► TracingNotifier   (log line)                │
//! │                        ├──► ChannelNotifier   (broadcast to UIs)        │
//! │                        └──► ...               (email, push)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing notifier is logged and skipped. It never fails the command
//! that produced the event.

use std::sync::Arc;

use async_trait::async_trait;
use smartstock_core::{Event, EventKind};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,

    #[error("Delivery failed: {0}")]
    Failed(String),
}

// =============================================================================
// Notifier Trait
// =============================================================================

/// A destination for ledger events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn notify(&self, event: &Event) -> Result<(), NotifyError>;
}

/// Writes every event to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        match event.kind {
            EventKind::Crud => info!(title = %event.title, "{}", event.body),
            EventKind::LowStock => warn!(
                title = %event.title,
                product_id = event.product_id.as_deref().unwrap_or_default(),
                "{}",
                event.body
            ),
        }
        Ok(())
    }
}

/// Fans events out to any number of in-process subscribers.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<Event>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        ChannelNotifier { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    fn name(&self) -> &str {
        "channel"
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        if self.tx.send(event.clone()).is_err() {
            debug!(title = %event.title, "No notification subscribers");
        }
        Ok(())
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Sending side of the dispatcher queue, held by the service.
#[derive(Debug, Clone)]
pub struct NotificationHandle {
    event_tx: mpsc::Sender<Event>,
    shutdown_tx: mpsc::Sender<()>,
}

impl NotificationHandle {
    /// Queues events for delivery. Drops (and logs) what does not fit.
    pub fn emit(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            if let Err(e) = self.event_tx.try_send(event) {
                warn!(error = %e, "Dropping notification");
            }
        }
    }

    /// Stops the dispatcher after it drains what is already queued.
    pub async fn shutdown(&self) -> Result<(), NotifyError> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| NotifyError::Closed)
    }
}

/// Background task delivering queued events to every notifier.
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
    event_rx: mpsc::Receiver<Event>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl NotificationDispatcher {
    pub fn new(
        notifiers: Vec<Arc<dyn Notifier>>,
        capacity: usize,
    ) -> (Self, NotificationHandle) {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let dispatcher = NotificationDispatcher {
            notifiers,
            event_rx,
            shutdown_rx,
        };
        let handle = NotificationHandle {
            event_tx,
            shutdown_tx,
        };

        (dispatcher, handle)
    }

    /// Creates a dispatcher and spawns its loop on the current runtime.
    pub fn spawn(notifiers: Vec<Arc<dyn Notifier>>, capacity: usize) -> NotificationHandle {
        let (dispatcher, handle) = Self::new(notifiers, capacity);
        tokio::spawn(dispatcher.run());
        handle
    }

    /// Runs the delivery loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(notifiers = self.notifiers.len(), "Notification dispatcher starting");

        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    self.deliver(&event).await;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Notification dispatcher shutting down");
                    break;
                }
            }
        }

        while let Ok(event) = self.event_rx.try_recv() {
            self.deliver(&event).await;
        }

        info!("Notification dispatcher stopped");
    }

    async fn deliver(&self, event: &Event) {
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(event).await {
                warn!(notifier = notifier.name(), error = %e, title = %event.title, "Notification failed");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
