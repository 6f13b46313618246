//! External handle to a running overlay session
//!
//! The handle is what the player and the UI layer hold. Every method enqueues
//! one event for the session loop; events are processed in the order they
//! were enqueued.
//!
//! The queue is bounded (`OverlayConfig::event_capacity`). The async methods
//! wait for room when it is full. Player callbacks that must return at once
//! use [`OverlayHandle::try_on_cue`] instead, which fails with
//! [`Error::QueueFull`].

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};

use crate::error::{Error, FetchError, Result};
use crate::overlay::ViewDescriptor;
use crate::poll::{FetchTicket, PollDetail};
use crate::stats::{OverlayStats, StatsRecorder};

/// Inbound session events
#[derive(Debug)]
pub(crate) enum OverlayEvent {
    /// Timed-text cue from the player
    Cue(String),
    /// RTMP/FLV script data message from the player
    ScriptData(Bytes),
    /// Tap on a poll option
    SelectOption(String),
    /// Tap on the basket call to action
    BuyNow,
    Shutdown,
}

/// Poll fetch result reported back by a spawned fetch task
#[derive(Debug)]
pub(crate) struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: std::result::Result<PollDetail, FetchError>,
}

/// Cloneable handle to an [`OverlaySession`](super::OverlaySession)
///
/// The session stops once [`OverlayHandle::shutdown`] is called or every
/// handle has been dropped.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    tx: mpsc::Sender<OverlayEvent>,
    view_tx: broadcast::Sender<ViewDescriptor>,
    stats: Arc<StatsRecorder>,
}

impl OverlayHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<OverlayEvent>,
        view_tx: broadcast::Sender<ViewDescriptor>,
        stats: Arc<StatsRecorder>,
    ) -> Self {
        Self { tx, view_tx, stats }
    }

    /// Deliver a timed metadata cue, waiting for queue space
    pub async fn on_cue(&self, text: impl Into<String>) -> Result<()> {
        self.send(OverlayEvent::Cue(text.into())).await
    }

    /// Deliver a timed metadata cue without waiting
    ///
    /// A full queue drops the cue and returns [`Error::QueueFull`].
    pub fn try_on_cue(&self, text: impl Into<String>) -> Result<()> {
        self.tx
            .try_send(OverlayEvent::Cue(text.into()))
            .map_err(|e| match e {
                TrySendError::Full(_) => Error::QueueFull,
                TrySendError::Closed(_) => Error::SessionClosed,
            })
    }

    /// Deliver an RTMP/FLV script data body (AMF0)
    pub async fn on_script_data(&self, body: Bytes) -> Result<()> {
        self.send(OverlayEvent::ScriptData(body)).await
    }

    /// The viewer tapped a poll option
    pub async fn select_option(&self, option_id: impl Into<String>) -> Result<()> {
        self.send(OverlayEvent::SelectOption(option_id.into())).await
    }

    /// The viewer tapped "Buy now"
    pub async fn buy_now(&self) -> Result<()> {
        self.send(OverlayEvent::BuyNow).await
    }

    /// Ask the session to stop
    pub async fn shutdown(&self) -> Result<()> {
        self.send(OverlayEvent::Shutdown).await
    }

    /// Receive every view published from now on
    pub fn subscribe_views(&self) -> broadcast::Receiver<ViewDescriptor> {
        self.view_tx.subscribe()
    }

    /// Current counters
    pub fn stats(&self) -> OverlayStats {
        self.stats.snapshot()
    }

    /// Whether the session loop has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, event: OverlayEvent) -> Result<()> {
        self.tx.send(event).await.map_err(|_| Error::SessionClosed)
    }
}
