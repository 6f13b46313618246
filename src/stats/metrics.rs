//! Statistics for overlay sessions

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::DecodeError;

/// Snapshot of overlay session counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Cue texts handed to the decoder
    pub cues_received: u64,
    /// Script data messages received (with or without a cue)
    pub script_messages: u64,
    /// Script data messages that failed to parse
    pub script_errors: u64,
    /// Cues that were not structured data
    pub decode_malformed: u64,
    /// Cues with a missing or unknown type
    pub decode_unknown_type: u64,
    /// Cues with a known type but a bad payload
    pub decode_schema_mismatch: u64,
    /// `set_active` calls
    pub overlay_updates: u64,
    /// Poll fetches issued
    pub fetches_started: u64,
    /// Poll fetches that reached the ready state
    pub fetches_ready: u64,
    /// Poll fetches that failed
    pub fetches_failed: u64,
    /// Fetch completions discarded as stale
    pub stale_responses: u64,
    /// Votes handed to the gateway
    pub votes_submitted: u64,
    /// Vote submissions the gateway reported as failed
    pub votes_failed: u64,
    /// Taps that did not produce a vote
    pub votes_rejected: u64,
    /// Taps on the basket call to action
    pub buy_now_taps: u64,
    /// Time since the session started
    pub uptime: Duration,
}

impl OverlayStats {
    /// Total decode failures of any kind
    pub fn decode_errors(&self) -> u64 {
        self.decode_malformed + self.decode_unknown_type + self.decode_schema_mismatch
    }
}

/// Shared counters behind [`OverlayStats`]
///
/// Written by the session loop and by the tasks it spawns.
#[derive(Debug)]
pub struct StatsRecorder {
    started_at: Instant,
    cues_received: AtomicU64,
    script_messages: AtomicU64,
    script_errors: AtomicU64,
    decode_malformed: AtomicU64,
    decode_unknown_type: AtomicU64,
    decode_schema_mismatch: AtomicU64,
    overlay_updates: AtomicU64,
    fetches_started: AtomicU64,
    fetches_ready: AtomicU64,
    fetches_failed: AtomicU64,
    stale_responses: AtomicU64,
    votes_submitted: AtomicU64,
    votes_failed: AtomicU64,
    votes_rejected: AtomicU64,
    buy_now_taps: AtomicU64,
}

/// Counter selector for [`StatsRecorder::incr`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    CuesReceived,
    ScriptMessages,
    ScriptErrors,
    OverlayUpdates,
    FetchesStarted,
    FetchesReady,
    FetchesFailed,
    StaleResponses,
    VotesSubmitted,
    VotesFailed,
    VotesRejected,
    BuyNowTaps,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            cues_received: AtomicU64::new(0),
            script_messages: AtomicU64::new(0),
            script_errors: AtomicU64::new(0),
            decode_malformed: AtomicU64::new(0),
            decode_unknown_type: AtomicU64::new(0),
            decode_schema_mismatch: AtomicU64::new(0),
            overlay_updates: AtomicU64::new(0),
            fetches_started: AtomicU64::new(0),
            fetches_ready: AtomicU64::new(0),
            fetches_failed: AtomicU64::new(0),
            stale_responses: AtomicU64::new(0),
            votes_submitted: AtomicU64::new(0),
            votes_failed: AtomicU64::new(0),
            votes_rejected: AtomicU64::new(0),
            buy_now_taps: AtomicU64::new(0),
        }
    }

    pub fn incr(&self, counter: Counter) {
        let cell = match counter {
            Counter::CuesReceived => &self.cues_received,
            Counter::ScriptMessages => &self.script_messages,
            Counter::ScriptErrors => &self.script_errors,
            Counter::OverlayUpdates => &self.overlay_updates,
            Counter::FetchesStarted => &self.fetches_started,
            Counter::FetchesReady => &self.fetches_ready,
            Counter::FetchesFailed => &self.fetches_failed,
            Counter::StaleResponses => &self.stale_responses,
            Counter::VotesSubmitted => &self.votes_submitted,
            Counter::VotesFailed => &self.votes_failed,
            Counter::VotesRejected => &self.votes_rejected,
            Counter::BuyNowTaps => &self.buy_now_taps,
        };
        cell.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a decode failure by kind
    pub fn record_decode_error(&self, error: &DecodeError) {
        let cell = match error {
            DecodeError::Malformed(_) => &self.decode_malformed,
            DecodeError::UnknownType(_) => &self.decode_unknown_type,
            DecodeError::SchemaMismatch { .. } => &self.decode_schema_mismatch,
        };
        cell.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> OverlayStats {
        let load = |cell: &AtomicU64| cell.load(Ordering::Relaxed);
        OverlayStats {
            cues_received: load(&self.cues_received),
            script_messages: load(&self.script_messages),
            script_errors: load(&self.script_errors),
            decode_malformed: load(&self.decode_malformed),
            decode_unknown_type: load(&self.decode_unknown_type),
            decode_schema_mismatch: load(&self.decode_schema_mismatch),
            overlay_updates: load(&self.overlay_updates),
            fetches_started: load(&self.fetches_started),
            fetches_ready: load(&self.fetches_ready),
            fetches_failed: load(&self.fetches_failed),
            stale_responses: load(&self.stale_responses),
            votes_submitted: load(&self.votes_submitted),
            votes_failed: load(&self.votes_failed),
            votes_rejected: load(&self.votes_rejected),
            buy_now_taps: load(&self.buy_now_taps),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
