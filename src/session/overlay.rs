//! Overlay session event loop
//!
//! One task owns the overlay store and the poll view. Cues, taps and fetch
//! completions are all applied on that task, so there is a single writer and
//! no locking. Gateway I/O runs in spawned tasks that report back over a
//! channel; the loop never waits on the network.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};

use super::config::{DecodeErrorPolicy, OverlayConfig};
use super::handle::{FetchCompletion, OverlayEvent, OverlayHandle};
use crate::cue::{self, MetadataEnvelope};
use crate::error::ConfigError;
use crate::ingest;
use crate::overlay::{self, Dispatch, OverlayStore, ViewDescriptor};
use crate::poll::{
    Applied, FetchTicket, HttpPollGateway, PollGateway, PollView, PollViewState, RandomVoterIds,
    Vote, VoterIdGenerator,
};
use crate::stats::{Counter, StatsRecorder};

/// Overlay session
///
/// Created together with its [`OverlayHandle`]; drive it with
/// [`OverlaySession::run`], typically on its own task.
pub struct OverlaySession<G: PollGateway> {
    config: OverlayConfig,
    gateway: Arc<G>,
    voter: Box<dyn VoterIdGenerator>,
    store: OverlayStore,
    poll: PollView,
    events: mpsc::Receiver<OverlayEvent>,
    completion_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions: mpsc::UnboundedReceiver<FetchCompletion>,
    view_tx: broadcast::Sender<ViewDescriptor>,
    stats: Arc<StatsRecorder>,
}

impl OverlaySession<HttpPollGateway> {
    /// Session backed by the HTTP poll service and random voter ids
    pub fn connect(
        config: OverlayConfig,
    ) -> Result<
        (
            Self,
            OverlayHandle,
            broadcast::Receiver<ViewDescriptor>,
        ),
        ConfigError,
    > {
        let gateway = HttpPollGateway::new(&config)?;
        Ok(Self::new(config, gateway, RandomVoterIds))
    }
}

impl<G: PollGateway> OverlaySession<G> {
    /// Create a session, its handle, and a receiver for rendered views
    pub fn new(
        config: OverlayConfig,
        gateway: G,
        voter: impl VoterIdGenerator,
    ) -> (Self, OverlayHandle, broadcast::Receiver<ViewDescriptor>) {
        let (tx, events) = mpsc::channel(config.event_capacity.max(1));
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = broadcast::channel(config.view_capacity.max(1));
        let stats = Arc::new(StatsRecorder::new());

        let handle = OverlayHandle::new(tx, view_tx.clone(), Arc::clone(&stats));

        let session = Self {
            poll: PollView::new(config.vote_guard),
            store: OverlayStore::new(),
            config,
            gateway: Arc::new(gateway),
            voter: Box::new(voter),
            events,
            completion_tx,
            completions,
            view_tx,
            stats,
        };

        (session, handle, view_rx)
    }

    /// Process events until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!(
            service = %self.config.service_base_url,
            stream = ?self.config.stream_url,
            policy = ?self.config.decode_error_policy,
            "Overlay session started"
        );

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(OverlayEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event),
                },
                Some(completion) = self.completions.recv() => self.handle_completion(completion),
            }
        }

        self.teardown();
    }

    fn handle_event(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::Cue(text) => self.handle_cue(&text),
            OverlayEvent::ScriptData(body) => self.handle_script_data(body),
            OverlayEvent::SelectOption(option_id) => self.handle_select(&option_id),
            OverlayEvent::BuyNow => self.handle_buy_now(),
            OverlayEvent::Shutdown => {}
        }
    }

    fn handle_cue(&mut self, text: &str) {
        self.stats.incr(Counter::CuesReceived);

        match cue::decode(text) {
            Ok(envelope) => {
                tracing::debug!(
                    metadata_type = %envelope.metadata_type(),
                    version = ?envelope.version,
                    "Cue decoded"
                );
                self.activate(Some(envelope));
            }
            Err(e) => {
                self.stats.record_decode_error(&e);
                tracing::warn!(
                    error = %e,
                    cue = %cue::preview(text),
                    policy = ?self.config.decode_error_policy,
                    "Undecodable cue"
                );

                match self.config.decode_error_policy {
                    DecodeErrorPolicy::Clear => self.activate(None),
                    DecodeErrorPolicy::Retain => {}
                }
            }
        }
    }

    fn handle_script_data(&mut self, body: Bytes) {
        self.stats.incr(Counter::ScriptMessages);

        match ingest::extract_cue(body) {
            Ok(Some(text)) => self.handle_cue(&text),
            Ok(None) => tracing::trace!("Script data without cue"),
            Err(e) => {
                self.stats.incr(Counter::ScriptErrors);
                tracing::warn!(error = %e, "Unreadable script data");
            }
        }
    }

    /// Replace the active overlay and bring the poll view in line with it
    fn activate(&mut self, value: Option<MetadataEnvelope>) {
        let generation = match self.store.set_active(value) {
            Ok(generation) => generation,
            Err(e) => {
                tracing::debug!(error = %e, "Overlay update refused");
                return;
            }
        };
        self.stats.incr(Counter::OverlayUpdates);

        let reference = match overlay::dispatch(self.store.active()) {
            Dispatch::Poll(reference) => Some(reference.clone()),
            _ => None,
        };

        match reference {
            Some(reference) => match reference.inline_detail() {
                Some(detail) => {
                    tracing::debug!(poll_id = %detail.id, "Inline poll shown");
                    self.poll.show(detail);
                }
                // Every poll cue is a fresh load, even for the same id
                None => {
                    let ticket = self.poll.enter(reference.id);
                    self.spawn_fetch(ticket);
                }
            },
            None => self.poll.reset(),
        }

        tracing::debug!(generation = generation, "Overlay updated");
        self.publish_view();
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        self.stats.incr(Counter::FetchesStarted);
        tracing::debug!(poll_id = %ticket.poll_id, seq = ticket.seq, "Poll fetch started");

        let gateway = Arc::clone(&self.gateway);
        let tx = self.completion_tx.clone();

        tokio::spawn(async move {
            let result = gateway.fetch_poll(&ticket.poll_id).await;
            // Session gone: nothing to apply the result to
            let _ = tx.send(FetchCompletion { ticket, result });
        });
    }

    fn handle_completion(&mut self, completion: FetchCompletion) {
        let FetchCompletion { ticket, result } = completion;

        match self.poll.complete(&ticket, result) {
            Applied::Ready => {
                self.stats.incr(Counter::FetchesReady);
                tracing::debug!(poll_id = %ticket.poll_id, "Poll ready");
                self.publish_view();
            }
            Applied::Failed => {
                self.stats.incr(Counter::FetchesFailed);
                if let PollViewState::Failed { error, .. } = self.poll.state() {
                    tracing::warn!(poll_id = %ticket.poll_id, error = %error, "Poll fetch failed");
                }
                self.publish_view();
            }
            Applied::Stale => {
                self.stats.incr(Counter::StaleResponses);
                tracing::trace!(
                    poll_id = %ticket.poll_id,
                    seq = ticket.seq,
                    "Discarding stale poll response"
                );
            }
        }
    }

    fn handle_select(&mut self, option_id: &str) {
        match self.poll.select(option_id, &mut *self.voter) {
            Ok((poll_id, vote)) => self.spawn_vote(poll_id, vote),
            Err(rejected) => {
                self.stats.incr(Counter::VotesRejected);
                tracing::debug!(option_id = %option_id, reason = %rejected, "Vote not sent");
            }
        }
    }

    fn spawn_vote(&self, poll_id: String, vote: Vote) {
        self.stats.incr(Counter::VotesSubmitted);

        let gateway = Arc::clone(&self.gateway);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            if let Err(e) = gateway.submit_vote(&poll_id, &vote).await {
                stats.incr(Counter::VotesFailed);
                tracing::warn!(
                    poll_id = %poll_id,
                    answer = %vote.answer,
                    error = %e,
                    "Vote submission failed"
                );
            }
        });
    }

    fn handle_buy_now(&self) {
        match overlay::dispatch(self.store.active()) {
            Dispatch::Basket(offer) => {
                self.stats.incr(Counter::BuyNowTaps);
                tracing::info!(product_id = %offer.product.id, "Buy now tapped");
            }
            _ => tracing::debug!("Buy now tapped without an active offer"),
        }
    }

    fn publish_view(&self) {
        let view = overlay::render(self.store.active(), &self.poll);
        // Nobody rendering is not an error
        let _ = self.view_tx.send(view);
    }

    fn teardown(&mut self) {
        self.store.close();
        self.poll.reset();
        self.publish_view();

        let stats = self.stats.snapshot();
        tracing::info!(
            cues = stats.cues_received,
            decode_errors = stats.decode_errors(),
            updates = stats.overlay_updates,
            votes = stats.votes_submitted,
            "Overlay session stopped"
        );
    }
}
