//! Poll view state machine
//!
//! ```text
//!            enter(id)                 complete(ticket, Ok)
//!   Idle ───────────────► Loading ─────────────────────────► Ready(detail)
//!    ▲                      │  │
//!    │ reset()              │  └──── complete(ticket, Err) ──► Failed
//!    └──────────────────────┘
//!
//!   any state ──── show(detail) ────► Ready(detail)
//! ```
//!
//! Every `enter` starts a new fetch and hands out a [`FetchTicket`]. A
//! completion is applied only while the view is still waiting on that exact
//! ticket; anything else is a stale response and is dropped. `show` skips the
//! fetch for polls that arrive complete in the cue. The view renders only in
//! `Ready`.

use thiserror::Error;

use super::detail::{PollDetail, PollOption, Vote};
use super::voter::VoterIdGenerator;
use crate::error::FetchError;

/// Duplicate vote handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteGuard {
    /// Every tap submits a vote
    #[default]
    Unguarded,
    /// Only the first tap per rendered poll submits a vote
    OncePerRender,
}

/// Identifies one poll fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Poll id at request time
    pub poll_id: String,
    /// Request sequence number, unique per view
    pub seq: u64,
}

/// Current state of the poll view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollViewState {
    Idle,
    Loading(FetchTicket),
    Ready(PollDetail),
    Failed { poll_id: String, error: FetchError },
}

/// Outcome of applying a fetch completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Ready,
    Failed,
    /// Completion did not match the outstanding ticket and was dropped
    Stale,
}

/// Why a tap did not produce a vote
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteRejected {
    #[error("poll is not ready")]
    NotReady,

    #[error("unknown option {0:?}")]
    UnknownOption(String),

    #[error("already voted on this poll")]
    AlreadyVoted,

    #[error("poll has no id to submit votes for")]
    Unaddressed,
}

/// What the poll overlay draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCard {
    pub poll_id: String,
    pub question: String,
    /// Buttons, in display order
    pub options: Vec<PollOption>,
}

/// Poll view
#[derive(Debug)]
pub struct PollView {
    state: PollViewState,
    next_seq: u64,
    guard: VoteGuard,
    votes_cast: u32,
}

impl PollView {
    pub fn new(guard: VoteGuard) -> Self {
        Self {
            state: PollViewState::Idle,
            next_seq: 1,
            guard,
            votes_cast: 0,
        }
    }

    pub fn state(&self) -> &PollViewState {
        &self.state
    }

    /// Poll id the view is currently bound to
    pub fn poll_id(&self) -> Option<&str> {
        match &self.state {
            PollViewState::Idle => None,
            PollViewState::Loading(ticket) => Some(&ticket.poll_id),
            PollViewState::Ready(detail) => Some(&detail.id),
            PollViewState::Failed { poll_id, .. } => Some(poll_id),
        }
    }

    /// Votes accepted since the last `enter`
    pub fn votes_cast(&self) -> u32 {
        self.votes_cast
    }

    /// Start loading `poll_id`, discarding whatever the view held
    ///
    /// The caller must issue exactly one fetch for the returned ticket.
    pub fn enter(&mut self, poll_id: impl Into<String>) -> FetchTicket {
        let ticket = FetchTicket {
            poll_id: poll_id.into(),
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.votes_cast = 0;
        self.state = PollViewState::Loading(ticket.clone());
        ticket
    }

    /// Show a poll that needs no fetch
    ///
    /// Any fetch still in flight becomes stale.
    pub fn show(&mut self, detail: PollDetail) {
        self.votes_cast = 0;
        self.state = PollViewState::Ready(detail);
    }

    /// Leave poll mode
    pub fn reset(&mut self) {
        self.state = PollViewState::Idle;
        self.votes_cast = 0;
    }

    /// Apply a fetch completion
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<PollDetail, FetchError>,
    ) -> Applied {
        match &self.state {
            PollViewState::Loading(current) if current == ticket => {}
            _ => return Applied::Stale,
        }

        match result {
            Ok(detail) if detail.id == ticket.poll_id => {
                self.state = PollViewState::Ready(detail);
                Applied::Ready
            }
            Ok(detail) => {
                self.state = PollViewState::Failed {
                    poll_id: ticket.poll_id.clone(),
                    error: FetchError::SchemaMismatch(format!(
                        "requested poll {}, received poll {}",
                        ticket.poll_id, detail.id
                    )),
                };
                Applied::Failed
            }
            Err(error) => {
                self.state = PollViewState::Failed {
                    poll_id: ticket.poll_id.clone(),
                    error,
                };
                Applied::Failed
            }
        }
    }

    /// Card to draw, if any. Only a fully loaded poll is ever shown.
    pub fn render(&self) -> Option<PollCard> {
        match &self.state {
            PollViewState::Ready(detail) => Some(PollCard {
                poll_id: detail.id.clone(),
                question: detail.question.clone(),
                options: detail.options.clone(),
            }),
            _ => None,
        }
    }

    /// Handle a tap on `option_id`
    ///
    /// Returns the poll id and the vote to submit.
    pub fn select(
        &mut self,
        option_id: &str,
        voter: &mut dyn VoterIdGenerator,
    ) -> Result<(String, Vote), VoteRejected> {
        let PollViewState::Ready(detail) = &self.state else {
            return Err(VoteRejected::NotReady);
        };

        let option = detail
            .option(option_id)
            .ok_or_else(|| VoteRejected::UnknownOption(option_id.to_string()))?;

        if detail.id.is_empty() {
            return Err(VoteRejected::Unaddressed);
        }

        if self.guard == VoteGuard::OncePerRender && self.votes_cast > 0 {
            return Err(VoteRejected::AlreadyVoted);
        }

        let vote = Vote {
            answer: option.id.clone(),
            user_id: voter.next_id(),
        };
        self.votes_cast += 1;
        Ok((detail.id.clone(), vote))
    }
}

impl Default for PollView {
    fn default() -> Self {
        Self::new(VoteGuard::default())
    }
}
