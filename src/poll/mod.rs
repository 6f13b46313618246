//! Poll overlay
//!
//! A poll cue only names the poll. The detail is fetched from the poll
//! service, rendered once it arrives, and taps on an option are submitted
//! back as votes.

pub mod detail;
pub mod gateway;
pub mod view;
pub mod voter;

pub use detail::{PollDetail, PollOption, Vote};
pub use gateway::{HttpPollGateway, PollGateway};
pub use view::{Applied, FetchTicket, PollCard, PollView, PollViewState, VoteGuard, VoteRejected};
pub use voter::{RandomVoterIds, SeededVoterIds, VoterIdGenerator};
