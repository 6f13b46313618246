//! Interactive overlays driven by timed metadata in live streams
//!
//! A broadcaster embeds small JSON cues in the stream (HLS timed text, or
//! RTMP/FLV script data). Each cue announces either a poll or a product
//! offer. This crate decodes those cues, keeps the single active overlay,
//! loads poll details from the poll service, submits votes, and tells the
//! UI what to draw.
//!
//! # Example
//!
//! ```no_run
//! use stream_overlay::{OverlayConfig, OverlaySession};
//!
//! # async fn run() -> Result<(), stream_overlay::Error> {
//! let config = OverlayConfig::with_base_url("https://polls.example.com/")?;
//! let (session, handle, mut views) = OverlaySession::connect(config)?;
//! tokio::spawn(session.run());
//!
//! handle.on_cue(r#"{"type":"poll","data":{"id":"abc"}}"#).await?;
//! while let Ok(view) = views.recv().await {
//!     println!("{:?}", view);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cue;
pub mod error;
pub mod ingest;
pub mod overlay;
pub mod poll;
pub mod session;
pub mod stats;

pub use cue::{decode, MetadataEnvelope, MetadataType};
pub use error::{Error, Result};
pub use overlay::{BasketCard, ViewDescriptor};
pub use poll::{HttpPollGateway, PollCard, PollGateway, VoteGuard};
pub use session::{DecodeErrorPolicy, OverlayConfig, OverlayHandle, OverlaySession};
pub use stats::OverlayStats;
