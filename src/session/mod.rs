//! Overlay session
//!
//! Ties the pieces together: cues and script data come in through an
//! [`OverlayHandle`], the [`OverlaySession`] loop decodes them, updates the
//! active overlay, drives poll fetches and votes, and publishes a
//! [`ViewDescriptor`](crate::overlay::ViewDescriptor) after every change.
//!
//! ```text
//!   player ──on_cue()──► OverlayHandle ──mpsc──► OverlaySession::run()
//!                                                   │   ▲
//!                                    tokio::spawn   │   │ FetchCompletion
//!                                                   ▼   │
//!                                               PollGateway
//!                                                   │
//!   UI ◄──────────── broadcast<ViewDescriptor> ◄────┘
//! ```

pub mod config;
pub mod handle;
pub mod overlay;

pub use config::{DecodeErrorPolicy, OverlayConfig};
pub use handle::OverlayHandle;
pub use overlay::OverlaySession;
