//! Overlay state and rendering
//!
//! ```text
//!   cue ──► decode ──► OverlayStore::set_active ──► dispatch ──► ViewDescriptor
//!                          (single slot)               │
//!                                                      ├─► PollView (async detail)
//!                                                      └─► BasketCard
//! ```

pub mod basket;
pub mod dispatch;
pub mod store;

pub use basket::{BasketCard, BUY_NOW_LABEL};
pub use dispatch::{dispatch, render, Dispatch, ViewDescriptor};
pub use store::OverlayStore;
