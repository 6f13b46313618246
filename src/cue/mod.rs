//! Metadata cues
//!
//! A cue is an opaque text payload delivered on the stream's timed metadata
//! track. This module holds the typed envelope model and the decoder that
//! produces it.

pub mod decoder;
pub mod envelope;

pub use decoder::{decode, preview};
pub use envelope::{
    BasketOffer, InlinePoll, Metadata, MetadataEnvelope, MetadataType, PollReference, Product,
};
