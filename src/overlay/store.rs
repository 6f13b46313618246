//! Overlay state store
//!
//! Single slot holding the active envelope. `set_active` is the only
//! mutation. Every call returns a fresh generation, including calls that store
//! a value equal to the previous one: a repeated cue is a new event, and the
//! owner re-renders once per generation.

use crate::cue::MetadataEnvelope;
use crate::error::StoreError;

/// Single-slot overlay store
///
/// Owned by one writer (the overlay session), which turns each accepted
/// `set_active` into exactly one published view.
#[derive(Debug, Default)]
pub struct OverlayStore {
    active: Option<MetadataEnvelope>,
    generation: u64,
    closed: bool,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active envelope
    pub fn active(&self) -> Option<&MetadataEnvelope> {
        self.active.as_ref()
    }

    /// Number of accepted `set_active` calls so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Replace the active envelope
    ///
    /// Returns the generation of this update, starting at 1.
    pub fn set_active(&mut self, value: Option<MetadataEnvelope>) -> Result<u64, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }

        self.generation += 1;
        self.active = value;
        Ok(self.generation)
    }

    /// Tear down. Later `set_active` calls are refused.
    pub fn close(&mut self) {
        self.closed = true;
        self.active = None;
    }
}
