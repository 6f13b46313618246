//! Overlay session statistics

pub mod metrics;

pub use metrics::{Counter, OverlayStats, StatsRecorder};
