//! Shared utilities: lazily cached values and frame pacing.

pub mod cached;
pub mod frame_timing;
