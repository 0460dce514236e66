//! Audio I/O modules
//!
//! Audio decoding using Symphonia and hop-based sample buffering for live chunks.

pub mod decoder;
pub mod sample_buffer;
