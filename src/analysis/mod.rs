//! Alignment result types
//!
//! Collects the output of an offline alignment run:
//! - Per-frame reference positions
//! - Alignment path
//! - Metadata and flags

pub mod result;
