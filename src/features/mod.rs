//! Feature extraction modules
//!
//! This module contains the streaming feature pipeline:
//! - Pitch mapping (FFT bin to MIDI pitch energy redistribution)
//! - CENS chroma extraction

pub mod chroma;
