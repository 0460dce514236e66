//! Audio preprocessing modules
//!
//! This module contains utilities for preparing the reference recording:
//! - Channel mixing (multi-channel to mono)
//! - Sample rate conversion
//! - Reference chromagram construction

pub mod channel_mixer;
pub mod reference;
pub mod resample;
