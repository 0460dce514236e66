//! Online alignment modules
//!
//! Incremental dynamic time warping of a live chroma stream against a fixed
//! reference chromagram:
//! - Growable column-major cost storage
//! - On-line time warping engine (windowed updates, step decisions)
//!
//! # Reference
//!
//! Dixon, S. (2005). Live Tracking of Musical Performances Using On-Line Time
//! Warping. *Proceedings of the 8th International Conference on Digital Audio
//! Effects (DAFx'05)*, 92-97.

pub mod cost_matrix;
pub mod otw;

use serde::{Deserialize, Serialize};

pub use cost_matrix::CostMatrix;
pub use otw::OnlineTimeWarping;

/// Direction of one cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Advance the reference index without consuming live input
    Ref,
    /// Stay on the current reference frame and wait for more live input
    Live,
    /// Advance the reference index and end the call (next live frame follows)
    Both,
}

impl Step {
    /// The alternating counterpart used when a run gets too long
    pub fn opposite(previous: Option<Step>) -> Step {
        match previous {
            Some(Step::Ref) => Step::Live,
            _ => Step::Ref,
        }
    }
}

/// One cell of the alignment grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathPoint {
    /// Reference frame index (row)
    pub ref_index: usize,
    /// Live frame index (column)
    pub live_index: usize,
}

impl PathPoint {
    /// Create a path point
    pub fn new(ref_index: usize, live_index: usize) -> Self {
        Self {
            ref_index,
            live_index,
        }
    }
}

impl From<(usize, usize)> for PathPoint {
    fn from((ref_index, live_index): (usize, usize)) -> Self {
        Self::new(ref_index, live_index)
    }
}
