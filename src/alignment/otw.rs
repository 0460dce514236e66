//! On-line time warping engine
//!
//! Aligns a live chroma stream against a fixed reference chromagram one
//! frame at a time. Only a window of `c` cells behind the cursor is updated
//! per step, so each call costs `O(c)` cost evaluations plus a scan of the
//! current row and column.
//!
//! # Algorithm
//!
//! For every inserted live frame `t`:
//!
//! 1. Compute costs for reference rows `[j - c + 1, j]` in column `t`
//! 2. Loop over step decisions:
//!    - Find the cheapest cell in row `j` (over all live columns) and in
//!      column `t` (over all reference rows)
//!    - Column minimum strictly cheaper → LIVE (the newest frame matches an
//!      earlier reference frame; wait for more input)
//!    - Otherwise, row minimum at an earlier live column → REF (the
//!      performance is past this reference frame)
//!    - Both minima at the cursor → BOTH
//!    - Overrides: warm-up (`t < c`) forces BOTH, a run of `max_run_count`
//!      identical decisions forces the opposite, and the last reference
//!      frame forces LIVE
//!    - REF and BOTH advance `j` and compute row `j` over columns `[t - c + 1, t]`
//! 3. Report the reference index of the best cell, clamped so it never decreases
//!
//! # Example
//!
//! ```
//! use stratum_follow::alignment::OnlineTimeWarping;
//! use stratum_follow::config::AlignmentConfig;
//! use stratum_follow::features::chroma::Chromagram;
//!
//! let mut frames = Vec::new();
//! for k in 0..5 {
//!     let mut v = [0.0f32; 12];
//!     v[k] = 1.0;
//!     frames.push(v);
//! }
//! let reference = Chromagram::from_columns(&frames);
//! let mut otw = OnlineTimeWarping::new(reference, AlignmentConfig::default())?;
//!
//! let mut position = 0;
//! for frame in &frames {
//!     position = otw.insert(frame)?;
//! }
//! assert_eq!(position, 4);
//! # Ok::<(), stratum_follow::FollowerError>(())
//! ```

use super::{CostMatrix, PathPoint, Step};
use crate::config::{AlignmentConfig, DiagonalWeighting};
use crate::error::FollowerError;
use crate::features::chroma::{dot, ChromaVector, Chromagram, CHROMA_BINS};

/// Incremental DTW state for one following session
#[derive(Debug, Clone)]
pub struct OnlineTimeWarping {
    reference: Chromagram,
    live: Chromagram,
    cost: CostMatrix,
    config: AlignmentConfig,
    capacity: Option<usize>,

    ref_index: usize,
    /// Number of live frames inserted; the live index is `live_len - 1`
    live_len: usize,
    previous_step: Option<Step>,
    run_count: usize,
    last_estimate: usize,

    path: Vec<PathPoint>,
    raw_estimates: Vec<usize>,
    step_history: Vec<Step>,
}

impl OnlineTimeWarping {
    /// Start a session against `reference`
    ///
    /// # Errors
    ///
    /// - `FollowerError::InvalidConfig` for invalid parameters, or when
    ///   `capacity_factor` times the reference length overflows
    /// - `FollowerError::InvalidInput` for an empty reference, or one with a
    ///   partial column or non-finite values
    pub fn new(reference: Chromagram, config: AlignmentConfig) -> Result<Self, FollowerError> {
        config.validate()?;
        reference.validate()?;
        if reference.is_empty() {
            return Err(FollowerError::InvalidInput(
                "Reference chromagram is empty".to_string(),
            ));
        }

        let ref_len = reference.len();
        let capacity = match config.capacity_factor {
            Some(factor) => Some(ref_len.checked_mul(factor).ok_or_else(|| {
                FollowerError::InvalidConfig(format!(
                    "Live capacity overflows: {} reference frames x capacity factor {}",
                    ref_len, factor
                ))
            })?),
            None => None,
        };

        log::debug!(
            "Starting online time warping: ref_len={}, capacity={:?}, c={}, max_run_count={}, diag_weight={:.2}",
            ref_len,
            capacity,
            config.window,
            config.max_run_count,
            config.diag_weight
        );

        Ok(Self {
            live: Chromagram::with_capacity(ref_len),
            cost: CostMatrix::new(ref_len),
            reference,
            config,
            capacity,
            ref_index: 0,
            live_len: 0,
            previous_step: None,
            run_count: 1,
            last_estimate: 0,
            path: Vec::new(),
            raw_estimates: Vec::new(),
            step_history: Vec::new(),
        })
    }

    /// Insert the next live chroma vector and return the estimated reference frame
    ///
    /// The returned index never decreases from one call to the next.
    ///
    /// # Errors
    ///
    /// - `FollowerError::InvalidInput` if `live` does not have 12 finite elements
    /// - `FollowerError::CapacityExceeded` once the live buffer is full
    ///
    /// State is left untouched when an error is returned.
    pub fn insert(&mut self, live: &[f32]) -> Result<usize, FollowerError> {
        if live.len() != CHROMA_BINS {
            return Err(FollowerError::InvalidInput(format!(
                "Live chroma vector has {} elements, expected {}",
                live.len(),
                CHROMA_BINS
            )));
        }
        if live.iter().any(|x| !x.is_finite()) {
            return Err(FollowerError::InvalidInput(
                "Live chroma vector contains non-finite values".to_string(),
            ));
        }
        if let Some(capacity) = self.capacity {
            if self.live_len >= capacity {
                return Err(FollowerError::CapacityExceeded { capacity });
            }
        }

        let mut column: ChromaVector = [0.0; CHROMA_BINS];
        column.copy_from_slice(live);
        self.live.push(&column);
        self.cost.push_column();
        self.live_len += 1;

        let t = self.live_len - 1;
        let c = self.config.window;

        for j in self.ref_index.saturating_sub(c - 1)..=self.ref_index {
            self.update_cost(j, t);
        }

        let best = loop {
            let (step, best) = self.best_step();
            if step == Step::Live {
                break best;
            }

            self.ref_index = (self.ref_index + 1).min(self.ref_len() - 1);
            for k in t.saturating_sub(c - 1)..=t {
                self.update_cost(self.ref_index, k);
            }

            if step == Step::Both {
                break best;
            }
        };

        self.raw_estimates.push(best.ref_index);
        self.path.push(PathPoint::new(self.ref_index, t));

        let estimate = best.ref_index.max(self.last_estimate);
        self.last_estimate = estimate;

        log::trace!(
            "live={} cursor=({}, {}) best=({}, {}) estimate={}",
            t,
            self.ref_index,
            t,
            best.ref_index,
            best.live_index,
            estimate
        );

        Ok(estimate)
    }

    /// Decide the next step and update the run-length state
    fn best_step(&mut self) -> (Step, PathPoint) {
        let j = self.ref_index;
        let t = self.live_len - 1;
        debug_assert!(self.cost.is_computed(j, t), "cursor cell ({}, {}) not computed", j, t);

        let mut best_t = self.cost.argmin_in_row(j, t);
        let mut best_j = self.cost.argmin_in_col(t, j);

        let mut step = if self.cost.get(best_j, t) < self.cost.get(j, best_t) {
            best_t = t;
            Step::Live
        } else {
            best_j = j;
            Step::Ref
        };

        if best_t == t && best_j == j {
            step = Step::Both;
        }

        if t < self.config.window {
            step = Step::Both;
        }

        if self.run_count >= self.config.max_run_count {
            step = Step::opposite(self.previous_step);
        }

        if step == Step::Both || self.previous_step != Some(step) {
            self.run_count = 1;
        } else {
            self.run_count += 1;
        }
        self.previous_step = Some(step);
        self.step_history.push(step);

        // Nothing left to align against: only live input can move
        if j == self.ref_len() - 1 {
            step = Step::Live;
        }

        (step, PathPoint::new(best_j, best_t))
    }

    /// Evaluate the DTW recurrence at (reference row `j`, live column `t`)
    fn update_cost(&mut self, j: usize, t: usize) {
        let local = 1.0 - dot(self.reference.column(j), self.live.column(t));

        if j == 0 && t == 0 {
            self.cost.set(0, 0, local);
            return;
        }

        let diag = (j > 0 && t > 0).then(|| self.cost.get(j - 1, t - 1));
        let up = (j > 0).then(|| self.cost.get(j - 1, t));
        let left = (t > 0).then(|| self.cost.get(j, t - 1));
        let w = self.config.diag_weight;

        let value = match self.config.diagonal_weighting {
            DiagonalWeighting::AccumulatedCost => {
                let best = [diag.map(|d| w * d), up, left]
                    .into_iter()
                    .flatten()
                    .fold(f32::INFINITY, f32::min);
                local + best
            }
            DiagonalWeighting::LocalCost => [
                diag.map(|d| d + w * local),
                up.map(|u| u + local),
                left.map(|l| l + local),
            ]
            .into_iter()
            .flatten()
            .fold(f32::INFINITY, f32::min),
        };

        self.cost.set(j, t, value);
    }

    /// Number of reference frames
    pub fn ref_len(&self) -> usize {
        self.reference.len()
    }

    /// Current reference index of the cursor
    pub fn ref_index(&self) -> usize {
        self.ref_index
    }

    /// Current live index of the cursor (`None` before the first insert)
    pub fn live_index(&self) -> Option<usize> {
        self.live_len.checked_sub(1)
    }

    /// Number of live frames inserted so far
    pub fn live_len(&self) -> usize {
        self.live_len
    }

    /// Maximum number of live frames (`None` if unbounded)
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// True once no further live frame can be inserted
    pub fn is_exhausted(&self) -> bool {
        self.capacity.map_or(false, |capacity| self.live_len >= capacity)
    }

    /// Last value returned by [`insert`](Self::insert)
    pub fn last_estimate(&self) -> usize {
        self.last_estimate
    }

    /// Cursor position after each insert
    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    /// Unclamped estimate of each insert (may move backwards)
    pub fn raw_estimates(&self) -> &[usize] {
        &self.raw_estimates
    }

    /// Every step decision taken, before the end-of-reference override
    pub fn step_history(&self) -> &[Step] {
        &self.step_history
    }

    /// Accumulated cost matrix
    pub fn cost_matrix(&self) -> &CostMatrix {
        &self.cost
    }

    /// Reference chromagram
    pub fn reference(&self) -> &Chromagram {
        &self.reference
    }

    /// Live chromagram received so far
    pub fn live(&self) -> &Chromagram {
        &self.live
    }

    /// Alignment parameters
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }
}
