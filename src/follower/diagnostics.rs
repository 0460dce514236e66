//! Retrospective path diagnostics
//!
//! The forward path is greedy: each decision only sees the costs computed so
//! far. Walking back from the cursor through the accumulated costs gives a
//! second opinion, and the cells where the two disagree show where the online
//! path diverged. None of this is needed for real-time following.

use std::collections::HashSet;

use crate::alignment::{CostMatrix, PathPoint};

/// Greedy backtrace from `cursor` through the accumulated cost matrix
///
/// At each cell the cheapest computed predecessor is taken: down
/// `(j - 1, t)`, left `(j, t - 1)` or diagonal `(j - 1, t - 1)`, in that
/// order of preference on ties. The walk covers at most `b` reference frames
/// and stops early at the origin or when no predecessor has been computed.
///
/// The cursor itself is not part of the returned path.
pub fn backwards_path(cost: &CostMatrix, cursor: PathPoint, b: usize) -> Vec<PathPoint> {
    let start = cursor.ref_index;
    let (mut j, mut t) = (cursor.ref_index, cursor.live_index);
    let mut path = Vec::new();

    while start - j < b && (j, t) != (0, 0) {
        let candidates = [
            (j > 0).then(|| (j - 1, t)),
            (t > 0).then(|| (j, t - 1)),
            (j > 0 && t > 0).then(|| (j - 1, t - 1)),
        ];

        let mut best: Option<((usize, usize), f32)> = None;
        for (row, col) in candidates.into_iter().flatten() {
            let value = match cost.try_get(row, col) {
                Some(v) if v.is_finite() => v,
                _ => continue,
            };
            if best.map_or(true, |(_, current)| value < current) {
                best = Some(((row, col), value));
            }
        }

        let Some(((row, col), _)) = best else {
            log::trace!("Backtrace stopped at ({}, {}): no computed predecessor", j, t);
            break;
        };
        path.push(PathPoint::new(row, col));
        j = row;
        t = col;
    }

    path
}

/// Points of `forward` that do not appear in `back`, in forward order
pub fn path_difference(forward: &[PathPoint], back: &[PathPoint]) -> Vec<PathPoint> {
    let back: HashSet<&PathPoint> = back.iter().collect();
    forward
        .iter()
        .filter(|p| !back.contains(p))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(columns: &[[f32; 3]]) -> CostMatrix {
        let mut cost = CostMatrix::new(3);
        for (t, column) in columns.iter().enumerate() {
            cost.push_column();
            for (j, &value) in column.iter().enumerate() {
                cost.set(j, t, value);
            }
        }
        cost
    }

    fn points(cells: &[(usize, usize)]) -> Vec<PathPoint> {
        cells.iter().copied().map(PathPoint::from).collect()
    }

    #[test]
    fn test_follows_cheap_diagonal() {
        let cost = matrix(&[[0.0, 1.0, 2.0], [1.0, 0.5, 1.5], [2.0, 1.5, 1.0]]);
        let path = backwards_path(&cost, PathPoint::new(2, 2), 10);
        assert_eq!(path, points(&[(1, 1), (0, 0)]));
    }

    #[test]
    fn test_limited_by_reference_steps() {
        let cost = matrix(&[[0.0, 1.0, 2.0], [1.0, 0.5, 1.5], [2.0, 1.5, 1.0]]);
        assert_eq!(backwards_path(&cost, PathPoint::new(2, 2), 1), points(&[(1, 1)]));
        assert!(backwards_path(&cost, PathPoint::new(2, 2), 0).is_empty());
    }

    #[test]
    fn test_ties_prefer_down_then_left() {
        let cost = matrix(&[[1.0; 3], [1.0; 3], [1.0; 3]]);
        let path = backwards_path(&cost, PathPoint::new(2, 2), 1);
        assert_eq!(path, points(&[(1, 2)]));

        // Along the first row only "left" is available
        let path = backwards_path(&cost, PathPoint::new(0, 2), 1);
        assert_eq!(path, points(&[(0, 1), (0, 0)]));
    }

    #[test]
    fn test_stops_at_uncomputed_cells() {
        let inf = f32::INFINITY;
        let cost = matrix(&[[0.0, inf, inf], [inf, inf, 0.5]]);
        assert!(backwards_path(&cost, PathPoint::new(2, 1), 5).is_empty());
    }

    #[test]
    fn test_origin_cursor() {
        let cost = matrix(&[[0.0, 1.0, 2.0]]);
        assert!(backwards_path(&cost, PathPoint::new(0, 0), 5).is_empty());
    }

    #[test]
    fn test_path_difference() {
        let forward = points(&[(0, 0), (1, 1), (1, 2), (2, 3)]);
        let back = points(&[(2, 2), (1, 1), (0, 0)]);
        assert_eq!(path_difference(&forward, &back), points(&[(1, 2), (2, 3)]));
        assert_eq!(path_difference(&forward, &[]), forward);
        assert!(path_difference(&[], &back).is_empty());
    }
}
