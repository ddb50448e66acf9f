//! Tour construction and improvement over a [`DistanceOracle`].
//!
//! Tours are open: they leave node `0` (the start) and never return to it.

use tracing::{debug, warn};

use super::oracle::DistanceOracle;

/// Start node index within every oracle.
pub const START_NODE: usize = 0;

/// Result of the greedy construction phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Construction {
    /// Visiting order as oracle node indices (never contains the start).
    pub order: Vec<usize>,
    /// Nodes that could not be reached from the tour.
    pub unreachable: Vec<usize>,
}

/// Greedy nearest-neighbour construction from the start node.
///
/// Each step picks the unvisited node closest to the current position; ties
/// go to the node that comes first in request order. Nodes whose best
/// distance is infinite are never appended. Once every remaining node is
/// infinitely far they are all reported as unreachable.
pub fn nearest_neighbor<D: DistanceOracle + ?Sized>(oracle: &mut D) -> Construction {
    let mut remaining: Vec<usize> = (1..oracle.node_count()).collect();
    let mut construction = Construction::default();
    let mut current = START_NODE;

    while !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (slot, &node) in remaining.iter().enumerate() {
            let distance = oracle.distance(current, node);
            if !distance.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((slot, distance));
            }
        }

        let Some((slot, _)) = best else {
            warn!(
                count = remaining.len(),
                from = current,
                "remaining tour targets are unreachable"
            );
            construction.unreachable.append(&mut remaining);
            break;
        };

        current = remaining.remove(slot);
        construction.order.push(current);
    }

    construction
}

/// Length of an open tour starting at the start node.
pub fn tour_length<D: DistanceOracle + ?Sized>(oracle: &mut D, order: &[usize]) -> f64 {
    let mut previous = START_NODE;
    let mut total = 0.0;
    for &node in order {
        total += oracle.distance(previous, node);
        previous = node;
    }
    total
}

/// Tuning for [`two_opt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoOptSettings {
    /// Minimum gain for a segment reversal to count as an improvement.
    pub tolerance: f64,
    /// Upper bound on applied reversals.
    pub max_improvements: usize,
}

/// Improve an open tour with 2-opt segment reversals.
///
/// For positions `i < k` the legs `A→B` (into position `i`) and `C→D` (out of
/// position `k`, absent at the tour end) are compared against `A→C` and
/// `B→D`. A reversal of `i..=k` is applied when it shortens the tour by more
/// than the tolerance, after which the scan restarts. Returns the number of
/// reversals applied.
pub fn two_opt<D: DistanceOracle + ?Sized>(
    oracle: &mut D,
    order: &mut [usize],
    settings: &TwoOptSettings,
) -> usize {
    let len = order.len();
    let mut applied = 0usize;

    'scan: loop {
        if applied >= settings.max_improvements {
            debug!(applied, "2-opt stopped at improvement limit");
            break;
        }
        for i in 0..len {
            let a = if i == 0 { START_NODE } else { order[i - 1] };
            let b = order[i];
            for k in (i + 1)..len {
                let c = order[k];
                let d = order.get(k + 1).copied();

                let before = oracle.distance(a, b) + d.map_or(0.0, |d| oracle.distance(c, d));
                let after = oracle.distance(a, c) + d.map_or(0.0, |d| oracle.distance(b, d));

                if after < before - settings.tolerance {
                    order[i..=k].reverse();
                    applied += 1;
                    debug!(i, k, gain = before - after, "2-opt reversal");
                    continue 'scan;
                }
            }
        }
        break;
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;
    use crate::routing::oracle::StraightLineOracle;

    fn oracle(points: &[(f64, f64)]) -> StraightLineOracle {
        StraightLineOracle::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    const SETTINGS: TwoOptSettings = TwoOptSettings {
        tolerance: 1e-6,
        max_improvements: 1000,
    };

    #[test]
    fn nearest_neighbor_breaks_ties_by_request_order() {
        let mut oracle = oracle(&[(0.0, 0.0), (0.0, 5.0), (5.0, 0.0)]);
        let construction = nearest_neighbor(&mut oracle);
        assert_eq!(construction.order, vec![1, 2]);
        assert!(construction.unreachable.is_empty());
    }

    #[test]
    fn two_opt_removes_crossing() {
        // Start, then a zig-zag along a line that nearest-neighbour would not
        // produce but a caller might hand in.
        let mut oracle = oracle(&[(0.0, 0.0), (30.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let mut order = vec![1, 2, 3];
        let before = tour_length(&mut oracle, &order);
        let applied = two_opt(&mut oracle, &mut order, &SETTINGS);
        let after = tour_length(&mut oracle, &order);

        assert!(applied >= 1);
        assert_eq!(order, vec![2, 3, 1]);
        assert!(after < before);
        assert!((after - 30.0).abs() < 1e-9);
    }

    #[test]
    fn two_opt_respects_improvement_limit() {
        let mut oracle = oracle(&[(0.0, 0.0), (30.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let mut order = vec![1, 2, 3];
        let limited = TwoOptSettings {
            max_improvements: 0,
            ..SETTINGS
        };
        assert_eq!(two_opt(&mut oracle, &mut order, &limited), 0);
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn two_opt_on_single_target_is_noop() {
        let mut oracle = oracle(&[(0.0, 0.0), (3.0, 4.0)]);
        let mut order = vec![1];
        assert_eq!(two_opt(&mut oracle, &mut order, &SETTINGS), 0);
        assert_eq!(order, vec![1]);
    }
}
