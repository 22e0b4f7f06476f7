// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Merging per-worker archives into one non-dominated front.

use crate::engine::archive::{BestArchive, SolutionSnapshot};
use crate::satisfaction::SATISFACTION_LEVELS;
use std::sync::Arc;

/// Feasible plans ordered by ascending satisfaction with strictly
/// increasing cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParetoFront {
    points: Vec<Arc<SolutionSnapshot>>,
}

impl ParetoFront {
    /// Walks the satisfaction levels from highest to lowest and keeps the
    /// cheapest plan of a level when it undercuts the last kept plan by at
    /// least `min_gap`.
    pub fn from_archives(archives: &[BestArchive], min_gap: f64) -> Self {
        let mut points: Vec<Arc<SolutionSnapshot>> = Vec::new();
        let mut last_cost = f64::INFINITY;
        for level in (0..SATISFACTION_LEVELS).rev() {
            let best = archives
                .iter()
                .filter_map(|archive| archive.best(level))
                .min_by(|a, b| a.cost.total_cmp(&b.cost));
            let Some(best) = best else {
                continue;
            };
            if best.cost < last_cost - min_gap {
                last_cost = best.cost;
                points.push(Arc::clone(best));
            }
        }
        points.reverse();
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Arc<SolutionSnapshot>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cheapest plan of the front.
    #[inline]
    pub fn cheapest(&self) -> Option<&Arc<SolutionSnapshot>> {
        self.points.first()
    }

    /// Most satisfying plan of the front.
    #[inline]
    pub fn most_satisfying(&self) -> Option<&Arc<SolutionSnapshot>> {
        self.points.last()
    }
}

impl std::fmt::Display for ParetoFront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}%: {:.2}", point.level(), point.cost)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cost: f64, satisfaction: f64, worker: usize) -> SolutionSnapshot {
        SolutionSnapshot {
            cost,
            raw_cost: cost,
            robustness: 0.0,
            penalty: 0.0,
            satisfaction,
            worker,
            iteration: 0,
            drivers: Vec::new(),
            hotels: Vec::new(),
        }
    }

    fn archive(points: &[(f64, f64)], worker: usize) -> BestArchive {
        let mut archive = BestArchive::new();
        for &(cost, satisfaction) in points {
            archive.insert(snapshot(cost, satisfaction, worker));
        }
        archive
    }

    #[test]
    fn test_front_is_monotone_and_ascending() {
        let archives = [
            archive(&[(100.0, 0.2), (300.0, 0.8)], 0),
            archive(&[(150.0, 0.5), (250.0, 0.9)], 1),
        ];
        let front = ParetoFront::from_archives(&archives, 0.0);
        let levels: Vec<_> = front.points().iter().map(|p| p.level()).collect();
        let costs: Vec<_> = front.points().iter().map(|p| p.cost).collect();
        // The 0.8 plan is dominated by the cheaper 0.9 plan.
        assert_eq!(levels, vec![20, 50, 90]);
        assert_eq!(costs, vec![100.0, 150.0, 250.0]);
        assert_eq!(front.cheapest().map(|p| p.worker), Some(0));
        assert_eq!(front.most_satisfying().map(|p| p.worker), Some(1));
    }

    #[test]
    fn test_min_gap_prunes_near_duplicates() {
        let archives = [archive(&[(100.0, 0.3), (104.0, 0.4), (200.0, 0.6)], 0)];
        let front = ParetoFront::from_archives(&archives, 10.0);
        let costs: Vec<_> = front.points().iter().map(|p| p.cost).collect();
        assert_eq!(costs, vec![104.0, 200.0]);
        for pair in front.points().windows(2) {
            assert!(pair[1].cost - pair[0].cost >= 10.0);
        }
    }

    #[test]
    fn test_empty_archives_give_empty_front() {
        let front = ParetoFront::from_archives(&[BestArchive::new()], 0.0);
        assert!(front.is_empty());
        assert_eq!(front.to_string(), "[]");
    }
}
