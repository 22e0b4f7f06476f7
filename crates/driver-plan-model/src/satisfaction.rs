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

//! Per-driver satisfaction criteria.
//!
//! A criterion maps one aggregate of a driver's plan (number of hotel
//! stays, travel time, ...) onto a score in `[0, 1]` and carries a weight
//! used when the per-criterion scores are combined.

use serde::{Deserialize, Serialize};

/// Aggregate of a driver's plan a criterion looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriterionMeasure {
    HotelStays,
    NightShifts,
    WeekendShifts,
    TravelTime,
    DuplicateRoutes,
    ConsecutiveFreeDays,
    ContractTime,
    /// Minutes of main shift time above the ideal shift length, summed
    /// over all shifts.
    ShiftLengths,
    /// Expected delay costs of the driver's successions.
    ExpectedDelays,
    /// Squared minutes of rest below the ideal rest time, summed over all
    /// rests between shifts.
    RestingTime,
}

/// How the measured value becomes a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CriterionScale {
    /// Linear ramp from 0 at `worst` to 1 at `best`, clamped outside.
    Linear { worst: f64, best: f64 },
    /// Relative deviation of worked time from the contract time; the score
    /// reaches 0 at a deviation of `worst_fraction`.
    ContractDeviation { worst_fraction: f64 },
    /// Like [`CriterionScale::ContractDeviation`], but only working more
    /// than the contract time lowers the score.
    ContractExcess { worst_fraction: f64 },
}

impl CriterionScale {
    /// Scores `value`. `reference` is the contract time and only used by
    /// the contract scales.
    pub fn score(&self, value: f64, reference: f64) -> f64 {
        match *self {
            CriterionScale::Linear { worst, best } => {
                if best == worst {
                    return if value == best { 1.0 } else { 0.0 };
                }
                ((value - worst) / (best - worst)).clamp(0.0, 1.0)
            }
            CriterionScale::ContractDeviation { worst_fraction } => {
                if reference <= 0.0 || worst_fraction <= 0.0 {
                    return 0.0;
                }
                let deviation = (value / reference - 1.0).abs();
                (1.0 - deviation / worst_fraction).max(0.0)
            }
            CriterionScale::ContractExcess { worst_fraction } => {
                if reference <= 0.0 || worst_fraction <= 0.0 {
                    return 0.0;
                }
                let excess = (value / reference - 1.0).max(0.0);
                (1.0 - excess / worst_fraction).max(0.0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionCriterion {
    pub measure: CriterionMeasure,
    pub scale: CriterionScale,
    pub weight: f64,
}

impl SatisfactionCriterion {
    pub fn new(measure: CriterionMeasure, scale: CriterionScale, weight: f64) -> Self {
        Self {
            measure,
            scale,
            weight,
        }
    }

    pub fn linear(measure: CriterionMeasure, worst: f64, best: f64, weight: f64) -> Self {
        Self::new(measure, CriterionScale::Linear { worst, best }, weight)
    }

    /// Criteria used when a driver has no explicit preferences.
    pub fn default_set() -> Vec<SatisfactionCriterion> {
        use CriterionMeasure::*;
        vec![
            Self::linear(HotelStays, 4.0, 0.0, 0.1),
            Self::linear(NightShifts, 4.0, 0.0, 0.15),
            Self::linear(WeekendShifts, 2.0, 0.0, 0.1),
            Self::linear(TravelTime, 600.0, 0.0, 0.15),
            Self::linear(DuplicateRoutes, 10.0, 0.0, 0.1),
            Self::linear(ConsecutiveFreeDays, 0.0, 1.0, 0.15),
            Self::new(
                ContractTime,
                CriterionScale::ContractDeviation {
                    worst_fraction: 0.5,
                },
                0.25,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale_clamps() {
        let scale = CriterionScale::Linear {
            worst: 4.0,
            best: 0.0,
        };
        assert_eq!(scale.score(0.0, 0.0), 1.0);
        assert_eq!(scale.score(2.0, 0.0), 0.5);
        assert_eq!(scale.score(10.0, 0.0), 0.0);
        assert_eq!(scale.score(-1.0, 0.0), 1.0);
    }

    #[test]
    fn test_contract_deviation() {
        let scale = CriterionScale::ContractDeviation {
            worst_fraction: 0.5,
        };
        assert_eq!(scale.score(1000.0, 1000.0), 1.0);
        assert!((scale.score(1250.0, 1000.0) - 0.5).abs() < 1e-12);
        assert_eq!(scale.score(0.0, 1000.0), 0.0);
        assert_eq!(scale.score(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_contract_excess_ignores_undertime() {
        let scale = CriterionScale::ContractExcess {
            worst_fraction: 0.5,
        };
        assert_eq!(scale.score(0.0, 1000.0), 1.0);
        assert_eq!(scale.score(1000.0, 1000.0), 1.0);
        assert!((scale.score(1250.0, 1000.0) - 0.5).abs() < 1e-12);
        assert_eq!(scale.score(2000.0, 1000.0), 0.0);
        assert_eq!(scale.score(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_default_set_weights_sum_to_one() {
        let sum: f64 = SatisfactionCriterion::default_set()
            .iter()
            .map(|c| c.weight)
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
