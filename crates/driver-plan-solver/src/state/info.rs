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

//! Additive aggregates of a plan.
//!
//! Every aggregate supports `+`, `-` and unary `-`, so the effect of an
//! operation can be expressed as `new_range - old_range` and applied to the
//! stored values with `+=`.

use crate::config::PenaltyConfig;
use driver_plan_core::math::approx::approx_eq;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Counts and amounts of constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenaltyInfo {
    pub precedence_count: i64,
    pub shift_length_count: i64,
    pub shift_length_amount: i64,
    pub rest_time_count: i64,
    pub rest_time_amount: i64,
    pub contract_time_count: i64,
    pub contract_time_amount: i64,
    /// Shifts above the per-driver maximum.
    pub shift_count_amount: i64,
    /// Shifts outside the bounds of external driver types.
    pub external_shift_count_amount: i64,
    pub invalid_hotel_count: i64,
    pub availability_count: i64,
    pub qualification_count: i64,
}

impl PenaltyInfo {
    /// Weighted sum of all violations.
    pub fn penalty(&self, weights: &PenaltyConfig) -> f64 {
        self.precedence_count as f64 * weights.precedence
            + self.shift_length_count as f64 * weights.shift_length
            + self.shift_length_amount as f64 * weights.shift_length_per_minute
            + self.rest_time_count as f64 * weights.rest_time
            + self.rest_time_amount as f64 * weights.rest_time_per_minute
            + self.contract_time_count as f64 * weights.contract_time
            + self.contract_time_amount as f64 * weights.contract_time_per_minute
            + self.shift_count_amount as f64 * weights.internal_shift_count_per_shift
            + self.external_shift_count_amount as f64 * weights.external_shift_count_per_shift
            + self.invalid_hotel_count as f64 * weights.invalid_hotel
            + self.availability_count as f64 * weights.availability
            + self.qualification_count as f64 * weights.qualification
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

macro_rules! impl_field_ops {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl AddAssign<&$ty> for $ty {
            #[inline]
            fn add_assign(&mut self, rhs: &$ty) {
                $(self.$field += rhs.$field;)*
            }
        }

        impl SubAssign<&$ty> for $ty {
            #[inline]
            fn sub_assign(&mut self, rhs: &$ty) {
                $(self.$field -= rhs.$field;)*
            }
        }

        impl AddAssign for $ty {
            #[inline]
            fn add_assign(&mut self, rhs: $ty) {
                *self += &rhs;
            }
        }

        impl SubAssign for $ty {
            #[inline]
            fn sub_assign(&mut self, rhs: $ty) {
                *self -= &rhs;
            }
        }

        impl Add for $ty {
            type Output = $ty;

            #[inline]
            fn add(mut self, rhs: $ty) -> $ty {
                self += &rhs;
                self
            }
        }

        impl Sub for $ty {
            type Output = $ty;

            #[inline]
            fn sub(mut self, rhs: $ty) -> $ty {
                self -= &rhs;
                self
            }
        }

        impl Neg for $ty {
            type Output = $ty;

            #[inline]
            fn neg(self) -> $ty {
                Self { $($field: -self.$field,)* }
            }
        }
    };
}

impl_field_ops!(PenaltyInfo {
    precedence_count,
    shift_length_count,
    shift_length_amount,
    rest_time_count,
    rest_time_amount,
    contract_time_count,
    contract_time_amount,
    shift_count_amount,
    external_shift_count_amount,
    invalid_hotel_count,
    availability_count,
    qualification_count,
});

/// Monetary view of a plan or part of it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    /// `raw_cost + robustness + penalty_factor * penalty`.
    pub cost: f64,
    pub raw_cost: f64,
    pub robustness: f64,
    pub penalty: f64,
    pub satisfaction: f64,
}

impl Stats {
    pub fn approx_eq(&self, other: &Stats, epsilon: f64) -> bool {
        approx_eq(self.cost, other.cost, epsilon)
            && approx_eq(self.raw_cost, other.raw_cost, epsilon)
            && approx_eq(self.robustness, other.robustness, epsilon)
            && approx_eq(self.penalty, other.penalty, epsilon)
            && approx_eq(self.satisfaction, other.satisfaction, epsilon)
    }
}

impl_field_ops!(Stats {
    cost,
    raw_cost,
    robustness,
    penalty,
    satisfaction,
});

/// Everything known about one driver's path, or a range of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverInfo {
    pub stats: Stats,
    pub penalty: PenaltyInfo,
    /// Paid minutes of all shifts.
    pub worked_time: i64,
    pub shift_count: i64,
    pub hotel_count: i64,
    pub night_shift_count: i64,
    pub weekend_shift_count: i64,
    /// Own-car travel minutes.
    pub travel_time: i64,
    pub single_free_days: i64,
    pub double_free_days: i64,
    /// Main shift minutes above the ideal shift length.
    pub ideal_shift_excess: i64,
    /// Sum of squared rest minutes missing to the ideal rest time.
    pub ideal_rest_deficit: i64,
    /// Activities per shared route. Shorter vectors read as zeros.
    pub route_counts: Vec<i64>,
}

impl DriverInfo {
    pub fn with_routes(route_count: usize) -> Self {
        Self {
            route_counts: vec![0; route_count],
            ..Self::default()
        }
    }

    /// Shared routes driven more than once, counting every repetition.
    pub fn duplicate_routes(&self) -> i64 {
        self.route_counts.iter().map(|&c| (c - 1).max(0)).sum()
    }

    pub fn approx_eq(&self, other: &DriverInfo, epsilon: f64) -> bool {
        let routes_match = {
            let len = self.route_counts.len().max(other.route_counts.len());
            (0..len).all(|r| {
                self.route_counts.get(r).copied().unwrap_or(0)
                    == other.route_counts.get(r).copied().unwrap_or(0)
            })
        };
        self.stats.approx_eq(&other.stats, epsilon)
            && self.penalty == other.penalty
            && self.worked_time == other.worked_time
            && self.shift_count == other.shift_count
            && self.hotel_count == other.hotel_count
            && self.night_shift_count == other.night_shift_count
            && self.weekend_shift_count == other.weekend_shift_count
            && self.travel_time == other.travel_time
            && self.single_free_days == other.single_free_days
            && self.double_free_days == other.double_free_days
            && self.ideal_shift_excess == other.ideal_shift_excess
            && self.ideal_rest_deficit == other.ideal_rest_deficit
            && routes_match
    }

    fn combine_routes(&mut self, rhs: &[i64], sign: i64) {
        if self.route_counts.len() < rhs.len() {
            self.route_counts.resize(rhs.len(), 0);
        }
        for (count, &other) in self.route_counts.iter_mut().zip(rhs) {
            *count += sign * other;
        }
    }

    fn combine_scalars(&mut self, rhs: &DriverInfo, sign: i64) {
        self.worked_time += sign * rhs.worked_time;
        self.shift_count += sign * rhs.shift_count;
        self.hotel_count += sign * rhs.hotel_count;
        self.night_shift_count += sign * rhs.night_shift_count;
        self.weekend_shift_count += sign * rhs.weekend_shift_count;
        self.travel_time += sign * rhs.travel_time;
        self.single_free_days += sign * rhs.single_free_days;
        self.double_free_days += sign * rhs.double_free_days;
        self.ideal_shift_excess += sign * rhs.ideal_shift_excess;
        self.ideal_rest_deficit += sign * rhs.ideal_rest_deficit;
    }
}

impl AddAssign<&DriverInfo> for DriverInfo {
    fn add_assign(&mut self, rhs: &DriverInfo) {
        self.stats += &rhs.stats;
        self.penalty += &rhs.penalty;
        self.combine_scalars(rhs, 1);
        self.combine_routes(&rhs.route_counts, 1);
    }
}

impl SubAssign<&DriverInfo> for DriverInfo {
    fn sub_assign(&mut self, rhs: &DriverInfo) {
        self.stats -= &rhs.stats;
        self.penalty -= &rhs.penalty;
        self.combine_scalars(rhs, -1);
        self.combine_routes(&rhs.route_counts, -1);
    }
}

impl Add<&DriverInfo> for &DriverInfo {
    type Output = DriverInfo;

    fn add(self, rhs: &DriverInfo) -> DriverInfo {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub<&DriverInfo> for &DriverInfo {
    type Output = DriverInfo;

    fn sub(self, rhs: &DriverInfo) -> DriverInfo {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Neg for &DriverInfo {
    type Output = DriverInfo;

    fn neg(self) -> DriverInfo {
        let mut out = DriverInfo::with_routes(self.route_counts.len());
        out -= self;
        out
    }
}

/// Aggregate of all external drivers of one type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExternalTypeInfo {
    pub shift_count: i64,
    /// Shifts outside the type's bounds.
    pub violation: i64,
    pub penalty: f64,
    pub cost: f64,
}

impl ExternalTypeInfo {
    pub fn evaluate(
        shift_count: i64,
        violation: i64,
        weights: &PenaltyConfig,
        penalty_factor: f64,
    ) -> Self {
        let penalty = violation as f64 * weights.external_shift_count_per_shift;
        Self {
            shift_count,
            violation,
            penalty,
            cost: penalty_factor * penalty,
        }
    }

    pub fn approx_eq(&self, other: &ExternalTypeInfo, epsilon: f64) -> bool {
        self.shift_count == other.shift_count
            && self.violation == other.violation
            && approx_eq(self.penalty, other.penalty, epsilon)
            && approx_eq(self.cost, other.cost, epsilon)
    }
}

impl_field_ops!(ExternalTypeInfo {
    shift_count,
    violation,
    penalty,
    cost,
});

/// Aggregate of the whole plan.
///
/// `stats.satisfaction` sums the per-driver scores; the fleet score lives
/// on the search state because it is not additive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TotalInfo {
    pub stats: Stats,
    pub penalty: PenaltyInfo,
    pub worked_time: i64,
    pub shift_count: i64,
}

impl TotalInfo {
    pub fn add_driver(&mut self, info: &DriverInfo) {
        self.stats += &info.stats;
        self.penalty += &info.penalty;
        self.worked_time += info.worked_time;
        self.shift_count += info.shift_count;
    }

    pub fn add_external_type(&mut self, info: &ExternalTypeInfo) {
        self.stats.cost += info.cost;
        self.stats.penalty += info.penalty;
        self.penalty.external_shift_count_amount += info.violation;
    }

    pub fn approx_eq(&self, other: &TotalInfo, epsilon: f64) -> bool {
        self.stats.approx_eq(&other.stats, epsilon)
            && self.penalty == other.penalty
            && self.worked_time == other.worked_time
            && self.shift_count == other.shift_count
    }
}

impl_field_ops!(TotalInfo {
    stats,
    penalty,
    worked_time,
    shift_count,
});

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DriverInfo {
        DriverInfo {
            stats: Stats {
                cost: 120.5,
                raw_cost: 100.0,
                robustness: 20.5,
                penalty: 3.0,
                satisfaction: 0.75,
            },
            penalty: PenaltyInfo {
                rest_time_count: 1,
                rest_time_amount: 45,
                ..PenaltyInfo::default()
            },
            worked_time: 480,
            shift_count: 1,
            hotel_count: 1,
            travel_time: 30,
            route_counts: vec![2, 0, 1],
            ..DriverInfo::default()
        }
    }

    #[test]
    fn test_add_then_subtract_is_identity() {
        let a = sample();
        let mut b = sample();
        b.worked_time = 17;
        b.ideal_shift_excess = 35;
        b.ideal_rest_deficit = 900;
        b.route_counts = vec![0, 1, 1, 4];
        let round_trip = &(&a + &b) - &b;
        assert!(round_trip.approx_eq(&a, 1e-9));
    }

    #[test]
    fn test_negation_cancels() {
        let a = sample();
        let zero = &a + &(-&a);
        assert!(zero.approx_eq(&DriverInfo::default(), 1e-9));
    }

    #[test]
    fn test_shorter_route_vectors_read_as_zero() {
        let mut a = DriverInfo::with_routes(1);
        a += &sample();
        assert_eq!(a.route_counts, vec![2, 0, 1]);
        assert_eq!(a.duplicate_routes(), 1);
    }

    #[test]
    fn test_penalty_weights_are_applied_per_field() {
        let weights = PenaltyConfig::default();
        let info = PenaltyInfo {
            precedence_count: 2,
            rest_time_amount: 60,
            ..PenaltyInfo::default()
        };
        let expected = 2.0 * weights.precedence + 60.0 * weights.rest_time_per_minute;
        assert!(approx_eq(info.penalty(&weights), expected, 1e-9));
        assert!(!info.is_clear());
        assert!(PenaltyInfo::default().is_clear());
    }

    #[test]
    fn test_total_collects_drivers_and_types() {
        let weights = PenaltyConfig::default();
        let mut total = TotalInfo::default();
        total.add_driver(&sample());
        total.add_external_type(&ExternalTypeInfo::evaluate(3, 1, &weights, 0.5));
        assert_eq!(total.penalty.external_shift_count_amount, 1);
        assert!(approx_eq(
            total.stats.cost,
            120.5 + 0.5 * weights.external_shift_count_per_shift,
            1e-9
        ));
        assert_eq!(total.worked_time, 480);
    }
}
