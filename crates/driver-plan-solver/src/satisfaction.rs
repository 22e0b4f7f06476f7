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

//! Driver and fleet satisfaction scores, all in `[0, 1]`.

use crate::state::info::DriverInfo;
use driver_plan_model::common::DriverIndex;
use driver_plan_model::driver::Driver;
use driver_plan_model::instance::Instance;
use driver_plan_model::satisfaction::CriterionMeasure;

/// Number of satisfaction levels the best solutions are tracked for.
pub const SATISFACTION_LEVELS: usize = 100;

/// Level of a fleet satisfaction score, `round(score * 100)` capped at 99.
#[inline]
pub fn satisfaction_level(score: f64) -> usize {
    ((score * SATISFACTION_LEVELS as f64).round().max(0.0) as usize).min(SATISFACTION_LEVELS - 1)
}

fn measure(info: &DriverInfo, measure: CriterionMeasure) -> f64 {
    match measure {
        CriterionMeasure::HotelStays => info.hotel_count as f64,
        CriterionMeasure::NightShifts => info.night_shift_count as f64,
        CriterionMeasure::WeekendShifts => info.weekend_shift_count as f64,
        CriterionMeasure::TravelTime => info.travel_time as f64,
        CriterionMeasure::DuplicateRoutes => info.duplicate_routes() as f64,
        CriterionMeasure::ConsecutiveFreeDays => {
            if info.double_free_days > 0 {
                1.0
            } else {
                0.25 * info.single_free_days as f64
            }
        }
        CriterionMeasure::ContractTime => info.worked_time as f64,
        CriterionMeasure::ShiftLengths => info.ideal_shift_excess as f64,
        CriterionMeasure::ExpectedDelays => info.stats.robustness,
        CriterionMeasure::RestingTime => info.ideal_rest_deficit as f64,
    }
}

/// Satisfaction of one driver with the path summarised by `info`.
///
/// The score averages the weighted mean of all criterion scores with the
/// worst criterion score, where a criterion's score is pulled towards 0.5
/// the smaller its weight is relative to the heaviest one. External and
/// optional drivers score 0, internal drivers without criteria 1.
pub fn driver_satisfaction(driver: &Driver, info: &DriverInfo) -> f64 {
    let Some(internal) = driver.as_internal().filter(|d| !d.is_optional()) else {
        return 0.0;
    };
    let criteria = internal.criteria();
    if criteria.is_empty() {
        return 1.0;
    }
    let max_weight = criteria.iter().map(|c| c.weight).fold(0.0, f64::max);
    let weight_sum: f64 = criteria.iter().map(|c| c.weight).sum();
    let reference = internal.contract_time() as f64;

    let mut weighted = 0.0;
    let mut minimum: f64 = 1.0;
    for criterion in criteria {
        let score = criterion.scale.score(measure(info, criterion.measure), reference);
        weighted += criterion.weight * score;
        if max_weight > 0.0 {
            minimum = minimum.min(0.5 + criterion.weight / max_weight * (score - 0.5));
        }
    }
    let mean = if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        criteria
            .iter()
            .map(|c| c.scale.score(measure(info, c.measure), reference))
            .sum::<f64>()
            / criteria.len() as f64
    };
    (mean + minimum) / 2.0
}

/// Fleet satisfaction: the average of the mean and the minimum over the
/// required internal drivers, 0 without any. Optional drivers are skipped.
pub fn fleet_satisfaction<F>(instance: &Instance, score_of: F) -> f64
where
    F: Fn(DriverIndex) -> f64,
{
    let required = instance.required_internal_driver_count();
    if required == 0 {
        return 0.0;
    }
    let (sum, minimum) = instance
        .internal_drivers()
        .iter()
        .filter(|d| d.as_internal().is_some_and(|d| !d.is_optional()))
        .map(|d| score_of(d.index()))
        .fold((0.0, f64::INFINITY), |(s, m), x| (s + x, m.min(x)));
    (sum / required as f64 + minimum) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day_instance, drv, preference_instance};
    use driver_plan_core::math::approx::approx_eq;

    #[test]
    fn test_levels() {
        assert_eq!(satisfaction_level(0.0), 0);
        assert_eq!(satisfaction_level(0.374), 37);
        assert_eq!(satisfaction_level(0.379), 38);
        assert_eq!(satisfaction_level(0.685), 69);
        assert_eq!(satisfaction_level(0.995), 99);
        assert_eq!(satisfaction_level(0.999), 99);
        assert_eq!(satisfaction_level(1.0), 99);
        assert_eq!(satisfaction_level(-0.2), 0);
    }

    #[test]
    fn test_external_driver_scores_zero() {
        let instance = day_instance();
        let external = &instance.external_drivers()[0];
        assert_eq!(driver_satisfaction(external, &DriverInfo::default()), 0.0);
    }

    #[test]
    fn test_idle_driver_with_default_criteria() {
        let instance = day_instance();
        let driver = instance.driver(drv(0));
        let score = driver_satisfaction(driver, &DriverInfo::default());
        // Everything is ideal except free days and contract time, which
        // score 0; the contract criterion is the heaviest.
        let criteria = driver.as_internal().map(|d| d.criteria().to_vec()).unwrap_or_default();
        let weight_sum: f64 = criteria.iter().map(|c| c.weight).sum();
        let zero_weight: f64 = criteria
            .iter()
            .filter(|c| {
                matches!(
                    c.measure,
                    CriterionMeasure::ConsecutiveFreeDays | CriterionMeasure::ContractTime
                )
            })
            .map(|c| c.weight)
            .sum();
        let mean = 1.0 - zero_weight / weight_sum;
        assert!(approx_eq(score, (mean + 0.0) / 2.0, 1e-9));
    }

    #[test]
    fn test_fleet_is_at_most_the_mean() {
        let instance = day_instance();
        let scores = [0.9, 0.3];
        let fleet = fleet_satisfaction(&instance, |d| scores[d.index()]);
        assert!(approx_eq(fleet, (0.6 + 0.3) / 2.0, 1e-12));
        assert!(fleet <= 0.6);
    }

    #[test]
    fn test_optional_drivers_do_not_count() {
        let instance = preference_instance();
        assert_eq!(instance.required_internal_driver_count(), 2);
        assert_eq!(driver_satisfaction(instance.driver(drv(2)), &DriverInfo::default()), 0.0);
        // The optional driver's score is ignored even when it is the lowest.
        let scores = [0.8, 0.4, 0.1];
        let fleet = fleet_satisfaction(&instance, |d| scores[d.index()]);
        assert!(approx_eq(fleet, (0.6 + 0.4) / 2.0, 1e-12));
    }

    #[test]
    fn test_longer_shifts_and_shorter_rests_lower_the_score() {
        let instance = preference_instance();
        let driver = instance.driver(drv(0));
        let mut info = DriverInfo {
            worked_time: 480,
            ..DriverInfo::default()
        };
        let ideal = driver_satisfaction(driver, &info);
        info.ideal_shift_excess = 120;
        let longer = driver_satisfaction(driver, &info);
        info.ideal_rest_deficit = 60 * 60;
        let shorter_rest = driver_satisfaction(driver, &info);
        assert!(longer < ideal);
        assert!(shorter_rest < longer);
        // Undertime does not count against the contract excess scale.
        info.worked_time = 0;
        assert_eq!(driver_satisfaction(driver, &info), shorter_rest);
    }

    #[test]
    fn test_more_hotel_stays_lower_the_score() {
        let instance = day_instance();
        let driver = instance.driver(drv(0));
        let mut info = DriverInfo {
            worked_time: 960,
            double_free_days: 1,
            ..DriverInfo::default()
        };
        let before = driver_satisfaction(driver, &info);
        info.hotel_count = 3;
        assert!(driver_satisfaction(driver, &info) < before);
    }
}
