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

use super::{CostModel, PathWalker};
use crate::satisfaction::fleet_satisfaction;
use crate::state::assignment::Assignment;
use crate::state::info::{DriverInfo, ExternalTypeInfo, TotalInfo};
use driver_plan_model::common::{DriverIndex, ExternalTypeIndex};

/// Result of evaluating an assignment from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub drivers: Vec<DriverInfo>,
    pub external_types: Vec<ExternalTypeInfo>,
    pub total: TotalInfo,
    pub satisfaction: f64,
}

impl CostModel<'_> {
    pub fn evaluate_driver(
        &self,
        assignment: &Assignment,
        driver: DriverIndex,
        penalty_factor: f64,
    ) -> DriverInfo {
        let d = self.instance.driver(driver);
        let walker = PathWalker::new(self.instance, d, |a| assignment.has_hotel_after(a));
        let mut info = walker.walk(assignment.path(driver), None);
        let values = self.path_values(d, &info);
        self.finish(&mut info, values, penalty_factor);
        info
    }

    pub fn evaluate_external_type(
        &self,
        driver_type: ExternalTypeIndex,
        drivers: &[DriverInfo],
        penalty_factor: f64,
    ) -> ExternalTypeInfo {
        let shift_count = self
            .instance
            .drivers_of_type(driver_type)
            .iter()
            .map(|d| drivers[d.index()].shift_count)
            .sum();
        self.external_type_info(driver_type, shift_count, penalty_factor)
    }

    pub(crate) fn external_type_info(
        &self,
        driver_type: ExternalTypeIndex,
        shift_count: i64,
        penalty_factor: f64,
    ) -> ExternalTypeInfo {
        let violation = self
            .instance
            .external_type(driver_type)
            .shift_count_violation(shift_count);
        ExternalTypeInfo::evaluate(shift_count, violation, self.penalties, penalty_factor)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn evaluate(&self, assignment: &Assignment, penalty_factor: f64) -> Evaluation {
        let drivers: Vec<DriverInfo> = (0..self.instance.driver_count())
            .map(|d| self.evaluate_driver(assignment, DriverIndex::new(d), penalty_factor))
            .collect();
        let external_types: Vec<ExternalTypeInfo> = (0..self.instance.external_types().len())
            .map(|t| self.evaluate_external_type(ExternalTypeIndex::new(t), &drivers, penalty_factor))
            .collect();

        let mut total = TotalInfo::default();
        for info in &drivers {
            total.add_driver(info);
        }
        for info in &external_types {
            total.add_external_type(info);
        }
        let satisfaction = fleet_satisfaction(self.instance, |d| drivers[d.index()].stats.satisfaction);
        Evaluation {
            drivers,
            external_types,
            total,
            satisfaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfig;
    use crate::test_support::{day_instance, drv, idx, preference_instance};
    use driver_plan_core::math::approx::approx_eq;
    use driver_plan_model::instance::Instance;

    fn assignment(instance: &Instance, pairs: &[(usize, usize)], hotels: &[usize]) -> Assignment {
        let mut asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        for &(a, d) in pairs {
            asg.assign(idx(a), drv(d));
        }
        for &a in hotels {
            asg.set_hotel_after(idx(a), true);
        }
        asg
    }

    #[test]
    fn test_two_close_activities_form_one_shift() {
        use driver_plan_core::time::MINUTES_PER_DAY;
        use driver_plan_model::prelude::*;

        let rules = RulesConfig::default()
            .with_horizon(MINUTES_PER_DAY)
            .with_rounding_step(15);
        let home = HomeTravel::new(vec![15, 15, 15], vec![10.0, 10.0, 10.0]);
        let mut builder = InstanceBuilder::new(rules).with_travel_matrices(
            3,
            vec![0, 20, 30, 20, 10, 20, 30, 20, 0],
            vec![0.0, 20.0, 30.0, 20.0, 10.0, 20.0, 30.0, 20.0, 0.0],
        );
        let salary = builder.add_salary_settings(SalarySettings::standard());
        builder
            .add_activity(ActivityRequest::new(0, 1, 0, 60))
            .add_activity(ActivityRequest::new(1, 2, 90, 150))
            .add_internal_driver(InternalDriverRequest::new("A", salary, 960, home));
        let instance = builder.build().expect("instance is valid");
        assert!(instance.is_same_shift(idx(0), idx(1)));

        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = assignment(&instance, &[(0, 0), (1, 0)], &[]);
        let info = model.evaluate_driver(&asg, drv(0), 1.0);
        assert_eq!(info.shift_count, 1);
        assert_eq!(info.penalty.precedence_count, 0);
        assert_eq!(info.travel_time, 30);
        let (main, _) = instance.shift_table().lookup(0, 150, salary);
        assert_eq!(main.length, 150);
    }

    #[test]
    fn test_ideal_shift_and_rest_accumulators() {
        let instance = preference_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = assignment(&instance, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)], &[]);
        let info = model.evaluate_driver(&asg, drv(0), 1.0);
        assert_eq!(info.shift_count, 2);
        // Main shifts of 420 and 300 minutes against an ideal of 240.
        assert_eq!(info.ideal_shift_excess, 180 + 60);
        // 990 minutes of rest against an ideal of 1080.
        assert_eq!(info.ideal_rest_deficit, 90 * 90);

        let score = |s: f64, w: f64| (s, w);
        let scores = [
            score(1.0 - 240.0 / 360.0, 0.3),
            score((1.0 - info.stats.robustness / 60.0).clamp(0.0, 1.0), 0.2),
            score(1.0 - 8100.0 / 14_400.0, 0.2),
            score(
                (1.0 - (info.worked_time as f64 / 480.0 - 1.0).max(0.0) / 0.5).max(0.0),
                0.3,
            ),
        ];
        let mean: f64 = scores.iter().map(|(s, w)| s * w).sum();
        let minimum = scores
            .iter()
            .map(|(s, w)| 0.5 + w / 0.3 * (s - 0.5))
            .fold(1.0, f64::min);
        assert!(approx_eq(info.stats.satisfaction, (mean + minimum) / 2.0, 1e-9));
    }

    #[test]
    fn test_optional_driver_is_left_out_of_the_fleet_score() {
        let instance = preference_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = assignment(&instance, &[(0, 0), (3, 1), (5, 2)], &[]);
        let eval = model.evaluate(&asg, 1.0);
        assert_eq!(eval.drivers[2].shift_count, 1);
        assert_eq!(eval.drivers[2].stats.satisfaction, 0.0);

        let (a, b) = (eval.drivers[0].stats.satisfaction, eval.drivers[1].stats.satisfaction);
        let expected = ((a + b) / 2.0 + a.min(b)) / 2.0;
        assert!(approx_eq(eval.satisfaction, expected, 1e-12));
    }

    #[test]
    fn test_one_shift_per_day() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = assignment(&instance, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)], &[]);
        let info = model.evaluate_driver(&asg, drv(0), 1.0);
        assert_eq!(info.shift_count, 3);
        assert_eq!(info.penalty.precedence_count, 0);
        assert_eq!(info.hotel_count, 0);
        // Home travel is 15 minutes at both ends of each shift.
        assert_eq!(info.travel_time, 3 * 30);
        assert!(info.stats.raw_cost > 0.0);
    }

    #[test]
    fn test_overlapping_activities_violate_precedence() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        // Activity 6 overlaps activity 5 in `day_instance`.
        let mut asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        asg.assign(idx(5), drv(1));
        asg.assign(idx(6), drv(1));
        let info = model.evaluate_driver(&asg, drv(1), 1.0);
        assert_eq!(info.shift_count, 1);
        assert_eq!(info.penalty.precedence_count, 1);
        assert!(info.stats.penalty >= penalties.precedence);
    }

    #[test]
    fn test_hotel_after_last_activity_is_invalid() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let mut asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        asg.assign(idx(5), drv(0));
        asg.set_hotel_after(idx(5), true);
        let info = model.evaluate_driver(&asg, drv(0), 1.0);
        assert_eq!(info.penalty.invalid_hotel_count, 1);
        assert_eq!(info.hotel_count, 0);
    }

    #[test]
    fn test_hotel_between_shifts_replaces_home_travel() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let mut asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        asg.assign(idx(2), drv(0));
        asg.assign(idx(3), drv(0));
        let home = model.evaluate_driver(&asg, drv(0), 1.0);
        asg.set_hotel_after(idx(2), true);
        let hotel = model.evaluate_driver(&asg, drv(0), 1.0);
        assert_eq!(home.travel_time, 60);
        assert_eq!(hotel.travel_time, 30);
        assert_eq!(hotel.hotel_count, 1);
        assert_eq!(hotel.penalty.invalid_hotel_count, 0);
    }

    #[test]
    fn test_penalty_factor_zero_suppresses_penalties_in_cost() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = assignment(&instance, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)], &[5]);
        let info = model.evaluate_driver(&asg, drv(0), 0.0);
        assert!(info.stats.penalty > 0.0);
        assert!(approx_eq(
            info.stats.cost,
            info.stats.raw_cost + info.stats.robustness,
            1e-9
        ));
    }

    #[test]
    fn test_evaluation_totals_match_drivers() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let mut asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        for a in 0..instance.activity_count() {
            asg.assign(idx(a), drv(a % instance.driver_count()));
        }
        let eval = model.evaluate(&asg, 0.5);
        let cost: f64 = eval.drivers.iter().map(|d| d.stats.cost).sum::<f64>()
            + eval.external_types.iter().map(|t| t.cost).sum::<f64>();
        assert!(approx_eq(eval.total.stats.cost, cost, 1e-6));
        let shifts: i64 = eval.drivers.iter().map(|d| d.shift_count).sum();
        assert_eq!(eval.total.shift_count, shifts);
        assert!((0.0..=1.0).contains(&eval.satisfaction));
    }

    #[test]
    fn test_idle_internal_drivers_miss_their_contract() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        let eval = model.evaluate(&asg, 1.0);
        assert_eq!(eval.total.penalty.contract_time_count, 2);
        assert_eq!(eval.total.stats.raw_cost, 0.0);
    }
}
