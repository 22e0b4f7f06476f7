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

use driver_plan_core::time::{MINUTES_PER_DAY, MINUTES_PER_HOUR};
use driver_plan_model::prelude::*;

#[inline]
pub(crate) fn idx(i: usize) -> ActivityIndex {
    ActivityIndex::new(i)
}

#[inline]
pub(crate) fn drv(i: usize) -> DriverIndex {
    DriverIndex::new(i)
}

/// Three days on two stations, 10 minutes apart.
///
/// Activities 0, 1 and 2 form one shift on the first day, 3 and 4 one on
/// the second, 5 one on the third; 6 overlaps 5. Drivers 0 and 1 are
/// internal, 2 and 3 external of one type allowing at most two shifts.
pub(crate) fn day_instance() -> Instance {
    day_instance_with(RulesConfig::default(), |salary, home| {
        vec![
            InternalDriverRequest::new("A", salary, 960, home.clone()),
            InternalDriverRequest::new("B", salary, 960, home),
        ]
    })
}

/// The activities of [`day_instance`] with an ideal shift length of four
/// hours and an ideal rest of 18 hours. Drivers 0 and 1 rate shift
/// lengths, delays, rest and overtime; driver 2 is optional. Drivers 3 and
/// 4 are external.
pub(crate) fn preference_instance() -> Instance {
    let rules = RulesConfig::default()
        .with_ideal_shift_length(4 * MINUTES_PER_HOUR)
        .with_ideal_rest_time(18 * MINUTES_PER_HOUR);
    day_instance_with(rules, |salary, home| {
        let criteria = vec![
            SatisfactionCriterion::linear(CriterionMeasure::ShiftLengths, 360.0, 0.0, 0.3),
            SatisfactionCriterion::linear(CriterionMeasure::ExpectedDelays, 60.0, 0.0, 0.2),
            SatisfactionCriterion::linear(CriterionMeasure::RestingTime, 14_400.0, 0.0, 0.2),
            SatisfactionCriterion::new(
                CriterionMeasure::ContractTime,
                CriterionScale::ContractExcess {
                    worst_fraction: 0.5,
                },
                0.3,
            ),
        ];
        vec![
            InternalDriverRequest::new("A", salary, 480, home.clone()).with_criteria(criteria.clone()),
            InternalDriverRequest::new("B", salary, 480, home.clone()).with_criteria(criteria),
            InternalDriverRequest::new("C", salary, 960, home).with_optional(true),
        ]
    })
}

fn day_instance_with<F>(rules: RulesConfig, internal: F) -> Instance
where
    F: FnOnce(SalaryIndex, HomeTravel) -> Vec<InternalDriverRequest>,
{
    let mut rules = rules
        .with_horizon(3 * MINUTES_PER_DAY)
        .with_rounding_step(15);
    rules.hotel_max_rest = 20 * MINUTES_PER_HOUR;

    let home = HomeTravel::new(vec![15, 15], vec![10.0, 10.0]);
    let mut builder = InstanceBuilder::new(rules)
        .with_robustness(RobustnessConfig::default())
        .with_travel_matrices(2, vec![0, 10, 10, 0], vec![0.0, 10.0, 10.0, 0.0]);
    let salary = builder.add_salary_settings(SalarySettings::standard());
    let day = MINUTES_PER_DAY;
    builder
        .add_activity(ActivityRequest::new(0, 1, 480, 600).with_duty(0))
        .add_activity(ActivityRequest::new(1, 0, 630, 720).with_duty(0))
        .add_activity(ActivityRequest::new(0, 1, 780, 900).with_duty(1))
        .add_activity(ActivityRequest::new(1, 0, day + 480, day + 600).with_duty(2))
        .add_activity(ActivityRequest::new(0, 1, day + 660, day + 780).with_duty(2))
        .add_activity(ActivityRequest::new(1, 0, 2 * day + 480, 2 * day + 600).with_duty(3))
        .add_activity(ActivityRequest::new(0, 1, 2 * day + 520, 2 * day + 620).with_duty(4));
    for request in internal(salary, home.clone()) {
        builder.add_internal_driver(request);
    }
    builder.add_external_type(
        ExternalDriverType::new("Agency", salary, home).with_shift_bounds(0, 2),
        2,
    );
    builder.build().expect("day instance is valid")
}

/// Seeded random instance of two days.
pub(crate) fn generated_instance(seed: u64) -> Instance {
    InstanceGenerator::new(
        GeneratorConfig::default()
            .with_seed(seed)
            .with_duty_count(10)
            .with_driver_counts(4, 1, 2),
    )
    .generate()
    .expect("generated instance is valid")
}
