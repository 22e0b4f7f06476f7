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

use crate::state::info::DriverInfo;
use driver_plan_model::activity::Activity;
use driver_plan_model::common::ActivityIndex;
use driver_plan_model::driver::Driver;
use driver_plan_model::instance::Instance;
use driver_plan_core::time::Minutes;

/// Walks a sorted sequence of activities of one driver and collects the
/// costs and violations of the shifts it forms.
///
/// The sequence must start at a shift boundary not preceded by a hotel
/// stay. `after` is the activity following the sequence on the path, used
/// for the rest time and hotel travel of the last shift.
pub(crate) struct PathWalker<'a, H> {
    instance: &'a Instance,
    driver: &'a Driver,
    hotel_after: H,
}

impl<'a, H> PathWalker<'a, H>
where
    H: Fn(ActivityIndex) -> bool,
{
    #[inline]
    pub(crate) fn new(instance: &'a Instance, driver: &'a Driver, hotel_after: H) -> Self {
        Self {
            instance,
            driver,
            hotel_after,
        }
    }

    pub(crate) fn walk(&self, range: &[ActivityIndex], after: Option<ActivityIndex>) -> DriverInfo {
        let mut info = DriverInfo::with_routes(self.instance.shared_route_count());
        let Some((&last, _)) = range.split_last() else {
            return info;
        };
        let rules = self.instance.rules();

        let mut shift_first = range[0];
        let mut hotel_before = None;
        for pair in range.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            self.visit(prev, &mut info);
            if self.instance.is_same_shift(prev, next) {
                let (a, b) = (self.instance.activity(prev), self.instance.activity(next));
                if !self.instance.is_successor(prev, next) {
                    info.penalty.precedence_count += 1;
                }
                info.stats.robustness += self.instance.robustness(prev, next);
                info.stats.raw_cost += self.instance.travel_distance_between(a, b) * rules.shared_car_cost_per_km;
                if (self.hotel_after)(prev) {
                    info.penalty.invalid_hotel_count += 1;
                }
            } else {
                hotel_before = self.end_shift(shift_first, prev, Some(next), hotel_before, &mut info);
                shift_first = next;
            }
        }
        self.visit(last, &mut info);
        self.end_shift(shift_first, last, after, hotel_before, &mut info);
        info
    }

    fn visit(&self, index: ActivityIndex, info: &mut DriverInfo) {
        let activity = self.instance.activity(index);
        if !self.driver.is_qualified(activity) {
            info.penalty.qualification_count += 1;
        }
        if let Some(route) = activity.shared_route() {
            info.route_counts[route] += 1;
        }
    }

    /// Books the shift from `first` to `last` and the rest after it.
    /// Returns the activity whose hotel stay precedes the next shift.
    fn end_shift(
        &self,
        first: ActivityIndex,
        last: ActivityIndex,
        next: Option<ActivityIndex>,
        hotel_before: Option<ActivityIndex>,
        info: &mut DriverInfo,
    ) -> Option<ActivityIndex> {
        let instance = self.instance;
        let rules = instance.rules();
        let driver = self.driver;
        let (first_activity, last_activity) = (instance.activity(first), instance.activity(last));

        let before = match hotel_before {
            Some(h) => Travel::shared(instance, instance.activity(h), first_activity),
            None => Travel::own(
                driver.home_travel_time(first_activity.start_station()),
                driver.home_travel_distance(first_activity.start_station()),
            ),
        };
        let hotel_next = next.filter(|_| (self.hotel_after)(last));
        let after = match hotel_next {
            Some(n) => Travel::shared(instance, last_activity, instance.activity(n)),
            None => Travel::own(
                driver.home_travel_time(last_activity.end_station()),
                driver.home_travel_distance(last_activity.end_station()),
            ),
        };

        let main_start = first_activity.start_time() - before.shared_time;
        let main_end = last_activity.end_time() + after.shared_time;
        let full_start = main_start - before.own_time;
        let full_end = main_end + after.own_time;
        let (main, paid) = instance.shift_table().lookup(main_start, main_end, driver.salary());

        let own_time = before.own_time + after.own_time;
        let own_distance = before.own_distance + after.own_distance;
        let shared_distance = before.shared_distance + after.shared_distance;
        info.shift_count += 1;
        info.worked_time += paid.paid_length as i64;
        info.travel_time += own_time as i64;
        info.ideal_shift_excess += (main_end - main_start - rules.ideal_shift_length).max(0) as i64;
        info.stats.raw_cost += paid.cost
            + driver.paid_travel_cost(own_time, own_distance)
            + shared_distance * rules.shared_car_cost_per_km;

        let length_violation =
            main.main_length_violation + (full_end - full_start - main.max_full_length).max(0);
        if length_violation > 0 {
            info.penalty.shift_length_count += 1;
            info.penalty.shift_length_amount += length_violation as i64;
        }
        if !driver.is_available(full_start, full_end) {
            info.penalty.availability_count += 1;
        }
        if main.night_by_company {
            info.night_shift_count += 1;
        }
        if main.weekend_by_company {
            info.weekend_shift_count += 1;
        }

        let Some(next) = next else {
            if (self.hotel_after)(last) {
                info.penalty.invalid_hotel_count += 1;
            }
            return None;
        };
        let next_activity = instance.activity(next);
        let (rest, hotel) = if hotel_next.is_some() {
            info.hotel_count += 1;
            info.stats.raw_cost += rules.hotel_costs;
            let rest = instance.rest_time_via_hotel(last_activity, next_activity);
            if !driver.hotel_allowed() || rest > rules.hotel_max_rest {
                info.penalty.invalid_hotel_count += 1;
            }
            (rest, Some(last))
        } else {
            let travel = after.own_time + driver.home_travel_time(next_activity.start_station());
            let rest = instance.rest_time_with_travel(last_activity, next_activity, travel);
            if rest > rules.double_free_day_min_rest {
                info.double_free_days += 1;
            } else if rest > rules.single_free_day_min_rest {
                info.single_free_days += 1;
            }
            (rest, None)
        };
        let rest_deficit = (rules.ideal_rest_time - rest).max(0) as i64;
        info.ideal_rest_deficit += rest_deficit * rest_deficit;
        let rest_violation = (main.min_rest_after - rest).max(0);
        if rest_violation > 0 {
            info.penalty.rest_time_count += 1;
            info.penalty.rest_time_amount += rest_violation as i64;
        }
        hotel
    }
}

/// Travel at one end of a shift, split into own-car and shared-car parts.
#[derive(Debug, Clone, Copy, Default)]
struct Travel {
    own_time: Minutes,
    own_distance: f64,
    shared_time: Minutes,
    shared_distance: f64,
}

impl Travel {
    #[inline]
    fn own(time: Minutes, distance: f64) -> Self {
        Self {
            own_time: time,
            own_distance: distance,
            ..Self::default()
        }
    }

    #[inline]
    fn shared(instance: &Instance, from: &Activity, to: &Activity) -> Self {
        Self {
            shared_time: instance.half_hotel_travel_time(from, to),
            shared_distance: instance.half_hotel_travel_distance(from, to),
            ..Self::default()
        }
    }
}
