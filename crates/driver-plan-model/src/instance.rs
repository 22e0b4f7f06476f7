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

use crate::activity::Activity;
use crate::common::{ActivityIndex, DriverIndex, ExternalTypeIndex, StationIndex};
use crate::driver::{Driver, ExternalDriverType};
use crate::mask::PairMask;
use crate::robustness::RobustnessConfig;
use crate::rules::RulesConfig;
use crate::salary::SalarySettings;
use crate::shift::ShiftTable;
use driver_plan_core::time::Minutes;

/// Immutable planning instance with all lookup tables the search needs.
///
/// Built once through [`InstanceBuilder`](crate::builder::InstanceBuilder)
/// and shared read-only between search threads.
#[derive(Debug, Clone)]
pub struct Instance {
    pub(crate) rules: RulesConfig,
    pub(crate) robustness_config: RobustnessConfig,
    pub(crate) activities: Vec<Activity>,
    pub(crate) successor: PairMask,
    pub(crate) same_shift: PairMask,
    pub(crate) robustness: Vec<f64>,
    pub(crate) station_count: usize,
    pub(crate) travel_times: Vec<Minutes>,
    pub(crate) travel_distances: Vec<f64>,
    pub(crate) drivers: Vec<Driver>,
    pub(crate) internal_count: usize,
    pub(crate) required_internal_count: usize,
    pub(crate) external_types: Vec<ExternalDriverType>,
    pub(crate) drivers_by_type: Vec<Vec<DriverIndex>>,
    pub(crate) salaries: Vec<SalarySettings>,
    pub(crate) shift_table: ShiftTable,
    pub(crate) shared_route_count: usize,
}

static_assertions::assert_impl_all!(Instance: Send, Sync);

impl Instance {
    #[inline]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    #[inline]
    pub fn robustness_config(&self) -> &RobustnessConfig {
        &self.robustness_config
    }

    #[inline]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[inline]
    pub fn activity(&self, index: ActivityIndex) -> &Activity {
        &self.activities[index.index()]
    }

    #[inline]
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    #[inline]
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    #[inline]
    pub fn driver(&self, index: DriverIndex) -> &Driver {
        &self.drivers[index.index()]
    }

    #[inline]
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// Internal drivers occupy the first indices.
    #[inline]
    pub fn internal_drivers(&self) -> &[Driver] {
        &self.drivers[..self.internal_count]
    }

    #[inline]
    pub fn external_drivers(&self) -> &[Driver] {
        &self.drivers[self.internal_count..]
    }

    #[inline]
    pub fn internal_driver_count(&self) -> usize {
        self.internal_count
    }

    /// Internal drivers that are not optional.
    #[inline]
    pub fn required_internal_driver_count(&self) -> usize {
        self.required_internal_count
    }

    #[inline]
    pub fn external_types(&self) -> &[ExternalDriverType] {
        &self.external_types
    }

    #[inline]
    pub fn external_type(&self, index: ExternalTypeIndex) -> &ExternalDriverType {
        &self.external_types[index.index()]
    }

    #[inline]
    pub fn drivers_of_type(&self, index: ExternalTypeIndex) -> &[DriverIndex] {
        &self.drivers_by_type[index.index()]
    }

    #[inline]
    pub fn salaries(&self) -> &[SalarySettings] {
        &self.salaries
    }

    #[inline]
    pub fn shift_table(&self) -> &ShiftTable {
        &self.shift_table
    }

    #[inline]
    pub fn shared_route_count(&self) -> usize {
        self.shared_route_count
    }

    #[inline]
    pub fn station_count(&self) -> usize {
        self.station_count
    }

    /// Whether `second` can be done after `first` by the same driver.
    #[inline]
    pub fn is_successor(&self, first: ActivityIndex, second: ActivityIndex) -> bool {
        self.successor.contains(first.index(), second.index())
    }

    /// Whether `second` continues the shift of `first`. Only meaningful for
    /// `first <= second`.
    #[inline]
    pub fn is_same_shift(&self, first: ActivityIndex, second: ActivityIndex) -> bool {
        self.same_shift.contains(first.index(), second.index())
    }

    #[inline]
    pub fn robustness(&self, first: ActivityIndex, second: ActivityIndex) -> f64 {
        self.robustness[first.index() * self.activities.len() + second.index()]
    }

    #[inline]
    pub fn car_travel_time(&self, from: StationIndex, to: StationIndex) -> Minutes {
        self.travel_times[from.index() * self.station_count + to.index()]
    }

    #[inline]
    pub fn car_travel_distance(&self, from: StationIndex, to: StationIndex) -> f64 {
        self.travel_distances[from.index() * self.station_count + to.index()]
    }

    #[inline]
    pub fn travel_time_between(&self, first: &Activity, second: &Activity) -> Minutes {
        self.car_travel_time(first.end_station(), second.start_station())
    }

    #[inline]
    pub fn travel_distance_between(&self, first: &Activity, second: &Activity) -> f64 {
        self.car_travel_distance(first.end_station(), second.start_station())
    }

    /// Time between two activities not spent travelling between them.
    #[inline]
    pub fn waiting_time(&self, first: &Activity, second: &Activity) -> Minutes {
        second.start_time() - first.end_time() - self.travel_time_between(first, second)
    }

    #[inline]
    pub fn hotel_travel_time(&self, first: &Activity, second: &Activity) -> Minutes {
        self.travel_time_between(first, second) + self.rules.hotel_extra_travel_time
    }

    #[inline]
    pub fn hotel_travel_distance(&self, first: &Activity, second: &Activity) -> f64 {
        self.travel_distance_between(first, second) + self.rules.hotel_extra_travel_distance
    }

    /// Half of the hotel travel, attributed to each of the two shifts.
    #[inline]
    pub fn half_hotel_travel_time(&self, first: &Activity, second: &Activity) -> Minutes {
        self.hotel_travel_time(first, second) / 2
    }

    #[inline]
    pub fn half_hotel_travel_distance(&self, first: &Activity, second: &Activity) -> f64 {
        self.hotel_travel_distance(first, second) / 2.0
    }

    #[inline]
    pub fn rest_time_via_hotel(&self, first: &Activity, second: &Activity) -> Minutes {
        second.start_time() - first.end_time() - self.hotel_travel_time(first, second)
    }

    #[inline]
    pub fn rest_time_with_travel(&self, first: &Activity, second: &Activity, travel: Minutes) -> Minutes {
        second.start_time() - first.end_time() - travel
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance({} activities, {} internal drivers, {} external drivers in {} types, {} stations)",
            self.activities.len(),
            self.internal_count,
            self.drivers.len() - self.internal_count,
            self.external_types.len(),
            self.station_count
        )
    }
}
