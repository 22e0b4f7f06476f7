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

use crate::activity::{Activity, ActivityRequest};
use crate::common::{DriverIndex, ExternalTypeIndex, SalaryIndex};
use crate::driver::{Driver, ExternalDriverType, InternalDriverRequest};
use crate::err::{
    EmptySalarySettingsError, HomeTravelLengthError, InstanceError, InvalidActivityTimeError,
    InvalidContractRangeError, InvalidRulesError, InvalidShiftBoundsError, NoActivitiesError,
    NoDriversError, StationOutOfRangeError, TravelMatrixShapeError, UnknownSalaryError,
};
use crate::instance::Instance;
use crate::mask::PairMask;
use crate::robustness::RobustnessConfig;
use crate::rules::RulesConfig;
use crate::salary::SalarySettings;
use crate::shift::ShiftTable;
use driver_plan_core::time::Minutes;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    rules: RulesConfig,
    robustness: RobustnessConfig,
    station_count: usize,
    travel_times: Vec<Minutes>,
    travel_distances: Vec<f64>,
    qualification_count: usize,
    activities: Vec<ActivityRequest>,
    salaries: Vec<SalarySettings>,
    internal: Vec<InternalDriverRequest>,
    external: Vec<(ExternalDriverType, usize)>,
}

impl InstanceBuilder {
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            rules,
            robustness: RobustnessConfig::default(),
            station_count: 0,
            travel_times: Vec::new(),
            travel_distances: Vec::new(),
            qualification_count: 0,
            activities: Vec::new(),
            salaries: Vec::new(),
            internal: Vec::new(),
            external: Vec::new(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    /// Row-major `station_count x station_count` car travel matrices.
    pub fn with_travel_matrices(
        mut self,
        station_count: usize,
        times: Vec<Minutes>,
        distances: Vec<f64>,
    ) -> Self {
        self.station_count = station_count;
        self.travel_times = times;
        self.travel_distances = distances;
        self
    }

    pub fn with_qualification_count(mut self, count: usize) -> Self {
        self.qualification_count = count;
        self
    }

    pub fn add_salary_settings(&mut self, settings: SalarySettings) -> SalaryIndex {
        self.salaries.push(settings);
        SalaryIndex::new(self.salaries.len() - 1)
    }

    pub fn add_activity(&mut self, activity: ActivityRequest) -> &mut Self {
        self.activities.push(activity);
        self
    }

    pub fn extend_activities<I>(&mut self, activities: I) -> &mut Self
    where
        I: IntoIterator<Item = ActivityRequest>,
    {
        self.activities.extend(activities);
        self
    }

    pub fn add_internal_driver(&mut self, driver: InternalDriverRequest) -> &mut Self {
        self.internal.push(driver);
        self
    }

    /// Adds an external company providing `driver_count` interchangeable drivers.
    pub fn add_external_type(&mut self, driver_type: ExternalDriverType, driver_count: usize) -> &mut Self {
        self.external.push((driver_type, driver_count));
        self
    }

    fn validate(&self) -> Result<(), InstanceError> {
        if self.rules.rounding_step <= 0 {
            return Err(InvalidRulesError::new("rounding step must be positive").into());
        }
        if self.rules.horizon <= 0 {
            return Err(InvalidRulesError::new("horizon must be positive").into());
        }
        if self.rules.single_free_day_min_rest > self.rules.double_free_day_min_rest {
            return Err(InvalidRulesError::new(
                "single free day rest must not exceed double free day rest",
            )
            .into());
        }
        if self.activities.is_empty() {
            return Err(NoActivitiesError.into());
        }

        let n = self.station_count;
        if n == 0 || self.travel_times.len() != n * n || self.travel_distances.len() != n * n {
            return Err(
                TravelMatrixShapeError::new(n, self.travel_times.len(), self.travel_distances.len())
                    .into(),
            );
        }

        for (id, a) in self.activities.iter().enumerate() {
            if a.end_time < a.start_time {
                return Err(InvalidActivityTimeError::new(id, a.start_time, a.end_time).into());
            }
            for station in [a.start_station, a.end_station] {
                if station >= n {
                    return Err(StationOutOfRangeError::new(id, station, n).into());
                }
            }
        }

        for (i, s) in self.salaries.iter().enumerate() {
            if s.weekday_blocks.is_empty() {
                return Err(EmptySalarySettingsError::new(SalaryIndex::new(i)).into());
            }
        }

        if self.internal.is_empty() && self.external.iter().all(|(_, count)| *count == 0) {
            return Err(NoDriversError.into());
        }

        for d in &self.internal {
            if d.salary.index() >= self.salaries.len() {
                return Err(UnknownSalaryError::new(d.salary).into());
            }
            if !d.home.is_consistent(n) {
                return Err(HomeTravelLengthError::new(&d.name, n, d.home.station_count()).into());
            }
            if let Some((min, max)) = d.contract_range {
                if min < 0 || min > max {
                    return Err(InvalidContractRangeError::new(&d.name, min, max).into());
                }
            }
        }

        for (t, _) in &self.external {
            if t.salary.index() >= self.salaries.len() {
                return Err(UnknownSalaryError::new(t.salary).into());
            }
            if !t.home.is_consistent(n) {
                return Err(HomeTravelLengthError::new(&t.name, n, t.home.station_count()).into());
            }
            if t.min_shift_count > t.max_shift_count {
                return Err(
                    InvalidShiftBoundsError::new(&t.name, t.min_shift_count, t.max_shift_count).into(),
                );
            }
        }

        Ok(())
    }

    fn sorted_activities(&self) -> (Vec<Activity>, usize) {
        let mut order: Vec<usize> = (0..self.activities.len()).collect();
        order.sort_by_key(|&id| {
            let a = &self.activities[id];
            (a.start_time, a.end_time, id)
        });

        let mut activities: Vec<Activity> = order
            .iter()
            .enumerate()
            .map(|(index, &id)| Activity::from_request(index, id, &self.activities[id]))
            .collect();

        let mut route_counts: HashMap<(usize, usize), usize> = HashMap::new();
        for key in activities.iter().filter_map(Activity::route_key) {
            *route_counts.entry(key).or_insert(0) += 1;
        }
        let mut route_indices: HashMap<(usize, usize), usize> = HashMap::new();
        for activity in activities.iter_mut() {
            let Some(key) = activity.route_key() else {
                continue;
            };
            if route_counts.get(&key).copied().unwrap_or(0) < 2 {
                continue;
            }
            let next = route_indices.len();
            let route = *route_indices.entry(key).or_insert(next);
            activity.set_shared_route(route);
        }

        (activities, route_indices.len())
    }

    fn contract_range(&self, driver: &InternalDriverRequest) -> (Minutes, Minutes) {
        driver.contract_range.unwrap_or_else(|| {
            let ct = driver.contract_time as f64;
            (
                (ct * self.rules.min_contract_fraction).round() as Minutes,
                (ct * self.rules.max_contract_fraction).round() as Minutes,
            )
        })
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn build(self) -> Result<Instance, InstanceError> {
        self.validate()?;

        let (activities, shared_route_count) = self.sorted_activities();
        let n = activities.len();
        let stations = self.station_count;
        let travel = |from: usize, to: usize| self.travel_times[from * stations + to];

        let mut successor = PairMask::new(n);
        let mut same_shift = PairMask::new(n);
        let mut robustness = vec![0.0; n * n];
        for first in &activities {
            let i = first.index().index();
            for second in &activities {
                let j = second.index().index();
                let travel_time = travel(first.end_station().index(), second.start_station().index());
                let waiting = second.start_time() - first.end_time() - travel_time;
                if i != j && waiting >= 0 {
                    successor.set(i, j, true);
                    robustness[i * n + j] = self.robustness.succession_cost(first, second, waiting);
                }
                if j >= i {
                    same_shift.set(i, j, waiting <= self.rules.shift_waiting_threshold);
                }
            }
        }

        let mut drivers = Vec::new();
        for (internal_index, request) in self.internal.iter().enumerate() {
            let range = self.contract_range(request);
            drivers.push(Driver::internal(
                DriverIndex::new(drivers.len()),
                internal_index,
                request.clone(),
                range,
                self.qualification_count,
            ));
        }
        let internal_count = drivers.len();
        let required_internal_count = self.internal.iter().filter(|d| !d.optional).count();

        let mut drivers_by_type = Vec::with_capacity(self.external.len());
        for (t, (driver_type, count)) in self.external.iter().enumerate() {
            let mut of_type = Vec::with_capacity(*count);
            for k in 0..*count {
                let index = DriverIndex::new(drivers.len());
                drivers.push(Driver::external(index, ExternalTypeIndex::new(t), k, driver_type));
                of_type.push(index);
            }
            drivers_by_type.push(of_type);
        }

        let shift_table = ShiftTable::build(&self.rules, &self.salaries);

        tracing::debug!(
            activities = n,
            internal_drivers = internal_count,
            required_internal_drivers = required_internal_count,
            drivers = drivers.len(),
            successions = successor.count_ones(),
            shared_routes = shared_route_count,
            "Instance built"
        );

        Ok(Instance {
            rules: self.rules,
            robustness_config: self.robustness,
            activities,
            successor,
            same_shift,
            robustness,
            station_count: stations,
            travel_times: self.travel_times,
            travel_distances: self.travel_distances,
            drivers,
            internal_count,
            required_internal_count,
            external_types: self.external.into_iter().map(|(t, _)| t).collect(),
            drivers_by_type,
            salaries: self.salaries,
            shift_table,
            shared_route_count,
        })
    }
}
