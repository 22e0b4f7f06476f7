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
use crate::common::{DriverIndex, ExternalTypeIndex, SalaryIndex, StationIndex};
use crate::satisfaction::SatisfactionCriterion;
use driver_plan_core::time::{Minutes, TimeRange};
use fixedbitset::FixedBitSet;
use rangemap::RangeSet;

/// Travel between a driver's home and every station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeTravel {
    times: Vec<Minutes>,
    distances: Vec<f64>,
}

impl HomeTravel {
    pub fn new(times: Vec<Minutes>, distances: Vec<f64>) -> Self {
        Self { times, distances }
    }

    #[inline]
    pub fn time(&self, station: StationIndex) -> Minutes {
        self.times[station.index()]
    }

    #[inline]
    pub fn distance(&self, station: StationIndex) -> f64 {
        self.distances[station.index()]
    }

    #[inline]
    pub fn station_count(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub(crate) fn is_consistent(&self, stations: usize) -> bool {
        self.times.len() == stations && self.distances.len() == stations
    }
}

/// Internal driver as supplied to the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalDriverRequest {
    pub name: String,
    pub salary: SalaryIndex,
    pub contract_time: Minutes,
    /// Explicit contract range; derived from the rules when `None`.
    pub contract_range: Option<(Minutes, Minutes)>,
    pub travel_time_rate: f64,
    pub unpaid_travel_time_per_shift: Minutes,
    pub hotel_allowed: bool,
    /// Optional drivers may be used but their satisfaction is not
    /// counted in the fleet score.
    pub optional: bool,
    pub home: HomeTravel,
    pub criteria: Vec<SatisfactionCriterion>,
    pub unavailability: Vec<TimeRange>,
    pub qualifications: Option<Vec<usize>>,
}

impl InternalDriverRequest {
    pub fn new(name: impl Into<String>, salary: SalaryIndex, contract_time: Minutes, home: HomeTravel) -> Self {
        Self {
            name: name.into(),
            salary,
            contract_time,
            contract_range: None,
            travel_time_rate: 0.5,
            unpaid_travel_time_per_shift: 60,
            hotel_allowed: true,
            optional: false,
            home,
            criteria: SatisfactionCriterion::default_set(),
            unavailability: Vec::new(),
            qualifications: None,
        }
    }

    pub fn with_contract_range(mut self, min: Minutes, max: Minutes) -> Self {
        self.contract_range = Some((min, max));
        self
    }

    pub fn with_hotel_allowed(mut self, allowed: bool) -> Self {
        self.hotel_allowed = allowed;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_travel_pay(mut self, rate: f64, unpaid_per_shift: Minutes) -> Self {
        self.travel_time_rate = rate;
        self.unpaid_travel_time_per_shift = unpaid_per_shift;
        self
    }

    pub fn with_criteria(mut self, criteria: Vec<SatisfactionCriterion>) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_unavailability(mut self, range: TimeRange) -> Self {
        self.unavailability.push(range);
        self
    }

    pub fn with_qualifications(mut self, qualifications: Vec<usize>) -> Self {
        self.qualifications = Some(qualifications);
        self
    }
}

/// A company supplying external drivers.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDriverType {
    pub name: String,
    pub salary: SalaryIndex,
    pub hotel_allowed: bool,
    pub min_shift_count: u32,
    pub max_shift_count: u32,
    pub travel_distance_rate: f64,
    pub unpaid_travel_distance_per_shift: f64,
    pub home: HomeTravel,
}

impl ExternalDriverType {
    pub fn new(name: impl Into<String>, salary: SalaryIndex, home: HomeTravel) -> Self {
        Self {
            name: name.into(),
            salary,
            hotel_allowed: true,
            min_shift_count: 0,
            max_shift_count: u32::MAX,
            travel_distance_rate: 0.25,
            unpaid_travel_distance_per_shift: 0.0,
            home,
        }
    }

    pub fn with_shift_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_shift_count = min;
        self.max_shift_count = max;
        self
    }

    pub fn with_hotel_allowed(mut self, allowed: bool) -> Self {
        self.hotel_allowed = allowed;
        self
    }

    /// Shifts outside `[min_shift_count, max_shift_count]`.
    #[inline]
    pub fn shift_count_violation(&self, shift_count: i64) -> i64 {
        let min = self.min_shift_count as i64;
        let max = self.max_shift_count as i64;
        (min - shift_count).max(0) + (shift_count - max).max(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InternalDriver {
    internal_index: usize,
    name: String,
    contract_time: Minutes,
    min_contract_time: Minutes,
    max_contract_time: Minutes,
    travel_time_rate: f64,
    unpaid_travel_time_per_shift: Minutes,
    optional: bool,
    criteria: Vec<SatisfactionCriterion>,
}

impl InternalDriver {
    #[inline]
    pub fn internal_index(&self) -> usize {
        self.internal_index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn contract_time(&self) -> Minutes {
        self.contract_time
    }

    #[inline]
    pub fn min_contract_time(&self) -> Minutes {
        self.min_contract_time
    }

    #[inline]
    pub fn max_contract_time(&self) -> Minutes {
        self.max_contract_time
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[inline]
    pub fn criteria(&self) -> &[SatisfactionCriterion] {
        &self.criteria
    }

    /// Worked minutes outside the contract range.
    #[inline]
    pub fn contract_time_violation(&self, worked_time: i64) -> i64 {
        (self.min_contract_time as i64 - worked_time).max(0)
            + (worked_time - self.max_contract_time as i64).max(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDriver {
    type_index: ExternalTypeIndex,
    index_in_type: usize,
    travel_distance_rate: f64,
    unpaid_travel_distance_per_shift: f64,
}

impl ExternalDriver {
    #[inline]
    pub fn type_index(&self) -> ExternalTypeIndex {
        self.type_index
    }

    #[inline]
    pub fn index_in_type(&self) -> usize {
        self.index_in_type
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DriverKind {
    Internal(InternalDriver),
    External(ExternalDriver),
}

/// A driver of either kind.
///
/// Shared capabilities (home travel, salary type, availability) live on the
/// driver itself; the kind only carries what differs, and is matched once
/// per shift when travel is paid.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    index: DriverIndex,
    kind: DriverKind,
    salary: SalaryIndex,
    hotel_allowed: bool,
    home: HomeTravel,
    unavailability: RangeSet<Minutes>,
    qualifications: Option<FixedBitSet>,
}

impl Driver {
    pub(crate) fn internal(
        index: DriverIndex,
        internal_index: usize,
        request: InternalDriverRequest,
        contract_range: (Minutes, Minutes),
        qualification_count: usize,
    ) -> Self {
        let qualifications = request.qualifications.as_ref().map(|q| {
            let mut bits = FixedBitSet::with_capacity(qualification_count);
            for &bit in q {
                if bit < qualification_count {
                    bits.insert(bit);
                }
            }
            bits
        });
        let unavailability = request
            .unavailability
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.start()..r.end())
            .collect();
        Self {
            index,
            salary: request.salary,
            hotel_allowed: request.hotel_allowed,
            home: request.home,
            unavailability,
            qualifications,
            kind: DriverKind::Internal(InternalDriver {
                internal_index,
                name: request.name,
                contract_time: request.contract_time,
                min_contract_time: contract_range.0,
                max_contract_time: contract_range.1,
                travel_time_rate: request.travel_time_rate,
                unpaid_travel_time_per_shift: request.unpaid_travel_time_per_shift,
                optional: request.optional,
                criteria: request.criteria,
            }),
        }
    }

    pub(crate) fn external(
        index: DriverIndex,
        type_index: ExternalTypeIndex,
        index_in_type: usize,
        driver_type: &ExternalDriverType,
    ) -> Self {
        Self {
            index,
            salary: driver_type.salary,
            hotel_allowed: driver_type.hotel_allowed,
            home: driver_type.home.clone(),
            unavailability: RangeSet::new(),
            qualifications: None,
            kind: DriverKind::External(ExternalDriver {
                type_index,
                index_in_type,
                travel_distance_rate: driver_type.travel_distance_rate,
                unpaid_travel_distance_per_shift: driver_type.unpaid_travel_distance_per_shift,
            }),
        }
    }

    #[inline]
    pub fn index(&self) -> DriverIndex {
        self.index
    }

    #[inline]
    pub fn kind(&self) -> &DriverKind {
        &self.kind
    }

    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, DriverKind::Internal(_))
    }

    #[inline]
    pub fn as_internal(&self) -> Option<&InternalDriver> {
        match &self.kind {
            DriverKind::Internal(d) => Some(d),
            DriverKind::External(_) => None,
        }
    }

    #[inline]
    pub fn as_external(&self) -> Option<&ExternalDriver> {
        match &self.kind {
            DriverKind::External(d) => Some(d),
            DriverKind::Internal(_) => None,
        }
    }

    #[inline]
    pub fn salary(&self) -> SalaryIndex {
        self.salary
    }

    #[inline]
    pub fn hotel_allowed(&self) -> bool {
        self.hotel_allowed
    }

    #[inline]
    pub fn home_travel_time(&self, station: StationIndex) -> Minutes {
        self.home.time(station)
    }

    #[inline]
    pub fn home_travel_distance(&self, station: StationIndex) -> f64 {
        self.home.distance(station)
    }

    /// Cost of travelling by own car for one shift.
    ///
    /// Internal drivers are paid per minute beyond an unpaid allowance,
    /// external drivers per kilometre beyond theirs.
    pub fn paid_travel_cost(&self, time: Minutes, distance: f64) -> f64 {
        match &self.kind {
            DriverKind::Internal(d) => {
                (time - d.unpaid_travel_time_per_shift).max(0) as f64 * d.travel_time_rate
            }
            DriverKind::External(d) => {
                (distance - d.unpaid_travel_distance_per_shift).max(0.0) * d.travel_distance_rate
            }
        }
    }

    #[inline]
    pub fn is_available(&self, start: Minutes, end: Minutes) -> bool {
        start >= end || !self.unavailability.overlaps(&(start..end))
    }

    #[inline]
    pub fn is_qualified(&self, activity: &Activity) -> bool {
        match (activity.qualification(), &self.qualifications) {
            (Some(required), Some(bits)) => bits.contains(required),
            _ => true,
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DriverKind::Internal(d) => write!(f, "Internal({}, {})", self.index.index(), d.name),
            DriverKind::External(d) => write!(
                f,
                "External({}, type {}, #{})",
                self.index.index(),
                d.type_index.index(),
                d.index_in_type
            ),
        }
    }
}
