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

use crate::common::SalaryIndex;
use driver_plan_core::time::Minutes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoActivitiesError;

impl std::fmt::Display for NoActivitiesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The instance contains no activities.")
    }
}

impl std::error::Error for NoActivitiesError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoDriversError;

impl std::fmt::Display for NoDriversError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The instance contains no drivers.")
    }
}

impl std::error::Error for NoDriversError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidActivityTimeError {
    source_id: usize,
    start: Minutes,
    end: Minutes,
}

impl InvalidActivityTimeError {
    pub fn new(source_id: usize, start: Minutes, end: Minutes) -> Self {
        Self {
            source_id,
            start,
            end,
        }
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn start(&self) -> Minutes {
        self.start
    }

    pub fn end(&self) -> Minutes {
        self.end
    }
}

impl std::fmt::Display for InvalidActivityTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Activity {} ends at {} before it starts at {}",
            self.source_id, self.end, self.start
        )
    }
}

impl std::error::Error for InvalidActivityTimeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationOutOfRangeError {
    source_id: usize,
    station: usize,
    station_count: usize,
}

impl StationOutOfRangeError {
    pub fn new(source_id: usize, station: usize, station_count: usize) -> Self {
        Self {
            source_id,
            station,
            station_count,
        }
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn station(&self) -> usize {
        self.station
    }

    pub fn station_count(&self) -> usize {
        self.station_count
    }
}

impl std::fmt::Display for StationOutOfRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Activity {} references station {} but only {} stations exist",
            self.source_id, self.station, self.station_count
        )
    }
}

impl std::error::Error for StationOutOfRangeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TravelMatrixShapeError {
    station_count: usize,
    times_len: usize,
    distances_len: usize,
}

impl TravelMatrixShapeError {
    pub fn new(station_count: usize, times_len: usize, distances_len: usize) -> Self {
        Self {
            station_count,
            times_len,
            distances_len,
        }
    }

    pub fn station_count(&self) -> usize {
        self.station_count
    }
}

impl std::fmt::Display for TravelMatrixShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Travel matrices for {} stations need {} entries, got {} times and {} distances",
            self.station_count,
            self.station_count * self.station_count,
            self.times_len,
            self.distances_len
        )
    }
}

impl std::error::Error for TravelMatrixShapeError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HomeTravelLengthError {
    driver: String,
    expected: usize,
    actual: usize,
}

impl HomeTravelLengthError {
    pub fn new(driver: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self {
            driver: driver.into(),
            expected,
            actual,
        }
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn actual(&self) -> usize {
        self.actual
    }
}

impl std::fmt::Display for HomeTravelLengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Home travel of {} covers {} stations, expected {}",
            self.driver, self.actual, self.expected
        )
    }
}

impl std::error::Error for HomeTravelLengthError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownSalaryError {
    salary: SalaryIndex,
}

impl UnknownSalaryError {
    pub fn new(salary: SalaryIndex) -> Self {
        Self { salary }
    }

    pub fn salary(&self) -> SalaryIndex {
        self.salary
    }
}

impl std::fmt::Display for UnknownSalaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown salary settings {}", self.salary)
    }
}

impl std::error::Error for UnknownSalaryError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptySalarySettingsError {
    salary: SalaryIndex,
}

impl EmptySalarySettingsError {
    pub fn new(salary: SalaryIndex) -> Self {
        Self { salary }
    }

    pub fn salary(&self) -> SalaryIndex {
        self.salary
    }
}

impl std::fmt::Display for EmptySalarySettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salary settings {} define no rate blocks", self.salary)
    }
}

impl std::error::Error for EmptySalarySettingsError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidContractRangeError {
    driver: String,
    min: Minutes,
    max: Minutes,
}

impl InvalidContractRangeError {
    pub fn new(driver: impl Into<String>, min: Minutes, max: Minutes) -> Self {
        Self {
            driver: driver.into(),
            min,
            max,
        }
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn min(&self) -> Minutes {
        self.min
    }

    pub fn max(&self) -> Minutes {
        self.max
    }
}

impl std::fmt::Display for InvalidContractRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contract range [{}, {}] of {} is invalid",
            self.min, self.max, self.driver
        )
    }
}

impl std::error::Error for InvalidContractRangeError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidShiftBoundsError {
    driver_type: String,
    min: u32,
    max: u32,
}

impl InvalidShiftBoundsError {
    pub fn new(driver_type: impl Into<String>, min: u32, max: u32) -> Self {
        Self {
            driver_type: driver_type.into(),
            min,
            max,
        }
    }

    pub fn driver_type(&self) -> &str {
        &self.driver_type
    }
}

impl std::fmt::Display for InvalidShiftBoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Shift count bounds [{}, {}] of external type {} are invalid",
            self.min, self.max, self.driver_type
        )
    }
}

impl std::error::Error for InvalidShiftBoundsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidRulesError {
    reason: &'static str,
}

impl InvalidRulesError {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl std::fmt::Display for InvalidRulesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid rules: {}", self.reason)
    }
}

impl std::error::Error for InvalidRulesError {}

#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    NoActivities(NoActivitiesError),
    NoDrivers(NoDriversError),
    InvalidActivityTime(InvalidActivityTimeError),
    StationOutOfRange(StationOutOfRangeError),
    TravelMatrixShape(TravelMatrixShapeError),
    HomeTravelLength(HomeTravelLengthError),
    UnknownSalary(UnknownSalaryError),
    EmptySalarySettings(EmptySalarySettingsError),
    InvalidContractRange(InvalidContractRangeError),
    InvalidShiftBounds(InvalidShiftBoundsError),
    InvalidRules(InvalidRulesError),
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::NoActivities(e) => write!(f, "{}", e),
            InstanceError::NoDrivers(e) => write!(f, "{}", e),
            InstanceError::InvalidActivityTime(e) => write!(f, "{}", e),
            InstanceError::StationOutOfRange(e) => write!(f, "{}", e),
            InstanceError::TravelMatrixShape(e) => write!(f, "{}", e),
            InstanceError::HomeTravelLength(e) => write!(f, "{}", e),
            InstanceError::UnknownSalary(e) => write!(f, "{}", e),
            InstanceError::EmptySalarySettings(e) => write!(f, "{}", e),
            InstanceError::InvalidContractRange(e) => write!(f, "{}", e),
            InstanceError::InvalidShiftBounds(e) => write!(f, "{}", e),
            InstanceError::InvalidRules(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InstanceError {}

macro_rules! impl_from_error {
    ($($variant:ident($source:ty)),* $(,)?) => {
        $(
            impl From<$source> for InstanceError {
                #[inline]
                fn from(err: $source) -> Self {
                    InstanceError::$variant(err)
                }
            }
        )*
    };
}

impl_from_error!(
    NoActivities(NoActivitiesError),
    NoDrivers(NoDriversError),
    InvalidActivityTime(InvalidActivityTimeError),
    StationOutOfRange(StationOutOfRangeError),
    TravelMatrixShape(TravelMatrixShapeError),
    HomeTravelLength(HomeTravelLengthError),
    UnknownSalary(UnknownSalaryError),
    EmptySalarySettings(EmptySalarySettingsError),
    InvalidContractRange(InvalidContractRangeError),
    InvalidShiftBounds(InvalidShiftBoundsError),
    InvalidRules(InvalidRulesError),
);
