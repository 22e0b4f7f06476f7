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

use crate::common::{ActivityIndex, StationIndex};
use driver_plan_core::time::{Minutes, TimeRange};

/// Activity as supplied to the [`InstanceBuilder`](crate::builder::InstanceBuilder).
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRequest {
    pub start_station: usize,
    pub end_station: usize,
    pub start_time: Minutes,
    pub end_time: Minutes,
    pub duty: Option<u32>,
    pub project: Option<u32>,
    pub driving: bool,
    pub qualification: Option<usize>,
}

impl ActivityRequest {
    pub fn new(
        start_station: usize,
        end_station: usize,
        start_time: Minutes,
        end_time: Minutes,
    ) -> Self {
        Self {
            start_station,
            end_station,
            start_time,
            end_time,
            duty: None,
            project: None,
            driving: true,
            qualification: None,
        }
    }

    pub fn with_duty(mut self, duty: u32) -> Self {
        self.duty = Some(duty);
        self
    }

    pub fn with_project(mut self, project: u32) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_driving(mut self, driving: bool) -> Self {
        self.driving = driving;
        self
    }

    pub fn with_qualification(mut self, qualification: usize) -> Self {
        self.qualification = Some(qualification);
        self
    }
}

/// A fixed piece of work: drive from `start_station` at `start_time` and
/// finish at `end_station` at `end_time`.
///
/// Activities are indexed in ascending start time order, so a driver path
/// sorted by index is also sorted chronologically.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    index: ActivityIndex,
    source_id: usize,
    start_station: StationIndex,
    end_station: StationIndex,
    start_time: Minutes,
    end_time: Minutes,
    duty: Option<u32>,
    project: Option<u32>,
    driving: bool,
    qualification: Option<usize>,
    shared_route: Option<usize>,
}

impl Activity {
    pub(crate) fn from_request(index: usize, source_id: usize, request: &ActivityRequest) -> Self {
        Self {
            index: ActivityIndex::new(index),
            source_id,
            start_station: StationIndex::new(request.start_station),
            end_station: StationIndex::new(request.end_station),
            start_time: request.start_time,
            end_time: request.end_time,
            duty: request.duty,
            project: request.project,
            driving: request.driving,
            qualification: request.qualification,
            shared_route: None,
        }
    }

    pub(crate) fn set_shared_route(&mut self, route: usize) {
        self.shared_route = Some(route);
    }

    #[inline]
    pub fn index(&self) -> ActivityIndex {
        self.index
    }

    /// Position of the activity in the order it was added to the builder.
    #[inline]
    pub fn source_id(&self) -> usize {
        self.source_id
    }

    #[inline]
    pub fn start_station(&self) -> StationIndex {
        self.start_station
    }

    #[inline]
    pub fn end_station(&self) -> StationIndex {
        self.end_station
    }

    #[inline]
    pub fn start_time(&self) -> Minutes {
        self.start_time
    }

    #[inline]
    pub fn end_time(&self) -> Minutes {
        self.end_time
    }

    #[inline]
    pub fn duration(&self) -> Minutes {
        self.end_time - self.start_time
    }

    #[inline]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    #[inline]
    pub fn duty(&self) -> Option<u32> {
        self.duty
    }

    #[inline]
    pub fn project(&self) -> Option<u32> {
        self.project
    }

    #[inline]
    pub fn is_driving(&self) -> bool {
        self.driving
    }

    #[inline]
    pub fn qualification(&self) -> Option<usize> {
        self.qualification
    }

    /// Index of the unordered station pair this activity travels, if at
    /// least one other activity travels the same pair.
    #[inline]
    pub fn shared_route(&self) -> Option<usize> {
        self.shared_route
    }

    /// Unordered station pair, `None` for activities that stay at one station.
    #[inline]
    pub fn route_key(&self) -> Option<(usize, usize)> {
        let a = self.start_station.index();
        let b = self.end_station.index();
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => Some((a, b)),
            std::cmp::Ordering::Greater => Some((b, a)),
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Activity({}, {} -> {}, {}..{})",
            self.index.index(),
            self.start_station.index(),
            self.end_station.index(),
            self.start_time,
            self.end_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_is_unordered() {
        let a = Activity::from_request(0, 0, &ActivityRequest::new(3, 1, 0, 10));
        let b = Activity::from_request(1, 1, &ActivityRequest::new(1, 3, 20, 30));
        assert_eq!(a.route_key(), Some((1, 3)));
        assert_eq!(a.route_key(), b.route_key());
    }

    #[test]
    fn test_round_trip_activity_has_no_route() {
        let a = Activity::from_request(0, 0, &ActivityRequest::new(2, 2, 0, 10));
        assert_eq!(a.route_key(), None);
        assert_eq!(a.duration(), 10);
    }
}
