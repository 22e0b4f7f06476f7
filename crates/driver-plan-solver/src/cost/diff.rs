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

use super::{CostModel, PathWalker, relevant_range};
use crate::operation::OperationDiff;
use crate::satisfaction::fleet_satisfaction;
use crate::state::assignment::Assignment;
use crate::state::info::{DriverInfo, TotalInfo};
use crate::state::search_state::SearchState;
use driver_plan_model::common::{ActivityIndex, DriverIndex, ExternalTypeIndex};
use smallvec::SmallVec;
use std::ops::Range;

type Activities = SmallVec<[ActivityIndex; 16]>;
type DriverDeltas = SmallVec<[(DriverIndex, DriverInfo); 2]>;

/// A part of one driver's path before and after an edit.
#[derive(Debug)]
struct Segment<'p> {
    old: &'p [ActivityIndex],
    new: Activities,
    after: Option<ActivityIndex>,
}

impl<'p> Segment<'p> {
    fn new(path: &'p [ActivityIndex], range: Range<usize>, new: Activities) -> Self {
        Self {
            after: path.get(range.end).copied(),
            old: &path[range],
            new,
        }
    }
}

impl CostModel<'_> {
    /// Part of `path` affected by removing the activity at `position`.
    fn removal_range(&self, assignment: &Assignment, path: &[ActivityIndex], position: usize) -> Range<usize> {
        let (first, last) = relevant_range(
            self.instance,
            path.len(),
            position,
            |i| path[i],
            |a| assignment.has_hotel_after(a),
        );
        first..last + 1
    }

    /// Part of `path` affected by inserting `activity` at `position`.
    fn insertion_range(
        &self,
        assignment: &Assignment,
        path: &[ActivityIndex],
        activity: ActivityIndex,
        position: usize,
    ) -> Range<usize> {
        let virtual_at = |i: usize| match i.cmp(&position) {
            std::cmp::Ordering::Less => path[i],
            std::cmp::Ordering::Equal => activity,
            std::cmp::Ordering::Greater => path[i - 1],
        };
        let (first, last) = relevant_range(
            self.instance,
            path.len() + 1,
            position,
            virtual_at,
            |a| assignment.has_hotel_after(a),
        );
        // The virtual range ends at or after the inserted activity.
        first..last
    }

    fn removal_segment<'p>(
        &self,
        assignment: &Assignment,
        path: &'p [ActivityIndex],
        activity: ActivityIndex,
        position: usize,
    ) -> Segment<'p> {
        let range = self.removal_range(assignment, path, position);
        let new = path[range.clone()].iter().copied().filter(|&a| a != activity).collect();
        Segment::new(path, range, new)
    }

    fn insertion_segment<'p>(
        &self,
        assignment: &Assignment,
        path: &'p [ActivityIndex],
        activity: ActivityIndex,
    ) -> Segment<'p> {
        let position = path.partition_point(|&a| a < activity);
        let range = self.insertion_range(assignment, path, activity, position);
        let mut new: Activities = path[range.start..position].iter().copied().collect();
        new.push(activity);
        new.extend(path[position..range.end].iter().copied());
        Segment::new(path, range, new)
    }

    /// Effect on one driver of replacing `segments` of its path, with the
    /// hotel flag of `toggled` inverted in the new version.
    fn driver_delta(
        &self,
        state: &SearchState,
        driver: DriverIndex,
        segments: &[Segment<'_>],
        toggled: Option<ActivityIndex>,
    ) -> DriverInfo {
        let assignment = state.assignment();
        let d = self.instance.driver(driver);
        let pf = state.penalty_factor();
        let old_walker = PathWalker::new(self.instance, d, |a| assignment.has_hotel_after(a));
        let new_walker = PathWalker::new(self.instance, d, |a| {
            assignment.has_hotel_after(a) != (Some(a) == toggled)
        });

        let routes = self.instance.shared_route_count();
        let mut old = DriverInfo::with_routes(routes);
        let mut new = DriverInfo::with_routes(routes);
        for segment in segments {
            old += &old_walker.walk(segment.old, segment.after);
            new += &new_walker.walk(&segment.new, segment.after);
        }

        let full = state.driver_info(driver);
        self.finish(&mut old, self.path_values(d, full), pf);
        let mut new_full = full - &old;
        new_full += &new;
        self.finish(&mut new, self.path_values(d, &new_full), pf);
        &new - &old
    }

    fn removal_delta(&self, state: &SearchState, driver: DriverIndex, activity: ActivityIndex) -> DriverInfo {
        let assignment = state.assignment();
        let path = assignment.path(driver);
        let position = assignment.position(activity).unwrap_or_default();
        let segment = self.removal_segment(assignment, path, activity, position);
        self.driver_delta(state, driver, &[segment], None)
    }

    fn insertion_delta(&self, state: &SearchState, driver: DriverIndex, activity: ActivityIndex) -> DriverInfo {
        let assignment = state.assignment();
        let path = assignment.path(driver);
        let segment = self.insertion_segment(assignment, path, activity);
        self.driver_delta(state, driver, &[segment], None)
    }

    /// Effect on `driver` of `remove` leaving its path and `insert` joining.
    fn replacement_delta(
        &self,
        state: &SearchState,
        driver: DriverIndex,
        remove: ActivityIndex,
        insert: ActivityIndex,
    ) -> DriverInfo {
        let assignment = state.assignment();
        let path = assignment.path(driver);
        let position = assignment.position(remove).unwrap_or_default();
        let removal = self.removal_range(assignment, path, position);
        let insert_at = path.partition_point(|&a| a < insert);
        let insertion = self.insertion_range(assignment, path, insert, insert_at);

        if removal.end >= insertion.start && insertion.end >= removal.start {
            let range = removal.start.min(insertion.start)..removal.end.max(insertion.end);
            let mut new: Activities = path[range.clone()].iter().copied().filter(|&a| a != remove).collect();
            new.push(insert);
            new.sort_unstable();
            return self.driver_delta(state, driver, &[Segment::new(path, range, new)], None);
        }

        let segments = [
            self.removal_segment(assignment, path, remove, position),
            self.insertion_segment(assignment, path, insert),
        ];
        self.driver_delta(state, driver, &segments, None)
    }

    /// Turns per-driver deltas into the diff of the whole plan.
    fn assemble(&self, state: &SearchState, drivers: DriverDeltas) -> OperationDiff {
        let pf = state.penalty_factor();
        let mut total = TotalInfo::default();
        let mut type_shifts: SmallVec<[(ExternalTypeIndex, i64); 2]> = SmallVec::new();
        for (driver, delta) in &drivers {
            total.add_driver(delta);
            if let Some(external) = self.instance.driver(*driver).as_external() {
                let t = external.type_index();
                match type_shifts.iter_mut().find(|(x, _)| *x == t) {
                    Some((_, shifts)) => *shifts += delta.shift_count,
                    None => type_shifts.push((t, delta.shift_count)),
                }
            }
        }

        let mut external_types = SmallVec::new();
        for (t, shifts) in type_shifts {
            let old = *state.external_type_info(t);
            let new = self.external_type_info(t, old.shift_count + shifts, pf);
            let delta = new - old;
            total.add_external_type(&delta);
            external_types.push((t, delta));
        }

        let new_satisfaction = fleet_satisfaction(self.instance, |d| {
            let current = state.driver_info(d).stats.satisfaction;
            drivers
                .iter()
                .find(|(x, _)| *x == d)
                .map_or(current, |(_, delta)| current + delta.stats.satisfaction)
        });
        OperationDiff::new(
            drivers,
            external_types,
            total,
            new_satisfaction - state.satisfaction(),
        )
    }

    pub(crate) fn unassign_diff(&self, state: &SearchState, activity: ActivityIndex) -> OperationDiff {
        let Some(driver) = state.assignment().driver_of(activity) else {
            return OperationDiff::default();
        };
        let delta = self.removal_delta(state, driver, activity);
        self.assemble(state, smallvec::smallvec![(driver, delta)])
    }

    pub(crate) fn assign_diff(
        &self,
        state: &SearchState,
        activity: ActivityIndex,
        driver: DriverIndex,
    ) -> OperationDiff {
        let current = state.assignment().driver_of(activity);
        if current == Some(driver) {
            return OperationDiff::default();
        }
        let mut deltas = DriverDeltas::new();
        if let Some(old) = current {
            deltas.push((old, self.removal_delta(state, old, activity)));
        }
        deltas.push((driver, self.insertion_delta(state, driver, activity)));
        self.assemble(state, deltas)
    }

    pub(crate) fn swap_diff(&self, state: &SearchState, first: ActivityIndex, second: ActivityIndex) -> OperationDiff {
        let assignment = state.assignment();
        let (a, b) = (assignment.driver_of(first), assignment.driver_of(second));
        if a == b {
            return OperationDiff::default();
        }
        // Each driver gives up its own activity and takes over the other one.
        let mut deltas = DriverDeltas::new();
        if let Some(d) = a {
            deltas.push((d, self.replacement_delta(state, d, first, second)));
        }
        if let Some(d) = b {
            deltas.push((d, self.replacement_delta(state, d, second, first)));
        }
        self.assemble(state, deltas)
    }

    pub(crate) fn toggle_hotel_diff(&self, state: &SearchState, activity: ActivityIndex) -> OperationDiff {
        let assignment = state.assignment();
        let (Some(driver), Some(position)) = (assignment.driver_of(activity), assignment.position(activity)) else {
            return OperationDiff::default();
        };
        let path = assignment.path(driver);
        let range = self.removal_range(assignment, path, position);
        let segment = Segment::new(path, range.clone(), path[range].iter().copied().collect());
        let delta = self.driver_delta(state, driver, &[segment], Some(activity));
        self.assemble(state, smallvec::smallvec![(driver, delta)])
    }
}
