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

use driver_plan_model::common::{ActivityIndex, DriverIndex};

/// Which driver does which activity, and where drivers stay at a hotel.
///
/// Paths are kept sorted by activity index, which is also chronological.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    drivers: Vec<Option<DriverIndex>>,
    hotels: Vec<bool>,
    paths: Vec<Vec<ActivityIndex>>,
    positions: Vec<usize>,
}

impl Assignment {
    pub fn unassigned(activity_count: usize, driver_count: usize) -> Self {
        Self {
            drivers: vec![None; activity_count],
            hotels: vec![false; activity_count],
            paths: vec![Vec::new(); driver_count],
            positions: vec![0; activity_count],
        }
    }

    /// Builds an assignment from a driver per activity and hotel flags.
    pub fn from_parts(
        drivers: Vec<Option<DriverIndex>>,
        hotels: Vec<bool>,
        driver_count: usize,
    ) -> Self {
        debug_assert_eq!(drivers.len(), hotels.len());
        let mut paths = vec![Vec::new(); driver_count];
        let mut positions = vec![0; drivers.len()];
        for (a, driver) in drivers.iter().enumerate() {
            if let Some(d) = driver {
                let path: &mut Vec<ActivityIndex> = &mut paths[d.index()];
                positions[a] = path.len();
                path.push(ActivityIndex::new(a));
            }
        }
        Self {
            drivers,
            hotels,
            paths,
            positions,
        }
    }

    #[inline]
    pub fn activity_count(&self) -> usize {
        self.drivers.len()
    }

    #[inline]
    pub fn driver_count(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn driver_of(&self, activity: ActivityIndex) -> Option<DriverIndex> {
        self.drivers[activity.index()]
    }

    #[inline]
    pub fn has_hotel_after(&self, activity: ActivityIndex) -> bool {
        self.hotels[activity.index()]
    }

    #[inline]
    pub fn path(&self, driver: DriverIndex) -> &[ActivityIndex] {
        &self.paths[driver.index()]
    }

    /// Position of an assigned activity within its driver's path.
    #[inline]
    pub fn position(&self, activity: ActivityIndex) -> Option<usize> {
        self.drivers[activity.index()].map(|_| self.positions[activity.index()])
    }

    #[inline]
    pub fn drivers(&self) -> &[Option<DriverIndex>] {
        &self.drivers
    }

    #[inline]
    pub fn hotels(&self) -> &[bool] {
        &self.hotels
    }

    pub fn unassigned_count(&self) -> usize {
        self.drivers.iter().filter(|d| d.is_none()).count()
    }

    pub fn assign(&mut self, activity: ActivityIndex, driver: DriverIndex) {
        if self.driver_of(activity) == Some(driver) {
            return;
        }
        self.unassign(activity);
        let path = &mut self.paths[driver.index()];
        let at = path.partition_point(|&a| a < activity);
        path.insert(at, activity);
        for (p, &a) in path.iter().enumerate().skip(at) {
            self.positions[a.index()] = p;
        }
        self.drivers[activity.index()] = Some(driver);
    }

    pub fn unassign(&mut self, activity: ActivityIndex) {
        let Some(driver) = self.drivers[activity.index()].take() else {
            return;
        };
        let at = self.positions[activity.index()];
        let path = &mut self.paths[driver.index()];
        debug_assert_eq!(path[at], activity);
        path.remove(at);
        for (p, &a) in path.iter().enumerate().skip(at) {
            self.positions[a.index()] = p;
        }
    }

    #[inline]
    pub fn set_hotel_after(&mut self, activity: ActivityIndex, hotel: bool) {
        self.hotels[activity.index()] = hotel;
    }

    #[inline]
    pub fn toggle_hotel_after(&mut self, activity: ActivityIndex) {
        self.hotels[activity.index()] ^= true;
    }

    /// Exchanges the drivers of two activities.
    pub fn swap(&mut self, first: ActivityIndex, second: ActivityIndex) {
        let a = self.driver_of(first);
        let b = self.driver_of(second);
        match b {
            Some(d) => self.assign(first, d),
            None => self.unassign(first),
        }
        match a {
            Some(d) => self.assign(second, d),
            None => self.unassign(second),
        }
    }

    /// Checks paths, positions and the driver table against each other.
    pub fn is_consistent(&self) -> bool {
        let paths_ok = self.paths.iter().enumerate().all(|(d, path)| {
            path.windows(2).all(|w| w[0] < w[1])
                && path.iter().enumerate().all(|(p, &a)| {
                    self.drivers[a.index()] == Some(DriverIndex::new(d))
                        && self.positions[a.index()] == p
                })
        });
        let assigned: usize = self.paths.iter().map(Vec::len).sum();
        paths_ok && assigned + self.unassigned_count() == self.drivers.len()
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Assignment({} activities, {} unassigned, {} hotel stays)",
            self.drivers.len(),
            self.unassigned_count(),
            self.hotels.iter().filter(|&&h| h).count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(i: usize) -> ActivityIndex {
        ActivityIndex::new(i)
    }

    fn d(i: usize) -> DriverIndex {
        DriverIndex::new(i)
    }

    #[test]
    fn test_paths_stay_sorted() {
        let mut asg = Assignment::unassigned(5, 2);
        asg.assign(a(3), d(0));
        asg.assign(a(0), d(0));
        asg.assign(a(4), d(0));
        asg.assign(a(1), d(0));
        assert_eq!(asg.path(d(0)), &[a(0), a(1), a(3), a(4)]);
        assert_eq!(asg.position(a(3)), Some(2));
        assert!(asg.is_consistent());
    }

    #[test]
    fn test_reassign_moves_between_paths() {
        let mut asg = Assignment::unassigned(3, 2);
        asg.assign(a(0), d(0));
        asg.assign(a(1), d(0));
        asg.assign(a(0), d(1));
        assert_eq!(asg.path(d(0)), &[a(1)]);
        assert_eq!(asg.path(d(1)), &[a(0)]);
        assert_eq!(asg.position(a(1)), Some(0));
        assert!(asg.is_consistent());
    }

    #[test]
    fn test_swap_exchanges_drivers() {
        let mut asg = Assignment::unassigned(3, 2);
        asg.assign(a(0), d(0));
        asg.assign(a(2), d(1));
        asg.swap(a(0), a(2));
        assert_eq!(asg.driver_of(a(0)), Some(d(1)));
        assert_eq!(asg.driver_of(a(2)), Some(d(0)));
        asg.swap(a(1), a(2));
        assert_eq!(asg.driver_of(a(1)), Some(d(0)));
        assert_eq!(asg.driver_of(a(2)), None);
        assert!(asg.is_consistent());
    }

    #[test]
    fn test_from_parts_builds_paths() {
        let asg = Assignment::from_parts(
            vec![Some(d(1)), None, Some(d(1)), Some(d(0))],
            vec![false, false, true, false],
            2,
        );
        assert_eq!(asg.path(d(1)), &[a(0), a(2)]);
        assert_eq!(asg.unassigned_count(), 1);
        assert!(asg.has_hotel_after(a(2)));
        assert!(asg.is_consistent());
    }

    #[test]
    fn test_unassign_is_idempotent() {
        let mut asg = Assignment::unassigned(2, 1);
        asg.assign(a(1), d(0));
        asg.unassign(a(1));
        asg.unassign(a(1));
        assert!(asg.path(d(0)).is_empty());
        assert_eq!(asg.position(a(1)), None);
    }
}
