//! Greedy placement of one student against live seat counts.

use std::collections::{BTreeMap, BTreeSet};

use ea_core::{DepartmentId, DepartmentSnapshot, Reason, StudentRequest};

use crate::trace::{Attempt, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Seats {
    capacity: u32,
    initially_occupied: u32,
    placed: u32,
}

impl Seats {
    #[inline]
    fn remaining(&self) -> u32 {
        self.capacity
            .saturating_sub(self.initially_occupied.saturating_add(self.placed))
    }
}

/// Remaining capacity per department: `capacity - (initial occupied + placed this run)`.
///
/// Only the placement step touches the counters, and it runs serially.
#[derive(Clone, Debug, Default)]
pub struct SeatBook {
    seats: BTreeMap<DepartmentId, Seats>,
}

impl SeatBook {
    /// Departments are expected to have unique ids; on a repeat the first
    /// snapshot wins.
    pub fn new(departments: &[DepartmentSnapshot]) -> Self {
        let mut seats = BTreeMap::new();
        for d in departments {
            seats.entry(d.id.clone()).or_insert(Seats {
                capacity: d.capacity,
                initially_occupied: d.occupied_count(),
                placed: 0,
            });
        }
        Self { seats }
    }

    pub fn remaining(&self, id: &DepartmentId) -> Option<u32> {
        self.seats.get(id).map(Seats::remaining)
    }

    pub fn placed(&self, id: &DepartmentId) -> u32 {
        self.seats.get(id).map_or(0, |s| s.placed)
    }

    /// Walk the student's preferences in order and take the first free seat.
    ///
    /// Returns the granted department (if any), the reason, and one attempt
    /// per listed preference up to and including the granted one.
    pub fn place(&mut self, student: &StudentRequest) -> (Option<DepartmentId>, Reason, Vec<Attempt>) {
        if student.preferences.is_empty() {
            return (None, Reason::NoPreferencesSubmitted, Vec::new());
        }

        let mut attempts = Vec::with_capacity(student.preferences.len());
        let mut tried: BTreeSet<&DepartmentId> = BTreeSet::new();

        for (ix, pref) in student.preferences.iter().enumerate() {
            let rank = u32::try_from(ix + 1).unwrap_or(u32::MAX);

            if !tried.insert(pref) {
                attempts.push(Attempt::new(rank, pref.clone(), Verdict::Duplicate, None));
                continue;
            }

            let Some(seats) = self.seats.get_mut(pref) else {
                attempts.push(Attempt::new(rank, pref.clone(), Verdict::Unknown, None));
                continue;
            };

            if seats.remaining() == 0 {
                attempts.push(Attempt::new(rank, pref.clone(), Verdict::Full, Some(0)));
                continue;
            }

            seats.placed += 1;
            debug_assert!(
                seats.initially_occupied + seats.placed <= seats.capacity,
                "department {pref} over capacity"
            );
            attempts.push(Attempt::new(rank, pref.clone(), Verdict::Placed, Some(seats.remaining())));
            return (Some(pref.clone()), Reason::Assigned { rank }, attempts);
        }

        (None, Reason::AllPreferencesFull, attempts)
    }
}
