//! Post-run invariant checks.
//!
//! These are programming invariants: a violation means the allocator (or a
//! caller that edited the outcomes) is wrong, not that the input was bad.

use core::fmt;
use std::collections::BTreeMap;

use ea_core::{AssignmentOutcome, DepartmentId, DepartmentSnapshot, Reason, RollNumber, StudentRequest};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A student has no outcome, or more outcomes than input records.
    OutcomeCount { roll_number: RollNumber, expected: usize, got: usize },
    /// An outcome names a roll number that is not in the input.
    UnknownStudent(RollNumber),
    OverCapacity { department: DepartmentId, capacity: u32, occupied: u32 },
    UnknownDepartment { roll_number: RollNumber, department: DepartmentId },
    /// The reason's rank does not point at the assigned department.
    RankMismatch { roll_number: RollNumber, rank: u32 },
    ReasonMismatch { roll_number: RollNumber, reason: Reason },
    /// A better-ranked department still has a free seat after the run.
    SeatLeftOpen { roll_number: RollNumber, department: DepartmentId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use InvariantViolation::*;
        match self {
            OutcomeCount { roll_number, expected, got } => {
                write!(f, "{roll_number}: expected {expected} outcome(s), got {got}")
            }
            UnknownStudent(r) => write!(f, "outcome for unknown student {r}"),
            OverCapacity { department, capacity, occupied } => {
                write!(f, "{department}: {occupied} occupied exceeds capacity {capacity}")
            }
            UnknownDepartment { roll_number, department } => {
                write!(f, "{roll_number}: assigned to unknown department {department}")
            }
            RankMismatch { roll_number, rank } => {
                write!(f, "{roll_number}: rank {rank} does not name the assigned department")
            }
            ReasonMismatch { roll_number, reason } => {
                write!(f, "{roll_number}: reason {reason} contradicts the outcome")
            }
            SeatLeftOpen { roll_number, department } => {
                write!(f, "{roll_number}: preferred department {department} still has a free seat")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Check completeness, capacity, preference respect, and reason consistency.
pub fn verify_outcomes(
    students: &[StudentRequest],
    departments: &[DepartmentSnapshot],
    outcomes: &[AssignmentOutcome],
) -> Result<(), InvariantViolation> {
    // ---- completeness ----
    let mut expected: BTreeMap<&RollNumber, usize> = BTreeMap::new();
    for s in students {
        *expected.entry(&s.roll_number).or_default() += 1;
    }
    let mut got: BTreeMap<&RollNumber, usize> = BTreeMap::new();
    for o in outcomes {
        if !expected.contains_key(&o.roll_number) {
            return Err(InvariantViolation::UnknownStudent(o.roll_number.clone()));
        }
        *got.entry(&o.roll_number).or_default() += 1;
    }
    for (roll, &want) in &expected {
        let have = got.get(roll).copied().unwrap_or(0);
        if have != want {
            return Err(InvariantViolation::OutcomeCount {
                roll_number: (*roll).clone(),
                expected: want,
                got: have,
            });
        }
    }

    // ---- capacity ----
    let mut depts: BTreeMap<&DepartmentId, &DepartmentSnapshot> = BTreeMap::new();
    for d in departments {
        depts.entry(&d.id).or_insert(d);
    }
    let mut placed: BTreeMap<&DepartmentId, u32> = BTreeMap::new();
    for o in outcomes {
        if let Some(d) = &o.assigned_department_id {
            if !depts.contains_key(d) {
                return Err(InvariantViolation::UnknownDepartment {
                    roll_number: o.roll_number.clone(),
                    department: d.clone(),
                });
            }
            *placed.entry(d).or_default() += 1;
        }
    }
    let mut remaining: BTreeMap<&DepartmentId, u32> = BTreeMap::new();
    for (id, d) in &depts {
        let n = placed.get(id).copied().unwrap_or(0);
        let occupied = d.occupied_count().saturating_add(n);
        // an over-full snapshot is tolerated as long as nobody was added
        if n > 0 && occupied > d.capacity {
            return Err(InvariantViolation::OverCapacity {
                department: (*id).clone(),
                capacity: d.capacity,
                occupied,
            });
        }
        remaining.insert(*id, d.capacity.saturating_sub(occupied));
    }

    // ---- preference respect & reason consistency ----
    let mut by_roll: BTreeMap<&RollNumber, &StudentRequest> = BTreeMap::new();
    for s in students {
        by_roll.entry(&s.roll_number).or_insert(s);
    }
    for o in outcomes {
        let Some(student) = by_roll.get(&o.roll_number) else { continue };
        let prefs = &student.preferences;

        let mismatch = || InvariantViolation::ReasonMismatch {
            roll_number: o.roll_number.clone(),
            reason: o.reason,
        };

        let considered = match (&o.assigned_department_id, o.reason) {
            (Some(d), Reason::Assigned { rank }) => {
                let ix = rank as usize;
                if ix == 0 || prefs.get(ix - 1) != Some(d) {
                    return Err(InvariantViolation::RankMismatch {
                        roll_number: o.roll_number.clone(),
                        rank,
                    });
                }
                &prefs[..ix - 1]
            }
            (None, Reason::NoPreferencesSubmitted) if prefs.is_empty() => &prefs[..],
            (None, Reason::AllPreferencesFull) if !prefs.is_empty() => &prefs[..],
            _ => return Err(mismatch()),
        };

        // Seats only ever fill up, so a department with room now had room then.
        for pref in considered {
            if remaining.get(pref).copied().unwrap_or(0) > 0 {
                return Err(InvariantViolation::SeatLeftOpen {
                    roll_number: o.roll_number.clone(),
                    department: pref.clone(),
                });
            }
        }
    }

    Ok(())
}
