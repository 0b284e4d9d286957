//! Applying outcomes to department snapshots, and the per-department status
//! view shown after a run ("Enrolled n / capacity").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ea_core::{AssignmentOutcome, DepartmentId, DepartmentSnapshot};

/// New snapshots with every assigned roll number added to its department's
/// `occupied` set. Set semantics make this idempotent; inputs are untouched.
pub fn apply_outcomes(departments: &[DepartmentSnapshot], outcomes: &[AssignmentOutcome]) -> Vec<DepartmentSnapshot> {
    let mut next: Vec<DepartmentSnapshot> = departments.to_vec();
    let index: BTreeMap<DepartmentId, usize> = next
        .iter()
        .enumerate()
        .rev() // first snapshot wins on a repeated id
        .map(|(i, d)| (d.id.clone(), i))
        .collect();

    for o in outcomes {
        let Some(d) = &o.assigned_department_id else { continue };
        if let Some(&i) = index.get(d) {
            next[i].occupied.insert(o.roll_number.clone());
        }
    }
    next
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentStatus {
    pub id: DepartmentId,
    pub capacity: u32,
    pub initially_occupied: u32,
    /// Outcomes granting this department in the run.
    pub placed: u32,
    /// Size of `occupied` after `apply_outcomes`.
    pub final_occupied: u32,
    pub remaining: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub students: u32,
    pub assigned: u32,
    pub unassigned: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Sorted by department id.
    pub departments: Vec<DepartmentStatus>,
    pub summary: AllocationSummary,
}

#[inline]
fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn department_status(departments: &[DepartmentSnapshot], outcomes: &[AssignmentOutcome]) -> StatusReport {
    let applied = apply_outcomes(departments, outcomes);

    let mut placed: BTreeMap<&DepartmentId, u32> = BTreeMap::new();
    for d in outcomes.iter().filter_map(|o| o.assigned_department_id.as_ref()) {
        *placed.entry(d).or_default() += 1;
    }

    let mut rows: BTreeMap<&DepartmentId, DepartmentStatus> = BTreeMap::new();
    for (before, after) in departments.iter().zip(applied.iter()) {
        if rows.contains_key(&before.id) {
            continue;
        }
        let final_occupied = after.occupied_count();
        rows.insert(
            &before.id,
            DepartmentStatus {
                id: before.id.clone(),
                capacity: before.capacity,
                initially_occupied: before.occupied_count(),
                placed: placed.get(&before.id).copied().unwrap_or(0),
                final_occupied,
                remaining: before.capacity.saturating_sub(final_occupied),
            },
        );
    }

    let assigned = count_u32(outcomes.iter().filter(|o| o.assigned_department_id.is_some()).count());
    let students = count_u32(outcomes.len());
    StatusReport {
        departments: rows.into_values().collect(),
        summary: AllocationSummary {
            students,
            assigned,
            unassigned: students - assigned,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ea_core::Reason;

    fn did(s: &str) -> DepartmentId {
        s.parse().unwrap()
    }

    fn dept(id: &str, capacity: u32, occupied: &[&str]) -> DepartmentSnapshot {
        DepartmentSnapshot {
            id: did(id),
            capacity,
            occupied: occupied.iter().map(|r| r.parse().unwrap()).collect(),
        }
    }

    fn out(roll: &str, d: Option<&str>) -> AssignmentOutcome {
        AssignmentOutcome {
            roll_number: roll.parse().unwrap(),
            assigned_department_id: d.map(did),
            reason: if d.is_some() { Reason::Assigned { rank: 1 } } else { Reason::AllPreferencesFull },
        }
    }

    #[test]
    fn apply_is_idempotent_and_pure() {
        let depts = vec![dept("me", 3, &["X1"]), dept("ee", 1, &[])];
        let outs = vec![out("S1", Some("me")), out("S2", None), out("S3", Some("ghost"))];

        let once = apply_outcomes(&depts, &outs);
        let twice = apply_outcomes(&once, &outs);
        assert_eq!(once, twice);
        assert_eq!(once[0].occupied.len(), 2);
        assert!(once[0].occupied.contains(&"S1".parse().unwrap()));
        assert_eq!(depts[0].occupied.len(), 1);
    }

    #[test]
    fn status_rows_and_summary() {
        let depts = vec![dept("me", 3, &["X1"]), dept("ee", 1, &[])];
        let outs = vec![out("S1", Some("me")), out("S2", Some("ee")), out("S3", None)];
        let report = department_status(&depts, &outs);

        assert_eq!(report.summary, AllocationSummary { students: 3, assigned: 2, unassigned: 1 });
        assert_eq!(report.departments[0].id.as_str(), "ee");
        let me = &report.departments[1];
        assert_eq!((me.initially_occupied, me.placed, me.final_occupied, me.remaining), (1, 1, 2, 1));
    }
}
