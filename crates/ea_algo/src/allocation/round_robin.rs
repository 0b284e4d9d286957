//! Round-robin driver.
//!
//! Contract:
//! - Groups (one per home department) are visited in a fixed order for the
//!   whole run, resolved from `AllocationConfig::group_order`.
//! - Each round takes the next unprocessed student from every group that
//!   still has one, and places that student immediately.
//! - The loop ends once every group is exhausted.
//! - Exactly one outcome per input student; never fails on well-typed input.
//!
//! Determinism:
//! - No hidden randomness. The only RNG is the seeded group shuffle, driven
//!   entirely by `group_seed`.

use ea_core::{
    AllocationConfig, AssignmentOutcome, DepartmentSnapshot, OutputOrder, StudentRequest,
};

use super::grouping::{build_groups, resolve_group_order};
use super::placement::SeatBook;
use crate::trace::{AllocationTrace, Round, Visit};

/// Outcomes plus the trace that explains them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationRun {
    pub outcomes: Vec<AssignmentOutcome>,
    pub trace: AllocationTrace,
}

/// Allocate with the default configuration (lexicographic groups, input-order output).
pub fn allocate(students: &[StudentRequest], departments: &[DepartmentSnapshot]) -> Vec<AssignmentOutcome> {
    allocate_with(students, departments, &AllocationConfig::default())
}

pub fn allocate_with(
    students: &[StudentRequest],
    departments: &[DepartmentSnapshot],
    config: &AllocationConfig,
) -> Vec<AssignmentOutcome> {
    allocate_with_trace(students, departments, config).outcomes
}

pub fn allocate_with_trace(
    students: &[StudentRequest],
    departments: &[DepartmentSnapshot],
    config: &AllocationConfig,
) -> AllocationRun {
    let group_order = resolve_group_order(students, config);
    let groups = build_groups(students, &group_order);
    let mut book = SeatBook::new(departments);

    let mut cursors = vec![0usize; groups.len()];
    let mut by_input: Vec<Option<AssignmentOutcome>> = vec![None; students.len()];
    let mut visit_order: Vec<usize> = Vec::with_capacity(students.len());
    let mut rounds: Vec<Round> = Vec::new();

    loop {
        let mut visits = Vec::new();
        for (g, group) in groups.iter().enumerate() {
            let Some(&ix) = group.members.get(cursors[g]) else { continue };
            cursors[g] += 1;

            let student = &students[ix];
            let (assigned, reason, attempts) = book.place(student);

            visits.push(Visit {
                group: group.home.clone(),
                roll_number: student.roll_number.clone(),
                attempts,
                assigned_department_id: assigned.clone(),
                reason,
            });
            by_input[ix] = Some(AssignmentOutcome {
                roll_number: student.roll_number.clone(),
                assigned_department_id: assigned,
                reason,
            });
            visit_order.push(ix);
        }
        if visits.is_empty() {
            break;
        }
        let round = u32::try_from(rounds.len() + 1).unwrap_or(u32::MAX);
        rounds.push(Round { round, visits });
    }

    let outcomes: Vec<AssignmentOutcome> = match config.output_order {
        OutputOrder::Input => by_input.into_iter().flatten().collect(),
        OutputOrder::Visit => visit_order
            .iter()
            .filter_map(|&ix| by_input[ix].take())
            .collect(),
    };
    debug_assert_eq!(outcomes.len(), students.len());

    let trace = AllocationTrace {
        group_order,
        rounds_run: u32::try_from(rounds.len()).unwrap_or(u32::MAX),
        students_visited: u32::try_from(visit_order.len()).unwrap_or(u32::MAX),
        rounds,
    };

    AllocationRun { outcomes, trace }
}

// ------------------------------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Verdict;
    use crate::verify::verify_outcomes;
    use ea_core::{DepartmentId, GroupOrder, MeritScore, Reason, RegistrationStatus};

    fn did(s: &str) -> DepartmentId {
        s.parse().unwrap()
    }

    fn st(roll: &str, home: &str, merit: f64, prefs: &[&str]) -> StudentRequest {
        StudentRequest {
            roll_number: roll.parse().unwrap(),
            home_department_id: did(home),
            preferences: prefs.iter().map(|p| did(p)).collect(),
            merit_score: MeritScore::from_percent(merit).unwrap(),
            status: RegistrationStatus::Approved,
        }
    }

    fn dept(id: &str, capacity: u32, occupied: &[&str]) -> DepartmentSnapshot {
        DepartmentSnapshot {
            id: did(id),
            capacity,
            occupied: occupied.iter().map(|r| r.parse().unwrap()).collect(),
        }
    }

    fn assigned<'a>(out: &'a [AssignmentOutcome], roll: &str) -> Option<&'a str> {
        out.iter()
            .find(|o| o.roll_number.as_str() == roll)
            .and_then(|o| o.assigned_department_id.as_ref())
            .map(|d| d.as_str())
    }

    #[test]
    fn small_department_gets_a_turn_before_large_departments_second_student() {
        let students = vec![
            st("H1-1", "H1", 95.0, &["X"]),
            st("H1-2", "H1", 90.0, &["X"]),
            st("H1-3", "H1", 85.0, &["X"]),
            st("H1-4", "H1", 80.0, &["X"]),
            st("H1-5", "H1", 75.0, &["X"]),
            st("H2-1", "H2", 40.0, &["X"]),
        ];
        let departments = vec![dept("X", 2, &[])];
        let out = allocate(&students, &departments);

        assert_eq!(assigned(&out, "H1-1"), Some("X"));
        assert_eq!(assigned(&out, "H2-1"), Some("X"));
        assert_eq!(assigned(&out, "H1-2"), None);
        for roll in ["H1-2", "H1-3", "H1-4", "H1-5"] {
            let o = out.iter().find(|o| o.roll_number.as_str() == roll).unwrap();
            assert_eq!(o.reason, Reason::AllPreferencesFull);
        }
        verify_outcomes(&students, &departments, &out).unwrap();
    }

    #[test]
    fn full_department_falls_through_to_second_preference() {
        let students = vec![st("S1", "cs", 88.0, &["X", "Y"])];
        let departments = vec![dept("X", 1, &["EXISTING_STUDENT_1"]), dept("Y", 3, &[])];
        let out = allocate(&students, &departments);
        assert_eq!(out[0].assigned_department_id, Some(did("Y")));
        assert_eq!(out[0].reason, Reason::Assigned { rank: 2 });
        assert_eq!(out[0].reason.to_string(), "assigned:rank=2");
    }

    #[test]
    fn empty_preferences_are_reported() {
        let students = vec![st("S1", "cs", 88.0, &[])];
        let out = allocate(&students, &[dept("X", 1, &[])]);
        assert_eq!(out[0].assigned_department_id, None);
        assert_eq!(out[0].reason.to_string(), "unassigned:no_preferences_submitted");
    }

    #[test]
    fn duplicate_preference_is_a_no_op() {
        let students = vec![
            st("S1", "cs", 90.0, &["X", "X", "Y"]),
            st("S2", "me", 80.0, &["X", "X"]),
        ];
        let departments = vec![dept("X", 1, &[]), dept("Y", 1, &[])];
        let run = allocate_with_trace(&students, &departments, &AllocationConfig::default());

        assert_eq!(assigned(&run.outcomes, "S1"), Some("X"));
        assert_eq!(run.outcomes[1].reason, Reason::AllPreferencesFull);
        let placed_in_x = run
            .outcomes
            .iter()
            .filter(|o| o.assigned_department_id == Some(did("X")))
            .count();
        assert_eq!(placed_in_x, 1);

        let s2 = run.trace.visits().find(|v| v.roll_number.as_str() == "S2").unwrap();
        let verdicts: Vec<Verdict> = s2.attempts.iter().map(|a| a.verdict).collect();
        assert_eq!(verdicts, vec![Verdict::Full, Verdict::Duplicate]);
    }

    #[test]
    fn unknown_departments_are_skipped() {
        let students = vec![st("S1", "cs", 70.0, &["ghost", "Y"])];
        let out = allocate(&students, &[dept("Y", 1, &[])]);
        assert_eq!(out[0].reason, Reason::Assigned { rank: 2 });
    }

    #[test]
    fn higher_merit_wins_within_a_group() {
        let students = vec![
            st("low", "cs", 60.0, &["X", "Y"]),
            st("high", "cs", 99.5, &["X", "Y"]),
        ];
        let out = allocate(&students, &[dept("X", 1, &[]), dept("Y", 1, &[])]);
        assert_eq!(assigned(&out, "high"), Some("X"));
        assert_eq!(assigned(&out, "low"), Some("Y"));
        // input order is preserved in the output
        assert_eq!(out[0].roll_number.as_str(), "low");
    }

    #[test]
    fn merit_differences_below_a_hundredth_still_count() {
        let students = vec![st("lower", "cs", 87.501, &["X"]), st("higher", "cs", 87.504, &["X"])];
        let departments = vec![dept("X", 1, &[])];
        let out = allocate(&students, &departments);
        assert_eq!(assigned(&out, "higher"), Some("X"));
        assert_eq!(assigned(&out, "lower"), None);
        verify_outcomes(&students, &departments, &out).unwrap();
    }

    #[test]
    fn equal_merit_keeps_input_order() {
        let students = vec![st("first", "cs", 75.0, &["X"]), st("second", "cs", 75.0, &["X"])];
        let out = allocate(&students, &[dept("X", 1, &[])]);
        assert_eq!(assigned(&out, "first"), Some("X"));
        assert_eq!(assigned(&out, "second"), None);
    }

    #[test]
    fn group_order_decides_only_the_contested_last_seat() {
        let students = vec![st("m", "me", 50.0, &["X", "Y"]), st("c", "cs", 50.0, &["X", "Y"])];
        let departments = vec![dept("X", 1, &[]), dept("Y", 1, &[])];

        let lex = allocate(&students, &departments);
        assert_eq!(assigned(&lex, "c"), Some("X"));
        assert_eq!(assigned(&lex, "m"), Some("Y"));

        let cfg = AllocationConfig::default().with_group_order(GroupOrder::FirstSeen);
        let seen = allocate_with(&students, &departments, &cfg);
        assert_eq!(assigned(&seen, "m"), Some("X"));
        assert_eq!(assigned(&seen, "c"), Some("Y"));

        // both runs place everyone
        assert!(lex.iter().chain(seen.iter()).all(|o| o.reason.is_assigned()));
    }

    #[test]
    fn seeded_order_is_reproducible() {
        let students: Vec<StudentRequest> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|h| st(&format!("S-{h}"), h, 50.0, &["X"]))
            .collect();
        let departments = vec![dept("X", 1, &[])];
        let one = allocate_with_trace(&students, &departments, &AllocationConfig::seeded(2024));
        let two = allocate_with_trace(&students, &departments, &AllocationConfig::seeded(2024));
        assert_eq!(one, two);
        assert_eq!(one.trace.group_order.len(), 5);
    }

    #[test]
    fn visit_order_output_and_trace_totals() {
        let students = vec![
            st("c2", "cs", 10.0, &["X"]),
            st("m1", "me", 10.0, &["X"]),
            st("c1", "cs", 90.0, &["X"]),
        ];
        let departments = vec![dept("X", 5, &[])];
        let cfg = AllocationConfig::default().with_output_order(OutputOrder::Visit);
        let run = allocate_with_trace(&students, &departments, &cfg);

        let order: Vec<&str> = run.outcomes.iter().map(|o| o.roll_number.as_str()).collect();
        assert_eq!(order, vec!["c1", "m1", "c2"]);
        assert_eq!(run.trace.rounds_run, 2);
        assert_eq!(run.trace.students_visited, 3);
        assert_eq!(run.trace.rounds[0].visits.len(), 2);
        assert_eq!(run.trace.rounds[1].visits[0].group.as_str(), "cs");
    }

    #[test]
    fn empty_roster_yields_nothing() {
        let run = allocate_with_trace(&[], &[dept("X", 1, &[])], &AllocationConfig::default());
        assert!(run.outcomes.is_empty());
        assert_eq!(run.trace.rounds_run, 0);
    }

    #[test]
    fn home_department_is_a_valid_target() {
        let students = vec![st("S1", "X", 50.0, &["X"])];
        let out = allocate(&students, &[dept("X", 1, &[])]);
        assert_eq!(out[0].reason, Reason::Assigned { rank: 1 });
    }
}
