//! PREPARE stage: decide who takes part, and what each student may ask for.
//!
//! - Pending registrations sit out unless `include_pending` is set.
//! - With `exclude_home_department`, a student's own department is removed
//!   from their list before allocation. Ranks then count positions in the
//!   filtered list.

use serde::{Deserialize, Serialize};

use ea_core::{AllocParams, RegistrationStatus, RollNumber, StudentRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    RegistrationPending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedStudent {
    pub roll_number: RollNumber,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prepared {
    /// Eligible students, input order kept.
    pub students: Vec<StudentRequest>,
    pub skipped: Vec<SkippedStudent>,
}

pub fn prepare(students: &[StudentRequest], params: &AllocParams) -> Prepared {
    let mut out = Prepared::default();
    for s in students {
        if s.status == RegistrationStatus::Pending && !params.include_pending {
            out.skipped.push(SkippedStudent {
                roll_number: s.roll_number.clone(),
                reason: SkipReason::RegistrationPending,
            });
            continue;
        }
        let mut s = s.clone();
        if params.exclude_home_department {
            let home = s.home_department_id.clone();
            s.preferences.retain(|p| *p != home);
        }
        out.students.push(s);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ea_core::{DepartmentId, MeritScore};

    fn did(s: &str) -> DepartmentId {
        s.parse().unwrap()
    }

    fn st(roll: &str, status: RegistrationStatus, prefs: &[&str]) -> StudentRequest {
        StudentRequest {
            roll_number: roll.parse().unwrap(),
            home_department_id: did("cs"),
            preferences: prefs.iter().map(|p| did(p)).collect(),
            merit_score: MeritScore::from_hundredths(5000).unwrap(),
            status,
        }
    }

    #[test]
    fn pending_students_are_skipped_by_default() {
        let students = vec![
            st("A", RegistrationStatus::Approved, &["me"]),
            st("B", RegistrationStatus::Pending, &["me"]),
        ];
        let p = prepare(&students, &AllocParams::default());
        assert_eq!(p.students.len(), 1);
        assert_eq!(p.skipped[0].roll_number.as_str(), "B");
        assert_eq!(serde_json::to_value(p.skipped[0].reason).unwrap(), "registration_pending");

        let all = prepare(&students, &AllocParams { include_pending: true, ..AllocParams::default() });
        assert_eq!(all.students.len(), 2);
        assert!(all.skipped.is_empty());
    }

    #[test]
    fn home_department_is_stripped_when_excluded() {
        let students = vec![st("A", RegistrationStatus::Approved, &["cs", "me", "cs", "ee"])];
        let kept = prepare(&students, &AllocParams::default());
        assert_eq!(kept.students[0].preferences.len(), 4);

        let p = prepare(
            &students,
            &AllocParams { exclude_home_department: true, ..AllocParams::default() },
        );
        assert_eq!(p.students[0].preferences, vec![did("me"), did("ee")]);
    }
}
