//! Structural & semantic validation before any allocation.
//! Deterministic output; issues are sorted by (code, where, message).
//!
//! Errors block the run. Warnings describe inputs the allocator handles by
//! design (unknown or repeated preferences, empty lists, over-full snapshots).

use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use ea_core::{AllocParams, CoreError, DepartmentId, DepartmentSnapshot, RollNumber, StudentRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// Where the issue occurred. Variant order is the sort order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Root,
    Param(&'static str),
    Department(DepartmentId),
    Student(RollNumber),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Root => f.write_str("root"),
            EntityRef::Param(p) => write!(f, "param:{p}"),
            EntityRef::Department(d) => write!(f, "department:{d}"),
            EntityRef::Student(r) => write!(f, "student:{r}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(rename = "where")]
    pub where_: EntityRef,
}

/// pass = no Error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

pub fn validate(
    students: &[StudentRequest],
    departments: &[DepartmentSnapshot],
    params: &AllocParams,
) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_params(params));
    issues.extend(check_departments(departments, students));
    issues.extend(check_students(students, departments, params.max_preferences));

    sort_issues_stably(&mut issues);
    ValidationReport {
        pass: !issues.iter().any(|i| i.severity == Severity::Error),
        issues,
    }
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

fn issue(severity: Severity, code: &'static str, where_: EntityRef, message: String) -> ValidationIssue {
    ValidationIssue { severity, code, message, where_ }
}

fn check_params(params: &AllocParams) -> Vec<ValidationIssue> {
    match params.validate_domains() {
        Ok(()) => Vec::new(),
        Err(CoreError::MissingSeed) => vec![issue(
            Severity::Error,
            "Params.SeedMissing",
            EntityRef::Param("groupSeed"),
            "groupOrder \"seeded\" requires groupSeed".to_string(),
        )],
        Err(e) => vec![issue(
            Severity::Error,
            "Params.OutOfDomain",
            EntityRef::Root,
            e.to_string(),
        )],
    }
}

/// Errors:
/// - "Department.DuplicateId"
/// - "Department.CapacityNonPositive"
/// Warnings:
/// - "Department.OverCapacity" (treated as full)
/// - "Department.OccupantIsStudent"
fn check_departments(departments: &[DepartmentSnapshot], students: &[StudentRequest]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let roster: BTreeSet<&RollNumber> = students.iter().map(|s| &s.roll_number).collect();
    let mut seen = BTreeSet::<&DepartmentId>::new();

    for d in departments {
        let at = || EntityRef::Department(d.id.clone());
        if !seen.insert(&d.id) {
            issues.push(issue(
                Severity::Error,
                "Department.DuplicateId",
                at(),
                format!("department id {} appears more than once", d.id),
            ));
        }
        if d.capacity == 0 {
            issues.push(issue(
                Severity::Error,
                "Department.CapacityNonPositive",
                at(),
                "capacity must be at least 1".to_string(),
            ));
        }
        if d.occupied_count() > d.capacity {
            issues.push(issue(
                Severity::Warning,
                "Department.OverCapacity",
                at(),
                format!("{} occupied exceeds capacity {}", d.occupied_count(), d.capacity),
            ));
        }
        for r in d.occupied.iter().filter(|r| roster.contains(r)) {
            issues.push(issue(
                Severity::Warning,
                "Department.OccupantIsStudent",
                at(),
                format!("occupant {r} is also in the roster"),
            ));
        }
    }
    issues
}

/// Errors:
/// - "Student.DuplicateRollNumber"
/// Warnings:
/// - "Student.UnknownHomeDepartment", "Student.UnknownPreference",
///   "Student.DuplicatePreference", "Student.TooManyPreferences",
///   "Student.NoPreferences"
fn check_students(
    students: &[StudentRequest],
    departments: &[DepartmentSnapshot],
    max_preferences: u32,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let known: BTreeSet<&DepartmentId> = departments.iter().map(|d| &d.id).collect();
    let mut rolls: BTreeMap<&RollNumber, usize> = BTreeMap::new();

    for s in students {
        let at = || EntityRef::Student(s.roll_number.clone());

        let n = rolls.entry(&s.roll_number).or_default();
        *n += 1;
        if *n == 2 {
            issues.push(issue(
                Severity::Error,
                "Student.DuplicateRollNumber",
                at(),
                format!("roll number {} appears more than once", s.roll_number),
            ));
        }

        if !known.contains(&s.home_department_id) {
            issues.push(issue(
                Severity::Warning,
                "Student.UnknownHomeDepartment",
                at(),
                format!("home department {} is not in the department list", s.home_department_id),
            ));
        }

        if s.preferences.is_empty() {
            issues.push(issue(
                Severity::Warning,
                "Student.NoPreferences",
                at(),
                "no preferences submitted".to_string(),
            ));
        }
        if s.preferences.len() > max_preferences as usize {
            issues.push(issue(
                Severity::Warning,
                "Student.TooManyPreferences",
                at(),
                format!("{} preferences listed, limit is {max_preferences}", s.preferences.len()),
            ));
        }

        let mut listed = BTreeSet::<&DepartmentId>::new();
        for (i, p) in s.preferences.iter().enumerate() {
            let rank = i + 1;
            if !listed.insert(p) {
                issues.push(issue(
                    Severity::Warning,
                    "Student.DuplicatePreference",
                    at(),
                    format!("preference {rank} repeats {p}"),
                ));
            } else if !known.contains(p) {
                issues.push(issue(
                    Severity::Warning,
                    "Student.UnknownPreference",
                    at(),
                    format!("preference {rank} names unknown department {p}"),
                ));
            }
        }
    }
    issues
}

// ------------------------------------------------------------------------------------------------
// Utilities
// ------------------------------------------------------------------------------------------------

fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.where_.cmp(&b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ea_core::{GroupOrder, MeritScore, RegistrationStatus};

    fn did(s: &str) -> DepartmentId {
        s.parse().unwrap()
    }

    fn st(roll: &str, home: &str, prefs: &[&str]) -> StudentRequest {
        StudentRequest {
            roll_number: roll.parse().unwrap(),
            home_department_id: did(home),
            preferences: prefs.iter().map(|p| did(p)).collect(),
            merit_score: MeritScore::from_hundredths(7000).unwrap(),
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

    #[test]
    fn clean_inputs_pass_without_issues() {
        let r = validate(
            &[st("S1", "cs", &["me", "ee"])],
            &[dept("cs", 2, &[]), dept("me", 2, &[]), dept("ee", 1, &[])],
            &AllocParams::default(),
        );
        assert!(r.pass);
        assert!(r.issues.is_empty());
    }

    #[test]
    fn structural_errors_block() {
        let r = validate(
            &[st("S1", "cs", &["me"]), st("S1", "cs", &["me"])],
            &[dept("me", 0, &[]), dept("me", 1, &[])],
            &AllocParams { group_order: GroupOrder::Seeded, ..AllocParams::default() },
        );
        assert!(!r.pass);
        for code in [
            "Department.DuplicateId",
            "Department.CapacityNonPositive",
            "Student.DuplicateRollNumber",
            "Params.SeedMissing",
        ] {
            assert!(r.has_code(code), "missing {code}");
        }
    }

    #[test]
    fn soft_outcomes_only_warn() {
        let students = vec![
            st("S1", "ghost", &["me", "me", "nowhere"]),
            st("S2", "cs", &[]),
            st("S3", "cs", &["me", "cs", "ee", "ce", "it"]),
        ];
        let departments = vec![
            dept("cs", 1, &[]),
            dept("me", 1, &["X1", "X2"]),
            dept("ee", 1, &["S2"]),
            dept("ce", 1, &[]),
            dept("it", 1, &[]),
        ];
        let r = validate(&students, &departments, &AllocParams::default());
        assert!(r.pass);
        assert_eq!(r.error_count(), 0);
        for code in [
            "Student.UnknownHomeDepartment",
            "Student.DuplicatePreference",
            "Student.UnknownPreference",
            "Student.NoPreferences",
            "Student.TooManyPreferences",
            "Department.OverCapacity",
            "Department.OccupantIsStudent",
        ] {
            assert!(r.has_code(code), "missing {code}");
        }
    }

    #[test]
    fn issues_are_sorted_by_code_then_location() {
        let r = validate(
            &[st("S2", "cs", &[]), st("S1", "cs", &[])],
            &[dept("cs", 1, &[])],
            &AllocParams::default(),
        );
        let rolls: Vec<String> = r.issues.iter().map(|i| i.where_.to_string()).collect();
        assert_eq!(rolls, vec!["student:S1", "student:S2"]);
    }
}
