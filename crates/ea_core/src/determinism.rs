//! Determinism utilities: stable ordering helpers.
//!
//! This module is **I/O-free**. It provides:
//! - The merit comparator used to order each home-department group
//! - First-seen ordering (input order, duplicates dropped)

use core::cmp::Ordering;
use std::collections::BTreeSet;

use crate::entities::MeritScore;

/* -------------------------------------------------------------------------- */
/*                            Canonical sort helpers                          */
/* -------------------------------------------------------------------------- */

/// Higher merit first. Equal merit compares `Equal`, so a stable sort keeps
/// input order for ties.
#[inline]
pub fn cmp_merit_desc(a: MeritScore, b: MeritScore) -> Ordering {
    b.cmp(&a)
}

/// Distinct items in order of first appearance.
pub fn first_seen_order<'a, T, I>(items: I) -> Vec<T>
where
    T: Ord + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for it in items {
        if seen.insert(it) {
            out.push(it.clone());
        }
    }
    out
}

/* ---------------------------------- Tests --------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{RegistrationStatus, StudentRequest};
    use crate::ids::DepartmentId;

    fn did(s: &str) -> DepartmentId { s.parse().unwrap() }

    fn student(roll: &str, merit: u32) -> StudentRequest {
        StudentRequest {
            roll_number: roll.parse().unwrap(),
            home_department_id: did("cs"),
            preferences: vec![],
            merit_score: MeritScore::from_hundredths(merit).unwrap(),
            status: RegistrationStatus::Approved,
        }
    }

    #[test]
    fn merit_order_is_stable() {
        let mut xs = vec![student("a", 5000), student("b", 9000), student("c", 5000), student("d", 9000)];
        xs.sort_by(|x, y| cmp_merit_desc(x.merit_score, y.merit_score));
        let got: Vec<&str> = xs.iter().map(|s| s.roll_number.as_str()).collect();
        assert_eq!(got, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn first_seen_drops_repeats() {
        let xs = vec![did("ee"), did("cs"), did("ee"), did("me"), did("cs")];
        let got: Vec<String> = first_seen_order(&xs).into_iter().map(String::from).collect();
        assert_eq!(got, vec!["ee", "cs", "me"]);
    }
}
