//! Home-department groups and the order they are visited in.
//!
//! A group holds indices into the caller's student slice, sorted by merit
//! descending. The sort is stable, so equal merit keeps input order.

use std::collections::BTreeMap;

use ea_core::determinism::{cmp_merit_desc, first_seen_order};
use ea_core::rng::OrderRng;
use ea_core::{AllocationConfig, DepartmentId, GroupOrder, StudentRequest};

/// One home department's queue for the round-robin driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeGroup {
    pub home: DepartmentId,
    /// Indices into the input slice, best merit first.
    pub members: Vec<usize>,
}

/// Resolve the group visitation order once for the whole run.
pub fn resolve_group_order(students: &[StudentRequest], config: &AllocationConfig) -> Vec<DepartmentId> {
    match config.group_order {
        GroupOrder::Lexicographic => lexicographic_homes(students),
        GroupOrder::FirstSeen => first_seen_order(students.iter().map(|s| &s.home_department_id)),
        GroupOrder::Seeded => {
            let mut homes = lexicographic_homes(students);
            // A missing seed is rejected upstream; fall back to 0 so the
            // allocator itself stays total.
            let mut rng = OrderRng::from_seed_u64(config.group_seed.unwrap_or_default());
            rng.shuffle_in_place(&mut homes);
            homes
        }
    }
}

fn lexicographic_homes(students: &[StudentRequest]) -> Vec<DepartmentId> {
    let mut homes: Vec<DepartmentId> = first_seen_order(students.iter().map(|s| &s.home_department_id));
    homes.sort();
    homes
}

/// Partition students by home department and order each group by merit.
/// Groups are returned in `order`.
pub fn build_groups(students: &[StudentRequest], order: &[DepartmentId]) -> Vec<HomeGroup> {
    let mut by_home: BTreeMap<&DepartmentId, Vec<usize>> = BTreeMap::new();
    for (ix, s) in students.iter().enumerate() {
        by_home.entry(&s.home_department_id).or_default().push(ix);
    }

    order
        .iter()
        .map(|home| {
            let mut members = by_home.remove(home).unwrap_or_default();
            members.sort_by(|&a, &b| cmp_merit_desc(students[a].merit_score, students[b].merit_score));
            HomeGroup {
                home: home.clone(),
                members,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ea_core::{MeritScore, RegistrationStatus};

    fn st(roll: &str, home: &str, merit: u32) -> StudentRequest {
        StudentRequest {
            roll_number: roll.parse().unwrap(),
            home_department_id: home.parse().unwrap(),
            preferences: vec![],
            merit_score: MeritScore::from_hundredths(merit).unwrap(),
            status: RegistrationStatus::Approved,
        }
    }

    fn ids(v: &[DepartmentId]) -> Vec<&str> {
        v.iter().map(|d| d.as_str()).collect()
    }

    #[test]
    fn group_orders() {
        let s = vec![st("a", "me", 1), st("b", "cs", 1), st("c", "ee", 1), st("d", "cs", 1)];
        let cfg = AllocationConfig::default();
        assert_eq!(ids(&resolve_group_order(&s, &cfg)), vec!["cs", "ee", "me"]);

        let cfg = cfg.with_group_order(GroupOrder::FirstSeen);
        assert_eq!(ids(&resolve_group_order(&s, &cfg)), vec!["me", "cs", "ee"]);

        let a = resolve_group_order(&s, &AllocationConfig::seeded(9));
        let b = resolve_group_order(&s, &AllocationConfig::seeded(9));
        assert_eq!(a, b);
        let mut sorted = ids(&a);
        sorted.sort();
        assert_eq!(sorted, vec!["cs", "ee", "me"]);
    }

    #[test]
    fn groups_sorted_by_merit_stably() {
        let s = vec![
            st("a", "cs", 7000),
            st("b", "cs", 9000),
            st("c", "me", 5000),
            st("d", "cs", 7000),
        ];
        let order = resolve_group_order(&s, &AllocationConfig::default());
        let g = build_groups(&s, &order);
        assert_eq!(g.len(), 2);
        assert_eq!(g[0].home.as_str(), "cs");
        assert_eq!(g[0].members, vec![1, 0, 3]);
        assert_eq!(g[1].members, vec![2]);
    }
}
