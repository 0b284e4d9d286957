//! Allocation trace: every decision the allocator made, in the order made.

use serde::{Deserialize, Serialize};

use ea_core::{DepartmentId, Reason, RollNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Placed,
    Full,
    Unknown,
    /// Department already tried earlier in the same list.
    Duplicate,
}

/// One preference looked at during placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based position in the student's listed preferences.
    pub rank: u32,
    pub department: DepartmentId,
    pub verdict: Verdict,
    /// Seats left after this attempt; `None` for unknown or duplicate entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
}

impl Attempt {
    pub fn new(rank: u32, department: DepartmentId, verdict: Verdict, remaining: Option<u32>) -> Self {
        Self {
            rank,
            department,
            verdict,
            remaining,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub group: DepartmentId,
    pub roll_number: RollNumber,
    pub attempts: Vec<Attempt>,
    pub assigned_department_id: Option<DepartmentId>,
    pub reason: Reason,
}

/// One round-robin pass: each non-exhausted group visited once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based.
    pub round: u32,
    pub visits: Vec<Visit>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTrace {
    pub group_order: Vec<DepartmentId>,
    pub rounds: Vec<Round>,
    pub rounds_run: u32,
    pub students_visited: u32,
}

impl AllocationTrace {
    /// All visits in visitation order.
    pub fn visits(&self) -> impl Iterator<Item = &Visit> {
        self.rounds.iter().flat_map(|r| r.visits.iter())
    }
}
