// crates/ea_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Elective allocation: group students by home department, order each group
//! by merit, visit groups round-robin, and place each student greedily on
//! their first preference with a free seat.
//!
//! Everything here is pure and synchronous. Inputs are borrowed, never
//! mutated; outputs are fresh values.

pub use ea_core::{
    AllocationConfig, AssignmentOutcome, DepartmentId, DepartmentSnapshot, GroupOrder,
    OutputOrder, Reason, RollNumber, StudentRequest,
};

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    pub mod grouping;
    pub mod placement;
    pub mod round_robin;

    pub use grouping::{build_groups, resolve_group_order, HomeGroup};
    pub use placement::SeatBook;
    pub use round_robin::{allocate, allocate_with, allocate_with_trace, AllocationRun};
}

pub mod trace;
pub mod verify;
pub mod apply;

// Pipeline imports these from the crate root.
pub use allocation::{allocate, allocate_with, allocate_with_trace, AllocationRun};
pub use apply::{apply_outcomes, department_status, AllocationSummary, DepartmentStatus, StatusReport};
pub use trace::{AllocationTrace, Attempt, Round, Verdict, Visit};
pub use verify::{verify_outcomes, InvariantViolation};
