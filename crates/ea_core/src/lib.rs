//! ea_core: Core types, parameter domains, ordering helpers, and seeded RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`ea_io`, `ea_algo`, `ea_pipeline`, `ea_cli`).
//!
//! - Roster tokens: `RollNumber`, `DepartmentId`
//! - Output IDs: `RES:`, `RUN:`
//! - `MeritScore`: full-precision percentage with a total order
//! - Closed reason codes for assignment outcomes
//! - Parameter domains: `GroupOrder`, `OutputOrder`, `AllocParams`
//! - Seedable RNG (ChaCha20) for the explicit `seeded` group order only

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidReason,
        MeritOutOfRange,
        DomainOutOfRange(&'static str),
        MissingSeed,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidReason => write!(f, "invalid reason code"),
                CoreError::MeritOutOfRange => write!(f, "merit score must be a finite number in 0..=100"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::MissingSeed => write!(f, "group order `seeded` requires a group seed"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod determinism;
pub mod entities;
pub mod ids;
pub mod params;
pub mod rng;

pub use entities::{
    AssignmentOutcome, DepartmentSnapshot, MeritScore, Reason, RegistrationStatus, StudentRequest,
};
pub use errors::CoreError;
pub use ids::{DepartmentId, IdError, ResultId, RollNumber, RunId};
pub use params::{AllocParams, AllocationConfig, GroupOrder, OutputOrder};
