//! Domain entities: student requests, department snapshots, outcomes.
//!
//! Wire names are camelCase to match the roster provider's JSON.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{DepartmentId, RollNumber};

/* -------------------------------------------------------------------------- */
/*                                 MeritScore                                 */
/* -------------------------------------------------------------------------- */

/// Percentage merit in `0.0..=100.0`, kept at full precision.
///
/// Ordering is total (`f64::total_cmp`); NaN and infinities never get in and
/// `-0.0` is stored as `0.0`, so `Eq` and `Ord` agree.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MeritScore(f64);

impl MeritScore {
    pub const MAX_HUNDREDTHS: u32 = 10_000;

    pub fn from_percent(pct: f64) -> Result<Self, CoreError> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(CoreError::MeritOutOfRange);
        }
        // -0.0 + 0.0 == +0.0
        Ok(MeritScore(pct + 0.0))
    }

    /// `8750` → `87.5`.
    pub fn from_hundredths(h: u32) -> Result<Self, CoreError> {
        if h > Self::MAX_HUNDREDTHS {
            return Err(CoreError::MeritOutOfRange);
        }
        Ok(MeritScore(f64::from(h) / 100.0))
    }

    #[inline]
    pub fn as_percent(self) -> f64 {
        self.0
    }
}

impl PartialEq for MeritScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MeritScore {}

impl PartialOrd for MeritScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MeritScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for MeritScore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for MeritScore {
    type Error = CoreError;
    fn try_from(v: f64) -> Result<Self, Self::Error> {
        MeritScore::from_percent(v)
    }
}

impl From<MeritScore> for f64 {
    fn from(m: MeritScore) -> f64 {
        m.as_percent()
    }
}

impl fmt::Display for MeritScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/* -------------------------------------------------------------------------- */
/*                                  Students                                  */
/* -------------------------------------------------------------------------- */

/// Registration state carried by the roster. Only `approved` students are
/// allocated unless the run opts in to pending ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Approved,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    pub roll_number: RollNumber,
    pub home_department_id: DepartmentId,
    /// Ranked best-first. May be empty; may contain repeats.
    #[serde(default)]
    pub preferences: Vec<DepartmentId>,
    pub merit_score: MeritScore,
    #[serde(default)]
    pub status: RegistrationStatus,
}

/* -------------------------------------------------------------------------- */
/*                                 Departments                                */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSnapshot {
    pub id: DepartmentId,
    pub capacity: u32,
    /// Roll numbers already holding a seat; duplicates collapse.
    #[serde(default)]
    pub occupied: BTreeSet<RollNumber>,
}

impl DepartmentSnapshot {
    /// Seats left before this run places anyone. Never negative.
    #[inline]
    pub fn initial_remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied_count())
    }

    #[inline]
    pub fn occupied_count(&self) -> u32 {
        u32::try_from(self.occupied.len()).unwrap_or(u32::MAX)
    }
}

/* -------------------------------------------------------------------------- */
/*                                  Outcomes                                  */
/* -------------------------------------------------------------------------- */

/// Closed set of reason codes. Wire form:
/// `assigned:rank=<k>`, `unassigned:all_preferences_full`,
/// `unassigned:no_preferences_submitted`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Reason {
    /// `rank` is the 1-based position in the student's listed preferences.
    Assigned { rank: u32 },
    AllPreferencesFull,
    NoPreferencesSubmitted,
}

impl Reason {
    #[inline]
    pub fn is_assigned(self) -> bool {
        matches!(self, Reason::Assigned { .. })
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Assigned { rank } => write!(f, "assigned:rank={rank}"),
            Reason::AllPreferencesFull => f.write_str("unassigned:all_preferences_full"),
            Reason::NoPreferencesSubmitted => f.write_str("unassigned:no_preferences_submitted"),
        }
    }
}

impl FromStr for Reason {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned:all_preferences_full" => Ok(Reason::AllPreferencesFull),
            "unassigned:no_preferences_submitted" => Ok(Reason::NoPreferencesSubmitted),
            _ => {
                let k = s.strip_prefix("assigned:rank=").ok_or(CoreError::InvalidReason)?;
                // reject "+1", "01" and friends so the wire form stays canonical
                if k.is_empty() || k.starts_with('0') || !k.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CoreError::InvalidReason);
                }
                let rank = k.parse::<u32>().map_err(|_| CoreError::InvalidReason)?;
                Ok(Reason::Assigned { rank })
            }
        }
    }
}

impl TryFrom<String> for Reason {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Reason> for String {
    fn from(r: Reason) -> String {
        r.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub roll_number: RollNumber,
    pub assigned_department_id: Option<DepartmentId>,
    pub reason: Reason,
}
