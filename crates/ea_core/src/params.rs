//! Allocation parameters with safe defaults, wire tokens, and domain checks.
//!
//! `AllocParams` is the on-disk shape (`params.json`, camelCase, every field
//! optional). `AllocationConfig` is the subset the allocator itself consumes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Define a serde'd enum with explicit wire tokens plus `as_token`/`FromStr`.
macro_rules! serde_enum {
    ($(#[$m:meta])* $name:ident => { $($variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$m])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[inline]
            pub fn as_token(self) -> &'static str {
                match self { $($name::$variant => $token,)+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    _ => Err(CoreError::DomainOutOfRange(stringify!($name))),
                }
            }
        }
    };
}

serde_enum!(
    /// Order in which home-department groups are visited in every round.
    GroupOrder => {
        Lexicographic = "lexicographic",
        FirstSeen     = "first_seen",
        Seeded        = "seeded"
    }
);

serde_enum!(
    /// Order of the returned outcomes.
    OutputOrder => {
        Input = "input",
        Visit = "visit"
    }
);

impl Default for GroupOrder {
    fn default() -> Self {
        GroupOrder::Lexicographic
    }
}

impl Default for OutputOrder {
    fn default() -> Self {
        OutputOrder::Input
    }
}

/// Original application's selection limit.
pub const DEFAULT_MAX_PREFERENCES: u32 = 4;

fn default_max_preferences() -> u32 {
    DEFAULT_MAX_PREFERENCES
}

/// What the allocator needs to know. Everything else is a pipeline concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationConfig {
    pub group_order: GroupOrder,
    /// Only read when `group_order == Seeded`.
    pub group_seed: Option<u64>,
    pub output_order: OutputOrder,
}

impl AllocationConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            group_order: GroupOrder::Seeded,
            group_seed: Some(seed),
            output_order: OutputOrder::Input,
        }
    }

    pub fn with_group_order(mut self, order: GroupOrder) -> Self {
        self.group_order = order;
        self
    }

    pub fn with_output_order(mut self, order: OutputOrder) -> Self {
        self.output_order = order;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AllocParams {
    #[serde(default)]
    pub group_order: GroupOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_seed: Option<u64>,
    #[serde(default)]
    pub output_order: OutputOrder,
    /// Advisory: longer lists only raise a warning.
    #[serde(default = "default_max_preferences")]
    pub max_preferences: u32,
    #[serde(default)]
    pub exclude_home_department: bool,
    #[serde(default)]
    pub include_pending: bool,
}

impl Default for AllocParams {
    fn default() -> Self {
        Self {
            group_order: GroupOrder::default(),
            group_seed: None,
            output_order: OutputOrder::default(),
            max_preferences: DEFAULT_MAX_PREFERENCES,
            exclude_home_department: false,
            include_pending: false,
        }
    }
}

impl AllocParams {
    /// Domain and cross-field checks.
    pub fn validate_domains(&self) -> Result<(), CoreError> {
        if self.max_preferences == 0 {
            return Err(CoreError::DomainOutOfRange("maxPreferences"));
        }
        if self.group_order == GroupOrder::Seeded && self.group_seed.is_none() {
            return Err(CoreError::MissingSeed);
        }
        Ok(())
    }

    pub fn allocation_config(&self) -> Result<AllocationConfig, CoreError> {
        self.validate_domains()?;
        Ok(AllocationConfig {
            group_order: self.group_order,
            group_seed: match self.group_order {
                GroupOrder::Seeded => self.group_seed,
                _ => None,
            },
            output_order: self.output_order,
        })
    }
}
