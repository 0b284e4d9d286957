//! LOAD stage: manifest or explicit paths → ea_io loaders → typed inputs,
//! then command-line overrides on top of the loaded parameters.

use tracing::info;

use ea_core::{AllocParams, GroupOrder};
use ea_io::loader::{self, LoadedInputs};

use crate::{InputSource, ParamOverrides, PipelineError};

pub fn load(source: &InputSource, overrides: &ParamOverrides) -> Result<LoadedInputs, PipelineError> {
    let mut loaded = match source {
        InputSource::Manifest(path) => {
            info!(stage = "load", manifest = %path.display(), "loading inputs from manifest");
            loader::load_all_from_manifest(path)?
        }
        InputSource::Paths(paths) => {
            info!(
                stage = "load",
                roster = %paths.roster.display(),
                departments = %paths.departments.display(),
                "loading inputs"
            );
            loader::load_inputs(paths)?
        }
    };
    apply_overrides(&mut loaded.params, overrides);
    info!(
        stage = "load",
        students = loaded.students.len(),
        departments = loaded.departments.len(),
        roster_sha256 = %loaded.digests.roster_sha256,
        "inputs loaded"
    );
    Ok(loaded)
}

/// Explicit order wins; a bare seed implies `seeded`.
pub fn apply_overrides(params: &mut AllocParams, overrides: &ParamOverrides) {
    if let Some(seed) = overrides.group_seed {
        params.group_seed = Some(seed);
        if overrides.group_order.is_none() {
            params.group_order = GroupOrder::Seeded;
        }
    }
    if let Some(order) = overrides.group_order {
        params.group_order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_alone_switches_to_seeded() {
        let mut p = AllocParams::default();
        apply_overrides(&mut p, &ParamOverrides { group_order: None, group_seed: Some(9) });
        assert_eq!(p.group_order, GroupOrder::Seeded);
        assert_eq!(p.group_seed, Some(9));
    }

    #[test]
    fn explicit_order_wins_over_seed() {
        let mut p = AllocParams::default();
        apply_overrides(
            &mut p,
            &ParamOverrides { group_order: Some(GroupOrder::FirstSeen), group_seed: Some(9) },
        );
        assert_eq!(p.group_order, GroupOrder::FirstSeen);
        assert_eq!(p.allocation_config().unwrap().group_seed, None);
    }

    #[test]
    fn no_overrides_leave_params_alone() {
        let mut p = AllocParams { include_pending: true, ..AllocParams::default() };
        let before = p.clone();
        apply_overrides(&mut p, &ParamOverrides::default());
        assert_eq!(p, before);
    }
}
