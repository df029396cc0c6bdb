// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `trajectoryInfo` version upgrades.
//!
//! Each step rewrites the untyped payload one version forward; the chain is
//! applied once at load time, before the payload is parsed.

use crate::error::{ConversionError, Result};
use crate::units::UnitData;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

pub const TRAJECTORY_INFO_VERSION: u32 = 3;
pub const SPATIAL_DATA_VERSION: u32 = 1;
pub const PLOT_DATA_VERSION: u32 = 1;

type Upgrade = fn(&mut Map<String, Value>) -> Result<()>;

/// `(from_version, step)`, in order.
const UPGRADES: &[(u32, Upgrade)] = &[(1, v1_to_v2 as Upgrade), (2, v2_to_v3 as Upgrade)];

/// Read `trajectoryInfo.version` from a payload.
pub fn trajectory_info_version(payload: &Value) -> Result<u32> {
    let version = payload
        .get("trajectoryInfo")
        .ok_or_else(|| ConversionError::missing("trajectoryInfo"))?
        .get("version")
        .ok_or_else(|| ConversionError::missing("trajectoryInfo.version"))?;
    version
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ConversionError::data(format!("invalid trajectoryInfo version {version}")))
}

/// Upgrade `payload` in place to the current `trajectoryInfo` version.
///
/// Returns the version the payload started at. Versions newer than this
/// library are rejected.
pub fn update_trajectory_info_version(payload: &mut Value) -> Result<u32> {
    let original = trajectory_info_version(payload)?;
    if original > TRAJECTORY_INFO_VERSION {
        return Err(ConversionError::VersionMismatch {
            expected: TRAJECTORY_INFO_VERSION,
            got: original,
        });
    }
    if original == 0 {
        return Err(ConversionError::data("trajectoryInfo version 0 does not exist"));
    }

    let info = payload
        .get_mut("trajectoryInfo")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ConversionError::data("trajectoryInfo is not an object"))?;
    for &(from, step) in UPGRADES.iter().filter(|(from, _)| *from >= original) {
        step(info)?;
        info.insert("version".into(), json!(from + 1));
        debug!("Upgraded trajectoryInfo v{} -> v{}", from, from + 1);
    }

    if original != TRAJECTORY_INFO_VERSION {
        info!(
            "Updated TrajectoryInfo v{} -> v{}",
            original, TRAJECTORY_INFO_VERSION
        );
    }
    Ok(original)
}

/// v2 carries unit objects instead of a bare meters factor.
fn v1_to_v2(info: &mut Map<String, Value>) -> Result<()> {
    let spatial_units = match info.remove("spatialUnitFactorMeters") {
        Some(factor) => {
            let factor = factor.as_f64().ok_or_else(|| {
                ConversionError::data(format!("invalid spatialUnitFactorMeters {factor}"))
            })?;
            UnitData::new("m", factor).compact()
        }
        None => UnitData::meters(),
    };
    info.insert("spatialUnits".into(), serde_json::to_value(spatial_units)?);
    info.insert("timeUnits".into(), serde_json::to_value(UnitData::seconds())?);
    Ok(())
}

/// Everything v3 adds is optional.
fn v2_to_v3(_info: &mut Map<String, Value>) -> Result<()> {
    Ok(())
}
