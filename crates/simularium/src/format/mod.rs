// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire format.
//!
//! - [`layout`] - fixed per-agent stride of the spatial buffer
//! - [`json`] - typed `.simularium` document and the buffer codec
//! - [`version`] - `trajectoryInfo` upgrade chain

pub mod json;
pub mod layout;
pub mod version;

pub use json::{decode, encode, SimulariumFile};
pub use layout::{BufferLayout, VizType};
pub use version::{update_trajectory_info_version, TRAJECTORY_INFO_VERSION};

use crate::error::Result;
use crate::trajectory::TrajectoryData;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// File extension of trajectory files.
pub const EXTENSION: &str = "simularium";

/// Upgrade an untyped payload to the current version, then parse it.
pub fn parse_value(mut payload: Value) -> Result<SimulariumFile> {
    update_trajectory_info_version(&mut payload)?;
    Ok(serde_json::from_value(payload)?)
}

/// Parse a `.simularium` document of any supported version.
pub fn read_str(text: &str) -> Result<TrajectoryData> {
    let payload: Value = serde_json::from_str(text)?;
    decode(&parse_value(payload)?)
}

/// Load a `.simularium` file of any supported version.
pub fn read_file(path: impl AsRef<Path>) -> Result<TrajectoryData> {
    read_str(&fs::read_to_string(path)?)
}
