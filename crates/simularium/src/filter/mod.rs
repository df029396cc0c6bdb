// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Post-processing filters.
//!
//! A filter is a pure transform `&TrajectoryData -> TrajectoryData`. Chains
//! run strictly in the order given:
//!
//! ```text
//! input --> [EveryNthTimestep] --> [MultiplySpace] --> [Translate] --> output
//! ```
//!
//! Filters with per-type parameters take a [`TypeMap`], a default value plus
//! overrides keyed by type name.

mod add_agents;
mod every_nth_agent;
mod every_nth_subpoint;
mod every_nth_timestep;
mod multiply_space;
mod multiply_time;
mod transform_axes;
mod translate;

pub use add_agents::{AddAgentsFilter, TimestepPolicy};
pub use every_nth_agent::EveryNthAgentFilter;
pub use every_nth_subpoint::EveryNthSubpointFilter;
pub use every_nth_timestep::EveryNthTimestepFilter;
pub use multiply_space::MultiplySpaceFilter;
pub use multiply_time::MultiplyTimeFilter;
pub use transform_axes::{SignedAxis, TransformSpatialAxesFilter};
pub use translate::TranslateFilter;

use crate::error::{ConversionError, Result};
use crate::format;
use crate::meta::Vec3;
use crate::trajectory::TrajectoryData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// A pure trajectory transform.
pub trait Filter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produce a filtered copy; `data` is left untouched.
    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData>;
}

/// Run `filters` left to right.
pub fn apply_all(data: &TrajectoryData, filters: &[Box<dyn Filter>]) -> Result<TrajectoryData> {
    let mut current = data.clone();
    for filter in filters {
        debug!("Applying filter '{}'", filter.name());
        current = filter.apply(&current)?;
    }
    Ok(current)
}

/// Per-type parameter: a default plus overrides by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMap<T> {
    pub default: T,
    #[serde(default)]
    pub overrides: BTreeMap<String, T>,
}

impl<T> TypeMap<T> {
    pub fn new(default: T) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Add an override for one type.
    #[must_use]
    pub fn with(mut self, type_name: impl Into<String>, value: T) -> Self {
        self.overrides.insert(type_name.into(), value);
        self
    }

    /// Override for `type_name`, else the default.
    pub fn get(&self, type_name: &str) -> &T {
        self.overrides.get(type_name).unwrap_or(&self.default)
    }

    /// Default first, then every override.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.default).chain(self.overrides.values())
    }
}

impl<T: Default> Default for TypeMap<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Reject zero strides anywhere in a per-type stride table.
pub(crate) fn check_strides(strides: &TypeMap<usize>, what: &str) -> Result<()> {
    if strides.values().any(|&n| n == 0) {
        return Err(ConversionError::data(format!(
            "every-nth-{what} stride must be at least 1"
        )));
    }
    Ok(())
}

fn one() -> usize {
    1
}

/// Serializable description of a filter, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum FilterSpec {
    EveryNthTimestep {
        n: usize,
    },
    EveryNthAgent {
        #[serde(default = "one")]
        default_n: usize,
        #[serde(default)]
        n_per_type: BTreeMap<String, usize>,
    },
    EveryNthSubpoint {
        #[serde(default = "one")]
        default_n: usize,
        #[serde(default)]
        n_per_type: BTreeMap<String, usize>,
    },
    MultiplyTime {
        multiplier: f64,
        #[serde(default)]
        apply_to_plots: bool,
    },
    MultiplySpace {
        multiplier: f64,
    },
    Translate {
        #[serde(default)]
        default_translation: Vec3,
        #[serde(default)]
        translation_per_type: BTreeMap<String, Vec3>,
    },
    TransformSpatialAxes {
        axes_mapping: Vec<String>,
    },
    /// Merge the agents of another `.simularium` file.
    AddAgents {
        path: PathBuf,
        #[serde(default)]
        timestep_policy: TimestepPolicy,
    },
}

impl FilterSpec {
    /// Build the filter this entry describes.
    pub fn build(&self) -> Result<Box<dyn Filter>> {
        let filter: Box<dyn Filter> = match self {
            Self::EveryNthTimestep { n } => Box::new(EveryNthTimestepFilter::new(*n)?),
            Self::EveryNthAgent {
                default_n,
                n_per_type,
            } => Box::new(EveryNthAgentFilter::new(TypeMap {
                default: *default_n,
                overrides: n_per_type.clone(),
            })?),
            Self::EveryNthSubpoint {
                default_n,
                n_per_type,
            } => Box::new(EveryNthSubpointFilter::new(TypeMap {
                default: *default_n,
                overrides: n_per_type.clone(),
            })?),
            Self::MultiplyTime {
                multiplier,
                apply_to_plots,
            } => Box::new(MultiplyTimeFilter::new(*multiplier, *apply_to_plots)),
            Self::MultiplySpace { multiplier } => {
                Box::new(MultiplySpaceFilter::new(*multiplier)?)
            }
            Self::Translate {
                default_translation,
                translation_per_type,
            } => Box::new(TranslateFilter::new(TypeMap {
                default: *default_translation,
                overrides: translation_per_type.clone(),
            })),
            Self::TransformSpatialAxes { axes_mapping } => {
                let axes: Vec<&str> = axes_mapping.iter().map(String::as_str).collect();
                Box::new(TransformSpatialAxesFilter::parse(&axes)?)
            }
            Self::AddAgents {
                path,
                timestep_policy,
            } => {
                let agents = format::read_file(path)?.agent_data;
                Box::new(AddAgentsFilter::new(agents).with_policy(*timestep_policy))
            }
        };
        Ok(filter)
    }
}
