// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A complete trajectory: agents, scene metadata, units and plots.

use crate::agent_data::AgentData;
use crate::meta::MetaData;
use crate::plot::Plot;
use crate::units::UnitData;

/// Everything a converter produces for one simulation run.
///
/// Filters take `&TrajectoryData` and return a new value; a trajectory is
/// never mutated once handed to the converter.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryData {
    pub meta_data: MetaData,
    pub agent_data: AgentData,
    pub time_units: UnitData,
    pub spatial_units: UnitData,
    pub plots: Vec<Plot>,
}

impl TrajectoryData {
    /// Trajectory in seconds and meters with no plots.
    pub fn new(meta_data: MetaData, agent_data: AgentData) -> Self {
        Self {
            meta_data,
            agent_data,
            time_units: UnitData::seconds(),
            spatial_units: UnitData::meters(),
            plots: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_time_units(mut self, units: UnitData) -> Self {
        self.time_units = units;
        self
    }

    #[must_use]
    pub fn with_spatial_units(mut self, units: UnitData) -> Self {
        self.spatial_units = units;
        self
    }

    #[must_use]
    pub fn with_plots(mut self, plots: Vec<Plot>) -> Self {
        self.plots = plots;
        self
    }

    /// Copy sharing everything but the agent buffer.
    pub fn with_agent_data(&self, agent_data: AgentData) -> Self {
        Self {
            meta_data: self.meta_data.clone(),
            agent_data,
            time_units: self.time_units.clone(),
            spatial_units: self.spatial_units.clone(),
            plots: self.plots.clone(),
        }
    }
}
