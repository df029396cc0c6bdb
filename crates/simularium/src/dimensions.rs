// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Allocated shape of an agent buffer.

use crate::error::{ConversionError, Result};
use std::fmt;

/// Allocated capacity of an [`AgentData`](crate::AgentData) buffer.
///
/// This is capacity, not occupancy: a buffer with `max_agents = 8` may hold
/// fewer valid agents in any frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DimensionData {
    pub total_steps: usize,
    pub max_agents: usize,
    pub max_subpoints: usize,
}

/// One growable axis of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferAxis {
    Timestep,
    Agent,
    Subpoint,
}

impl DimensionData {
    pub const fn new(total_steps: usize, max_agents: usize, max_subpoints: usize) -> Self {
        Self {
            total_steps,
            max_agents,
            max_subpoints,
        }
    }

    /// Build from signed counts, rejecting negative capacity.
    pub fn try_new(total_steps: i64, max_agents: i64, max_subpoints: i64) -> Result<Self> {
        let to_usize = |value: i64, axis: &str| {
            usize::try_from(value).map_err(|_| {
                ConversionError::data(format!("negative {axis} capacity: {value}"))
            })
        };
        Ok(Self {
            total_steps: to_usize(total_steps, "timestep")?,
            max_agents: to_usize(max_agents, "agent")?,
            max_subpoints: to_usize(max_subpoints, "subpoint")?,
        })
    }

    /// Capacity along one axis.
    pub fn get(&self, axis: BufferAxis) -> usize {
        match axis {
            BufferAxis::Timestep => self.total_steps,
            BufferAxis::Agent => self.max_agents,
            BufferAxis::Subpoint => self.max_subpoints,
        }
    }

    /// Copy with one axis replaced.
    #[must_use]
    pub fn with(mut self, axis: BufferAxis, capacity: usize) -> Self {
        match axis {
            BufferAxis::Timestep => self.total_steps = capacity,
            BufferAxis::Agent => self.max_agents = capacity,
            BufferAxis::Subpoint => self.max_subpoints = capacity,
        }
        self
    }

    /// Element-wise maximum, the smallest shape holding both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            total_steps: self.total_steps.max(other.total_steps),
            max_agents: self.max_agents.max(other.max_agents),
            max_subpoints: self.max_subpoints.max(other.max_subpoints),
        }
    }
}

impl fmt::Display for DimensionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} timesteps X {} agents X {} subpoints",
            self.total_steps, self.max_agents, self.max_subpoints
        )
    }
}

impl fmt::Display for BufferAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timestep => "timestep",
            Self::Agent => "agent",
            Self::Subpoint => "subpoint",
        })
    }
}
