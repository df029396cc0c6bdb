// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Filter;
use crate::error::{ConversionError, Result};
use crate::trajectory::TrajectoryData;
use tracing::{debug, info};

/// Keep frames `0, n, 2n, ...`; times are kept as-is, not renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EveryNthTimestepFilter {
    n: usize,
}

impl EveryNthTimestepFilter {
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(ConversionError::data(
                "every-nth-timestep stride must be at least 1",
            ));
        }
        Ok(Self { n })
    }

    pub fn n(&self) -> usize {
        self.n
    }
}

impl Filter for EveryNthTimestepFilter {
    fn name(&self) -> &'static str {
        "every_nth_timestep"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: every {}th timestep", self.n);
        let agents = &data.agent_data;
        let keep: Vec<usize> = (0..agents.n_timesteps()).step_by(self.n).collect();

        let mut filtered = agents.select_timesteps(&keep);
        let used = filtered.get_type_names();
        filtered.display_data.retain(|name, _| used.contains(name));

        debug!("filtered dims = {}", filtered.get_dimensions());
        Ok(data.with_agent_data(filtered))
    }
}
