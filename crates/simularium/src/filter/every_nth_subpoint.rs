// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{check_strides, Filter, TypeMap};
use crate::error::Result;
use crate::trajectory::TrajectoryData;
use ndarray::s;
use tracing::{debug, info};

/// Keep every nth subpoint of each agent, re-packed from subpoint 0.
#[derive(Debug, Clone, PartialEq)]
pub struct EveryNthSubpointFilter {
    strides: TypeMap<usize>,
}

impl EveryNthSubpointFilter {
    pub fn new(strides: TypeMap<usize>) -> Result<Self> {
        check_strides(&strides, "subpoint")?;
        Ok(Self { strides })
    }

    pub fn uniform(n: usize) -> Result<Self> {
        Self::new(TypeMap::new(n))
    }
}

impl Filter for EveryNthSubpointFilter {
    fn name(&self) -> &'static str {
        "every_nth_subpoint"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: every Nth subpoint");
        let mut out = data.agent_data.clone();
        out.subpoints.fill(0.0);

        let src = &data.agent_data;
        for t in 0..src.n_timesteps() {
            for a in 0..src.n_agents[t] {
                let n = *self.strides.get(&src.types[[t, a]]);
                let mut next = 0;
                for p in (0..src.n_subpoints[[t, a]]).step_by(n) {
                    out.subpoints
                        .slice_mut(s![t, a, next, ..])
                        .assign(&src.subpoints.slice(s![t, a, p, ..]));
                    next += 1;
                }
                out.n_subpoints[[t, a]] = next;
            }
        }

        debug!(
            "filtered dims = {} timesteps X {} agents X {} subpoints",
            out.n_timesteps(),
            out.max_n_agents(),
            out.max_n_subpoints()
        );
        Ok(data.with_agent_data(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_data::AgentData;
    use crate::dimensions::DimensionData;
    use crate::format::layout::VizType;
    use crate::meta::MetaData;

    fn fiber(n_points: usize) -> TrajectoryData {
        let mut agents = AgentData::from_dimensions(DimensionData::new(1, 1, n_points));
        agents.n_agents[0] = 1;
        agents.viz_types[[0, 0]] = VizType::Fiber;
        agents.types[[0, 0]] = "actin".into();
        agents.n_subpoints[[0, 0]] = n_points;
        for p in 0..n_points {
            agents.subpoints[[0, 0, p, 0]] = p as f64;
        }
        TrajectoryData::new(MetaData::default(), agents)
    }

    #[test]
    fn test_every_third_subpoint() {
        let traj = fiber(7);
        let out = EveryNthSubpointFilter::uniform(3)
            .expect("valid")
            .apply(&traj)
            .expect("applies");
        let agents = &out.agent_data;
        assert_eq!(agents.n_subpoints[[0, 0]], 3);
        assert_eq!(agents.subpoint(0, 0, 1), [3.0, 0.0, 0.0]);
        assert_eq!(agents.subpoint(0, 0, 2), [6.0, 0.0, 0.0]);
        assert_eq!(agents.subpoints[[0, 0, 3, 0]], 0.0);
        assert_eq!(traj.agent_data.n_subpoints[[0, 0]], 7);
    }

    #[test]
    fn test_per_type_override() {
        let filter = EveryNthSubpointFilter::new(TypeMap::new(1).with("actin", 2)).expect("valid");
        let out = filter.apply(&fiber(4)).expect("applies");
        assert_eq!(out.agent_data.n_subpoints[[0, 0]], 2);
    }
}
