// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{check_strides, Filter, TypeMap};
use crate::agent_data::AgentData;
use crate::error::Result;
use crate::trajectory::TrajectoryData;
use std::collections::HashMap;
use tracing::{debug, info};

/// Per frame, keep every nth agent of each type and re-pack from slot 0.
///
/// Agents are counted separately per type, in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct EveryNthAgentFilter {
    strides: TypeMap<usize>,
}

impl EveryNthAgentFilter {
    pub fn new(strides: TypeMap<usize>) -> Result<Self> {
        check_strides(&strides, "agent")?;
        Ok(Self { strides })
    }

    /// Same stride for every type.
    pub fn uniform(n: usize) -> Result<Self> {
        Self::new(TypeMap::new(n))
    }
}

impl Filter for EveryNthAgentFilter {
    fn name(&self) -> &'static str {
        "every_nth_agent"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: every Nth agent");
        let src = &data.agent_data;
        let mut out = AgentData::from_dimensions(src.get_dimensions());
        out.times.assign(&src.times);
        out.display_data = src.display_data.clone();
        out.draw_fiber_points = src.draw_fiber_points;

        for t in 0..src.n_timesteps() {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            let mut next = 0;
            for a in 0..src.n_agents[t] {
                let type_name = src.types[[t, a]].as_str();
                let count = seen.entry(type_name).or_insert(0);
                let keep = *count % self.strides.get(type_name) == 0;
                *count += 1;
                if keep {
                    out.copy_agent((t, next), src, (t, a));
                    next += 1;
                }
            }
            out.n_agents[t] = next;
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
    use crate::filter::test_util::{row, trajectory};

    #[test]
    fn test_every_second_agent_repacked() {
        let rows: Vec<_> = (0..4)
            .map(|i| row(0.0, i, "A", [i as f64, 0.0, 0.0]))
            .collect();
        let traj = trajectory(&rows);
        let out = EveryNthAgentFilter::uniform(2)
            .expect("valid")
            .apply(&traj)
            .expect("applies");
        let agents = &out.agent_data;
        assert_eq!(agents.n_agents[0], 2);
        assert_eq!(agents.unique_ids[[0, 0]], 0);
        assert_eq!(agents.unique_ids[[0, 1]], 2);
        assert_eq!(agents.position(0, 1), [2.0, 0.0, 0.0]);
        assert_eq!(traj.agent_data.n_agents[0], 4);
    }

    #[test]
    fn test_counts_per_type() {
        // A B A B A: strides A=2, B=1 keep A0, B1, B3, A4
        let types = ["A", "B", "A", "B", "A"];
        let rows: Vec<_> = types
            .iter()
            .enumerate()
            .map(|(i, t)| row(0.0, i as i64, t, [0.0; 3]))
            .collect();
        let filter = EveryNthAgentFilter::new(TypeMap::new(1).with("A", 2)).expect("valid");
        let out = filter.apply(&trajectory(&rows)).expect("applies");
        let ids: Vec<i64> = (0..out.agent_data.n_agents[0])
            .map(|a| out.agent_data.unique_ids[[0, a]])
            .collect();
        assert_eq!(ids, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_zero_stride_rejected() {
        assert!(EveryNthAgentFilter::new(TypeMap::new(1).with("A", 0)).is_err());
    }
}
