// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Filter;
use crate::agent_data::AgentData;
use crate::dimensions::DimensionData;
use crate::error::{ConversionError, Result};
use crate::trajectory::TrajectoryData;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// What to do when the injected agents cover a different number of frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestepPolicy {
    /// Keep every frame of the longer input; extra frames hold only that
    /// side's agents.
    #[default]
    Append,
    /// Keep only frames present in both.
    Truncate,
    /// Fail with a data error.
    Reject,
}

/// Merge a second agent buffer into the trajectory, frame by frame.
///
/// Existing agents keep their slots; injected agents follow them. Injected
/// IDs that clash with existing ones are moved past the largest ID in use,
/// with the same replacement in every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AddAgentsFilter {
    new_agent_data: AgentData,
    policy: TimestepPolicy,
}

impl AddAgentsFilter {
    pub fn new(new_agent_data: AgentData) -> Self {
        Self {
            new_agent_data,
            policy: TimestepPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TimestepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replacement IDs for injected agents whose IDs are taken.
    fn remap_ids(&self, base: &AgentData) -> Result<HashMap<i64, i64>> {
        let added = &self.new_agent_data;
        let valid = |data: &AgentData| -> Vec<i64> {
            (0..data.n_timesteps())
                .flat_map(|t| (0..data.n_agents[t]).map(move |a| (t, a)))
                .map(|(t, a)| data.unique_ids[[t, a]])
                .collect()
        };
        let taken: HashSet<i64> = valid(base).into_iter().collect();
        let added_ids = valid(added);

        let overflow = || ConversionError::data("no free agent id above the largest id in use");
        let mut next_free = match taken.iter().chain(added_ids.iter()).copied().max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        let mut remap = HashMap::new();
        for uid in added_ids {
            if taken.contains(&uid) && !remap.contains_key(&uid) {
                let free = next_free.ok_or_else(overflow)?;
                remap.insert(uid, free);
                next_free = free.checked_add(1);
            }
        }
        Ok(remap)
    }
}

impl Filter for AddAgentsFilter {
    fn name(&self) -> &'static str {
        "add_agents"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: add agents");
        let base = &data.agent_data;
        let added = &self.new_agent_data;
        let (base_steps, added_steps) = (base.n_timesteps(), added.n_timesteps());

        let total_steps = match self.policy {
            _ if base_steps == added_steps => base_steps,
            TimestepPolicy::Append => base_steps.max(added_steps),
            TimestepPolicy::Truncate => base_steps.min(added_steps),
            TimestepPolicy::Reject => {
                return Err(ConversionError::data(format!(
                    "Timestep in data to add differs from existing: new data has \
                     {added_steps} steps, while existing data has {base_steps}"
                )))
            }
        };

        let count = |d: &AgentData, t: usize| if t < d.n_timesteps() { d.n_agents[t] } else { 0 };
        let max_agents = (0..total_steps)
            .map(|t| count(base, t) + count(added, t))
            .max()
            .unwrap_or(0);
        let needed =
            |d: &AgentData| DimensionData::new(total_steps, max_agents, d.max_n_subpoints());
        let mut out = AgentData::from_dimensions(needed(base).union(&needed(added)));
        out.draw_fiber_points = base.draw_fiber_points;
        out.display_data = base.display_data.clone();
        for (name, display) in &added.display_data {
            out.display_data
                .entry(name.clone())
                .or_insert_with(|| display.clone());
        }

        let remap = self.remap_ids(base)?;
        if !remap.is_empty() {
            debug!("remapped {} colliding agent ids", remap.len());
        }

        for t in 0..total_steps {
            out.times[t] = if t < base_steps {
                base.times[t]
            } else {
                added.times[t]
            };
            let mut next = 0;
            for a in 0..count(base, t) {
                out.copy_agent((t, next), base, (t, a));
                next += 1;
            }
            for a in 0..count(added, t) {
                out.copy_agent((t, next), added, (t, a));
                let uid = added.unique_ids[[t, a]];
                out.unique_ids[[t, next]] = remap.get(&uid).copied().unwrap_or(uid);
                next += 1;
            }
            out.n_agents[t] = next;
        }

        debug!("merged dims = {}", out.get_dimensions());
        Ok(data.with_agent_data(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{row, trajectory};

    #[test]
    fn test_single_frame_merge() {
        let traj = trajectory(&[row(0.0, 0, "A", [1.0, 0.0, 0.0])]);
        let extra = AgentData::from_table(&[row(0.0, 5, "B", [0.0, 1.0, 0.0])]).expect("rows");
        let out = AddAgentsFilter::new(extra).apply(&traj).expect("applies");
        let agents = &out.agent_data;
        assert_eq!(agents.n_timesteps(), 1);
        assert_eq!(agents.n_agents[0], 2);
        assert_eq!(agents.types[[0, 0]], "A");
        assert_eq!(agents.types[[0, 1]], "B");
        assert_eq!(agents.unique_ids[[0, 1]], 5);
        assert_eq!(agents.get_dimensions().max_agents, 2);
    }

    #[test]
    fn test_colliding_ids_remapped_stably() {
        let traj = trajectory(&[row(0.0, 1, "A", [0.0; 3]), row(1.0, 1, "A", [0.0; 3])]);
        let extra = AgentData::from_table(&[
            row(0.0, 1, "B", [0.0; 3]),
            row(1.0, 1, "B", [0.0; 3]),
            row(1.0, 2, "B", [0.0; 3]),
        ])
        .expect("rows");
        let out = AddAgentsFilter::new(extra).apply(&traj).expect("applies");
        let agents = &out.agent_data;
        assert_eq!(agents.unique_ids[[0, 1]], 3);
        assert_eq!(agents.unique_ids[[1, 1]], 3);
        assert_eq!(agents.unique_ids[[1, 2]], 2);
    }

    #[test]
    fn test_remap_overflow_is_data_error() {
        let traj = trajectory(&[row(0.0, i64::MAX, "A", [0.0; 3])]);
        let extra = AgentData::from_table(&[row(0.0, i64::MAX, "B", [0.0; 3])]).expect("rows");
        let err = AddAgentsFilter::new(extra)
            .apply(&traj)
            .expect_err("no id left");
        assert!(matches!(err, ConversionError::Data(_)));
    }

    #[test]
    fn test_subpoint_capacity_covers_both_inputs() {
        let traj = trajectory(&[row(0.0, 0, "A", [0.0; 3])]);
        let mut extra = AgentData::from_dimensions(DimensionData::new(1, 1, 4));
        extra.n_agents[0] = 1;
        extra.unique_ids[[0, 0]] = 1;
        extra.types[[0, 0]] = "fiber".into();
        extra.n_subpoints[[0, 0]] = 2;
        extra.subpoints[[0, 0, 1, 2]] = 9.0;
        let out = AddAgentsFilter::new(extra).apply(&traj).expect("applies");
        assert_eq!(out.agent_data.get_dimensions(), DimensionData::new(1, 2, 2));
        assert_eq!(out.agent_data.subpoint(0, 1, 1), [0.0, 0.0, 9.0]);
    }

    #[test]
    fn test_timestep_policies() {
        let traj = trajectory(&[row(0.0, 0, "A", [0.0; 3])]);
        let extra = AgentData::from_table(&[
            row(0.0, 1, "B", [0.0; 3]),
            row(1.0, 1, "B", [0.0; 3]),
        ])
        .expect("rows");

        let appended = AddAgentsFilter::new(extra.clone())
            .apply(&traj)
            .expect("append");
        assert_eq!(appended.agent_data.times.to_vec(), vec![0.0, 1.0]);
        assert_eq!(appended.agent_data.n_agents.to_vec(), vec![2, 1]);
        assert_eq!(appended.agent_data.types[[1, 0]], "B");

        let truncated = AddAgentsFilter::new(extra.clone())
            .with_policy(TimestepPolicy::Truncate)
            .apply(&traj)
            .expect("truncate");
        assert_eq!(truncated.agent_data.n_timesteps(), 1);

        let err = AddAgentsFilter::new(extra)
            .with_policy(TimestepPolicy::Reject)
            .apply(&traj)
            .expect_err("reject");
        assert!(matches!(err, ConversionError::Data(_)));
    }
}
