// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Filter, TypeMap};
use crate::error::Result;
use crate::meta::Vec3;
use crate::trajectory::TrajectoryData;
use tracing::info;

/// Offset positions and subpoints (world coordinates) per agent type.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateFilter {
    translations: TypeMap<Vec3>,
}

impl TranslateFilter {
    pub fn new(translations: TypeMap<Vec3>) -> Self {
        Self { translations }
    }
}

impl Filter for TranslateFilter {
    fn name(&self) -> &'static str {
        "translate"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: translation");
        let src = &data.agent_data;
        let mut out = src.clone();
        for t in 0..src.n_timesteps() {
            for a in 0..src.n_agents[t] {
                let offset = self.translations.get(&src.types[[t, a]]);
                for (i, d) in offset.iter().enumerate() {
                    out.positions[[t, a, i]] += d;
                    for p in 0..src.n_subpoints[[t, a]] {
                        out.subpoints[[t, a, p, i]] += d;
                    }
                }
            }
        }
        Ok(data.with_agent_data(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{row, trajectory};

    #[test]
    fn test_per_type_offsets() {
        let traj = trajectory(&[
            row(0.0, 1, "A", [1.0, 1.0, 1.0]),
            row(0.0, 2, "B", [1.0, 1.0, 1.0]),
        ]);
        let offsets = TypeMap::new([0.0, 0.0, 5.0]).with("B", [-1.0, 0.0, 0.0]);
        let filter = TranslateFilter::new(offsets);
        let out = filter.apply(&traj).expect("applies");
        assert_eq!(out.agent_data.position(0, 0), [1.0, 1.0, 6.0]);
        assert_eq!(out.agent_data.position(0, 1), [0.0, 1.0, 1.0]);
        assert_eq!(out.agent_data.rotation(0, 1), [0.0, 0.0, 0.0]);
        assert_eq!(out.agent_data.radii[[0, 1]], 1.0);
    }

    #[test]
    fn test_unused_slots_untouched() {
        let mut traj = trajectory(&[row(0.0, 1, "A", [0.0; 3]), row(1.0, 1, "A", [0.0; 3])]);
        let mut agents = traj.agent_data.clone();
        agents.n_agents[1] = 0;
        traj = traj.with_agent_data(agents);
        let out = TranslateFilter::new(TypeMap::new([2.0, 0.0, 0.0]))
            .apply(&traj)
            .expect("applies");
        assert_eq!(out.agent_data.positions[[1, 0, 0]], 0.0);
    }
}
