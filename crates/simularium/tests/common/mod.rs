// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(dead_code)]

use simularium::{AgentData, DimensionData, MetaData, TableRow, TrajectoryData, VizType};

const TYPES: [&str; 3] = ["A", "B", "fiber#tip"];

/// Random ragged buffer: up to 3 frames, 5 agents per frame, 4 subpoints
/// per agent. Agents with subpoints are fibers.
pub fn random_agents(rng: &mut fastrand::Rng) -> AgentData {
    let total_steps = rng.usize(0..=3);
    let mut agents = AgentData::from_dimensions(DimensionData::new(total_steps, 5, 4));
    for t in 0..total_steps {
        agents.times[t] = t as f64 * 0.1;
        let n_agents = rng.usize(0..=5);
        agents.n_agents[t] = n_agents;
        for a in 0..n_agents {
            agents.unique_ids[[t, a]] = (a * 10 + rng.usize(0..10)) as i64;
            agents.types[[t, a]] = TYPES[rng.usize(..TYPES.len())].to_string();
            agents.radii[[t, a]] = rng.f64() * 5.0;
            for i in 0..3 {
                agents.positions[[t, a, i]] = rng.f64() * 200.0 - 100.0;
                agents.rotations[[t, a, i]] = rng.f64() * 6.0;
            }
            let n_subpoints = rng.usize(0..=4);
            agents.n_subpoints[[t, a]] = n_subpoints;
            agents.viz_types[[t, a]] = if n_subpoints > 0 {
                VizType::Fiber
            } else {
                VizType::Default
            };
            for p in 0..n_subpoints {
                for i in 0..3 {
                    agents.subpoints[[t, a, p, i]] = rng.f64() * 50.0;
                }
            }
        }
    }
    agents
}

pub fn random_trajectory(rng: &mut fastrand::Rng) -> TrajectoryData {
    let mut meta = MetaData::with_box_size([
        1.0 + rng.f64() * 100.0,
        1.0 + rng.f64() * 100.0,
        1.0 + rng.f64() * 100.0,
    ]);
    meta.trajectory_title = "random".into();
    TrajectoryData::new(meta, random_agents(rng))
}

pub fn row(time: f64, uid: i64, type_name: &str, position: [f64; 3]) -> TableRow {
    TableRow {
        time,
        unique_id: uid,
        type_name: type_name.into(),
        position,
        ..Default::default()
    }
}

pub fn trajectory(rows: &[TableRow]) -> TrajectoryData {
    TrajectoryData::new(
        MetaData::default(),
        AgentData::from_table(rows).expect("valid rows"),
    )
}
