// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Property checks on the ragged agent buffer and its flat encoding, over
// seeded random buffers of 0-3 frames, 0-5 agents and 0-4 subpoints.

#![allow(clippy::float_cmp)]

mod common;

use common::random_agents;
use simularium::format::{self, json};
use simularium::{BufferAxis, MetaData, TrajectoryConverter, TrajectoryData};

const SEEDS: u64 = 200;

#[test]
fn growth_preserves_occupied_cells() {
    let axes = [BufferAxis::Timestep, BufferAxis::Agent, BufferAxis::Subpoint];
    for seed in 0..SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        let agents = random_agents(&mut rng);
        let axis = axes[rng.usize(..axes.len())];
        let capacity = agents.get_dimensions().get(axis);
        let index = capacity + rng.usize(0..8);

        let grown = agents.clone().check_increase_buffer_size(index, axis);
        assert!(
            grown.get_dimensions().get(axis) >= index + 1,
            "seed {seed}: {axis} capacity {} < {}",
            grown.get_dimensions().get(axis),
            index + 1
        );
        assert!(grown.get_dimensions().get(axis) >= 2 * capacity);

        // Extra frames are unoccupied; compare the original frames only.
        let frames: Vec<usize> = (0..agents.n_timesteps()).collect();
        let head = grown.select_timesteps(&frames);
        assert!(head.valid_cells_eq(&agents, 0.0), "seed {seed}");
        assert!(grown.n_agents.iter().skip(agents.n_timesteps()).all(|&n| n == 0));
    }
}

#[test]
fn growth_within_capacity_is_noop() {
    for seed in 0..SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        let agents = random_agents(&mut rng);
        let dims = agents.get_dimensions();
        if dims.max_agents == 0 {
            continue;
        }
        let same = agents
            .clone()
            .check_increase_buffer_size(dims.max_agents - 1, BufferAxis::Agent);
        assert_eq!(same, agents);
    }
}

#[test]
fn stride_round_trip_in_memory() {
    for seed in 0..SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        let data = TrajectoryData::new(MetaData::default(), random_agents(&mut rng));
        let file = json::encode(&data).expect("encode");
        let decoded = json::decode(&file).expect("decode");
        assert!(
            decoded.agent_data.valid_cells_eq(&data.agent_data, 0.0),
            "seed {seed}"
        );
        assert_eq!(decoded.agent_data.n_agents, data.agent_data.n_agents);
    }
}

#[test]
fn stride_round_trip_through_text() {
    for seed in 0..SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        let data = common::random_trajectory(&mut rng);
        let text = TrajectoryConverter::new(data.clone())
            .to_json()
            .expect("serialize");
        let decoded = format::read_str(&text).expect("parse");
        assert!(
            decoded.agent_data.valid_cells_eq(&data.agent_data, 1e-9),
            "seed {seed}"
        );
        assert_eq!(decoded.meta_data.trajectory_title, "random");
    }
}

#[test]
fn type_ids_follow_first_appearance() {
    let mut rng = fastrand::Rng::with_seed(7);
    let agents = random_agents(&mut rng);
    let (ids, mapping) = agents.get_type_ids_and_mapping();
    assert_eq!(mapping.len(), agents.get_type_names().len());

    let mut expected_next = 0;
    for t in 0..agents.n_timesteps() {
        for a in 0..agents.n_agents[t] {
            let id = ids[[t, a]];
            assert!(id <= expected_next);
            if id == expected_next {
                expected_next += 1;
            }
            assert_eq!(mapping.name(id), Some(agents.types[[t, a]].as_str()));
        }
    }
}
