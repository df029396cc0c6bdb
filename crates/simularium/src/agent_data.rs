// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ragged trajectory buffer.
//!
//! Every per-agent field is an arena array indexed by `(timestep, slot)`
//! (plus a subpoint slot for `subpoints`). Allocated capacity is shared by
//! the whole buffer; occupancy lives in `n_agents` and `n_subpoints`:
//!
//! ```text
//!            slot 0   slot 1   slot 2   slot 3      n_agents
//! frame 0  [ agent  | agent  | ------ | ------ ]    2
//! frame 1  [ agent  | agent  | agent  | ------ ]    3
//! frame 2  [ agent  | ------ | ------ | ------ ]    1
//! ```
//!
//! Cells past the occupancy counts hold zeros and are never read.

use crate::dimensions::{BufferAxis, DimensionData};
use crate::error::{ConversionError, Result};
use crate::format::layout::VizType;
use crate::meta::{DisplayData, Vec3};
use ndarray::{s, Array1, Array2, Array3, Array4, Axis};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Radius given to freshly allocated agent slots.
pub const DEFAULT_RADIUS: f64 = 1.0;

/// Agent buffer for a whole trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentData {
    /// Time of each frame, `[T]`.
    pub times: Array1<f64>,
    /// Valid slots per frame, `[T]`.
    pub n_agents: Array1<usize>,
    pub viz_types: Array2<VizType>,
    pub unique_ids: Array2<i64>,
    /// Type name per slot; empty for unused slots.
    pub types: Array2<String>,
    pub positions: Array3<f64>,
    pub radii: Array2<f64>,
    /// Euler angles per slot, `[T][A][3]`.
    pub rotations: Array3<f64>,
    pub n_subpoints: Array2<usize>,
    /// Control points per slot, `[T][A][S][3]`.
    pub subpoints: Array4<f64>,
    /// Display overrides keyed by type name.
    pub display_data: BTreeMap<String, DisplayData>,
    /// Also emit fiber control points as spheres when writing.
    pub draw_fiber_points: bool,
}

/// One point agent in tabular form.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub time: f64,
    pub unique_id: i64,
    pub type_name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub radius: f64,
}

impl Default for TableRow {
    fn default() -> Self {
        Self {
            time: 0.0,
            unique_id: 0,
            type_name: String::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            radius: DEFAULT_RADIUS,
        }
    }
}

/// Bidirectional type name <-> numeric ID table, IDs in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapping {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl TypeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ID of `name`, assigning the next one if unseen.
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// `(id, name)` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(id, n)| (id, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AgentData {
    /// Allocate a zero-filled buffer with exactly the given capacity.
    pub fn from_dimensions(dims: DimensionData) -> Self {
        let DimensionData {
            total_steps: t,
            max_agents: a,
            max_subpoints: sp,
        } = dims;
        Self {
            times: Array1::zeros(t),
            n_agents: Array1::zeros(t),
            viz_types: Array2::from_elem((t, a), VizType::Default),
            unique_ids: Array2::zeros((t, a)),
            types: Array2::from_elem((t, a), String::new()),
            positions: Array3::zeros((t, a, 3)),
            radii: Array2::from_elem((t, a), DEFAULT_RADIUS),
            rotations: Array3::zeros((t, a, 3)),
            n_subpoints: Array2::zeros((t, a)),
            subpoints: Array4::zeros((t, a, sp, 3)),
            display_data: BTreeMap::new(),
            draw_fiber_points: false,
        }
    }

    /// Allocated capacity, read from the array shapes.
    pub fn get_dimensions(&self) -> DimensionData {
        let (t, a, sp, _) = self.subpoints.dim();
        DimensionData::new(t, a, sp)
    }

    /// Number of frames.
    pub fn n_timesteps(&self) -> usize {
        self.times.len()
    }

    /// Whether `(t, a)` is an occupied slot.
    pub fn is_valid(&self, t: usize, a: usize) -> bool {
        t < self.n_agents.len() && a < self.n_agents[t]
    }

    /// Largest `n_agents` over all frames.
    pub fn max_n_agents(&self) -> usize {
        self.n_agents.iter().copied().max().unwrap_or(0)
    }

    /// Largest `n_subpoints` over all valid slots.
    pub fn max_n_subpoints(&self) -> usize {
        (0..self.n_timesteps())
            .flat_map(|t| (0..self.n_agents[t]).map(move |a| (t, a)))
            .map(|(t, a)| self.n_subpoints[[t, a]])
            .max()
            .unwrap_or(0)
    }

    pub fn position(&self, t: usize, a: usize) -> Vec3 {
        vec3(&self.positions, t, a)
    }

    pub fn rotation(&self, t: usize, a: usize) -> Vec3 {
        vec3(&self.rotations, t, a)
    }

    pub fn subpoint(&self, t: usize, a: usize, p: usize) -> Vec3 {
        [
            self.subpoints[[t, a, p, 0]],
            self.subpoints[[t, a, p, 1]],
            self.subpoints[[t, a, p, 2]],
        ]
    }

    /// Copy with `axis` grown to `capacity`; existing cells keep their
    /// indices. Requests at or below the current capacity return an
    /// unchanged copy.
    pub fn get_copy_with_increased_buffer_size(&self, capacity: usize, axis: BufferAxis) -> Self {
        let dims = self.get_dimensions();
        if capacity <= dims.get(axis) {
            return self.clone();
        }
        let grown = dims.with(axis, capacity);
        debug!("Growing {} axis: {} -> {}", axis, dims, grown);

        let (t, a, sp) = (dims.total_steps, dims.max_agents, dims.max_subpoints);
        let mut out = Self::from_dimensions(grown);
        out.times.slice_mut(s![..t]).assign(&self.times);
        out.n_agents.slice_mut(s![..t]).assign(&self.n_agents);
        out.viz_types
            .slice_mut(s![..t, ..a])
            .assign(&self.viz_types);
        out.unique_ids
            .slice_mut(s![..t, ..a])
            .assign(&self.unique_ids);
        out.types.slice_mut(s![..t, ..a]).assign(&self.types);
        out.positions
            .slice_mut(s![..t, ..a, ..])
            .assign(&self.positions);
        out.radii.slice_mut(s![..t, ..a]).assign(&self.radii);
        out.rotations
            .slice_mut(s![..t, ..a, ..])
            .assign(&self.rotations);
        out.n_subpoints
            .slice_mut(s![..t, ..a])
            .assign(&self.n_subpoints);
        out.subpoints
            .slice_mut(s![..t, ..a, ..sp, ..])
            .assign(&self.subpoints);
        out.display_data = self.display_data.clone();
        out.draw_fiber_points = self.draw_fiber_points;
        out
    }

    /// Make room for a write at `next_index` along `axis`.
    ///
    /// Grows to `max(2 * capacity, next_index + 1)` when the index is out of
    /// range, so a run of appends reallocates a logarithmic number of times.
    pub fn check_increase_buffer_size(self, next_index: usize, axis: BufferAxis) -> Self {
        let capacity = self.get_dimensions().get(axis);
        if next_index < capacity {
            return self;
        }
        let new_capacity = (2 * capacity).max(next_index + 1);
        self.get_copy_with_increased_buffer_size(new_capacity, axis)
    }

    /// Keep the given frames, in order, with the same agent and subpoint
    /// capacity.
    pub fn select_timesteps(&self, indices: &[usize]) -> Self {
        Self {
            times: self.times.select(Axis(0), indices),
            n_agents: self.n_agents.select(Axis(0), indices),
            viz_types: self.viz_types.select(Axis(0), indices),
            unique_ids: self.unique_ids.select(Axis(0), indices),
            types: self.types.select(Axis(0), indices),
            positions: self.positions.select(Axis(0), indices),
            radii: self.radii.select(Axis(0), indices),
            rotations: self.rotations.select(Axis(0), indices),
            n_subpoints: self.n_subpoints.select(Axis(0), indices),
            subpoints: self.subpoints.select(Axis(0), indices),
            display_data: self.display_data.clone(),
            draw_fiber_points: self.draw_fiber_points,
        }
    }

    /// Copy one agent slot, including its subpoints, from `src`.
    ///
    /// The destination must have room for the source's subpoints.
    pub(crate) fn copy_agent(
        &mut self,
        (t, a): (usize, usize),
        src: &AgentData,
        (src_t, src_a): (usize, usize),
    ) {
        self.viz_types[[t, a]] = src.viz_types[[src_t, src_a]];
        self.unique_ids[[t, a]] = src.unique_ids[[src_t, src_a]];
        self.types[[t, a]] = src.types[[src_t, src_a]].clone();
        self.radii[[t, a]] = src.radii[[src_t, src_a]];
        self.positions
            .slice_mut(s![t, a, ..])
            .assign(&src.positions.slice(s![src_t, src_a, ..]));
        self.rotations
            .slice_mut(s![t, a, ..])
            .assign(&src.rotations.slice(s![src_t, src_a, ..]));
        let n = src.n_subpoints[[src_t, src_a]];
        self.n_subpoints[[t, a]] = n;
        self.subpoints
            .slice_mut(s![t, a, ..n, ..])
            .assign(&src.subpoints.slice(s![src_t, src_a, ..n, ..]));
    }

    /// Numeric type IDs per slot plus the mapping that produced them.
    ///
    /// IDs are assigned in first-seen order scanning frames, then slots.
    /// Unused slots and empty names keep ID 0.
    pub fn get_type_ids_and_mapping(&self) -> (Array2<usize>, TypeMapping) {
        let (t_cap, a_cap) = self.types.dim();
        let mut ids = Array2::zeros((t_cap, a_cap));
        let mut mapping = TypeMapping::new();
        for t in 0..self.n_timesteps() {
            for a in 0..self.n_agents[t] {
                let name = &self.types[[t, a]];
                if name.is_empty() {
                    continue;
                }
                ids[[t, a]] = mapping.insert(name);
            }
        }
        (ids, mapping)
    }

    /// Every type name used by a valid slot.
    pub fn get_type_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for t in 0..self.n_timesteps() {
            for a in 0..self.n_agents[t] {
                let name = &self.types[[t, a]];
                if !name.is_empty() {
                    names.insert(name.clone());
                }
            }
        }
        names
    }

    /// Resolve numeric type IDs back into names for every valid slot.
    pub fn type_names_from_ids(
        type_ids: &Array2<usize>,
        n_agents: &Array1<usize>,
        mapping: &TypeMapping,
    ) -> Result<Array2<String>> {
        let mut names = Array2::from_elem(type_ids.dim(), String::new());
        for (t, &count) in n_agents.iter().enumerate() {
            for a in 0..count {
                let id = type_ids[[t, a]];
                let name = mapping.name(id).ok_or_else(|| {
                    ConversionError::data(format!(
                        "type id {id} at frame {t} slot {a} is not in the type mapping"
                    ))
                })?;
                names[[t, a]] = name.to_string();
            }
        }
        Ok(names)
    }

    /// Build a buffer of point agents from tabular rows.
    ///
    /// Rows sharing a time become one frame, in row order; frames are sorted
    /// by time.
    pub fn from_table(rows: &[TableRow]) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| !r.time.is_finite()) {
            return Err(ConversionError::data(format!(
                "agent {} has non-finite time {}",
                row.unique_id, row.time
            )));
        }
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&l, &r| rows[l].time.total_cmp(&rows[r].time));

        let mut data = Self::from_dimensions(DimensionData::default());
        let mut frames = 0usize;
        for index in order {
            let row = &rows[index];
            if frames == 0 || data.times[frames - 1] != row.time {
                data = data.check_increase_buffer_size(frames, BufferAxis::Timestep);
                data.times[frames] = row.time;
                frames += 1;
            }
            let t = frames - 1;
            let a = data.n_agents[t];
            data = data.check_increase_buffer_size(a, BufferAxis::Agent);

            data.viz_types[[t, a]] = VizType::Default;
            data.unique_ids[[t, a]] = row.unique_id;
            data.types[[t, a]] = row.type_name.clone();
            data.radii[[t, a]] = row.radius;
            set_vec3(&mut data.positions, t, a, row.position);
            set_vec3(&mut data.rotations, t, a, row.rotation);
            data.n_agents[t] += 1;
        }

        let keep: Vec<usize> = (0..frames).collect();
        let data = data.select_timesteps(&keep);
        debug!("Built agent buffer from {} rows: {}", rows.len(), data.get_dimensions());
        Ok(data)
    }

    /// Compare occupancy and every valid cell, floats within `tolerance`.
    ///
    /// Capacity and the contents of unused cells are ignored.
    pub fn valid_cells_eq(&self, other: &Self, tolerance: f64) -> bool {
        let close = |l: f64, r: f64| (l - r).abs() <= tolerance;
        if self.n_timesteps() != other.n_timesteps() || self.n_agents != other.n_agents {
            return false;
        }
        for t in 0..self.n_timesteps() {
            if !close(self.times[t], other.times[t]) {
                return false;
            }
            for a in 0..self.n_agents[t] {
                let n = self.n_subpoints[[t, a]];
                let same_header = self.viz_types[[t, a]] == other.viz_types[[t, a]]
                    && self.unique_ids[[t, a]] == other.unique_ids[[t, a]]
                    && self.types[[t, a]] == other.types[[t, a]]
                    && close(self.radii[[t, a]], other.radii[[t, a]])
                    && n == other.n_subpoints[[t, a]];
                if !same_header {
                    return false;
                }
                let vectors = (0..3).all(|i| {
                    close(self.positions[[t, a, i]], other.positions[[t, a, i]])
                        && close(self.rotations[[t, a, i]], other.rotations[[t, a, i]])
                });
                let points = (0..n).all(|p| {
                    (0..3).all(|i| {
                        close(self.subpoints[[t, a, p, i]], other.subpoints[[t, a, p, i]])
                    })
                });
                if !vectors || !points {
                    return false;
                }
            }
        }
        true
    }
}

pub(crate) fn vec3(array: &Array3<f64>, t: usize, a: usize) -> Vec3 {
    [array[[t, a, 0]], array[[t, a, 1]], array[[t, a, 2]]]
}

pub(crate) fn set_vec3(array: &mut Array3<f64>, t: usize, a: usize, value: Vec3) {
    for (i, v) in value.into_iter().enumerate() {
        array[[t, a, i]] = v;
    }
}
