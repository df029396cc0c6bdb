// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `.simularium` JSON codec.
//!
//! ```text
//! {
//!   "trajectoryInfo": { version, units, size, cameraDefault, typeMapping, ... },
//!   "spatialData":    { version, msgType, bundleStart, bundleSize,
//!                       bundleData: [ { frameNumber, time, data: [f64] } ] },
//!   "plotData":       { version, data: [plots] }
//! }
//! ```
//!
//! See [`layout`](super::layout) for the per-agent stride inside `data`.

use super::layout::{
    BufferLayout, VizType, AGENT_HEADER_LEN, NSP_INDEX, POSX_INDEX, R_INDEX, ROTX_INDEX,
    SP_INDEX, TID_INDEX, UID_INDEX, VALUES_PER_3D_POINT, VIZ_TYPE_INDEX,
};
use super::version::{PLOT_DATA_VERSION, SPATIAL_DATA_VERSION, TRAJECTORY_INFO_VERSION};
use crate::agent_data::{AgentData, TypeMapping};
use crate::dimensions::{BufferAxis, DimensionData};
use crate::error::{ConversionError, Result};
use crate::meta::{CameraData, DisplayData, DisplayType, MetaData, Vec3};
use crate::plot::Plot;
use crate::trajectory::TrajectoryData;
use crate::units::{clamp_precision, UnitData};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Radius of the spheres drawn at fiber control points.
const FIBER_POINT_RADIUS: f64 = 0.5;

/// Spacing between generated fiber point IDs of one fiber.
const FIBER_POINT_ID_STRIDE: i64 = 100;

/// Whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulariumFile {
    pub trajectory_info: TrajectoryInfo,
    pub spatial_data: SpatialData,
    #[serde(default)]
    pub plot_data: PlotData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vec3> for Xyz {
    fn from([x, y, z]: Vec3) -> Self {
        Self { x, y, z }
    }
}

impl From<Xyz> for Vec3 {
    fn from(v: Xyz) -> Self {
        [v.x, v.y, v.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    pub position: Xyz,
    pub look_at_position: Xyz,
    pub up_vector: Xyz,
    pub fov_degrees: f64,
}

impl From<&CameraData> for CameraInfo {
    fn from(camera: &CameraData) -> Self {
        Self {
            position: camera.position.into(),
            look_at_position: camera.look_at_position.into(),
            up_vector: camera.up_vector.into(),
            fov_degrees: camera.fov_degrees,
        }
    }
}

impl From<CameraInfo> for CameraData {
    fn from(info: CameraInfo) -> Self {
        Self {
            position: info.position.into(),
            look_at_position: info.look_at_position.into(),
            up_vector: info.up_vector.into(),
            fov_degrees: info.fov_degrees,
        }
    }
}

impl Default for CameraInfo {
    fn default() -> Self {
        Self::from(&CameraData::DEFAULT)
    }
}

/// One `typeMapping` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<DisplayData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryInfo {
    pub version: u32,
    #[serde(default = "UnitData::seconds")]
    pub time_units: UnitData,
    #[serde(default)]
    pub time_step_size: f64,
    pub total_steps: usize,
    #[serde(default = "UnitData::meters")]
    pub spatial_units: UnitData,
    pub size: Xyz,
    #[serde(default)]
    pub camera_default: CameraInfo,
    /// Keyed by the decimal type ID.
    #[serde(default)]
    pub type_mapping: BTreeMap<String, TypeInfo>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trajectory_title: String,
    #[serde(default)]
    pub buffer_layout: BufferLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialData {
    pub version: u32,
    pub msg_type: u32,
    pub bundle_start: usize,
    pub bundle_size: usize,
    pub bundle_data: Vec<BundleFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleFrame {
    pub frame_number: usize,
    pub time: f64,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub version: u32,
    #[serde(default)]
    pub data: Vec<Plot>,
}

impl Default for PlotData {
    fn default() -> Self {
        Self {
            version: PLOT_DATA_VERSION,
            data: Vec::new(),
        }
    }
}

/// Check that every agent is named and that subpoints, viz type and
/// display type agree.
pub fn check_types_match_subpoints(agents: &AgentData) -> Result<()> {
    for t in 0..agents.n_timesteps() {
        for a in 0..agents.n_agents[t] {
            let type_name = &agents.types[[t, a]];
            if type_name.is_empty() {
                return Err(ConversionError::data(format!(
                    "Agent at index Time = {t}, Agent = {a} has no type name"
                )));
            }
            let has_subpoints = agents.n_subpoints[[t, a]] > 0;
            let viz_type = agents.viz_types[[t, a]];
            let what = if has_subpoints { "has" } else { "does not have" };
            if has_subpoints != (viz_type == VizType::Fiber) {
                return Err(ConversionError::data(format!(
                    "Agent at index Time = {t}, Agent = {a}: Type {type_name} {what} \
                     subpoints and viz type is {viz_type:?}"
                )));
            }
            let display_type = agents
                .display_data
                .get(type_name)
                .and_then(|d| d.display_type);
            if let Some(display_type) = display_type {
                if has_subpoints != (display_type == DisplayType::Fiber) {
                    return Err(ConversionError::data(format!(
                        "Agent at index Time = {t}, Agent = {a}: Type {type_name} {what} \
                         subpoints and display type is {display_type:?}"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Stable IDs for spheres generated at fiber control points.
struct FiberPointIds {
    assigned: HashMap<i64, i64>,
    used: HashSet<i64>,
}

impl FiberPointIds {
    fn new(agents: &AgentData) -> Self {
        let used = (0..agents.n_timesteps())
            .flat_map(|t| (0..agents.n_agents[t]).map(move |a| (t, a)))
            .map(|(t, a)| agents.unique_ids[[t, a]])
            .collect();
        Self {
            assigned: HashMap::new(),
            used,
        }
    }

    fn get(&mut self, fiber_uid: i64, point: usize) -> Result<i64> {
        let overflow = || {
            ConversionError::data(format!(
                "fiber point id for agent {fiber_uid} point {point} overflows"
            ))
        };
        let raw = fiber_uid
            .checked_add(1)
            .and_then(|uid| uid.checked_mul(FIBER_POINT_ID_STRIDE))
            .and_then(|base| i64::try_from(point).ok().and_then(|p| base.checked_add(p)))
            .ok_or_else(overflow)?;
        if let Some(uid) = self.assigned.get(&raw) {
            return Ok(*uid);
        }
        let mut uid = raw;
        while self.used.contains(&uid) {
            uid = uid.checked_add(FIBER_POINT_ID_STRIDE).ok_or_else(overflow)?;
        }
        self.used.insert(uid);
        self.assigned.insert(raw, uid);
        Ok(uid)
    }
}

#[allow(clippy::too_many_arguments)]
fn push_header(
    buf: &mut Vec<f64>,
    viz_type: VizType,
    uid: i64,
    type_id: usize,
    position: Vec3,
    rotation: Vec3,
    radius: f64,
    n_subpoint_values: usize,
) {
    let start = buf.len();
    buf.resize(start + AGENT_HEADER_LEN, 0.0);
    let header = &mut buf[start..];
    header[VIZ_TYPE_INDEX] = viz_type.code();
    header[UID_INDEX] = uid as f64;
    header[TID_INDEX] = type_id as f64;
    header[POSX_INDEX..POSX_INDEX + 3].copy_from_slice(&position);
    header[ROTX_INDEX..ROTX_INDEX + 3].copy_from_slice(&rotation);
    header[R_INDEX] = radius;
    header[NSP_INDEX] = n_subpoint_values as f64;
}

/// Flatten one frame into the per-agent stride.
fn encode_frame(
    agents: &AgentData,
    t: usize,
    type_ids: &Array2<usize>,
    fiber_ids: &mut FiberPointIds,
) -> Result<Vec<f64>> {
    let mut buf = Vec::new();
    for a in 0..agents.n_agents[t] {
        let n = agents.n_subpoints[[t, a]];
        push_header(
            &mut buf,
            agents.viz_types[[t, a]],
            agents.unique_ids[[t, a]],
            type_ids[[t, a]],
            agents.position(t, a),
            agents.rotation(t, a),
            agents.radii[[t, a]],
            VALUES_PER_3D_POINT * n,
        );
        for p in 0..n {
            buf.extend_from_slice(&agents.subpoint(t, a, p));
        }

        if !agents.draw_fiber_points || n == 0 {
            continue;
        }
        let fiber_uid = agents.unique_ids[[t, a]];
        for p in (0..n).step_by(2) {
            push_header(
                &mut buf,
                VizType::Default,
                fiber_ids.get(fiber_uid, p)?,
                type_ids[[t, a]],
                agents.subpoint(t, a, p),
                [0.0; 3],
                FIBER_POINT_RADIUS,
                0,
            );
        }
    }
    Ok(buf)
}

/// Build the wire representation of a trajectory.
pub fn encode(data: &TrajectoryData) -> Result<SimulariumFile> {
    let agents = &data.agent_data;
    check_types_match_subpoints(agents)?;

    let (type_ids, mapping) = agents.get_type_ids_and_mapping();
    let type_mapping = mapping
        .iter()
        .map(|(id, name)| {
            let geometry = agents
                .display_data
                .get(name)
                .filter(|d| !d.is_default())
                .cloned();
            (
                id.to_string(),
                TypeInfo {
                    name: name.to_string(),
                    geometry,
                },
            )
        })
        .collect();

    let total_steps = agents.n_timesteps();
    let time_step_size = if total_steps > 1 {
        clamp_precision(agents.times[1] - agents.times[0])
    } else {
        0.0
    };

    let mut fiber_ids = FiberPointIds::new(agents);
    let bundle_data = (0..total_steps)
        .map(|t| {
            Ok(BundleFrame {
                frame_number: t,
                time: agents.times[t],
                data: encode_frame(agents, t, &type_ids, &mut fiber_ids)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let meta = &data.meta_data;
    Ok(SimulariumFile {
        trajectory_info: TrajectoryInfo {
            version: TRAJECTORY_INFO_VERSION,
            time_units: data.time_units.clone(),
            time_step_size,
            total_steps,
            spatial_units: data.spatial_units.clone(),
            size: meta.box_size.into(),
            camera_default: CameraInfo::from(&meta.camera_defaults),
            type_mapping,
            trajectory_title: meta.trajectory_title.clone(),
            buffer_layout: BufferLayout::V1,
        },
        spatial_data: SpatialData {
            version: SPATIAL_DATA_VERSION,
            msg_type: 1,
            bundle_start: 0,
            bundle_size: total_steps,
            bundle_data,
        },
        plot_data: PlotData {
            version: PLOT_DATA_VERSION,
            data: data.plots.clone(),
        },
    })
}

/// Read a float that must hold a non-negative integer.
fn as_count(value: f64, what: &str, frame: usize, offset: usize) -> Result<usize> {
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(ConversionError::data(format!(
            "frame {frame} offset {offset}: {what} {value} is not a non-negative integer"
        )));
    }
    Ok(value as usize)
}

/// One agent header plus its subpoint run, borrowed from a frame buffer.
struct AgentRecord<'a> {
    header: &'a [f64],
    subpoints: &'a [f64],
}

/// Split a frame buffer into agent records.
fn split_frame(data: &[f64], frame: usize) -> Result<Vec<AgentRecord<'_>>> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let header_end = offset + AGENT_HEADER_LEN;
        if header_end > data.len() {
            return Err(ConversionError::data(format!(
                "frame {frame}: agent at offset {offset} is truncated"
            )));
        }
        let n_values = as_count(data[offset + NSP_INDEX], "subpoint count", frame, offset)?;
        if n_values % VALUES_PER_3D_POINT != 0 {
            return Err(ConversionError::data(format!(
                "frame {frame} offset {offset}: {n_values} subpoint values is not a \
                 multiple of {VALUES_PER_3D_POINT}"
            )));
        }
        let end = header_end + n_values;
        if end > data.len() {
            return Err(ConversionError::data(format!(
                "frame {frame}: subpoints of agent at offset {offset} are truncated"
            )));
        }
        records.push(AgentRecord {
            header: &data[offset..header_end],
            subpoints: &data[header_end..end],
        });
        offset = end;
    }
    Ok(records)
}

/// Rebuild the agent buffer from a parsed file.
pub fn decode_agent_data(file: &SimulariumFile) -> Result<AgentData> {
    let info = &file.trajectory_info;
    let frames = &file.spatial_data.bundle_data;
    if info.buffer_layout != BufferLayout::V1 {
        return Err(ConversionError::data(format!(
            "unsupported buffer layout {:?}",
            info.buffer_layout
        )));
    }
    if info.total_steps != frames.len() {
        warn!(
            "totalSteps is {} but the file holds {} frames",
            info.total_steps,
            frames.len()
        );
    }

    // Wire IDs may be sparse; map them onto dense insertion-order IDs.
    let mut wire_ids: Vec<(usize, &TypeInfo)> = Vec::with_capacity(info.type_mapping.len());
    for (key, type_info) in &info.type_mapping {
        let id = key
            .parse()
            .map_err(|_| ConversionError::data(format!("invalid type id '{key}'")))?;
        wire_ids.push((id, type_info));
    }
    wire_ids.sort_by_key(|(id, _)| *id);
    let mut mapping = TypeMapping::new();
    let dense: HashMap<usize, usize> = wire_ids
        .iter()
        .map(|(id, type_info)| (*id, mapping.insert(&type_info.name)))
        .collect();

    let mut agents = AgentData::from_dimensions(DimensionData::new(frames.len(), 0, 0));
    let mut frame_type_ids: Vec<Vec<usize>> = Vec::with_capacity(frames.len());
    for (t, frame) in frames.iter().enumerate() {
        agents.times[t] = frame.time;
        let mut ids = Vec::new();
        for (a, record) in split_frame(&frame.data, t)?.into_iter().enumerate() {
            let n = record.subpoints.len() / VALUES_PER_3D_POINT;
            agents = agents.check_increase_buffer_size(a, BufferAxis::Agent);
            if n > 0 {
                agents = agents.check_increase_buffer_size(n - 1, BufferAxis::Subpoint);
            }

            let h = record.header;
            let code = h[VIZ_TYPE_INDEX];
            agents.viz_types[[t, a]] = VizType::from_code(code).ok_or_else(|| {
                ConversionError::data(format!("frame {t} agent {a}: unknown viz type {code}"))
            })?;
            agents.unique_ids[[t, a]] = h[UID_INDEX] as i64;
            let wire_id = as_count(h[TID_INDEX], "type id", t, a)?;
            ids.push(*dense.get(&wire_id).ok_or_else(|| {
                ConversionError::data(format!(
                    "frame {t} agent {a}: type id {wire_id} is not in the type mapping"
                ))
            })?);
            for i in 0..3 {
                agents.positions[[t, a, i]] = h[POSX_INDEX + i];
                agents.rotations[[t, a, i]] = h[ROTX_INDEX + i];
            }
            agents.radii[[t, a]] = h[R_INDEX];
            agents.n_subpoints[[t, a]] = n;
            for (p, point) in record.subpoints.chunks_exact(VALUES_PER_3D_POINT).enumerate() {
                for (i, v) in point.iter().enumerate() {
                    agents.subpoints[[t, a, p, i]] = *v;
                }
            }
            agents.n_agents[t] = a + 1;
        }
        frame_type_ids.push(ids);
    }

    let mut type_ids = Array2::zeros(agents.types.dim());
    for (t, ids) in frame_type_ids.iter().enumerate() {
        for (a, id) in ids.iter().enumerate() {
            type_ids[[t, a]] = *id;
        }
    }
    agents.types = AgentData::type_names_from_ids(&type_ids, &agents.n_agents, &mapping)?;

    for type_info in info.type_mapping.values() {
        if let Some(geometry) = &type_info.geometry {
            agents
                .display_data
                .insert(type_info.name.clone(), geometry.clone());
        }
    }
    debug!("Decoded agent buffer: {}", agents.get_dimensions());
    Ok(agents)
}

/// Rebuild a full trajectory from a parsed file.
pub fn decode(file: &SimulariumFile) -> Result<TrajectoryData> {
    let info = &file.trajectory_info;
    if info.version != TRAJECTORY_INFO_VERSION {
        return Err(ConversionError::VersionMismatch {
            expected: TRAJECTORY_INFO_VERSION,
            got: info.version,
        });
    }
    let agent_data = decode_agent_data(file)?;
    let meta_data = MetaData {
        box_size: info.size.into(),
        camera_defaults: info.camera_default.into(),
        scale_factor: 1.0,
        trajectory_title: info.trajectory_title.clone(),
    };
    Ok(TrajectoryData::new(meta_data, agent_data)
        .with_time_units(info.time_units.clone())
        .with_spatial_units(info.spatial_units.clone())
        .with_plots(file.plot_data.data.clone()))
}
