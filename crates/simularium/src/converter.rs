// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Orchestration: filter, annotate with plots, serialize.

use crate::error::{ConversionError, Result};
use crate::filter::{self, Filter};
use crate::format::{self, json, SimulariumFile, EXTENSION};
use crate::plot::{PlotKind, ScatterPlotData};
use crate::trajectory::TrajectoryData;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Largest agent ID the viewer can address.
pub const MAX_AGENT_ID: i64 = i32::MAX as i64;

/// Holds one trajectory and turns it into `.simularium` output.
#[derive(Debug, Clone)]
pub struct TrajectoryConverter {
    data: TrajectoryData,
    validate_ids: bool,
}

impl TrajectoryConverter {
    pub fn new(data: TrajectoryData) -> Self {
        Self {
            data,
            validate_ids: false,
        }
    }

    /// Check agent IDs (32-bit range, unique per frame) before writing.
    pub fn validate_ids(mut self, enabled: bool) -> Self {
        self.validate_ids = enabled;
        self
    }

    /// Load a `.simularium` file of any supported version.
    pub fn from_simularium_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading {}", path.display());
        Ok(Self::new(format::read_file(path)?))
    }

    /// Build from an already-parsed wire payload of any supported version.
    pub fn from_buffer_data(payload: Value) -> Result<Self> {
        let file = format::parse_value(payload)?;
        Ok(Self::new(format::decode(&file)?))
    }

    pub fn data(&self) -> &TrajectoryData {
        &self.data
    }

    pub fn into_data(self) -> TrajectoryData {
        self.data
    }

    /// Run `filters` in order over a copy of the data.
    pub fn filter_data(&self, filters: &[Box<dyn Filter>]) -> Result<TrajectoryData> {
        filter::apply_all(&self.data, filters)
    }

    /// Replace the held data with its filtered copy.
    pub fn apply_filters(&mut self, filters: &[Box<dyn Filter>]) -> Result<()> {
        self.data = self.filter_data(filters)?;
        Ok(())
    }

    /// Shape `data` with the reader for `plot_type` and attach the plot.
    pub fn add_plot<T: Serialize>(&mut self, data: &T, plot_type: &str) -> Result<()> {
        let kind: PlotKind = plot_type.parse()?;
        let payload = serde_json::to_value(data)?;
        let plot = kind.reader().read(&payload)?;
        self.data.plots.push(plot);
        Ok(())
    }

    /// Attach a line plot of how many agents of each type exist over time.
    ///
    /// Type names are cut at the first `#`, so `actin#barbed` counts as
    /// `actin`.
    pub fn add_number_of_agents_plot(&mut self) -> Result<()> {
        let agents = &self.data.agent_data;
        let mut counts: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for t in 0..agents.n_timesteps() {
            for a in 0..agents.n_agents[t] {
                let full = &agents.types[[t, a]];
                let base = full.split('#').next().unwrap_or(full);
                counts
                    .entry(base.to_string())
                    .or_insert_with(|| vec![0.0; agents.n_timesteps()])[t] += 1.0;
            }
        }
        let plot = ScatterPlotData {
            title: "Number of agents over time".into(),
            xaxis_title: format!("Time ({})", self.data.time_units),
            yaxis_title: "Number of agents".into(),
            xtrace: agents.times.to_vec(),
            ytraces: counts,
            render_mode: "lines".into(),
        };
        self.add_plot(&plot, "scatter")
    }

    /// Wire representation of the held data.
    pub fn to_simularium(&self) -> Result<SimulariumFile> {
        let file = json::encode(&self.data)?;
        if self.validate_ids {
            check_agent_ids(&file)?;
        }
        Ok(file)
    }

    /// Serialize the held data to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_simularium()?)?)
    }

    /// Write `<output_path>.simularium` and return the path written.
    pub fn write_json(&self, output_path: impl AsRef<Path>) -> Result<PathBuf> {
        info!("Writing JSON");
        write_file(output_path.as_ref(), &self.to_simularium()?)
    }

    /// Upgrade, validate and re-serialize a payload that did not come from a
    /// converter.
    pub fn write_external_json(
        output_path: impl AsRef<Path>,
        payload: Value,
        validate_ids: bool,
    ) -> Result<PathBuf> {
        info!("Writing JSON (external)");
        let converter = Self::from_buffer_data(payload)?.validate_ids(validate_ids);
        converter.write_json(output_path)
    }

    /// Upgrade `payload` in place; returns the version it started at.
    pub fn update_trajectory_info_version(payload: &mut Value) -> Result<u32> {
        format::update_trajectory_info_version(payload)
    }
}

/// `path` with the `.simularium` extension, unless it already has it.
pub fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == EXTENSION) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(EXTENSION);
        PathBuf::from(name)
    }
}

fn write_file(path: &Path, file: &SimulariumFile) -> Result<PathBuf> {
    let path = output_path(path);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, file)?;
    writer.flush()?;
    info!("saved to {}", path.display());
    Ok(path)
}

/// Agent IDs must fit in 32 bits and be unique within each frame.
fn check_agent_ids(file: &SimulariumFile) -> Result<()> {
    use crate::format::layout::{AGENT_HEADER_LEN, NSP_INDEX, UID_INDEX};

    for frame in &file.spatial_data.bundle_data {
        let mut seen = HashSet::new();
        let mut offset = 0;
        while offset + AGENT_HEADER_LEN <= frame.data.len() {
            let uid = frame.data[offset + UID_INDEX] as i64;
            if uid > MAX_AGENT_ID {
                return Err(ConversionError::data(format!(
                    "Agent ID is larger than a 32 bit integer: {uid}"
                )));
            }
            if !seen.insert(uid) {
                return Err(ConversionError::data(format!(
                    "found duplicate ID {uid} in frame {} at index {offset}",
                    frame.frame_number
                )));
            }
            offset += AGENT_HEADER_LEN + frame.data[offset + NSP_INDEX] as usize;
        }
    }
    Ok(())
}
