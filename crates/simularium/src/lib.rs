// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simularium trajectory core
//!
//! Normalize spatiotemporal simulation output into one versioned trajectory
//! format:
//! - Ragged agent buffer with amortized per-axis growth
//! - Pure post-processing filters (down-sampling, spatial transforms, agent
//!   injection)
//! - `.simularium` JSON codec with version upgrades on load
//!
//! # Quick Start
//!
//! ```no_run
//! use simularium::{
//!     AgentData, EveryNthTimestepFilter, Filter, MetaData, TableRow,
//!     TrajectoryConverter, TrajectoryData,
//! };
//!
//! # fn main() -> simularium::Result<()> {
//! let rows = vec![TableRow {
//!     time: 0.0,
//!     unique_id: 1,
//!     type_name: "A".into(),
//!     ..Default::default()
//! }];
//! let data = TrajectoryData::new(MetaData::default(), AgentData::from_table(&rows)?);
//! let converter = TrajectoryConverter::new(data);
//!
//! let filters: Vec<Box<dyn Filter>> = vec![Box::new(EveryNthTimestepFilter::new(2)?)];
//! let filtered = TrajectoryConverter::new(converter.filter_data(&filters)?);
//! filtered.write_json("out/run")?; // writes out/run.simularium
//! # Ok(())
//! # }
//! ```
//!
//! # Command line
//!
//! ```bash
//! simularium-convert --input run.simularium --output run_small --every-nth-timestep 10
//! ```

pub mod agent_data;
pub mod config;
pub mod converter;
pub mod dimensions;
pub mod error;
pub mod filter;
pub mod format;
pub mod meta;
pub mod plot;
pub mod trajectory;
pub mod units;

pub use agent_data::{AgentData, TableRow, TypeMapping};
pub use config::ConvertConfig;
pub use converter::TrajectoryConverter;
pub use dimensions::{BufferAxis, DimensionData};
pub use error::{ConversionError, Result};
pub use filter::{
    AddAgentsFilter, EveryNthAgentFilter, EveryNthSubpointFilter, EveryNthTimestepFilter, Filter,
    FilterSpec, MultiplySpaceFilter, MultiplyTimeFilter, TimestepPolicy,
    TransformSpatialAxesFilter, TranslateFilter, TypeMap,
};
pub use format::{SimulariumFile, VizType};
pub use meta::{CameraData, DisplayData, DisplayType, MetaData, Vec3};
pub use plot::{HistogramPlotData, Plot, PlotKind, PlotReader, ScatterPlotData};
pub use trajectory::TrajectoryData;
pub use units::UnitData;
