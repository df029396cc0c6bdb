// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plots shipped alongside the spatial data.
//!
//! Callers hand `add_plot` a loosely typed payload and a plot type name; a
//! [`PlotReader`] shapes it into a [`Plot`], the structure written under
//! `plotData`.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::info;

/// A rendered plot: layout plus traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub layout: PlotLayout,
    pub data: Vec<PlotTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    pub title: String,
    pub xaxis: AxisTitle,
    pub yaxis: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub title: String,
}

impl AxisTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Histogram,
}

/// One named series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotTrace {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub x: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Plot types `add_plot` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Scatter,
    Histogram,
}

impl FromStr for PlotKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scatter" => Ok(Self::Scatter),
            "histogram" => Ok(Self::Histogram),
            other => Err(ConversionError::UnsupportedPlotType(other.to_string())),
        }
    }
}

impl PlotKind {
    /// Reader that shapes payloads of this kind.
    pub fn reader(self) -> Box<dyn PlotReader> {
        match self {
            Self::Scatter => Box::new(ScatterPlotReader),
            Self::Histogram => Box::new(HistogramPlotReader),
        }
    }
}

/// Shapes a caller payload into a [`Plot`].
pub trait PlotReader {
    fn read(&self, data: &Value) -> Result<Plot>;
}

/// Input for a scatter plot; every y trace is drawn against `xtrace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlotData {
    pub title: String,
    pub xaxis_title: String,
    pub yaxis_title: String,
    pub xtrace: Vec<f64>,
    pub ytraces: BTreeMap<String, Vec<f64>>,
    /// `"markers"` or `"lines"`.
    #[serde(default = "default_render_mode")]
    pub render_mode: String,
}

fn default_render_mode() -> String {
    "markers".to_string()
}

/// Input for a histogram; each trace is a list of raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramPlotData {
    pub title: String,
    pub xaxis_title: String,
    pub traces: BTreeMap<String, Vec<f64>>,
}

/// Fail with `MissingData` naming the first absent field.
fn require_fields(data: &Value, fields: &[&str]) -> Result<()> {
    for field in fields {
        if data.get(field).map_or(true, Value::is_null) {
            return Err(ConversionError::missing(*field));
        }
    }
    Ok(())
}

pub struct ScatterPlotReader;

impl PlotReader for ScatterPlotReader {
    fn read(&self, data: &Value) -> Result<Plot> {
        require_fields(
            data,
            &["title", "xaxis_title", "yaxis_title", "xtrace", "ytraces"],
        )?;
        let data: ScatterPlotData = serde_json::from_value(data.clone())?;
        info!("Reading scatter plot '{}'", data.title);

        let mut traces = Vec::with_capacity(data.ytraces.len());
        for (name, y) in &data.ytraces {
            if y.len() != data.xtrace.len() {
                return Err(ConversionError::data(format!(
                    "Plot {} y-trace {} has a different length than x-trace",
                    data.title, name
                )));
            }
            traces.push(PlotTrace {
                name: name.clone(),
                kind: TraceKind::Scatter,
                x: data.xtrace.clone(),
                y: Some(y.clone()),
                mode: Some(data.render_mode.clone()),
            });
        }
        Ok(Plot {
            layout: PlotLayout {
                title: data.title,
                xaxis: AxisTitle::new(data.xaxis_title),
                yaxis: AxisTitle::new(data.yaxis_title),
            },
            data: traces,
        })
    }
}

pub struct HistogramPlotReader;

impl PlotReader for HistogramPlotReader {
    fn read(&self, data: &Value) -> Result<Plot> {
        require_fields(data, &["title", "xaxis_title", "traces"])?;
        let data: HistogramPlotData = serde_json::from_value(data.clone())?;
        info!("Reading histogram '{}'", data.title);

        let traces = data
            .traces
            .into_iter()
            .map(|(name, x)| PlotTrace {
                name,
                kind: TraceKind::Histogram,
                x,
                y: None,
                mode: None,
            })
            .collect();
        Ok(Plot {
            layout: PlotLayout {
                title: data.title,
                xaxis: AxisTitle::new(data.xaxis_title),
                yaxis: AxisTitle::new("frequency"),
            },
            data: traces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plot_kind_parse() {
        assert_eq!("scatter".parse::<PlotKind>().expect("known"), PlotKind::Scatter);
        let err = "pie".parse::<PlotKind>().expect_err("unknown");
        assert!(matches!(err, ConversionError::UnsupportedPlotType(ref t) if t == "pie"));
    }

    #[test]
    fn test_scatter_reader() {
        let plot = ScatterPlotReader
            .read(&json!({
                "title": "Count",
                "xaxis_title": "time (s)",
                "yaxis_title": "agents",
                "xtrace": [0.0, 1.0],
                "ytraces": {"A": [3.0, 4.0]},
                "render_mode": "lines",
            }))
            .expect("valid scatter");
        assert_eq!(plot.layout.xaxis.title, "time (s)");
        assert_eq!(plot.data.len(), 1);
        assert_eq!(plot.data[0].kind, TraceKind::Scatter);
        assert_eq!(plot.data[0].mode.as_deref(), Some("lines"));

        let json = serde_json::to_value(&plot).expect("serialize");
        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][0]["y"], json!([3.0, 4.0]));
    }

    #[test]
    fn test_scatter_length_mismatch() {
        let err = ScatterPlotReader
            .read(&json!({
                "title": "t", "xaxis_title": "x", "yaxis_title": "y",
                "xtrace": [0.0, 1.0], "ytraces": {"A": [3.0]},
            }))
            .expect_err("lengths differ");
        assert!(matches!(err, ConversionError::Data(_)));
    }

    #[test]
    fn test_missing_field() {
        let err = ScatterPlotReader
            .read(&json!({"title": "t", "xaxis_title": "x", "yaxis_title": "y"}))
            .expect_err("no xtrace");
        assert_eq!(err.to_string(), "Missing data: 'xtrace'");
    }

    #[test]
    fn test_histogram_reader() {
        let plot = HistogramPlotReader
            .read(&json!({
                "title": "Lengths", "xaxis_title": "length (nm)",
                "traces": {"fiber": [1.0, 2.0, 2.0]},
            }))
            .expect("valid histogram");
        assert_eq!(plot.layout.yaxis.title, "frequency");
        let json = serde_json::to_value(&plot).expect("serialize");
        assert_eq!(json["data"][0]["type"], "histogram");
        assert!(json["data"][0].get("y").is_none());
    }
}
