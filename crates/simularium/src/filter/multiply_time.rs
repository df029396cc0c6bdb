// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Filter;
use crate::error::Result;
use crate::trajectory::TrajectoryData;
use tracing::info;

/// Scale every frame time, and optionally the x values of every plot trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplyTimeFilter {
    multiplier: f64,
    apply_to_plots: bool,
}

impl MultiplyTimeFilter {
    pub fn new(multiplier: f64, apply_to_plots: bool) -> Self {
        Self {
            multiplier,
            apply_to_plots,
        }
    }
}

impl Filter for MultiplyTimeFilter {
    fn name(&self) -> &'static str {
        "multiply_time"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: multiplying time by {}", self.multiplier);
        let mut agents = data.agent_data.clone();
        agents.times *= self.multiplier;

        let mut out = data.with_agent_data(agents);
        if self.apply_to_plots {
            for trace in out.plots.iter_mut().flat_map(|p| p.data.iter_mut()) {
                trace.x.iter_mut().for_each(|x| *x *= self.multiplier);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{row, trajectory};
    use crate::plot::{AxisTitle, Plot, PlotLayout, PlotTrace, TraceKind};

    fn with_plot() -> TrajectoryData {
        let plot = Plot {
            layout: PlotLayout {
                title: "p".into(),
                xaxis: AxisTitle::new("time"),
                yaxis: AxisTitle::new("y"),
            },
            data: vec![PlotTrace {
                name: "A".into(),
                kind: TraceKind::Scatter,
                x: vec![1.0, 2.0],
                y: Some(vec![5.0, 6.0]),
                mode: None,
            }],
        };
        trajectory(&[row(1.0, 0, "A", [0.0; 3]), row(2.0, 0, "A", [0.0; 3])])
            .with_plots(vec![plot])
    }

    #[test]
    fn test_times_scaled_plots_untouched() {
        let traj = with_plot();
        let out = MultiplyTimeFilter::new(10.0, false)
            .apply(&traj)
            .expect("applies");
        assert_eq!(out.agent_data.times.to_vec(), vec![10.0, 20.0]);
        assert_eq!(out.plots, traj.plots);
        assert_eq!(traj.agent_data.times.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_plot_x_scaled() {
        let out = MultiplyTimeFilter::new(0.5, true)
            .apply(&with_plot())
            .expect("applies");
        assert_eq!(out.plots[0].data[0].x, vec![0.5, 1.0]);
        assert_eq!(out.plots[0].data[0].y, Some(vec![5.0, 6.0]));
    }
}
