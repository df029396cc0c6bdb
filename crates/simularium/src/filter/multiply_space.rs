// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Filter;
use crate::error::{ConversionError, Result};
use crate::trajectory::TrajectoryData;
use tracing::info;

/// Scale positions, radii, subpoints and the bounding box.
///
/// Rotations and `scale_factor` are left alone. The spatial unit magnitude is
/// divided by the multiplier so physical lengths are unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplySpaceFilter {
    multiplier: f64,
}

impl MultiplySpaceFilter {
    /// The multiplier must be finite and non-zero; the spatial unit
    /// magnitude is divided by it.
    pub fn new(multiplier: f64) -> Result<Self> {
        if multiplier == 0.0 || !multiplier.is_finite() {
            return Err(ConversionError::data(format!(
                "space multiplier must be finite and non-zero, got {multiplier}"
            )));
        }
        Ok(Self { multiplier })
    }
}

impl Filter for MultiplySpaceFilter {
    fn name(&self) -> &'static str {
        "multiply_space"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!("Filtering: multiplying spatial scale by {}", self.multiplier);
        let m = self.multiplier;
        let mut agents = data.agent_data.clone();
        agents.positions *= m;
        agents.radii *= m;
        agents.subpoints *= m;

        let mut out = data.with_agent_data(agents);
        out.meta_data.box_size = data.meta_data.box_size.map(|v| v * m);
        out.spatial_units.magnitude = data.spatial_units.magnitude / m;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{row, trajectory};

    #[test]
    fn test_doubles_positions_and_box() {
        let traj = trajectory(&[
            row(0.0, 1, "A", [0.0, 0.0, 0.0]),
            row(1.0, 1, "A", [1.0, 0.0, 0.0]),
            row(1.0, 2, "B", [0.0, 1.0, 0.0]),
        ]);
        let out = MultiplySpaceFilter::new(2.0)
            .expect("valid")
            .apply(&traj)
            .expect("applies");
        let agents = &out.agent_data;
        assert_eq!(agents.position(0, 0), [0.0, 0.0, 0.0]);
        assert_eq!(agents.position(1, 0), [2.0, 0.0, 0.0]);
        assert_eq!(agents.position(1, 1), [0.0, 2.0, 0.0]);
        assert_eq!(agents.radii[[1, 1]], 2.0);
        assert_eq!(out.meta_data.box_size, [200.0, 200.0, 200.0]);
        assert_eq!(out.meta_data.scale_factor, 1.0);
        assert_eq!(out.spatial_units.magnitude, 0.5);
        assert_eq!(out.spatial_units.name, "m");
        assert_eq!(traj.meta_data.box_size, [100.0, 100.0, 100.0]);
    }

    #[test]
    fn test_degenerate_multipliers_rejected() {
        for m in [0.0, -0.0, f64::INFINITY, f64::NAN] {
            let err = MultiplySpaceFilter::new(m).expect_err("degenerate multiplier");
            assert!(matches!(err, ConversionError::Data(_)));
        }
        assert!(MultiplySpaceFilter::new(-2.0).is_ok());
    }
}
