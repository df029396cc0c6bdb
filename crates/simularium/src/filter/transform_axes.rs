// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Filter;
use crate::error::{ConversionError, Result};
use crate::meta::Vec3;
use crate::trajectory::TrajectoryData;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// A source axis with a sign, written `+X`, `-y`, `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAxis {
    /// 0 = X, 1 = Y, 2 = Z.
    pub axis: usize,
    pub negative: bool,
}

impl FromStr for SignedAxis {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let (negative, name) = match lower.as_bytes() {
            [b'-', rest @ ..] => (true, rest),
            [b'+', rest @ ..] => (false, rest),
            rest => (false, rest),
        };
        let axis = match name {
            b"x" => 0,
            b"y" => 1,
            b"z" => 2,
            _ => return Err(ConversionError::data(format!("invalid axis '{s}'"))),
        };
        Ok(Self { axis, negative })
    }
}

impl fmt::Display for SignedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { '-' } else { '+' };
        write!(f, "{sign}{}", ['X', 'Y', 'Z'][self.axis])
    }
}

/// Rotate and/or reflect the scene by remapping axes.
///
/// Output axis `d` takes source axis `mapping[d].axis`, negated when
/// `mapping[d].negative`. Positions, rotations and subpoints get the signed
/// mapping; `box_size` is only permuted so sizes stay positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSpatialAxesFilter {
    mapping: [SignedAxis; 3],
}

impl TransformSpatialAxesFilter {
    /// The mapping must use each source axis exactly once.
    pub fn new(mapping: [SignedAxis; 3]) -> Result<Self> {
        let mut used = [false; 3];
        for signed in &mapping {
            if signed.axis > 2 || std::mem::replace(&mut used[signed.axis], true) {
                return Err(ConversionError::data(format!(
                    "axes mapping [{}, {}, {}] is not a permutation of X, Y, Z",
                    mapping[0], mapping[1], mapping[2]
                )));
            }
        }
        Ok(Self { mapping })
    }

    /// Parse a mapping such as `["+X", "-Z", "+Y"]`.
    pub fn parse(axes: &[&str]) -> Result<Self> {
        let [x, y, z] = axes else {
            return Err(ConversionError::data(format!(
                "axes mapping must have length 3, got {}",
                axes.len()
            )));
        };
        Self::new([x.parse()?, y.parse()?, z.parse()?])
    }

    pub fn mapping(&self) -> [SignedAxis; 3] {
        self.mapping
    }

    /// The mapping that undoes this one.
    pub fn inverse(&self) -> Self {
        let mut inverse = self.mapping;
        for (d, signed) in self.mapping.iter().enumerate() {
            inverse[signed.axis] = SignedAxis {
                axis: d,
                negative: signed.negative,
            };
        }
        Self { mapping: inverse }
    }

    fn transform(&self, v: Vec3) -> Vec3 {
        self.mapping.map(|m| if m.negative { -v[m.axis] } else { v[m.axis] })
    }

    fn permute(&self, v: Vec3) -> Vec3 {
        self.mapping.map(|m| v[m.axis])
    }
}

impl Filter for TransformSpatialAxesFilter {
    fn name(&self) -> &'static str {
        "transform_spatial_axes"
    }

    fn apply(&self, data: &TrajectoryData) -> Result<TrajectoryData> {
        info!(
            "Filtering: transform spatial axes [{}, {}, {}]",
            self.mapping[0], self.mapping[1], self.mapping[2]
        );
        let src = &data.agent_data;
        let mut out = src.clone();
        for t in 0..src.n_timesteps() {
            for a in 0..src.n_agents[t] {
                let position = self.transform(src.position(t, a));
                let rotation = self.transform(src.rotation(t, a));
                for i in 0..3 {
                    out.positions[[t, a, i]] = position[i];
                    out.rotations[[t, a, i]] = rotation[i];
                }
                for p in 0..src.n_subpoints[[t, a]] {
                    let point = self.transform(src.subpoint(t, a, p));
                    for (i, v) in point.into_iter().enumerate() {
                        out.subpoints[[t, a, p, i]] = v;
                    }
                }
            }
        }

        let mut result = data.with_agent_data(out);
        result.meta_data.box_size = self.permute(data.meta_data.box_size);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{row, trajectory};

    #[test]
    fn test_parse_axes() {
        assert_eq!(
            "-z".parse::<SignedAxis>().expect("valid"),
            SignedAxis {
                axis: 2,
                negative: true
            }
        );
        assert_eq!("Y".parse::<SignedAxis>().expect("valid").axis, 1);
        assert!("+W".parse::<SignedAxis>().is_err());
        assert!(TransformSpatialAxesFilter::parse(&["+X", "+X", "+Y"]).is_err());
        assert!(TransformSpatialAxesFilter::parse(&["+X", "+Y"]).is_err());
    }

    #[test]
    fn test_remaps_vectors_and_box() {
        let mut traj = trajectory(&[row(0.0, 1, "A", [1.0, 2.0, 3.0])]);
        traj.meta_data.box_size = [10.0, 20.0, 30.0];
        let filter = TransformSpatialAxesFilter::parse(&["+X", "-Z", "+Y"]).expect("valid");
        let out = filter.apply(&traj).expect("applies");
        assert_eq!(out.agent_data.position(0, 0), [1.0, -3.0, 2.0]);
        assert_eq!(out.meta_data.box_size, [10.0, 30.0, 20.0]);
    }

    #[test]
    fn test_inverse_round_trip() {
        let mut traj = trajectory(&[
            row(0.0, 1, "A", [1.0, 2.0, 3.0]),
            row(0.0, 2, "B", [-4.0, 0.5, 9.0]),
        ]);
        traj.meta_data.box_size = [10.0, 20.0, 30.0];
        let filter = TransformSpatialAxesFilter::parse(&["-Z", "-Y", "+X"]).expect("valid");
        let there = filter.apply(&traj).expect("applies");
        let back = filter.inverse().apply(&there).expect("applies");
        assert!(back.agent_data.valid_cells_eq(&traj.agent_data, 1e-12));
        assert_eq!(back.meta_data.box_size, traj.meta_data.box_size);
    }
}
