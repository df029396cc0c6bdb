// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed per-agent stride of the spatial buffer.
//!
//! ```text
//! +------------------------------------------------------------------+
//! | vizType | uid | typeId | px py pz | rx ry rz | radius | nSpValues |
//! |   [0]   | [1] |  [2]   |  [3..6]  |  [6..9]  |  [9]   |   [10]    |
//! +------------------------------------------------------------------+
//! | sp0x sp0y sp0z sp1x ... (nSpValues floats, 3 per subpoint)        |
//! +------------------------------------------------------------------+
//! ```
//!
//! Every agent contributes the 11-value header, followed by a run of
//! `nSpValues` subpoint coordinates (zero for point agents).

use serde::{Deserialize, Serialize};

pub const VIZ_TYPE_INDEX: usize = 0;
pub const UID_INDEX: usize = 1;
pub const TID_INDEX: usize = 2;
pub const POSX_INDEX: usize = 3;
pub const POSY_INDEX: usize = 4;
pub const POSZ_INDEX: usize = 5;
pub const ROTX_INDEX: usize = 6;
pub const ROTY_INDEX: usize = 7;
pub const ROTZ_INDEX: usize = 8;
pub const R_INDEX: usize = 9;
/// Holds the number of subpoint *values* (3 per subpoint).
pub const NSP_INDEX: usize = 10;
pub const SP_INDEX: usize = 11;
pub const VALUES_PER_AGENT: usize = 12;

/// Header values preceding an agent's subpoint run.
pub const AGENT_HEADER_LEN: usize = SP_INDEX;

/// Floats per subpoint.
pub const VALUES_PER_3D_POINT: usize = 3;

/// How the viewer draws an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VizType {
    /// Point agent drawn with its type geometry.
    Default,
    /// Polymer drawn through its subpoints.
    Fiber,
}

impl VizType {
    pub const DEFAULT_CODE: f64 = 1000.0;
    pub const FIBER_CODE: f64 = 1001.0;

    /// Value written into the buffer.
    pub fn code(self) -> f64 {
        match self {
            Self::Default => Self::DEFAULT_CODE,
            Self::Fiber => Self::FIBER_CODE,
        }
    }

    /// Parse a buffer value.
    pub fn from_code(code: f64) -> Option<Self> {
        if code == Self::DEFAULT_CODE {
            Some(Self::Default)
        } else if code == Self::FIBER_CODE {
            Some(Self::Fiber)
        } else {
            None
        }
    }
}

/// Stride descriptor written into `trajectoryInfo.bufferLayout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferLayout {
    pub values_per_agent: usize,
    pub viz_type_index: usize,
    pub uid_index: usize,
    pub type_id_index: usize,
    pub position_index: usize,
    pub rotation_index: usize,
    pub radius_index: usize,
    pub subpoint_count_index: usize,
    pub subpoint_index: usize,
}

impl BufferLayout {
    /// The layout this crate reads and writes.
    pub const V1: BufferLayout = BufferLayout {
        values_per_agent: VALUES_PER_AGENT,
        viz_type_index: VIZ_TYPE_INDEX,
        uid_index: UID_INDEX,
        type_id_index: TID_INDEX,
        position_index: POSX_INDEX,
        rotation_index: ROTX_INDEX,
        radius_index: R_INDEX,
        subpoint_count_index: NSP_INDEX,
        subpoint_index: SP_INDEX,
    };
}

impl Default for BufferLayout {
    fn default() -> Self {
        Self::V1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viz_type_codes() {
        assert_eq!(VizType::from_code(1000.0), Some(VizType::Default));
        assert_eq!(VizType::from_code(1001.0), Some(VizType::Fiber));
        assert_eq!(VizType::from_code(7.0), None);
        assert_eq!(VizType::Fiber.code(), 1001.0);
    }

    #[test]
    fn test_layout_json() {
        let json = serde_json::to_value(BufferLayout::V1).expect("serialize");
        assert_eq!(json["valuesPerAgent"], 12);
        assert_eq!(json["subpointCountIndex"], 10);
        assert_eq!(AGENT_HEADER_LEN, VALUES_PER_AGENT - 1);
    }
}
