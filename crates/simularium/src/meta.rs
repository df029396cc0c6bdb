// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scene metadata: bounding box, camera framing and per-type display hints.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};

/// A 3D vector of floats (position, rotation, size, ...).
pub type Vec3 = [f64; 3];

/// Default bounding box edge length.
pub const DEFAULT_BOX_SIZE: Vec3 = [100.0, 100.0, 100.0];

/// Camera framing the viewer starts with and resets to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    pub position: Vec3,
    pub look_at_position: Vec3,
    pub up_vector: Vec3,
    pub fov_degrees: f64,
}

impl CameraData {
    /// Camera used when a converter supplies none.
    pub const DEFAULT: CameraData = CameraData {
        position: [0.0, 0.0, 120.0],
        look_at_position: [0.0, 0.0, 0.0],
        up_vector: [0.0, 1.0, 0.0],
        fov_degrees: 75.0,
    };
}

impl Default for CameraData {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Coordinate frame and default framing for one trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaData {
    /// XYZ extent of the simulation volume.
    pub box_size: Vec3,

    /// Initial camera settings.
    pub camera_defaults: CameraData,

    /// Uniform multiplier format converters applied to spatial values at load
    /// time. Filters never change it.
    pub scale_factor: f64,

    /// Optional title for this run of the model.
    pub trajectory_title: String,
}

impl Default for MetaData {
    fn default() -> Self {
        Self {
            box_size: DEFAULT_BOX_SIZE,
            camera_defaults: CameraData::DEFAULT,
            scale_factor: 1.0,
            trajectory_title: String::new(),
        }
    }
}

impl MetaData {
    /// Metadata with the given box size and defaults for everything else.
    pub fn with_box_size(box_size: Vec3) -> Self {
        Self {
            box_size,
            ..Default::default()
        }
    }
}

/// Geometry used to draw agents of a type.
///
/// Values are part of the file format; changing them requires a version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayType {
    Sphere,
    Pdb,
    Obj,
    Fiber,
}

/// Per-type display overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<DisplayType>,

    /// Local path or web URL of the geometry file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Hex color, `#rgb` or `#rrggbb`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DisplayData {
    /// Create display data, validating the color format.
    pub fn new(
        display_type: Option<DisplayType>,
        url: Option<String>,
        color: Option<String>,
    ) -> Result<Self> {
        if let Some(color) = &color {
            let valid_len = color.len() == 4 || color.len() == 7;
            let hex = color
                .strip_prefix('#')
                .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()));
            if !valid_len || !hex {
                return Err(ConversionError::data(format!(
                    "{color} should be provided as '#xxxxxx'"
                )));
            }
        }
        Ok(Self {
            display_type,
            url,
            color,
        })
    }

    /// Only default values: nothing to write into the type mapping.
    pub fn is_default(&self) -> bool {
        self.display_type.is_none()
            && self.url.as_deref().map_or(true, str::is_empty)
            && self.color.as_deref().map_or(true, str::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_defaults() {
        let meta = MetaData::default();
        assert_eq!(meta.box_size, DEFAULT_BOX_SIZE);
        assert_eq!(meta.camera_defaults, CameraData::DEFAULT);
        assert_eq!(meta.scale_factor, 1.0);
        assert!(meta.trajectory_title.is_empty());
    }

    #[test]
    fn test_display_data_color_validation() {
        assert!(DisplayData::new(None, None, Some("#fff".into())).is_ok());
        assert!(DisplayData::new(None, None, Some("#00ff00".into())).is_ok());
        assert!(DisplayData::new(None, None, Some("00ff00".into())).is_err());
        assert!(DisplayData::new(None, None, Some("#00ff0".into())).is_err());
        assert!(DisplayData::new(None, None, Some("#gggggg".into())).is_err());
    }

    #[test]
    fn test_display_data_is_default() {
        assert!(DisplayData::default().is_default());
        let fiber = DisplayData::new(Some(DisplayType::Fiber), None, None).expect("valid");
        assert!(!fiber.is_default());
    }

    #[test]
    fn test_display_type_serialization() {
        let json = serde_json::to_string(&DisplayType::Fiber).expect("serialize");
        assert_eq!(json, "\"FIBER\"");
    }
}
