// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion configuration

use crate::error::Result;
use crate::filter::{Filter, FilterSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What to do to a trajectory between loading and writing it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Filters, applied in order
    pub filters: Vec<FilterSpec>,

    /// Reject output whose agent IDs overflow 32 bits or repeat within a frame
    pub validate_ids: bool,

    /// Attach a per-type agent count plot
    pub number_of_agents_plot: bool,
}

impl ConvertConfig {
    /// Create a new config builder
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder::default()
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Instantiate the configured filter chain
    pub fn build_filters(&self) -> Result<Vec<Box<dyn Filter>>> {
        self.filters.iter().map(FilterSpec::build).collect()
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct ConvertConfigBuilder {
    filters: Vec<FilterSpec>,
    validate_ids: Option<bool>,
    number_of_agents_plot: Option<bool>,
}

impl ConvertConfigBuilder {
    /// Append a filter to the chain
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filters.push(spec);
        self
    }

    /// Check agent IDs before writing (default: false)
    pub fn validate_ids(mut self, enabled: bool) -> Self {
        self.validate_ids = Some(enabled);
        self
    }

    /// Add the agent count plot (default: false)
    pub fn number_of_agents_plot(mut self, enabled: bool) -> Self {
        self.number_of_agents_plot = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConvertConfig {
        let defaults = ConvertConfig::default();

        ConvertConfig {
            filters: self.filters,
            validate_ids: self.validate_ids.unwrap_or(defaults.validate_ids),
            number_of_agents_plot: self
                .number_of_agents_plot
                .unwrap_or(defaults.number_of_agents_plot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::builder()
            .filter(FilterSpec::EveryNthTimestep { n: 4 })
            .filter(FilterSpec::MultiplySpace { multiplier: 0.1 })
            .validate_ids(true)
            .build();

        assert_eq!(config.filters.len(), 2);
        assert!(config.validate_ids);
        assert!(!config.number_of_agents_plot);
        assert_eq!(config.build_filters().expect("valid filters").len(), 2);
    }

    #[test]
    fn test_config_defaults() {
        let config = ConvertConfig::default();
        assert!(config.filters.is_empty());
        assert!(!config.validate_ids);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "filters": [
                    {{"filter": "multiply_time", "multiplier": 1e-6, "apply_to_plots": true}},
                    {{"filter": "translate", "default_translation": [1.0, 0.0, 0.0]}}
                ],
                "number_of_agents_plot": true
            }}"#
        )
        .expect("write config");

        let config = ConvertConfig::from_file(file.path()).expect("load config");
        assert!(config.number_of_agents_plot);
        assert!(!config.validate_ids);
        assert_eq!(
            config.filters[0],
            FilterSpec::MultiplyTime {
                multiplier: 1e-6,
                apply_to_plots: true
            }
        );
    }

    #[test]
    fn test_invalid_filter_fails_to_build() {
        let config = ConvertConfig::builder()
            .filter(FilterSpec::TransformSpatialAxes {
                axes_mapping: vec!["+X".into(), "+X".into(), "+Z".into()],
            })
            .build();
        assert!(config.build_filters().is_err());
    }
}
