// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Units attached to time and spatial values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SI prefixes recognized by [`UnitData::compact`], largest first.
const SI_PREFIXES: &[(&str, f64)] = &[
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("", 1.0),
    ("m", 1e-3),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
];

/// Base symbols that can carry an SI prefix.
const BASE_UNITS: &[&str] = &["m", "s"];

/// A multiplier and unit name for a family of values.
///
/// `UnitData { magnitude: 10.0, name: "nm" }` means a stored value of `1.0`
/// is ten nanometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitData {
    pub magnitude: f64,
    pub name: String,
}

impl UnitData {
    /// Create a unit with an explicit magnitude.
    pub fn new(name: impl Into<String>, magnitude: f64) -> Self {
        Self {
            magnitude,
            name: name.into(),
        }
    }

    /// Create a whole unit (magnitude 1).
    pub fn unit(name: impl Into<String>) -> Self {
        Self::new(name, 1.0)
    }

    /// Default time units (seconds).
    pub fn seconds() -> Self {
        Self::unit("s")
    }

    /// Default spatial units (meters).
    pub fn meters() -> Self {
        Self::unit("m")
    }

    /// Return a copy with the magnitude scaled; the name is unchanged.
    #[must_use]
    pub fn multiply(&self, multiplier: f64) -> Self {
        Self {
            magnitude: self.magnitude * multiplier,
            name: self.name.clone(),
        }
    }

    /// Re-express the quantity with the SI prefix that brings the magnitude
    /// into `[1, 1000)`, clamped to 4 significant figures.
    ///
    /// Names that are not a (prefixed) `m` or `s` are returned unchanged.
    #[must_use]
    pub fn compact(&self) -> Self {
        let Some((base, factor)) = split_prefixed(&self.name) else {
            return self.clone();
        };
        let value = self.magnitude * factor;
        if value == 0.0 || !value.is_finite() {
            return self.clone();
        }

        let (prefix, prefix_factor) = SI_PREFIXES
            .iter()
            .find(|(_, f)| value.abs() / f >= 1.0 - 1e-9)
            .copied()
            .unwrap_or(SI_PREFIXES[SI_PREFIXES.len() - 1]);

        Self {
            magnitude: clamp_precision(value / prefix_factor),
            name: format!("{prefix}{base}"),
        }
    }

    /// Whether the magnitude is (numerically) one.
    pub fn is_whole(&self) -> bool {
        (self.magnitude - 1.0).abs() <= f64::EPSILON
    }
}

impl fmt::Display for UnitData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.magnitude, self.name)
        }
    }
}

/// Split a unit symbol into its base and the prefix factor.
fn split_prefixed(name: &str) -> Option<(&'static str, f64)> {
    for base in BASE_UNITS {
        let Some(prefix) = name.strip_suffix(base) else {
            continue;
        };
        let prefix = if prefix == "u" { "µ" } else { prefix };
        if let Some((_, factor)) = SI_PREFIXES.iter().find(|(p, _)| *p == prefix) {
            return Some((base, *factor));
        }
    }
    None
}

/// Round to 4 significant figures.
pub(crate) fn clamp_precision(value: f64) -> f64 {
    format!("{value:.3e}").parse().unwrap_or(value)
}
