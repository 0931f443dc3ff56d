//! Physical and meshing parameters shared by the generator recipes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PatchgenError, Result};

/// Parameters of one generation run.
///
/// Domain extents (`width`, `front`, `back`, `side`) are given in cylinder
/// radii; `height == 0` selects a 2D run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub diameter: f64,
    pub width: f64,
    pub front: f64,
    pub back: f64,
    pub side: f64,
    pub height: f64,
    pub reynolds: f64,
    pub grading: f64,
    pub nel_boundary_layer: usize,
    pub nel_circumference: usize,
    pub nel_height: usize,
    pub order: usize,
    pub out: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            diameter: 1.0,
            width: 20.0,
            front: 20.0,
            back: 40.0,
            side: 20.0,
            height: 0.0,
            reynolds: 100.0,
            grading: 1.05,
            nel_boundary_layer: 10,
            nel_circumference: 40,
            nel_height: 10,
            order: 4,
            out: "out".into(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PatchgenError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject parameter sets no recipe can build geometry from.
    pub fn validate(&self) -> Result<()> {
        positive("diameter", self.diameter)?;
        positive("width", self.width)?;
        positive("reynolds", self.reynolds)?;
        positive("grading", self.grading)?;

        for (name, value) in [("front", self.front), ("back", self.back), ("side", self.side)] {
            if !value.is_finite() || value < self.width {
                return Err(PatchgenError::config(
                    name,
                    format!("{value} is smaller than the domain half-width {}", self.width),
                ));
            }
        }
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(PatchgenError::config(
                "height",
                format!("{} must be zero (2D) or positive", self.height),
            ));
        }
        for (name, value) in [
            ("nel_boundary_layer", self.nel_boundary_layer),
            ("nel_circumference", self.nel_circumference),
            ("nel_height", self.nel_height),
        ] {
            if value == 0 {
                return Err(PatchgenError::config(name, "needs at least one element"));
            }
        }
        if self.order < 2 {
            return Err(PatchgenError::config(
                "order",
                format!("{} is below linear order", self.order),
            ));
        }
        if self.out.trim().is_empty() {
            return Err(PatchgenError::config("out", "output base name is empty"));
        }
        Ok(())
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Half-width of the near-body box in physical units.
    pub fn half_width(&self) -> f64 {
        self.width * self.radius()
    }

    /// Boundary layer thickness estimate `D / sqrt(Re)`.
    pub fn boundary_layer_thickness(&self) -> f64 {
        self.diameter / self.reynolds.sqrt()
    }

    pub fn dimension(&self) -> usize {
        if self.height == 0.0 {
            2
        } else {
            3
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PatchgenError::config(name, format!("{value} must be positive")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = GeneratorConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.dimension(), 2);
        assert!((cfg.boundary_layer_thickness() - 0.1).abs() < 1e-12);
        assert!((cfg.half_width() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let cfg =
            GeneratorConfig::from_json_str(r#"{ "reynolds": 400.0, "height": 2.0 }"#).unwrap();
        assert_eq!(cfg.reynolds, 400.0);
        assert_eq!(cfg.dimension(), 3);
        assert_eq!(cfg.order, 4);
        assert_eq!(cfg.out, "out");
    }

    #[test]
    fn test_front_smaller_than_width_rejected() {
        let cfg = GeneratorConfig {
            front: 10.0,
            ..Default::default()
        };
        match cfg.validate() {
            Err(PatchgenError::Configuration { parameter, .. }) => assert_eq!(parameter, "front"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_diameter_rejected() {
        let cfg = GeneratorConfig {
            diameter: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PatchgenError::Configuration { parameter: "diameter", .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            GeneratorConfig::from_json_str("{ diameter: "),
            Err(PatchgenError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "order": 3, "out": "cyl" }"#).unwrap();
        let cfg = GeneratorConfig::from_path(&path).unwrap();
        assert_eq!(cfg.order, 3);
        assert_eq!(cfg.out, "cyl");
    }
}
