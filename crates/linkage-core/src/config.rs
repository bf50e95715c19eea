//! Configuration for linkage-core
//!
//! Declares the brush groups and brushes a linked group starts with, plus the
//! pointer lens, hover and exit defaults. Loaded from TOML:
//!
//! ```toml
//! exit = "restyle"
//!
//! [lens]
//! radius = 25.0
//!
//! [hover]
//! mode = "neighborhood"
//! max_distance = 40.0
//!
//! [[groups]]
//! name = "scatter"
//! mode = "replace"
//!
//! [[brushes]]
//! id = "xy"
//! kind = "rectangle"
//! group = "scatter"
//!
//! [[brushes]]
//! id = "lens"
//! kind = "radius"
//! links = true
//! group = "scatter"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::brush::{BrushId, BrushKind};
use crate::coordinator::CombineMode;
use crate::error::{ConfigError, ConfigResult};
use crate::reconcile::ExitPolicy;

/// Configuration for one linked group of views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Pointer lens settings
    pub lens: LensConfig,
    /// Hover picking settings
    pub hover: HoverConfig,
    /// Exit treatment for views registered without an explicit policy
    pub exit: ExitPolicy,
    /// Brush groups to define
    pub groups: Vec<GroupConfig>,
    /// Brushes to register
    pub brushes: Vec<BrushConfig>,
}

/// Pointer lens configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Lens radius in domain units
    pub radius: f64,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self { radius: 25.0 }
    }
}

/// What hovering an entity selects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverMode {
    /// Only the picked entity
    #[default]
    Nearest,
    /// The picked entity and its graph neighbors
    Neighborhood,
}

/// Hover picking configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub mode: HoverMode,
    /// Farthest distance, in domain units, at which a hover still picks
    pub max_distance: Option<f64>,
}

/// A brush group declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default = "default_group_mode")]
    pub mode: CombineMode,
}

fn default_group_mode() -> CombineMode {
    CombineMode::Replace
}

/// Brush shape as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushShape {
    Rectangle,
    Radius,
    Interval,
    None,
}

/// A brush declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    pub id: String,
    pub kind: BrushShape,
    /// Numeric field, required for interval brushes
    #[serde(default)]
    pub field: Option<String>,
    /// Radius brushes only: also select links touching lensed nodes
    #[serde(default)]
    pub links: bool,
    pub group: String,
}

impl BrushConfig {
    /// Brush id
    pub fn brush_id(&self) -> BrushId {
        BrushId::new(self.id.clone())
    }

    /// Resolve the declared shape into a brush kind
    pub fn brush_kind(&self) -> ConfigResult<BrushKind> {
        if self.links && self.kind != BrushShape::Radius {
            return Err(ConfigError::InvalidValue {
                key: format!("brushes.{}.links", self.id),
                message: "only radius brushes select links".to_string(),
            });
        }
        match (self.kind, &self.field) {
            (BrushShape::Rectangle, _) => Ok(BrushKind::Rectangle),
            (BrushShape::Radius, _) => Ok(BrushKind::Radius { links: self.links }),
            (BrushShape::None, _) => Ok(BrushKind::None),
            (BrushShape::Interval, Some(field)) if !field.is_empty() => Ok(BrushKind::Interval {
                field: field.clone(),
            }),
            (BrushShape::Interval, _) => Err(ConfigError::InvalidValue {
                key: format!("brushes.{}.field", self.id),
                message: "interval brushes need a numeric field".to_string(),
            }),
        }
    }
}

impl LinkConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.lens.radius > 0.0) {
            return Err(invalid("lens.radius", "must be positive"));
        }

        if let Some(max) = self.hover.max_distance {
            if !(max > 0.0) {
                return Err(invalid("hover.max_distance", "must be positive"));
            }
        }

        let mut names = HashSet::new();
        for group in &self.groups {
            if !names.insert(group.name.as_str()) {
                return Err(invalid(
                    "groups",
                    &format!("group '{}' is declared twice", group.name),
                ));
            }
        }

        let mut brushes = HashSet::new();
        for brush in &self.brushes {
            if !names.contains(brush.group.as_str()) {
                return Err(invalid(
                    &format!("brushes.{}.group", brush.id),
                    &format!("undefined group '{}'", brush.group),
                ));
            }
            if !brushes.insert(brush.id.as_str()) {
                return Err(invalid(
                    "brushes",
                    &format!("brush '{}' is declared twice", brush.id),
                ));
            }
            brush.brush_kind()?;
        }

        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
exit = "remove"

[lens]
radius = 40.0

[hover]
mode = "neighborhood"
max_distance = 12.5

[[groups]]
name = "scatter"
mode = "and"

[[groups]]
name = "hist"

[[brushes]]
id = "bill"
kind = "rectangle"
group = "scatter"

[[brushes]]
id = "flipper"
kind = "rectangle"
group = "scatter"

[[brushes]]
id = "rating"
kind = "interval"
field = "rating"
group = "hist"
"#;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.lens.radius, 25.0);
        assert_eq!(config.hover.mode, HoverMode::Nearest);
        assert_eq!(config.exit, ExitPolicy::Restyle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(LinkConfig::from_toml_str("").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_parse_sample() {
        let config = LinkConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.exit, ExitPolicy::Remove);
        assert_eq!(config.lens.radius, 40.0);
        assert_eq!(config.hover.mode, HoverMode::Neighborhood);
        assert_eq!(config.hover.max_distance, Some(12.5));
        assert_eq!(config.groups[0].mode, CombineMode::And);
        assert_eq!(config.groups[1].mode, CombineMode::Replace);
        assert_eq!(
            config.brushes[2].brush_kind().unwrap(),
            BrushKind::Interval {
                field: "rating".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let err = LinkConfig::from_toml_str("[lens]\nradius = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "lens.radius"));
    }

    #[test]
    fn test_rejects_interval_without_field() {
        let toml = r#"
[[groups]]
name = "g"

[[brushes]]
id = "h"
kind = "interval"
group = "g"
"#;
        assert!(matches!(
            LinkConfig::from_toml_str(toml),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_links_flag() {
        let toml = r#"
[[groups]]
name = "g"

[[brushes]]
id = "lens"
kind = "radius"
links = true
group = "g"
"#;
        let config = LinkConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.brushes[0].brush_kind().unwrap(),
            BrushKind::Radius { links: true }
        );

        let bad = toml.replace("radius", "rectangle");
        let err = LinkConfig::from_toml_str(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "brushes.lens.links"));
    }

    #[test]
    fn test_rejects_undefined_group() {
        let toml = r#"
[[brushes]]
id = "b"
kind = "rectangle"
group = "nowhere"
"#;
        let err = LinkConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let toml = r#"
[[groups]]
name = "g"

[[brushes]]
id = "b"
kind = "lasso"
group = "g"
"#;
        assert!(matches!(
            LinkConfig::from_toml_str(toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = LinkConfig::load(file.path()).unwrap();
        assert_eq!(config.brushes.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LinkConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
