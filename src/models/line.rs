use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::type_tag::type_tags;
use crate::constants::{Z_INDEX_MAX, Z_INDEX_MIN};
use crate::registry;

type_tags! {
    /// Path-shape algorithm of a line
    pub enum LinePathType {
        Diagonal => "diagonal",
        Perpendicular => "perpendicular",
        RotatePerpendicular => "rotate-perpendicular",
        Simple => "simple",
    }
}

type_tags! {
    /// Rendering/colouring algorithm of a line
    pub enum LineStyleType {
        SingleColor => "single-color",
        DualColor => "dual-color",
        BjsubwayDotted => "bjsubway-dotted",
        ShmetroVirtualInt => "shmetro-virtual-int",
        GzmtrVirtualInt => "gzmtr-virtual-int",
        MtrRaceDays => "mtr-race-days",
        River => "river",
        JrEastSingleColor => "jreast-single-color",
        MrtUnderConstruction => "mrt-under-construction",
    }
}

impl LinePathType {
    /// Whether this path type takes part in parallel-offset resolution
    #[must_use]
    pub fn is_parallel_aware(&self) -> bool {
        matches!(
            self,
            LinePathType::Diagonal | LinePathType::Perpendicular | LinePathType::RotatePerpendicular
        )
    }
}

impl LineStyleType {
    /// Support matrix: may a line of this style use `path`?
    #[must_use]
    pub fn supports_path(&self, path: &LinePathType) -> bool {
        match self {
            LineStyleType::ShmetroVirtualInt | LineStyleType::GzmtrVirtualInt => {
                matches!(path, LinePathType::Simple)
            }
            LineStyleType::River | LineStyleType::MrtUnderConstruction => {
                !matches!(path, LinePathType::Simple)
            }
            LineStyleType::DualColor
            | LineStyleType::BjsubwayDotted
            | LineStyleType::MtrRaceDays
            | LineStyleType::JrEastSingleColor => path.is_parallel_aware(),
            LineStyleType::SingleColor | LineStyleType::Other(_) => true,
        }
    }

    /// First known path type this style supports
    #[must_use]
    pub fn first_supported_path(&self) -> LinePathType {
        LinePathType::known()
            .into_iter()
            .find(|path| self.supports_path(path))
            .unwrap_or(LinePathType::Simple)
    }
}

/// Which endpoint a two-leg path starts its first leg from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartFrom {
    #[default]
    From,
    To,
}

/// Geometry fields read by the path generators
///
/// Every path payload is parsed into this struct; fields a given type does not
/// use simply keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathAttributes {
    pub start_from: StartFrom,
    pub offset_from: f64,
    pub offset_to: f64,
    pub round_corner_factor: f64,
    pub offset: f64,
}

fn default_visible() -> bool {
    true
}

fn default_parallel_index() -> i32 {
    -1
}

/// Attributes stored on every line
///
/// One path payload keyed by `type` and one style payload keyed by `style`
/// are kept alongside the common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeAttributes {
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub z_index: i32,
    #[serde(rename = "type")]
    pub path_type: LinePathType,
    pub style: LineStyleType,
    #[serde(default = "default_parallel_index")]
    pub parallel_index: i32,
    #[serde(default)]
    pub reconcile_id: String,
    #[serde(flatten)]
    payloads: Map<String, Value>,
}

/// Outcome of a type or style change that may violate the support matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Applied,
    /// The other half of the (type, style) pair was reset to stay legal
    Reset,
    /// Not applied: the new value is incompatible and the change was not forced
    NeedsConfirmation,
}

impl EdgeAttributes {
    /// Attributes for a new line with default payloads, not parallel, standalone
    #[must_use]
    pub fn new(path_type: LinePathType, style: LineStyleType) -> Self {
        let mut attrs = Self {
            visible: true,
            z_index: 0,
            path_type,
            style,
            parallel_index: -1,
            reconcile_id: String::new(),
            payloads: Map::new(),
        };
        attrs.payloads.insert(
            attrs.path_type.as_str().to_string(),
            registry::path_bundle(&attrs.path_type).default_payload(),
        );
        attrs.payloads.insert(
            attrs.style.as_str().to_string(),
            registry::style_bundle(&attrs.style).default_payload(),
        );
        attrs
    }

    /// Set the z-index, clamped to the allowed range
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index.clamp(Z_INDEX_MIN, Z_INDEX_MAX);
    }

    #[must_use]
    pub fn path_payload(&self) -> Option<&Value> {
        self.payloads.get(self.path_type.as_str())
    }

    #[must_use]
    pub fn style_payload(&self) -> Option<&Value> {
        self.payloads.get(self.style.as_str())
    }

    /// Style payload parsed into `T`
    #[must_use]
    pub fn style_payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.style_payload().and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Geometry fields of the path payload; unparseable payloads read as defaults
    #[must_use]
    pub fn path_attributes(&self) -> PathAttributes {
        self.path_payload()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    pub fn set_path_payload(&mut self, payload: Value) {
        self.payloads.insert(self.path_type.as_str().to_string(), payload);
    }

    pub fn set_style_payload(&mut self, payload: Value) {
        self.payloads.insert(self.style.as_str().to_string(), payload);
    }

    /// Write `offsetFrom`/`offsetTo` into the path payload, keeping its other fields
    pub fn set_offsets(&mut self, offset_from: f64, offset_to: f64) {
        let tag = self.path_type.as_str().to_string();
        let entry = self.payloads.entry(tag).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(fields) = entry {
            fields.insert("offsetFrom".to_string(), Value::from(offset_from));
            fields.insert("offsetTo".to_string(), Value::from(offset_to));
        }
    }

    /// Change the path type, consulting the support matrix.
    ///
    /// An incompatible type is only applied when `force` is set, in which case
    /// the style is reset to `single-color`.
    pub fn change_path_type(&mut self, path_type: LinePathType, force: bool) -> LineChange {
        if path_type == self.path_type {
            return LineChange::Applied;
        }
        let compatible = self.style.supports_path(&path_type);
        if !compatible && !force {
            return LineChange::NeedsConfirmation;
        }

        self.payloads.remove(self.path_type.as_str());
        self.path_type = path_type;
        self.payloads.insert(
            self.path_type.as_str().to_string(),
            registry::path_bundle(&self.path_type).default_payload(),
        );

        if compatible {
            LineChange::Applied
        } else {
            self.replace_style(LineStyleType::SingleColor);
            LineChange::Reset
        }
    }

    /// Change the style, consulting the support matrix.
    ///
    /// An incompatible style is only applied when `force` is set, in which case
    /// the path type is reset to the first one the style supports.
    pub fn change_style(&mut self, style: LineStyleType, force: bool) -> LineChange {
        if style == self.style {
            return LineChange::Applied;
        }
        let compatible = style.supports_path(&self.path_type);
        if !compatible && !force {
            return LineChange::NeedsConfirmation;
        }

        self.replace_style(style);

        if compatible {
            LineChange::Applied
        } else {
            let path_type = self.style.first_supported_path();
            self.payloads.remove(self.path_type.as_str());
            self.path_type = path_type;
            self.payloads.insert(
                self.path_type.as_str().to_string(),
                registry::path_bundle(&self.path_type).default_payload(),
            );
            LineChange::Reset
        }
    }

    fn replace_style(&mut self, style: LineStyleType) {
        self.payloads.remove(self.style.as_str());
        self.style = style;
        self.payloads.insert(
            self.style.as_str().to_string(),
            registry::style_bundle(&self.style).default_payload(),
        );
    }

    /// Re-establish the invariants after deserialising or merging: clamped
    /// z-index and exactly the payloads for `type` and `style`.
    pub fn normalize(&mut self) {
        self.set_z_index(self.z_index);
        let path_tag = self.path_type.as_str().to_string();
        let style_tag = self.style.as_str().to_string();
        let path = self
            .payloads
            .remove(&path_tag)
            .unwrap_or_else(|| registry::path_bundle(&self.path_type).default_payload());
        let style = self
            .payloads
            .remove(&style_tag)
            .unwrap_or_else(|| registry::style_bundle(&self.style).default_payload());
        self.payloads.clear();
        self.payloads.insert(path_tag, path);
        self.payloads.insert(style_tag, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_line_defaults() {
        let attrs = EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor);
        assert!(attrs.visible);
        assert_eq!(attrs.parallel_index, -1);
        assert!(attrs.reconcile_id.is_empty());

        let value = serde_json::to_value(&attrs).expect("serializes");
        assert_eq!(value["type"], json!("diagonal"));
        assert_eq!(value["style"], json!("single-color"));
        assert!(value.get("diagonal").is_some());
        assert!(value.get("single-color").is_some());
    }

    #[test]
    fn test_path_attributes_read_camel_case() {
        let mut attrs = EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor);
        attrs.set_path_payload(json!({ "startFrom": "to", "offsetFrom": 5, "offsetTo": -5, "roundCornerFactor": 10 }));
        let path = attrs.path_attributes();
        assert_eq!(path.start_from, StartFrom::To);
        assert_eq!(path.offset_from, 5.0);
        assert_eq!(path.offset_to, -5.0);
        assert_eq!(path.round_corner_factor, 10.0);
    }

    #[test]
    fn test_set_offsets_keeps_other_fields() {
        let mut attrs = EdgeAttributes::new(LinePathType::Perpendicular, LineStyleType::SingleColor);
        attrs.set_path_payload(json!({ "startFrom": "to", "roundCornerFactor": 4 }));
        attrs.set_offsets(2.5, 2.5);
        let path = attrs.path_attributes();
        assert_eq!(path.start_from, StartFrom::To);
        assert_eq!(path.round_corner_factor, 4.0);
        assert_eq!(path.offset_from, 2.5);
    }

    #[test]
    fn test_support_matrix() {
        assert!(LineStyleType::SingleColor.supports_path(&LinePathType::Simple));
        assert!(LineStyleType::ShmetroVirtualInt.supports_path(&LinePathType::Simple));
        assert!(!LineStyleType::ShmetroVirtualInt.supports_path(&LinePathType::Diagonal));
        assert!(!LineStyleType::River.supports_path(&LinePathType::Simple));
        assert_eq!(LineStyleType::ShmetroVirtualInt.first_supported_path(), LinePathType::Simple);
        assert_eq!(LineStyleType::River.first_supported_path(), LinePathType::Diagonal);
    }

    #[test]
    fn test_incompatible_style_needs_confirmation() {
        let mut attrs = EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor);
        let outcome = attrs.change_style(LineStyleType::ShmetroVirtualInt, false);
        assert_eq!(outcome, LineChange::NeedsConfirmation);
        assert_eq!(attrs.style, LineStyleType::SingleColor);

        let outcome = attrs.change_style(LineStyleType::ShmetroVirtualInt, true);
        assert_eq!(outcome, LineChange::Reset);
        assert_eq!(attrs.style, LineStyleType::ShmetroVirtualInt);
        assert_eq!(attrs.path_type, LinePathType::Simple);

        let value = serde_json::to_value(&attrs).expect("serializes");
        assert!(value.get("diagonal").is_none());
        assert!(value.get("single-color").is_none());
        assert!(value.get("simple").is_some());
    }

    #[test]
    fn test_incompatible_type_resets_style_when_forced() {
        let mut attrs = EdgeAttributes::new(LinePathType::Simple, LineStyleType::ShmetroVirtualInt);
        assert_eq!(attrs.change_path_type(LinePathType::Diagonal, false), LineChange::NeedsConfirmation);
        assert_eq!(attrs.change_path_type(LinePathType::Diagonal, true), LineChange::Reset);
        assert_eq!(attrs.style, LineStyleType::SingleColor);

        assert_eq!(attrs.change_path_type(LinePathType::Perpendicular, false), LineChange::Applied);
        assert_eq!(attrs.path_type, LinePathType::Perpendicular);
    }

    #[test]
    fn test_normalize_restores_payloads() {
        let mut attrs: EdgeAttributes = serde_json::from_value(json!({
            "zIndex": -30,
            "type": "simple",
            "style": "single-color",
            "diagonal": {}
        }))
        .expect("valid line");
        attrs.normalize();
        assert_eq!(attrs.z_index, -10);
        assert_eq!(attrs.parallel_index, -1);
        assert!(attrs.path_payload().is_some());
        assert!(attrs.style_payload().is_some());
        let value = serde_json::to_value(&attrs).expect("serializes");
        assert!(value.get("diagonal").is_none());
    }
}
