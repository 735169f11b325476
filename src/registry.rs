//! Capability bundles looked up by type tag.
//!
//! The view layer owns the actual renderers; the core only needs defaults, the
//! geometry generator and a couple of flags per tag. Unknown tags resolve to
//! explicit fallback bundles instead of failing.

use serde_json::{json, Value};
use crate::canvas::paths::{self, PathGenerator};
use crate::models::{LinePathType, LineStyleType, NodeCategory, NodeType};

/// What the core knows about a node type
#[derive(Clone, Copy)]
pub struct NodeBundle {
    pub category: Option<NodeCategory>,
    pub display_name: &'static str,
    default_payload: fn() -> Value,
}

impl NodeBundle {
    #[must_use]
    pub fn default_payload(&self) -> Value {
        (self.default_payload)()
    }
}

/// What the core knows about a path type
#[derive(Clone, Copy)]
pub struct PathBundle {
    pub generator: PathGenerator,
    pub parallel_aware: bool,
    pub is_fallback: bool,
    default_payload: fn() -> Value,
}

impl PathBundle {
    #[must_use]
    pub fn default_payload(&self) -> Value {
        (self.default_payload)()
    }
}

/// What the core knows about a line style
#[derive(Clone, Copy)]
pub struct StyleBundle {
    pub display_name: &'static str,
    pub is_fallback: bool,
    default_payload: fn() -> Value,
}

impl StyleBundle {
    #[must_use]
    pub fn default_payload(&self) -> Value {
        (self.default_payload)()
    }
}

fn station_names() -> Value {
    json!({ "names": ["车站", "Stn"], "nameOffsetX": "right", "nameOffsetY": "top" })
}

fn interchange_station() -> Value {
    json!({
        "names": ["车站", "Stn"],
        "nameOffsetX": "right",
        "nameOffsetY": "top",
        "transfer": [[]]
    })
}

fn numbered_station() -> Value {
    json!({
        "names": ["车站", "Stn"],
        "nameOffsetX": "right",
        "nameOffsetY": "top",
        "color": ["shanghai", "sh1", "#E4002B", "#fff"],
        "lineCode": "1",
        "stationCode": "01"
    })
}

fn line_badge() -> Value {
    json!({ "num": 1, "color": ["shanghai", "sh1", "#E4002B", "#fff"] })
}

fn text_payload() -> Value {
    json!({ "content": "Enter your text here", "fontSize": 16, "textAnchor": "middle", "color": ["shanghai", "sh1", "#000000", "#fff"] })
}

fn facilities_payload() -> Value {
    json!({ "type": "airport" })
}

fn empty_payload() -> Value {
    json!({})
}

fn two_leg_payload() -> Value {
    json!({ "startFrom": "from", "offsetFrom": 0, "offsetTo": 0, "roundCornerFactor": 10 })
}

fn simple_payload() -> Value {
    json!({ "offset": 0 })
}

fn single_color() -> Value {
    json!({ "color": ["shanghai", "sh1", "#E4002B", "#fff"] })
}

fn dual_color() -> Value {
    json!({
        "colorA": ["shanghai", "sh1", "#E4002B", "#fff"],
        "colorB": ["shanghai", "sh2", "#97D700", "#fff"]
    })
}

fn river_payload() -> Value {
    json!({ "color": ["shanghai", "sh1", "#B9E3F9", "#fff"], "width": 20 })
}

#[must_use]
pub fn node_bundle(node_type: &NodeType) -> NodeBundle {
    let (display_name, default_payload): (&'static str, fn() -> Value) = match node_type {
        NodeType::ShmetroBasic => ("Shanghai Metro basic station", station_names),
        NodeType::ShmetroBasic2020 => ("Shanghai Metro basic station (2020)", station_names),
        NodeType::ShmetroInt => ("Shanghai Metro interchange station", interchange_station),
        NodeType::GzmtrBasic => ("Guangzhou Metro basic station", numbered_station),
        NodeType::GzmtrInt => ("Guangzhou Metro interchange station", interchange_station),
        NodeType::BjsubwayBasic => ("Beijing Subway basic station", station_names),
        NodeType::BjsubwayInt => ("Beijing Subway interchange station", interchange_station),
        NodeType::Mtr => ("MTR station", interchange_station),
        NodeType::BerlinSBahn => ("Berlin S-Bahn station", station_names),
        NodeType::BerlinUBahn => ("Berlin U-Bahn station", station_names),
        NodeType::JrEastBasic => ("JR East basic station", numbered_station),
        NodeType::MrtBasic => ("MRT basic station", numbered_station),
        NodeType::Virtual => ("Virtual node", empty_payload),
        NodeType::Text => ("Text", text_payload),
        NodeType::ShmetroNumLineBadge
        | NodeType::GzmtrLineBadge
        | NodeType::BerlinSBahnLineBadge
        | NodeType::BerlinUBahnLineBadge
        | NodeType::MrtLineBadge
        | NodeType::JrEastLineBadge => ("Line badge", line_badge),
        NodeType::Facilities => ("Facilities", facilities_payload),
        NodeType::Other(_) => ("Unknown node type", empty_payload),
    };
    NodeBundle { category: node_type.category(), display_name, default_payload }
}

#[must_use]
pub fn path_bundle(path_type: &LinePathType) -> PathBundle {
    match path_type {
        LinePathType::Diagonal => PathBundle {
            generator: paths::generate_diagonal_path,
            parallel_aware: true,
            is_fallback: false,
            default_payload: two_leg_payload,
        },
        LinePathType::Perpendicular => PathBundle {
            generator: paths::generate_perpendicular_path,
            parallel_aware: true,
            is_fallback: false,
            default_payload: two_leg_payload,
        },
        LinePathType::RotatePerpendicular => PathBundle {
            generator: paths::generate_rotate_perpendicular_path,
            parallel_aware: true,
            is_fallback: false,
            default_payload: two_leg_payload,
        },
        LinePathType::Simple => PathBundle {
            generator: paths::generate_simple_path,
            parallel_aware: false,
            is_fallback: false,
            default_payload: simple_payload,
        },
        LinePathType::Other(_) => PathBundle {
            generator: paths::generate_straight_path,
            parallel_aware: false,
            is_fallback: true,
            default_payload: empty_payload,
        },
    }
}

#[must_use]
pub fn style_bundle(style: &LineStyleType) -> StyleBundle {
    let (display_name, default_payload): (&'static str, fn() -> Value) = match style {
        LineStyleType::SingleColor => ("Single color", single_color),
        LineStyleType::DualColor => ("Dual color", dual_color),
        LineStyleType::BjsubwayDotted => ("Beijing Subway dotted", single_color),
        LineStyleType::ShmetroVirtualInt => ("Shanghai Metro out-of-station interchange", empty_payload),
        LineStyleType::GzmtrVirtualInt => ("Guangzhou Metro out-of-station interchange", empty_payload),
        LineStyleType::MtrRaceDays => ("MTR race days", single_color),
        LineStyleType::River => ("River", river_payload),
        LineStyleType::JrEastSingleColor => ("JR East single color", single_color),
        LineStyleType::MrtUnderConstruction => ("MRT under construction", single_color),
        LineStyleType::Other(_) => {
            return StyleBundle {
                display_name: "Unknown style",
                is_fallback: true,
                default_payload: empty_payload,
            };
        }
    };
    StyleBundle { display_name, is_fallback: false, default_payload }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PathAttributes;

    #[test]
    fn test_every_known_node_type_has_a_category() {
        for node_type in NodeType::known() {
            let bundle = node_bundle(&node_type);
            assert!(bundle.category.is_some(), "{node_type} has no category");
            assert!(bundle.default_payload().is_object());
        }
    }

    #[test]
    fn test_unknown_tags_route_to_fallbacks() {
        let node = node_bundle(&NodeType::Other("x".to_string()));
        assert_eq!(node.category, None);
        assert_eq!(node.default_payload(), json!({}));

        let path = path_bundle(&LinePathType::Other("zigzag".to_string()));
        assert!(path.is_fallback);
        let generated = (path.generator)(0.0, 0.0, 10.0, 5.0, &PathAttributes::default());
        assert_eq!(generated, "M 0 0 L 10 5");

        assert!(style_bundle(&LineStyleType::Other("neon".to_string())).is_fallback);
    }

    #[test]
    fn test_parallel_awareness_matches_path_type() {
        for path_type in LinePathType::known() {
            assert_eq!(path_bundle(&path_type).parallel_aware, path_type.is_parallel_aware());
        }
    }

    #[test]
    fn test_two_leg_defaults_parse_as_path_attributes() {
        let parsed: PathAttributes =
            serde_json::from_value(path_bundle(&LinePathType::Diagonal).default_payload()).expect("parses");
        assert_eq!(parsed.round_corner_factor, 10.0);
        assert_eq!(parsed.offset_from, 0.0);
    }
}
