use std::fmt;
use std::str::FromStr;
use crate::models::{LinePathType, NodeCategory, NodeType};

const STATION_PREFIX: &str = "station-";
const MISC_NODE_PREFIX: &str = "misc-node-";
const LINE_PREFIX: &str = "line-";

/// Active tool of the editor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Rubber-band selection
    Select,
    /// Pick, drag and pan
    #[default]
    Free,
    /// Place a station of the given type
    Station(NodeType),
    /// Place a misc node of the given type
    MiscNode(NodeType),
    /// Draw a line of the given path type
    Line(LinePathType),
}

impl Mode {
    /// Placement tool for `node_type`, picking the station or misc-node flavour
    #[must_use]
    pub fn place(node_type: NodeType) -> Self {
        match node_type.category() {
            Some(NodeCategory::MiscNode) => Mode::MiscNode(node_type),
            _ => Mode::Station(node_type),
        }
    }

    /// Whether this mode creates something on pointer down
    #[must_use]
    pub fn is_tool(&self) -> bool {
        matches!(self, Mode::Station(_) | Mode::MiscNode(_) | Mode::Line(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Select => f.write_str("select"),
            Mode::Free => f.write_str("free"),
            Mode::Station(t) => write!(f, "{STATION_PREFIX}{t}"),
            Mode::MiscNode(t) => write!(f, "{MISC_NODE_PREFIX}{t}"),
            Mode::Line(t) => write!(f, "{LINE_PREFIX}{t}"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tagged = |rest: &str| {
            if rest.is_empty() {
                Err(format!("Mode '{s}' is missing its type"))
            } else {
                Ok(rest.to_string())
            }
        };

        match s {
            "select" => Ok(Mode::Select),
            "free" => Ok(Mode::Free),
            _ => {
                if let Some(rest) = s.strip_prefix(STATION_PREFIX) {
                    Ok(Mode::Station(NodeType::from(tagged(rest)?)))
                } else if let Some(rest) = s.strip_prefix(MISC_NODE_PREFIX) {
                    Ok(Mode::MiscNode(NodeType::from(tagged(rest)?)))
                } else if let Some(rest) = s.strip_prefix(LINE_PREFIX) {
                    Ok(Mode::Line(LinePathType::from(tagged(rest)?)))
                } else {
                    Err(format!("Unknown mode '{s}'"))
                }
            }
        }
    }
}
