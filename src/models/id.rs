/// ID generation utilities
///
/// Every node and line id carries a namespace prefix that determines what kind
/// of entity it names:
/// - `stn_` for stations
/// - `misc_node_` for misc nodes (badges, text, virtual markers)
/// - `line_` for lines
use crate::constants::{LINE_ID_PREFIX, MISC_NODE_ID_PREFIX, STATION_ID_PREFIX};
use super::node::NodeCategory;

/// Random suffix shared by all generated ids
fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(10);
    suffix
}

/// Generate a new station id (`stn_…`)
#[must_use]
pub fn generate_station_id() -> String {
    format!("{STATION_ID_PREFIX}{}", random_suffix())
}

/// Generate a new misc node id (`misc_node_…`)
#[must_use]
pub fn generate_misc_node_id() -> String {
    format!("{MISC_NODE_ID_PREFIX}{}", random_suffix())
}

/// Generate a new line id (`line_…`)
#[must_use]
pub fn generate_line_id() -> String {
    format!("{LINE_ID_PREFIX}{}", random_suffix())
}

/// Generate a reconcile group id for a copied chain
#[must_use]
pub fn generate_reconcile_id() -> String {
    random_suffix()
}

/// Generate a node id in the namespace of `category`
#[must_use]
pub fn generate_node_id(category: NodeCategory) -> String {
    match category {
        NodeCategory::Station => generate_station_id(),
        NodeCategory::MiscNode => generate_misc_node_id(),
    }
}

/// Category implied by a node id's prefix, `None` if it carries no node prefix
#[must_use]
pub fn node_category_of(id: &str) -> Option<NodeCategory> {
    if id.starts_with(STATION_ID_PREFIX) {
        Some(NodeCategory::Station)
    } else if id.starts_with(MISC_NODE_ID_PREFIX) {
        Some(NodeCategory::MiscNode)
    } else {
        None
    }
}

#[must_use]
pub fn is_line_id(id: &str) -> bool {
    id.starts_with(LINE_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_carry_prefix() {
        assert!(generate_station_id().starts_with("stn_"));
        assert!(generate_misc_node_id().starts_with("misc_node_"));
        assert!(generate_line_id().starts_with("line_"));
        assert_eq!(generate_station_id().len(), "stn_".len() + 10);
    }

    #[test]
    fn test_generate_many_unique_ids() {
        let mut ids = HashSet::new();
        let count = 10_000;

        for _ in 0..count {
            ids.insert(generate_line_id());
        }

        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_node_category_of() {
        assert_eq!(node_category_of("stn_abc"), Some(NodeCategory::Station));
        assert_eq!(node_category_of("misc_node_abc"), Some(NodeCategory::MiscNode));
        assert_eq!(node_category_of("line_abc"), None);
        assert!(is_line_id("line_abc"));
        assert!(!is_line_id("stn_abc"));
    }
}
