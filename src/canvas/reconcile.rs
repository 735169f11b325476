//! Reconciliation of lines sharing a reconcile id into single chains.
//!
//! A group qualifies when it is one simple directed chain with a uniform path
//! type and style. Anything else (branches, cycles, mixed styles, gaps) sends the
//! whole group to the dangling set; a group is never split into a partial chain.

use std::collections::HashMap;
use std::sync::OnceLock;
use indexmap::IndexMap;
use regex::Regex;
use crate::logging::log_warn;
use crate::models::MetroGraph;

/// Result of grouping the line set by reconcile id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Qualifying groups, each in chain order from source to sink
    pub chains: Vec<Vec<String>>,
    /// Lines of groups that failed to form a chain
    pub dangling: Vec<String>,
    /// Lines without a reconcile id, or alone in their group
    pub standalone: Vec<String>,
}

struct GroupMember<'a> {
    id: &'a str,
    source: &'a str,
    target: &'a str,
}

/// Partition every line into chains, dangling groups and standalone lines
#[must_use]
pub fn reconcile(graph: &MetroGraph) -> Reconciliation {
    let mut result = Reconciliation::default();
    let mut groups: IndexMap<&str, Vec<GroupMember>> = IndexMap::new();

    // line keys are in insertion order, so groups keep their first appearance
    for line_id in graph.line_keys() {
        let Some(index) = graph.line_index(line_id) else { continue };
        let (Some((source, target)), Some(entry)) = (graph.graph.edge_endpoints(index), graph.graph.edge_weight(index))
        else {
            continue;
        };
        let (Some(source), Some(target)) = (graph.graph.node_weight(source), graph.graph.node_weight(target)) else {
            continue;
        };
        let reconcile_id = entry.attributes.reconcile_id.as_str();
        if reconcile_id.is_empty() {
            result.standalone.push(line_id.to_string());
            continue;
        }
        groups.entry(reconcile_id).or_default().push(GroupMember {
            id: line_id,
            source: source.id.as_str(),
            target: target.id.as_str(),
        });
    }

    for (reconcile_id, members) in groups {
        if members.len() == 1 {
            result.standalone.extend(members.iter().map(|m| m.id.to_string()));
            continue;
        }
        if let Some(chain) = chain_order(graph, &members) {
            result.chains.push(chain);
        } else {
            log_warn!("Reconcile group {} does not form a single chain", reconcile_id);
            result.dangling.extend(members.iter().map(|m| m.id.to_string()));
        }
    }

    result
}

/// Chain order of a group, or `None` if it is not one uniform simple chain
fn chain_order(graph: &MetroGraph, members: &[GroupMember]) -> Option<Vec<String>> {
    let first = members.first()?;
    let first_attrs = graph.line_index(first.id).and_then(|i| graph.graph.edge_weight(i))?;
    let uniform = members.iter().all(|member| {
        graph
            .line_index(member.id)
            .and_then(|i| graph.graph.edge_weight(i))
            .is_some_and(|entry| {
                entry.attributes.path_type == first_attrs.attributes.path_type
                    && entry.attributes.style == first_attrs.attributes.style
            })
    });
    if !uniform {
        return None;
    }

    let mut out_degree: IndexMap<&str, usize> = IndexMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut successors: HashMap<&str, Vec<&GroupMember>> = HashMap::new();
    for member in members {
        *out_degree.entry(member.source).or_default() += 1;
        out_degree.entry(member.target).or_default();
        *in_degree.entry(member.target).or_default() += 1;
        successors.entry(member.source).or_default().push(member);
    }

    let degree = |node: &str| (out_degree.get(node).copied().unwrap_or(0), in_degree.get(node).copied().unwrap_or(0));
    let sources: Vec<&str> = out_degree.keys().copied().filter(|n| degree(n) == (1, 0)).collect();
    let sinks: Vec<&str> = out_degree.keys().copied().filter(|n| degree(n) == (0, 1)).collect();
    let ([source], [sink]) = (sources.as_slice(), sinks.as_slice()) else {
        return None;
    };
    if source == sink {
        return None;
    }

    let mut chain = Vec::with_capacity(members.len());
    let mut current = *source;
    while chain.len() < members.len() {
        let [next] = successors.get(current)?.as_slice() else {
            return None;
        };
        chain.push(next.id.to_string());
        current = next.target;
    }

    (current == *sink).then_some(chain)
}

fn moveto_prefix() -> Option<&'static Regex> {
    static MOVETO: OnceLock<Option<Regex>> = OnceLock::new();
    MOVETO
        .get_or_init(|| Regex::new(r"^\s*M\s*-?[\d.]+(?:e-?\d+)?[\s,]+-?[\d.]+(?:e-?\d+)?\s*").ok())
        .as_ref()
}

/// Join chain member paths into one directive
///
/// The leading `M x y` of every path but the first is dropped, so the pen
/// continues from where the previous segment ended.
#[must_use]
pub fn stitch_paths(paths: &[String]) -> String {
    let mut stitched = String::new();
    for (i, path) in paths.iter().enumerate() {
        if i == 0 {
            stitched.push_str(path);
            continue;
        }
        let rest = moveto_prefix().map_or(path.as_str(), |re| match re.find(path) {
            Some(m) => &path[m.end()..],
            None => path.as_str(),
        });
        stitched.push(' ');
        stitched.push_str(rest);
    }
    stitched
}
