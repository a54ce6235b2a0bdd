use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::EntityKind;

/// Summary of FK graph structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FkGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for FK dependency ordering between entity kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphReport {
    pub summary: FkGraphSummary,
    pub topo_order: Option<Vec<EntityKind>>,
    pub cycle: Option<Vec<EntityKind>>,
}

/// Build a deterministic FK dependency report for the given kinds.
///
/// Referenced kinds always precede the kinds referencing them. Ties are broken
/// by declaration order.
pub fn build_fk_graph_report(kinds: &[EntityKind]) -> FkGraphReport {
    let graph = build_adjacency(kinds);
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = FkGraphSummary { nodes, edges };

    match toposort(&graph) {
        Ok(order) => FkGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => FkGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Generation order for every entity kind: referents before referrers.
pub fn dependency_order() -> Result<Vec<EntityKind>> {
    let report = build_fk_graph_report(&EntityKind::ALL);
    match (report.topo_order, report.cycle) {
        (Some(order), _) => Ok(order),
        (None, cycle) => Err(Error::Cycle(cycle.unwrap_or_default())),
    }
}

fn build_adjacency(kinds: &[EntityKind]) -> BTreeMap<EntityKind, BTreeSet<EntityKind>> {
    let mut graph: BTreeMap<EntityKind, BTreeSet<EntityKind>> = BTreeMap::new();

    for kind in kinds {
        graph.entry(*kind).or_default();
        for fk in kind.foreign_keys() {
            graph.entry(fk.referenced).or_default().insert(*kind);
        }
    }

    graph
}

fn toposort(
    graph: &BTreeMap<EntityKind, BTreeSet<EntityKind>>,
) -> std::result::Result<Vec<EntityKind>, Vec<EntityKind>> {
    let mut indegree: BTreeMap<EntityKind, usize> =
        graph.keys().map(|node| (*node, 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<EntityKind> = indegree
        .iter()
        .filter_map(|(node, count)| if *count == 0 { Some(*node) } else { None })
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle_nodes)
    }
}
