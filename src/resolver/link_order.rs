//! Link ordering.
//!
//! Static linkers resolve symbols left to right, so a library must appear
//! before every library it depends on. The order is a topological sort of
//! the component graph with ties broken by catalog declaration order, which
//! keeps the output stable across runs.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

use crate::resolver::errors::RecipeError;
use crate::resolver::graph::ComponentGraph;

/// Order present components dependents-first.
pub fn resolve_order(graph: &ComponentGraph) -> Result<Vec<&'static str>, RecipeError> {
    let g = graph.inner();

    // Remaining dependents per node; a node is ready once all have been emitted.
    let mut pending: HashMap<NodeIndex, usize> = g
        .node_indices()
        .map(|n| (n, g.neighbors_directed(n, Direction::Incoming).count()))
        .collect();

    let mut ready: BinaryHeap<Reverse<(usize, NodeIndex)>> = pending
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(&n, _)| Reverse((g[n].position, n)))
        .collect();

    let mut order = Vec::with_capacity(g.node_count());

    while let Some(Reverse((_, node))) = ready.pop() {
        order.push(g[node].component.name);

        for dep in g.neighbors_directed(node, Direction::Outgoing) {
            if let Some(count) = pending.get_mut(&dep) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse((g[dep].position, dep)));
                }
            }
        }
    }

    if order.len() != g.node_count() {
        let components = tarjan_scc(g)
            .into_iter()
            .find(|scc| scc.len() > 1 || scc.iter().any(|&n| g.contains_edge(n, n)))
            .map(|mut scc| {
                scc.sort_by_key(|&n| g[n].position);
                let mut names: Vec<String> =
                    scc.iter().map(|&n| g[n].component.name.to_string()).collect();
                if let Some(first) = names.first().cloned() {
                    names.push(first);
                }
                names
            })
            .unwrap_or_default();

        return Err(RecipeError::CyclicDependency { components });
    }

    Ok(order)
}

/// Library artifact names in link order.
pub fn link_libraries(graph: &ComponentGraph, order: &[&'static str]) -> Vec<&'static str> {
    order
        .iter()
        .filter_map(|name| graph.component(name))
        .flat_map(|c| c.libs.iter().copied())
        .collect()
}

/// System libraries in link order, each listed once, after its last user.
pub fn link_system_libraries(graph: &ComponentGraph, order: &[&'static str]) -> Vec<&'static str> {
    let mut libs: Vec<&'static str> = Vec::new();
    for name in order {
        for lib in graph.system_libs(name) {
            libs.retain(|l| l != lib);
            libs.push(lib);
        }
    }
    libs
}
