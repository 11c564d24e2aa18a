//! The component graph.
//!
//! Built once from the catalog and the effective options, then read-only.
//! Edges point from a dependent to its dependency, so `a -> b` means
//! "`a` links against `b`".

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::component::{Catalog, Component};
use crate::core::options::OptionSet;
use crate::core::platform::Os;
use crate::resolver::errors::RecipeError;

/// A present component plus what the platform adds to it.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Declaration index in the catalog
    pub position: usize,
    pub component: Component,
    /// System libraries applying on the target OS
    pub system_libs: Vec<&'static str>,
}

/// The present subset of the catalog with induced dependency edges.
#[derive(Debug, Clone)]
pub struct ComponentGraph {
    graph: DiGraph<GraphNode, ()>,
    by_name: HashMap<&'static str, NodeIndex>,
}

/// Build the graph for `options`, checking the catalog's invariants.
pub fn build_graph(
    catalog: &Catalog,
    options: &OptionSet,
    os: Os,
) -> Result<ComponentGraph, RecipeError> {
    check_catalog(catalog)?;

    let mut graph = DiGraph::new();
    let mut by_name = HashMap::new();

    for (position, component) in catalog.components().iter().enumerate() {
        if !component.is_present(options) {
            tracing::debug!("Component `{}` not present", component.name);
            continue;
        }

        let node = graph.add_node(GraphNode {
            position,
            component: component.clone(),
            system_libs: component.system_libs_for(os),
        });
        by_name.insert(component.name, node);
    }

    let present: Vec<NodeIndex> = graph.node_indices().collect();
    for node in present {
        let component = graph[node].component.clone();
        for dep in &component.requires {
            let Some(&dep_node) = by_name.get(dep) else {
                return Err(RecipeError::InconsistentCatalog {
                    component: component.name.to_string(),
                    problem: format!("is present but its dependency `{}` is not", dep),
                });
            };
            if !graph.contains_edge(node, dep_node) {
                graph.add_edge(node, dep_node, ());
            }
        }
    }

    Ok(ComponentGraph { graph, by_name })
}

/// Static checks independent of options: unique names, known dependencies.
fn check_catalog(catalog: &Catalog) -> Result<(), RecipeError> {
    let mut seen = HashSet::new();
    for component in catalog.components() {
        if !seen.insert(component.name) {
            return Err(RecipeError::InconsistentCatalog {
                component: component.name.to_string(),
                problem: "is declared more than once".to_string(),
            });
        }
    }

    for component in catalog.components() {
        for dep in &component.requires {
            if catalog.get(dep).is_none() {
                return Err(RecipeError::InconsistentCatalog {
                    component: component.name.to_string(),
                    problem: format!("requires unknown component `{}`", dep),
                });
            }
        }
    }

    Ok(())
}

impl ComponentGraph {
    /// Number of present components.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.by_name.get(name).map(|&idx| &self.graph[idx])
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.node(name).map(|n| &n.component)
    }

    /// System libraries of a present component on the graph's OS.
    pub fn system_libs(&self, name: &str) -> &[&'static str] {
        self.node(name).map(|n| n.system_libs.as_slice()).unwrap_or(&[])
    }

    /// Present components in catalog order.
    pub fn components(&self) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self.graph.node_weights().collect();
        nodes.sort_by_key(|n| n.position);
        nodes
    }

    /// Component names in catalog order.
    pub fn names(&self) -> Vec<&'static str> {
        self.components().iter().map(|n| n.component.name).collect()
    }

    /// Direct dependencies of a component, in catalog order.
    pub fn dependencies(&self, name: &str) -> Vec<&'static str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Components depending directly on `name`, in catalog order.
    pub fn dependents(&self, name: &str) -> Vec<&'static str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&'static str> {
        let Some(&idx) = self.by_name.get(name) else {
            return Vec::new();
        };
        let mut nodes: Vec<&GraphNode> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| &self.graph[n])
            .collect();
        nodes.sort_by_key(|n| n.position);
        nodes.iter().map(|n| n.component.name).collect()
    }

    /// Every (dependent, dependency) edge.
    pub fn edges(&self) -> Vec<(&'static str, &'static str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].component.name, self.graph[b].component.name))
            .collect()
    }

    pub(crate) fn inner(&self) -> &DiGraph<GraphNode, ()> {
        &self.graph
    }
}
