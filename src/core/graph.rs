//! Dependency graph over configured packages
//!
//! Determines the publish order: dependencies must be published before
//! their dependents, across ecosystems.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::error::{FoldError, FoldResult};

/// Directed graph of managed packages
pub struct PackageGraph {
  graph: DiGraph<String, ()>,
  node_map: HashMap<String, NodeIndex>,
}

impl PackageGraph {
  /// Build from `(package, internal dependencies)` pairs
  ///
  /// Edges point from dependent → dependency so that the reversed
  /// topological sort yields dependencies first.
  pub fn new(packages: &[(String, Vec<String>)]) -> Self {
    let mut graph = DiGraph::new();
    let mut node_map = HashMap::new();

    for (name, _) in packages {
      let idx = graph.add_node(name.clone());
      node_map.insert(name.clone(), idx);
    }

    for (name, deps) in packages {
      let dependent = node_map[name];
      for dep in deps {
        if let Some(&dependency) = node_map.get(dep) {
          graph.add_edge(dependent, dependency, ());
        }
      }
    }

    Self { graph, node_map }
  }

  /// Publish order: dependencies first
  pub fn publish_order(&self) -> FoldResult<Vec<String>> {
    let sorted = toposort(&self.graph, None).map_err(|cycle| {
      let name = &self.graph[cycle.node_id()];
      FoldError::with_help(
        format!("Circular dependency detected involving package '{}'", name),
        "Break the cycle (or mark one side private) before publishing.",
      )
    })?;

    Ok(sorted.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
  }

  /// Check if the graph has circular dependencies
  pub fn has_cycles(&self) -> bool {
    toposort(&self.graph, None).is_err()
  }

  /// Direct dependencies of a package
  pub fn dependencies_of(&self, name: &str) -> Option<Vec<String>> {
    let idx = self.node_map.get(name)?;
    Some(self.graph.neighbors(*idx).map(|dep| self.graph[dep].clone()).collect())
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }
}
