//! Foreign-key dependency ordering
//!
//! Builds a directed "depends on" graph from a schema catalog and produces
//! the export order: for every non-cyclic foreign-key edge `A -> B`, B is
//! emitted at or before A, so inserting rows in this order never references
//! a not-yet-inserted foreign key. Cycles are tolerated, not errors: a node
//! reached again while still in progress is skipped, which breaks the cycle
//! at that edge. Referential integrity for that one edge is then only
//! covered by the importer's enforcement-disabled window, so circular
//! groups are surfaced separately via [`DependencyGraph::cyclic_groups`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use crate::catalog::SchemaCatalog;

/// Table processing order, dependencies first.
pub type ExportOrder = Vec<String>;

/// Directed graph of table dependencies derived from foreign keys.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Nodes in catalog listing order; drives the outer traversal loop.
    nodes: Vec<String>,
    /// table -> tables it references. Sorted sets keep traversal
    /// deterministic for a fixed catalog.
    deps: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Build the graph from an introspected catalog. Self-referencing
    /// edges and edges pointing outside the catalog's table set are
    /// dropped; every table becomes a node even without edges.
    pub fn from_catalog(catalog: &SchemaCatalog) -> Self {
        let nodes: Vec<String> = catalog.tables.iter().map(|t| t.name.clone()).collect();
        let edges: Vec<(String, String)> = catalog
            .foreign_keys
            .iter()
            .filter(|fk| !fk.is_self_referencing())
            .map(|fk| (fk.table.clone(), fk.foreign_table.clone()))
            .collect();
        Self::from_edges(nodes, edges)
    }

    /// Build the graph from an explicit node list and `(table, depends_on)`
    /// edge pairs. Edges whose endpoints are not both nodes are ignored.
    pub fn from_edges(nodes: Vec<String>, edges: Vec<(String, String)>) -> Self {
        let mut deps: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for node in &nodes {
            deps.entry(node.clone()).or_default();
        }
        for (table, depends_on) in edges {
            if table == depends_on || !deps.contains_key(&depends_on) {
                continue;
            }
            if let Some(set) = deps.get_mut(&table) {
                set.insert(depends_on);
            }
        }
        Self { nodes, deps }
    }

    /// Number of tables in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tables the given table references, in sorted order.
    pub fn dependencies_of(&self, table: &str) -> Vec<&str> {
        self.deps
            .get(table)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Depth-first topological sort with cycle tolerance.
    ///
    /// Covers every node exactly once regardless of connectivity. For a
    /// fixed catalog the result is deterministic.
    pub fn export_order(&self) -> ExportOrder {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut visiting: HashSet<&str> = HashSet::new();
        let mut order: Vec<String> = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            self.visit(node, &mut visited, &mut visiting, &mut order);
        }
        order
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        visiting: &mut HashSet<&'a str>,
        order: &mut Vec<String>,
    ) {
        if visited.contains(node) {
            return;
        }
        if visiting.contains(node) {
            // Cycle: the node is already on the current path. Skip it, the
            // edge back into the path is simply not enforced.
            return;
        }
        visiting.insert(node);
        if let Some(deps) = self.deps.get(node) {
            for dep in deps {
                self.visit(dep, visited, visiting, order);
            }
        }
        visiting.remove(node);
        visited.insert(node);
        order.push(node.to_string());
    }

    /// Strongly connected components with more than one member, sorted for
    /// stable reporting. These are the table groups whose relative import
    /// order cannot be made safe by ordering alone.
    pub fn cyclic_groups(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut indices = HashMap::new();
        for node in &self.nodes {
            indices.insert(node.as_str(), graph.add_node(node.as_str()));
        }
        for (table, deps) in &self.deps {
            for dep in deps {
                if let (Some(&a), Some(&b)) =
                    (indices.get(table.as_str()), indices.get(dep.as_str()))
                {
                    graph.add_edge(a, b, ());
                }
            }
        }

        let mut groups: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut group: Vec<String> =
                    scc.into_iter().map(|i| graph[i].to_string()).collect();
                group.sort();
                group
            })
            .collect();
        groups.sort();
        groups
    }
}
