//!
//! petgraph view of the GFA topology, for the stats report
//!
use crate::common::NodeId;
use crate::io::gfa::Gfa;
use fnv::FnvHashMap as HashMap;
use log::warn;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

///
/// Directed graph of segments and links.
///
/// Link orientations are dropped: the report only cares about branching
/// around the collapsed module region, not the bidirected structure.
///
pub struct PangenomeGraph {
    graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl PangenomeGraph {
    pub fn from_gfa(gfa: &Gfa) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::default();
        for node in &gfa.nodes {
            index.insert(node.id, graph.add_node(node.id));
        }
        for link in &gfa.links {
            let (from, _) = link.from;
            let (to, _) = link.to;
            match (index.get(&from), index.get(&to)) {
                (Some(&a), Some(&b)) => {
                    graph.add_edge(a, b, ());
                }
                _ => warn!("link {}->{} references an undeclared segment", from, to),
            }
        }
        PangenomeGraph { graph, index }
    }
    pub fn n_nodes(&self) -> usize {
        self.graph.node_count()
    }
    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }
    ///
    /// count of nodes by (in_degree, out_degree)
    ///
    pub fn degree_stats(&self) -> Vec<((usize, usize), usize)> {
        let mut counts: HashMap<(usize, usize), usize> = HashMap::default();
        for v in self.graph.node_indices() {
            let in_deg = self.graph.neighbors_directed(v, Direction::Incoming).count();
            let out_deg = self.graph.neighbors_directed(v, Direction::Outgoing).count();
            *counts.entry((in_deg, out_deg)).or_insert(0) += 1;
        }
        let mut stats: Vec<_> = counts.into_iter().collect();
        stats.sort();
        stats
    }
    ///
    /// nodes whose in_degree > 1 and out_degree > 1, the candidates for a
    /// collapsed repeat boundary
    ///
    pub fn n_ambiguous_nodes(&self) -> usize {
        self.degree_stats()
            .into_iter()
            .filter(|&((i, o), _)| i > 1 && o > 1)
            .map(|(_, count)| count)
            .sum()
    }
    ///
    /// Dot file for eyeballing the collapsed region
    ///
    pub fn to_dot(&self) -> String {
        format!(
            "{:?}",
            Dot::with_config(&self.graph, &[Config::EdgeNoLabel])
        )
    }
}

//
// tests
//
