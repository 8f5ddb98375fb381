//! Dependency resolution: an edge exists wherever one node's input key is
//! another node's output key.

use dagcore::{Node, NodeId};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Map every node to the set of nodes producing one of its inputs.
///
/// Constant inputs never create edges, and inputs that no node produces
/// (caller-supplied data) leave the node without a predecessor for them.
pub fn dependencies<'a, I>(nodes: I) -> HashMap<NodeId, HashSet<NodeId>>
where
    I: IntoIterator<Item = &'a Node>,
    I::IntoIter: Clone,
{
    let nodes = nodes.into_iter();
    let producers: HashMap<&str, NodeId> = nodes
        .clone()
        .flat_map(|node| node.output_keys().map(move |key| (key, node.id())))
        .collect();

    let mut deps = HashMap::new();
    for node in nodes {
        let entry: &mut HashSet<NodeId> = deps.entry(node.id()).or_default();
        for key in node.input_keys() {
            match producers.get(key) {
                Some(&producer) if producer != node.id() => {
                    entry.insert(producer);
                }
                Some(_) => {
                    tracing::debug!("Ignoring self dependency of {} on '{}'", node.id(), key);
                }
                None => {}
            }
        }
    }
    deps
}

/// Export the dependency structure as a petgraph graph.
///
/// Edges point from producer to consumer and carry the data key that
/// creates them.
pub fn dependency_graph<'a, I>(nodes: I) -> DiGraph<NodeId, String>
where
    I: IntoIterator<Item = &'a Node>,
    I::IntoIter: Clone,
{
    let nodes = nodes.into_iter();
    let mut graph = DiGraph::new();
    let mut node_to_index: HashMap<NodeId, NodeIndex> = HashMap::new();
    let mut producers: HashMap<&str, NodeId> = HashMap::new();

    for node in nodes.clone() {
        let idx = graph.add_node(node.id());
        node_to_index.insert(node.id(), idx);
        for key in node.output_keys() {
            producers.insert(key, node.id());
        }
    }

    for node in nodes {
        for key in node.input_keys() {
            let Some(&producer) = producers.get(key) else {
                continue;
            };
            if producer == node.id() {
                continue;
            }
            graph.add_edge(
                node_to_index[&producer],
                node_to_index[&node.id()],
                key.to_string(),
            );
        }
    }

    graph
}
