use dagcore::{DescriptorCatalog, Node, NodeId, NodeSpec, RegistrationError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Append-only store of the nodes of one graph.
///
/// Owns the id counter, so ids are unique per registry and increase in
/// registration order.
#[derive(Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, Arc<Node>>,
    producers: HashMap<String, NodeId>,
    catalog: DescriptorCatalog,
    next_id: u64,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_catalog(&mut self, catalog: DescriptorCatalog) {
        self.catalog = catalog;
    }

    /// Build and store a node.
    ///
    /// On error nothing is stored and no id is consumed.
    pub fn register(&mut self, spec: NodeSpec) -> Result<NodeId, RegistrationError> {
        let id = NodeId::new(self.next_id);
        let node = spec.build(id, &self.catalog)?;

        // Output keys are unique across the whole graph
        if let Some(key) = node.output_keys().find(|key| self.producers.contains_key(*key)) {
            return Err(RegistrationError::DuplicateOutput(key.to_string()));
        }

        for key in node.output_keys() {
            self.producers.insert(key.to_string(), id);
        }
        tracing::info!("Registering {}", node);
        self.nodes.insert(id, Arc::new(node));
        self.next_id += 1;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(&id)
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<Node>> + Clone {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Non-constant input keys of every node, duplicates included
    pub fn sim_inputs(&self) -> Vec<String> {
        self.nodes
            .values()
            .flat_map(|node| node.input_keys().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// Output keys of every node
    pub fn sim_outputs(&self) -> Vec<String> {
        self.nodes
            .values()
            .flat_map(|node| node.output_keys().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }
}
