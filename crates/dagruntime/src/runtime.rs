use crate::executor::LevelExecutor;
use crate::pool::{BlockingPool, InlinePool, WorkerPool};
use crate::registry::NodeRegistry;
use crate::{resolver, topology};
use chrono::Utc;
use dagcore::{
    DataBag, DataSchema, DescriptorCatalog, EventBus, ExecutionEvent, ExecutionId, GraphError,
    Input, Node, NodeId, NodeSpec, Output, ValidationError, Value,
};
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// What to do with caller data that no node reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnusedInputPolicy {
    /// Fail validation
    #[default]
    Reject,
    /// Log a warning and leave the extra keys out of the data bag
    Warn,
}

/// Configuration for a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Run the nodes of a level concurrently
    pub parallel: bool,
    /// Worker count when `parallel` is set
    pub pool_size: usize,
    /// Deep-copy caller data into the data bag instead of aliasing shared cells
    pub copy_input: bool,
    pub unused_inputs: UnusedInputPolicy,
    pub event_buffer_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            pool_size: 2,
            copy_input: true,
            unused_inputs: UnusedInputPolicy::Reject,
            event_buffer_size: 1000,
        }
    }
}

/// Collection of related nodes, calculated in dependency order
pub struct Graph {
    config: GraphConfig,
    registry: NodeRegistry,
    executor: LevelExecutor,
    event_bus: Arc<EventBus>,
    schema: Option<DataSchema>,
    levels: Option<Arc<Vec<Vec<NodeId>>>>,
    data: Option<DataBag>,
}

impl Graph {
    /// Create a sequential graph with default settings
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        let pool: Arc<dyn WorkerPool> = if config.parallel {
            Arc::new(BlockingPool::new(config.pool_size))
        } else {
            Arc::new(InlinePool)
        };
        Self::with_pool(config, pool)
    }

    /// Create a graph running levels on a caller-provided pool
    pub fn with_pool(config: GraphConfig, pool: Arc<dyn WorkerPool>) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        Self {
            config,
            registry: NodeRegistry::new(),
            executor: LevelExecutor::new(pool),
            event_bus,
            schema: None,
            levels: None,
            data: None,
        }
    }

    /// Declare descriptors once for the whole graph. Nodes naming one of
    /// them by string pick it up; passing a descriptor object for the same
    /// name is a registration error.
    pub fn with_descriptors(
        mut self,
        inputs: impl IntoIterator<Item = Input>,
        outputs: impl IntoIterator<Item = Output>,
    ) -> Self {
        self.registry
            .set_catalog(DescriptorCatalog::new(inputs, outputs));
        self
    }

    /// Check caller data against `schema` before every calculation
    pub fn with_schema(mut self, schema: DataSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn set_schema(&mut self, schema: Option<DataSchema>) {
        self.schema = schema;
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Register a node. Invalidates the cached leveling.
    pub fn register(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        let id = self.registry.register(spec)?;
        self.levels = None;
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.registry.get(id).map(|node| &**node)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Data bag of the most recent calculation
    pub fn data(&self) -> Option<&DataBag> {
        self.data.as_ref()
    }

    pub fn sim_inputs(&self) -> Vec<String> {
        self.registry.sim_inputs()
    }

    pub fn sim_outputs(&self) -> Vec<String> {
        self.registry.sim_outputs()
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    /// Node id to the ids of the nodes it depends on
    pub fn dependencies(&self) -> HashMap<NodeId, HashSet<NodeId>> {
        resolver::dependencies(self.registry.nodes().map(|node| &**node))
    }

    pub fn dependency_graph(&self) -> DiGraph<NodeId, String> {
        resolver::dependency_graph(self.registry.nodes().map(|node| &**node))
    }

    /// Graphviz rendering of the dependency graph, edges labeled with keys
    pub fn to_dot(&self) -> String {
        let graph = self.dependency_graph().map(
            |_, id| match self.registry.get(*id) {
                Some(node) => format!("{} {}", id, node.name()),
                None => id.to_string(),
            },
            |_, key| key.clone(),
        );
        format!("{}", Dot::new(&graph))
    }

    /// Leveled node ids, computed on first use and cached until the next
    /// registration. Does not run anything.
    pub fn levels(&mut self) -> Result<Arc<Vec<Vec<NodeId>>>, GraphError> {
        if let Some(levels) = &self.levels {
            return Ok(levels.clone());
        }
        let levels = Arc::new(topology::levels(self.dependencies())?);
        tracing::debug!("Computed {} levels for {} nodes", levels.len(), self.len());
        self.levels = Some(levels.clone());
        Ok(levels)
    }

    /// Leveled nodes, for printing
    pub fn dag(&mut self) -> Result<Vec<Vec<Arc<Node>>>, GraphError> {
        let levels = self.levels()?;
        Ok(levels
            .iter()
            .map(|level| {
                level
                    .iter()
                    .filter_map(|id| self.registry.get(*id).cloned())
                    .collect()
            })
            .collect())
    }

    /// Run every node once and return the output of the last level.
    ///
    /// The last level's result is the value itself when that level holds a
    /// single node with a single output, and a `Value::Array` of all its
    /// outputs otherwise. The data bag of the run stays available through
    /// [`data`](Self::data), also after a failure.
    pub async fn calculate(&mut self, data: &HashMap<String, Value>) -> Result<Value, GraphError> {
        let execution_id = ExecutionId::new_v4();
        let span = tracing::info_span!("calculate", %execution_id);

        async {
            let start = Instant::now();
            tracing::info!("Starting calculation...");
            self.event_bus.emit(ExecutionEvent::CalculationStarted {
                execution_id,
                node_count: self.len(),
                timestamp: Utc::now(),
            });

            let result = self.run(data, execution_id).await;

            let duration = start.elapsed();
            self.event_bus.emit(ExecutionEvent::CalculationCompleted {
                execution_id,
                success: result.is_ok(),
                duration_ms: duration.as_millis() as u64,
                timestamp: Utc::now(),
            });
            match &result {
                Ok(_) => tracing::info!("Calculation finished in {:?}", duration),
                Err(e) => tracing::error!("Calculation failed after {:?}: {}", duration, e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &mut self,
        data: &HashMap<String, Value>,
        execution_id: ExecutionId,
    ) -> Result<Value, GraphError> {
        self.data = None;
        let unused = self.check_inputs(data)?;
        if let Some(schema) = &self.schema {
            schema.validate(data)?;
        }

        let mut bag = DataBag::from_inputs(data, self.config.copy_input);
        for key in &unused {
            bag.remove(key);
        }

        let levels = self.levels()?;
        let result = self
            .executor
            .execute(&levels, &self.registry, &mut bag, &self.event_bus, execution_id)
            .await;
        self.data = Some(bag);
        result
    }

    /// Caller keys must be exactly the inputs no node produces. Returns the
    /// unused keys tolerated under [`UnusedInputPolicy::Warn`].
    fn check_inputs(&self, data: &HashMap<String, Value>) -> Result<Vec<String>, ValidationError> {
        let provided: BTreeSet<&str> = data.keys().map(String::as_str).collect();
        let mut outputs: BTreeSet<&str> = BTreeSet::new();
        let mut required: BTreeSet<&str> = BTreeSet::new();
        let mut optional: BTreeSet<&str> = BTreeSet::new();
        for node in self.registry.nodes() {
            outputs.extend(node.output_keys());
            required.extend(node.required_keys());
            optional.extend(node.optional_keys());
        }

        let already_used = names(provided.intersection(&outputs));
        if !already_used.is_empty() {
            return Err(ValidationError::AlreadyUsed(already_used));
        }

        let required: BTreeSet<&str> = required.difference(&outputs).copied().collect();
        let needed = names(required.difference(&provided));
        if !needed.is_empty() {
            return Err(ValidationError::Needed(needed));
        }

        let unused = names(
            provided
                .iter()
                .filter(|key| !required.contains(*key) && !optional.contains(*key)),
        );
        if unused.is_empty() {
            return Ok(unused);
        }
        match self.config.unused_inputs {
            UnusedInputPolicy::Reject => Err(ValidationError::Unused(unused)),
            UnusedInputPolicy::Warn => {
                tracing::warn!("The following inputs are not used by the model: {:?}", unused);
                Ok(unused)
            }
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

fn names<'a>(keys: impl Iterator<Item = &'a &'a str>) -> Vec<String> {
    keys.map(|key| key.to_string()).collect()
}
