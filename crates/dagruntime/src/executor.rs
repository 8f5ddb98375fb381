use crate::pool::{NodeTask, WorkerPool};
use crate::registry::NodeRegistry;
use chrono::Utc;
use dagcore::{DataBag, EventBus, ExecutionEvent, ExecutionId, GraphError, NodeId, Value};
use std::sync::Arc;

/// Executes leveled nodes with a barrier between levels
pub struct LevelExecutor {
    pool: Arc<dyn WorkerPool>,
}

impl LevelExecutor {
    pub fn new(pool: Arc<dyn WorkerPool>) -> Self {
        Self { pool }
    }

    /// Run every level in order against `data` and return the combined
    /// output of the last level.
    ///
    /// Within a level, all nodes are bound against the same snapshot of the
    /// data bag and their outputs are merged only after the whole level has
    /// finished. A failure stops execution before the next level starts;
    /// outputs of earlier levels stay in `data`.
    pub async fn execute(
        &self,
        levels: &[Vec<NodeId>],
        registry: &NodeRegistry,
        data: &mut DataBag,
        event_bus: &EventBus,
        execution_id: ExecutionId,
    ) -> Result<Value, GraphError> {
        let mut last = Value::Null;

        for (index, level) in levels.iter().enumerate() {
            tracing::debug!("Level {}: {:?}", index, level);
            event_bus.emit(ExecutionEvent::LevelStarted {
                execution_id,
                level: index,
                node_ids: level.clone(),
                timestamp: Utc::now(),
            });

            let mut tasks = Vec::with_capacity(level.len());
            for node_id in level {
                let Some(node) = registry.get(*node_id) else {
                    tracing::debug!("Skipping {}: not a registered node", node_id);
                    continue;
                };
                match node.bind(data) {
                    Ok(args) => tasks.push(NodeTask::new(node.clone(), args)),
                    Err(e) => {
                        tracing::error!("Could not bind inputs of {}: {}", node, e);
                        event_bus.emit(ExecutionEvent::NodeFailed {
                            execution_id,
                            node_id: *node_id,
                            node_name: node.name().to_string(),
                            error: e.to_string(),
                            timestamp: Utc::now(),
                        });
                        return Err(e);
                    }
                }
            }

            let mut outcomes = self.pool.run_batch(tasks).await;
            outcomes.sort_by_key(|outcome| outcome.node_id);

            let mut produced = Vec::with_capacity(outcomes.len());
            let mut failure = None;
            for outcome in outcomes {
                let Some(node) = registry.get(outcome.node_id) else {
                    continue;
                };
                let shaped = outcome
                    .result
                    .map_err(|e| node.failed(e))
                    .and_then(|value| node.shape_outputs(value));

                match shaped {
                    Ok(outputs) => {
                        event_bus.emit(ExecutionEvent::NodeCompleted {
                            execution_id,
                            node_id: outcome.node_id,
                            node_name: node.name().to_string(),
                            outputs: outputs.iter().map(|(key, _)| key.clone()).collect(),
                            duration_ms: outcome.duration.as_millis() as u64,
                            timestamp: Utc::now(),
                        });
                        produced.push(outputs);
                    }
                    Err(e) => {
                        tracing::error!("Node {} failed: {}", node, e);
                        event_bus.emit(ExecutionEvent::NodeFailed {
                            execution_id,
                            node_id: outcome.node_id,
                            node_name: node.name().to_string(),
                            error: e.to_string(),
                            timestamp: Utc::now(),
                        });
                        failure.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = failure {
                return Err(e);
            }

            if !produced.is_empty() {
                last = level_result(&produced);
            }
            for outputs in produced {
                data.extend(outputs);
            }
        }

        Ok(last)
    }
}

/// One node with one output yields that value; anything else yields every
/// output of the level, nodes in id order and outputs in declared order.
fn level_result(produced: &[Vec<(String, Value)>]) -> Value {
    match produced {
        [single] if single.len() == 1 => single[0].1.clone(),
        _ => Value::Array(
            produced
                .iter()
                .flatten()
                .map(|(_, value)| value.clone())
                .collect(),
        ),
    }
}
