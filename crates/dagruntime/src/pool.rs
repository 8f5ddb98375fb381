use async_trait::async_trait;
use dagcore::{CallArgs, Node, NodeError, NodeId, Value};
use futures::stream::{FuturesUnordered, StreamExt};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// A node with its arguments already bound, ready to run anywhere
pub struct NodeTask {
    pub node: Arc<Node>,
    pub args: CallArgs,
}

impl NodeTask {
    pub fn new(node: Arc<Node>, args: CallArgs) -> Self {
        Self { node, args }
    }

    fn run(self) -> TaskOutcome {
        let node_id = self.node.id();
        let start = Instant::now();
        let node = self.node;
        let args = self.args;
        let result = panic::catch_unwind(AssertUnwindSafe(|| node.invoke(args)))
            .unwrap_or_else(|payload| Err(NodeError::Panicked(panic_message(payload))));
        TaskOutcome {
            node_id,
            result,
            duration: start.elapsed(),
        }
    }
}

/// Result of one task, in whatever order the pool finished it
#[derive(Debug)]
pub struct TaskOutcome {
    pub node_id: NodeId,
    pub result: Result<Value, NodeError>,
    pub duration: Duration,
}

/// Executes a batch of mutually independent node tasks.
///
/// `run_batch` returns only once every task has finished, successfully or
/// not, with one outcome per submitted task.
#[async_trait]
pub trait WorkerPool: Send + Sync {
    async fn run_batch(&self, tasks: Vec<NodeTask>) -> Vec<TaskOutcome>;
}

/// Runs tasks one after another on the calling task
#[derive(Debug, Default, Clone, Copy)]
pub struct InlinePool;

#[async_trait]
impl WorkerPool for InlinePool {
    async fn run_batch(&self, tasks: Vec<NodeTask>) -> Vec<TaskOutcome> {
        tasks.into_iter().map(NodeTask::run).collect()
    }
}

/// Runs tasks on tokio's blocking threads, at most `size` at a time
#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
}

impl BlockingPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }
}

#[async_trait]
impl WorkerPool for BlockingPool {
    async fn run_batch(&self, tasks: Vec<NodeTask>) -> Vec<TaskOutcome> {
        let running: FuturesUnordered<_> = tasks
            .into_iter()
            .map(|task| {
                let permits = self.permits.clone();
                let span = tracing::Span::current();
                let node_id = task.node.id();
                async move {
                    // The semaphore is never closed, so acquiring cannot fail.
                    let _permit = permits.acquire_owned().await.ok();
                    let handle = tokio::task::spawn_blocking(move || {
                        let _entered = span.enter();
                        task.run()
                    });
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::error!("Worker for {} did not complete: {}", node_id, e);
                            TaskOutcome {
                                node_id,
                                result: Err(NodeError::Panicked(e.to_string())),
                                duration: Duration::ZERO,
                            }
                        }
                    }
                }
            })
            .collect();

        running.collect().await
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
