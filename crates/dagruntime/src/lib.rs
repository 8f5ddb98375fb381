//! Calculation runtime
//!
//! This crate resolves the dependencies between registered nodes, levels
//! them topologically, and runs each level as a batch on a worker pool with
//! a barrier between levels. [`Graph`] is the entry point.

mod executor;
mod pool;
mod registry;
mod resolver;
mod runtime;
pub mod topology;

pub use executor::LevelExecutor;
pub use pool::{BlockingPool, InlinePool, NodeTask, TaskOutcome, WorkerPool};
pub use registry::NodeRegistry;
pub use resolver::{dependencies, dependency_graph};
pub use runtime::{Graph, GraphConfig, UnusedInputPolicy};
pub use topology::{levels, TopologicalLevels};
