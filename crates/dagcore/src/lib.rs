//! Core abstractions for the calculation graph
//!
//! This crate provides the leaf types every other component depends on:
//! dynamic values, input/output descriptors with their contracts, nodes and
//! the callables they wrap, the per-calculation data bag, and the error and
//! event types. It does not schedule anything.

pub mod contract;
mod data;
mod error;
pub mod events;
mod io;
mod node;
mod schema;
mod value;

pub use contract::{Contract, ContractSpec};
pub use data::DataBag;
pub use error::{
    ContractViolation, CycleError, GraphError, NodeError, RegistrationError, ValidationError,
};
pub use events::*;
pub use io::{Input, InputKind, Output};
pub use node::{
    CallArgs, Callable, DescriptorCatalog, InputSpec, Node, NodeId, NodeSpec, OutputSpec,
};
pub use schema::{DataSchema, PropertySchema};
pub use value::{SharedValue, Value, ValueKind};

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
