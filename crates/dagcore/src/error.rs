use crate::{NodeId, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("{0}")]
    Cycle(#[from] CycleError<NodeId>),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    ContractViolation(#[from] ContractViolation),

    #[error("Node {node_id} <{node}> failed: {source}")]
    Execution {
        node_id: NodeId,
        node: String,
        #[source]
        source: NodeError,
    },
}

impl GraphError {
    /// Node error behind an execution failure, if this is one
    pub fn node_error(&self) -> Option<&NodeError> {
        match self {
            GraphError::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure reported by a node's callable or while shaping its result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid input type for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Expected {expected} return values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Callable panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("Missing inputs parameter")]
    MissingInputs,

    #[error("Missing outputs parameters")]
    MissingOutputs,

    #[error("inputs need to be of type Input, str or dict")]
    InvalidInputShape,

    #[error("dict inputs should have only one key and cannot be empty")]
    InvalidConstant,

    #[error("{0} output already exist")]
    DuplicateOutput(String),

    #[error("'{0}' is declared more than once in the same node")]
    DuplicateParameter(String),

    #[error("You cannot use Input / Output in a Node if already defined: {0}")]
    DescriptorAlreadyDefined(String),

    #[error("Invalid contract '{contract}': {reason}")]
    InvalidContract { contract: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("The following inputs are already used in the model: {}", name_list(.0))]
    AlreadyUsed(Vec<String>),

    #[error("The following inputs are needed: {}", name_list(.0))]
    Needed(Vec<String>),

    #[error("The following inputs are not used by the model: {}", name_list(.0))]
    Unused(Vec<String>),

    #[error("{value} is not of type '{expected}' (field '{field}')")]
    Schema {
        field: String,
        expected: String,
        value: String,
    },
}

/// A bound or produced value failed the contract of its descriptor
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Contract violated by '{name}' with value {value}: {message}")]
pub struct ContractViolation {
    pub name: String,
    pub value: Value,
    pub message: String,
}

/// Leveling could not drain the dependency map.
///
/// `pending` holds every unresolved id with the predecessors it was still
/// waiting on.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleError<T: Ord> {
    pub pending: BTreeMap<T, BTreeSet<T>>,
}

impl<T: Ord + fmt::Debug + fmt::Display> std::error::Error for CycleError<T> {}

impl<T: Ord + fmt::Display> fmt::Display for CycleError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A cyclic dependency exists amongst {{")?;
        for (i, (id, deps)) in self.pending.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {{", id)?;
            for (j, dep) in deps.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", dep)?;
            }
            write!(f, "}}")?;
        }
        write!(f, "}}")
    }
}

fn name_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}
