use crate::io::{Input, InputKind, Output};
use crate::{DataBag, GraphError, NodeError, RegistrationError, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Identifier of a registered node, unique within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Computation wrapped by a node.
///
/// Receives the bound positional values and keyword mapping and returns a
/// single value; nodes with several outputs return a `Value::Array` with one
/// element per declared output.
pub trait Callable: Send + Sync {
    fn call(&self, args: CallArgs) -> Result<Value, NodeError>;
}

impl<F> Callable for F
where
    F: Fn(CallArgs) -> Result<Value, NodeError> + Send + Sync,
{
    fn call(&self, args: CallArgs) -> Result<Value, NodeError> {
        self(args)
    }
}

/// Arguments bound for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub args: Vec<Value>,
    pub kwargs: HashMap<String, Value>,
    names: Vec<String>,
}

impl CallArgs {
    pub fn new(args: Vec<Value>, kwargs: HashMap<String, Value>) -> Self {
        let names = (0..args.len()).map(|i| format!("argument {}", i)).collect();
        Self {
            args,
            kwargs,
            names,
        }
    }

    fn push_arg(&mut self, name: &str, value: Value) {
        self.names.push(name.to_string());
        self.args.push(value);
    }

    /// Get positional argument or return error
    pub fn arg(&self, index: usize) -> Result<&Value, NodeError> {
        self.args
            .get(index)
            .ok_or_else(|| NodeError::MissingInput(format!("argument {}", index)))
    }

    /// Get positional argument as a number
    pub fn number(&self, index: usize) -> Result<f64, NodeError> {
        let name = self
            .names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("argument {}", index));
        expect_number(&name, self.arg(index)?)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    pub fn require_kwarg(&self, name: &str) -> Result<&Value, NodeError> {
        self.kwargs
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    pub fn kwarg_number(&self, name: &str) -> Result<f64, NodeError> {
        expect_number(name, self.require_kwarg(name)?)
    }

    /// Keyword as a number, falling back to `default` when it was not bound
    pub fn kwarg_number_or(&self, name: &str, default: f64) -> Result<f64, NodeError> {
        match self.kwargs.get(name) {
            Some(value) => expect_number(name, value),
            None => Ok(default),
        }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

fn expect_number(field: &str, value: &Value) -> Result<f64, NodeError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Shared(cell) => expect_number(field, &cell.read()),
        other => Err(NodeError::InvalidInputType {
            field: field.to_string(),
            expected: "number".to_string(),
            actual: other.kind().to_string(),
        }),
    }
}

/// Accepted shapes for a node input at registration
#[derive(Debug, Clone)]
pub enum InputSpec {
    /// Bare variable name
    Name(String),
    /// `{name: value}` constant; exactly one entry is accepted
    Constant(HashMap<String, Value>),
    /// Pre-built descriptor
    Descriptor(Input),
    /// JSON form: a string is a name, a one-key object is a constant
    Json(serde_json::Value),
}

impl InputSpec {
    pub fn constant(name: impl Into<String>, value: impl Into<Value>) -> Self {
        InputSpec::Constant(HashMap::from([(name.into(), value.into())]))
    }

    fn resolve(self, catalog: &DescriptorCatalog) -> Result<Input, RegistrationError> {
        match self {
            InputSpec::Name(name) => Ok(catalog
                .input(&name)
                .cloned()
                .unwrap_or_else(|| Input::new(name))),
            InputSpec::Constant(map) => {
                if map.len() != 1 {
                    return Err(RegistrationError::InvalidConstant);
                }
                let (name, value) = map
                    .into_iter()
                    .next()
                    .ok_or(RegistrationError::InvalidConstant)?;
                Ok(Input::constant(name, value))
            }
            InputSpec::Descriptor(input) => {
                if catalog.input(input.name()).is_some() {
                    return Err(RegistrationError::DescriptorAlreadyDefined(
                        input.name().to_string(),
                    ));
                }
                Ok(input)
            }
            InputSpec::Json(serde_json::Value::String(name)) => {
                InputSpec::Name(name).resolve(catalog)
            }
            InputSpec::Json(serde_json::Value::Object(obj)) => {
                if obj.len() != 1 {
                    return Err(RegistrationError::InvalidConstant);
                }
                let (name, value) = obj
                    .into_iter()
                    .next()
                    .ok_or(RegistrationError::InvalidConstant)?;
                Ok(Input::constant(name, Value::from_json(value)))
            }
            InputSpec::Json(_) => Err(RegistrationError::InvalidInputShape),
        }
    }
}

impl From<&str> for InputSpec {
    fn from(name: &str) -> Self {
        InputSpec::Name(name.to_string())
    }
}

impl From<String> for InputSpec {
    fn from(name: String) -> Self {
        InputSpec::Name(name)
    }
}

impl From<Input> for InputSpec {
    fn from(input: Input) -> Self {
        InputSpec::Descriptor(input)
    }
}

impl From<HashMap<String, Value>> for InputSpec {
    fn from(map: HashMap<String, Value>) -> Self {
        InputSpec::Constant(map)
    }
}

impl From<serde_json::Value> for InputSpec {
    fn from(json: serde_json::Value) -> Self {
        InputSpec::Json(json)
    }
}

/// Accepted shapes for a node output at registration
#[derive(Debug, Clone)]
pub enum OutputSpec {
    Name(String),
    Descriptor(Output),
}

impl OutputSpec {
    fn resolve(self, catalog: &DescriptorCatalog) -> Result<Output, RegistrationError> {
        match self {
            OutputSpec::Name(name) => Ok(catalog
                .output(&name)
                .cloned()
                .unwrap_or_else(|| Output::new(name))),
            OutputSpec::Descriptor(output) => {
                if catalog.output(output.name()).is_some() {
                    return Err(RegistrationError::DescriptorAlreadyDefined(
                        output.name().to_string(),
                    ));
                }
                Ok(output)
            }
        }
    }
}

impl From<&str> for OutputSpec {
    fn from(name: &str) -> Self {
        OutputSpec::Name(name.to_string())
    }
}

impl From<String> for OutputSpec {
    fn from(name: String) -> Self {
        OutputSpec::Name(name)
    }
}

impl From<Output> for OutputSpec {
    fn from(output: Output) -> Self {
        OutputSpec::Descriptor(output)
    }
}

/// Descriptors declared once at graph level and picked up by name
#[derive(Debug, Clone, Default)]
pub struct DescriptorCatalog {
    inputs: HashMap<String, Input>,
    outputs: HashMap<String, Output>,
}

impl DescriptorCatalog {
    pub fn new(
        inputs: impl IntoIterator<Item = Input>,
        outputs: impl IntoIterator<Item = Output>,
    ) -> Self {
        Self {
            inputs: inputs
                .into_iter()
                .map(|i| (i.name().to_string(), i))
                .collect(),
            outputs: outputs
                .into_iter()
                .map(|o| (o.name().to_string(), o))
                .collect(),
        }
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }
}

/// Registration request for a node
#[derive(Clone)]
pub struct NodeSpec {
    name: String,
    callable: Arc<dyn Callable>,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    args: Vec<InputSpec>,
    kwargs: Vec<InputSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, callable: impl Callable + 'static) -> Self {
        Self {
            name: name.into(),
            callable: Arc::new(callable),
            inputs: Vec::new(),
            outputs: Vec::new(),
            args: Vec::new(),
            kwargs: Vec::new(),
        }
    }

    pub fn inputs<I, T>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<InputSpec>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn input(mut self, input: impl Into<InputSpec>) -> Self {
        self.inputs.push(input.into());
        self
    }

    pub fn outputs<I, T>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OutputSpec>,
    {
        self.outputs.extend(outputs.into_iter().map(Into::into));
        self
    }

    pub fn output(mut self, output: impl Into<OutputSpec>) -> Self {
        self.outputs.push(output.into());
        self
    }

    /// Extra positional inputs, appended after the declared inputs
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<InputSpec>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Extra keyword inputs, bound by name
    pub fn kwargs<I, T>(mut self, kwargs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<InputSpec>,
    {
        self.kwargs.extend(kwargs.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve every input/output shape into descriptors.
    ///
    /// Fails if inputs or outputs are empty, if an input has an unsupported
    /// shape, or if a name appears twice within the node.
    pub fn build(self, id: NodeId, catalog: &DescriptorCatalog) -> Result<Node, RegistrationError> {
        if self.inputs.is_empty() {
            return Err(RegistrationError::MissingInputs);
        }
        if self.outputs.is_empty() {
            return Err(RegistrationError::MissingOutputs);
        }

        // Descriptors are bound by their own kind, whichever list declared them.
        // Constants stay in the list they were declared in.
        let mut inputs = Vec::new();
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        let declared = [
            (self.inputs, InputKind::Plain),
            (self.args, InputKind::Positional),
            (self.kwargs, InputKind::Keyword),
        ];
        for (specs, default_kind) in declared {
            for spec in specs {
                let input = spec.resolve(catalog)?.with_kind(default_kind);
                let target = match (input.kind(), default_kind) {
                    (InputKind::Positional, _) => &mut args,
                    (InputKind::Keyword, _) => &mut kwargs,
                    (InputKind::Constant, InputKind::Positional) => &mut args,
                    (InputKind::Constant, InputKind::Keyword) => &mut kwargs,
                    _ => &mut inputs,
                };
                target.push(input);
            }
        }
        let outputs = self
            .outputs
            .into_iter()
            .map(|spec| spec.resolve(catalog))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for input in inputs.iter().chain(&args).chain(&kwargs) {
            if !seen.insert(input.name()) {
                return Err(RegistrationError::DuplicateParameter(input.name().to_string()));
            }
        }
        let mut seen = HashSet::new();
        for output in &outputs {
            if !seen.insert(output.key()) {
                return Err(RegistrationError::DuplicateParameter(output.key().to_string()));
            }
        }

        Ok(Node {
            id,
            name: self.name,
            callable: self.callable,
            inputs,
            args,
            kwargs,
            outputs,
        })
    }
}

impl fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish()
    }
}

/// A registered unit of computation
pub struct Node {
    id: NodeId,
    name: String,
    callable: Arc<dyn Callable>,
    inputs: Vec<Input>,
    args: Vec<Input>,
    kwargs: Vec<Input>,
    outputs: Vec<Output>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn args(&self) -> &[Input] {
        &self.args
    }

    pub fn kwargs(&self) -> &[Input] {
        &self.kwargs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    fn all_inputs(&self) -> impl Iterator<Item = &Input> {
        self.inputs.iter().chain(&self.args).chain(&self.kwargs)
    }

    /// Data-bag keys of every non-constant input
    pub fn input_keys(&self) -> impl Iterator<Item = &str> {
        self.all_inputs()
            .filter(|i| !i.is_constant())
            .map(Input::key)
    }

    /// Keys that must be present before this node runs
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.all_inputs()
            .filter(|i| !i.is_constant() && !i.is_optional())
            .map(Input::key)
    }

    pub fn optional_keys(&self) -> impl Iterator<Item = &str> {
        self.all_inputs().filter(|i| i.is_optional()).map(Input::key)
    }

    pub fn output_keys(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(Output::key)
    }

    /// Bind inputs against the data bag: plain inputs then positional ones in
    /// order, keywords by name. Constants use a deep copy of their fixed
    /// value. Every bound value is checked against its contract.
    pub fn bind(&self, data: &DataBag) -> Result<CallArgs, GraphError> {
        let mut call = CallArgs::default();

        for input in self.inputs.iter().chain(&self.args) {
            let value = self.lookup(input, data)?;
            input.validate(&value)?;
            call.push_arg(input.name(), value);
        }

        for input in &self.kwargs {
            let value = match (input.value(), data.get(input.key())) {
                (Some(constant), _) => constant.deep_clone(),
                (None, Some(value)) => value.clone(),
                (None, None) if input.is_optional() => continue,
                (None, None) => {
                    return Err(self.failed(NodeError::MissingInput(input.key().to_string())))
                }
            };
            input.validate(&value)?;
            call.kwargs.insert(input.name().to_string(), value);
        }

        Ok(call)
    }

    fn lookup(&self, input: &Input, data: &DataBag) -> Result<Value, GraphError> {
        // Fresh copy per call so a callable mutating a shared constant
        // cannot affect later calculations
        if let Some(constant) = input.value() {
            return Ok(constant.deep_clone());
        }
        data.get(input.key())
            .cloned()
            .ok_or_else(|| self.failed(NodeError::MissingInput(input.key().to_string())))
    }

    /// Run the callable with already bound arguments
    pub fn invoke(&self, args: CallArgs) -> Result<Value, NodeError> {
        let start = Instant::now();
        let result = self.callable.call(args);
        tracing::info!("Ran {} in {:?}", self, start.elapsed());
        result
    }

    /// Split a raw return value into `(data key, value)` pairs.
    ///
    /// A single output stores the value as is. Several outputs require a
    /// `Value::Array` of exactly that many elements. Output contracts run
    /// before anything is returned.
    pub fn shape_outputs(&self, result: Value) -> Result<Vec<(String, Value)>, GraphError> {
        let values = if self.outputs.len() == 1 {
            vec![result]
        } else {
            match result {
                Value::Array(items) if items.len() == self.outputs.len() => items,
                Value::Array(items) => {
                    return Err(self.failed(NodeError::ArityMismatch {
                        expected: self.outputs.len(),
                        actual: items.len(),
                    }))
                }
                _ => {
                    return Err(self.failed(NodeError::ArityMismatch {
                        expected: self.outputs.len(),
                        actual: 1,
                    }))
                }
            }
        };

        let mut shaped = Vec::with_capacity(values.len());
        for (output, value) in self.outputs.iter().zip(values) {
            output.validate(&value)?;
            shaped.push((output.key().to_string(), value));
        }
        Ok(shaped)
    }

    /// Wrap a node error with this node's identity
    pub fn failed(&self, source: NodeError) -> GraphError {
        GraphError::Execution {
            node_id: self.id,
            node: self.name.clone(),
            source,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<&str> = self.all_inputs().map(Input::name).collect();
        let outputs: Vec<&str> = self.output_keys().collect();
        write!(f, "Node({}, <{}>, {:?}, {:?})", self.id, self.name, inputs, outputs)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .field("outputs", &self.outputs)
            .finish()
    }
}
