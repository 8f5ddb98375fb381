//! Input and output descriptors.

use crate::contract::{Contract, ContractSpec, SharedContract};
use crate::{ContractViolation, RegistrationError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How an input is handed to the callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Declared input, bound positionally in declaration order
    Plain,
    /// Extra positional argument, appended after every plain input
    Positional,
    /// Extra keyword argument, bound by name
    Keyword,
    /// Fixed at registration, never read from the data bag
    Constant,
}

#[derive(Clone)]
pub struct Input {
    name: String,
    kind: InputKind,
    value: Option<Value>,
    map: Option<String>,
    optional: bool,
    contract: Option<SharedContract>,
    meta: HashMap<String, String>,
}

impl Input {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Plain,
            value: None,
            map: None,
            optional: false,
            contract: None,
            meta: HashMap::new(),
        }
    }

    pub fn arg(name: impl Into<String>) -> Self {
        Self {
            kind: InputKind::Positional,
            ..Self::new(name)
        }
    }

    pub fn kwarg(name: impl Into<String>) -> Self {
        Self {
            kind: InputKind::Keyword,
            ..Self::new(name)
        }
    }

    pub fn constant(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: InputKind::Constant,
            value: Some(value.into()),
            ..Self::new(name)
        }
    }

    /// Read the value from data-bag key `key` instead of the input name
    pub fn map(mut self, key: impl Into<String>) -> Self {
        self.map = Some(key.into());
        self
    }

    /// Only meaningful for keyword inputs: the keyword is left out of the
    /// call when nothing provides it.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_contract(mut self, contract: impl Contract + 'static) -> Self {
        self.contract = Some(Arc::new(contract));
        self
    }

    /// Attach a textual contract such as `"int,>0"`
    pub fn with_contract_str(self, contract: &str) -> Result<Self, RegistrationError> {
        let spec: ContractSpec = contract.parse()?;
        Ok(self.with_contract(spec))
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data-bag key this input reads
    pub fn key(&self) -> &str {
        self.map.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Constant value, if this is a constant input
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    pub fn is_constant(&self) -> bool {
        self.kind == InputKind::Constant
    }

    pub fn is_arg(&self) -> bool {
        self.kind == InputKind::Positional
    }

    pub fn is_kwarg(&self) -> bool {
        self.kind == InputKind::Keyword
    }

    pub fn is_optional(&self) -> bool {
        self.optional && self.is_kwarg()
    }

    pub fn has_contract(&self) -> bool {
        self.contract.is_some()
    }

    pub(crate) fn with_kind(mut self, kind: InputKind) -> Self {
        if self.kind == InputKind::Plain {
            self.kind = kind;
        }
        self
    }

    pub fn validate(&self, value: &Value) -> Result<(), ContractViolation> {
        check(self.contract.as_deref(), &self.name, value)
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("map", &self.map)
            .field("optional", &self.optional)
            .field("contract", &self.contract.as_ref().map(|c| c.describe()))
            .field("meta", &self.meta)
            .finish()
    }
}

#[derive(Clone)]
pub struct Output {
    name: String,
    map: Option<String>,
    contract: Option<SharedContract>,
    meta: HashMap<String, String>,
}

impl Output {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map: None,
            contract: None,
            meta: HashMap::new(),
        }
    }

    /// Write the value under data-bag key `key` instead of the output name
    pub fn map(mut self, key: impl Into<String>) -> Self {
        self.map = Some(key.into());
        self
    }

    pub fn with_contract(mut self, contract: impl Contract + 'static) -> Self {
        self.contract = Some(Arc::new(contract));
        self
    }

    pub fn with_contract_str(self, contract: &str) -> Result<Self, RegistrationError> {
        let spec: ContractSpec = contract.parse()?;
        Ok(self.with_contract(spec))
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        self.map.as_deref().unwrap_or(&self.name)
    }

    pub fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    pub fn has_contract(&self) -> bool {
        self.contract.is_some()
    }

    pub fn validate(&self, value: &Value) -> Result<(), ContractViolation> {
        check(self.contract.as_deref(), &self.name, value)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("name", &self.name)
            .field("map", &self.map)
            .field("contract", &self.contract.as_ref().map(|c| c.describe()))
            .field("meta", &self.meta)
            .finish()
    }
}

fn check(
    contract: Option<&dyn Contract>,
    name: &str,
    value: &Value,
) -> Result<(), ContractViolation> {
    match contract {
        Some(contract) => contract.check(value).map_err(|message| ContractViolation {
            name: name.to_string(),
            value: value.clone(),
            message,
        }),
        None => Ok(()),
    }
}
