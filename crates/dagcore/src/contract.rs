//! Validation predicates attached to input and output descriptors.

use crate::{RegistrationError, Value, ValueKind};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Predicate a bound value must satisfy.
///
/// `Err` carries a human readable reason; the engine wraps it into a
/// [`ContractViolation`](crate::ContractViolation) together with the
/// descriptor name and the offending value.
pub trait Contract: Send + Sync {
    fn check(&self, value: &Value) -> Result<(), String>;

    /// Short description used in `Debug` output
    fn describe(&self) -> String {
        "<contract>".to_string()
    }
}

impl<F> Contract for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn check(&self, value: &Value) -> Result<(), String> {
        self(value)
    }
}

pub type SharedContract = Arc<dyn Contract>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl Comparison {
    fn symbol(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }

    fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Kind(ValueKind),
    Compare(Comparison, f64),
}

/// Textual contract such as `"int,>0"`: every comma separated clause must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSpec {
    source: String,
    clauses: Vec<Clause>,
}

impl ContractSpec {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for ContractSpec {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| RegistrationError::InvalidContract {
            contract: s.to_string(),
            reason,
        };

        let mut clauses = Vec::new();
        for raw in s.split(',') {
            let clause = raw.trim();
            if clause.is_empty() {
                return Err(invalid("empty clause".to_string()));
            }

            // Two-character operators first so ">=" is not read as ">" "=..."
            let operators = [
                (">=", Comparison::Ge),
                ("<=", Comparison::Le),
                ("==", Comparison::Eq),
                ("!=", Comparison::Ne),
                (">", Comparison::Gt),
                ("<", Comparison::Lt),
            ];
            let compare = operators
                .iter()
                .find_map(|(op, cmp)| clause.strip_prefix(op).map(|rest| (*cmp, rest.trim())));

            match compare {
                Some((cmp, operand)) => {
                    let bound: f64 = operand
                        .parse()
                        .map_err(|_| invalid(format!("'{}' is not a number", operand)))?;
                    clauses.push(Clause::Compare(cmp, bound));
                }
                None => {
                    let kind = ValueKind::parse(clause)
                        .ok_or_else(|| invalid(format!("unknown clause '{}'", clause)))?;
                    clauses.push(Clause::Kind(kind));
                }
            }
        }

        Ok(Self {
            source: s.to_string(),
            clauses,
        })
    }
}

impl Contract for ContractSpec {
    fn check(&self, value: &Value) -> Result<(), String> {
        for clause in &self.clauses {
            match clause {
                Clause::Kind(kind) => {
                    if !kind.matches(value) {
                        return Err(format!("Expected {}, got {}", kind, value.kind()));
                    }
                }
                Clause::Compare(cmp, bound) => {
                    let number = numeric(value).ok_or_else(|| {
                        format!("Expected a number to compare, got {}", value.kind())
                    })?;
                    if !cmp.holds(number, *bound) {
                        return Err(format!(
                            "Condition {} {} {} not respected",
                            number,
                            cmp.symbol(),
                            bound
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.source.clone()
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Shared(cell) => numeric(&cell.read()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_comparison() {
        let spec: ContractSpec = "int, >0".parse().unwrap();
        assert_eq!(
            spec.clauses(),
            &[Clause::Kind(ValueKind::Int), Clause::Compare(Comparison::Gt, 0.0)]
        );
    }

    #[test]
    fn reports_failed_condition() {
        let spec: ContractSpec = "int,>0".parse().unwrap();
        assert!(spec.check(&Value::Number(2.0)).is_ok());

        let err = spec.check(&Value::Number(-2.0)).unwrap_err();
        assert_eq!(err, "Condition -2 > 0 not respected");

        let err = spec.check(&Value::Number(1.5)).unwrap_err();
        assert!(err.contains("Expected int"));
    }

    #[test]
    fn two_character_operators() {
        let spec: ContractSpec = "number,>=1,<=3,!=2".parse().unwrap();
        assert!(spec.check(&Value::Number(1.0)).is_ok());
        assert!(spec.check(&Value::Number(3.0)).is_ok());
        assert!(spec.check(&Value::Number(2.0)).is_err());
        assert!(spec.check(&Value::Number(0.5)).is_err());
    }

    #[test]
    fn rejects_unknown_clause() {
        let err = "int,positive".parse::<ContractSpec>().unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidContract { .. }));

        let err = ">abc".parse::<ContractSpec>().unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn closures_are_contracts() {
        let even = |v: &Value| match v.as_f64() {
            Some(n) if n % 2.0 == 0.0 => Ok(()),
            _ => Err("not even".to_string()),
        };
        assert!(even.check(&Value::Number(4.0)).is_ok());
        assert!(even.check(&Value::Number(3.0)).is_err());
    }
}
