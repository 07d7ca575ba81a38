use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, instrument, trace};

use super::constants;
use super::context::Context;
use super::value::{Array, ArrayKey, DeferredCall, Value, ValueKind};
use crate::ast::{Argument, ArrayEntry, Node};
use crate::config::{EvaluatorConfig, UnaryMinusPolicy};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unsupported operand type {found} for {operation}")]
    UnsupportedOperand {
        operation: &'static str,
        found: ValueKind,
    },
    #[error("Illegal array key of type {found}")]
    IllegalKey { found: ValueKind },
    #[error("Cannot add element to the array as the next element is already occupied")]
    NextIndexOccupied,
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Turns expression trees into values.
///
/// Evaluation is pure: it reads the expression, the context and the
/// constant tables, and never executes calls. A `Call` node, or a bare word
/// that is not a known constant, becomes a [`DeferredCall`].
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    unary_minus: UnaryMinusPolicy,
    constants: HashMap<String, Value>,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            unary_minus: config.unary_minus,
            constants: config
                .constants
                .into_iter()
                .map(|(name, value)| (name, Value::from(value)))
                .collect(),
        }
    }

    #[instrument(level = "debug", skip(self, nodes, context))]
    pub fn evaluate_all(&self, nodes: &[Node], context: &Context) -> EvalResult<Vec<Value>> {
        nodes
            .iter()
            .map(|node| self.evaluate(node, context))
            .collect()
    }

    pub fn evaluate(&self, node: &Node, context: &Context) -> EvalResult<Value> {
        match node {
            Node::IntLiteral(i) => Ok(Value::Int(*i)),
            Node::FloatLiteral(f) => Ok(Value::Float(*f)),
            Node::StringLiteral(s) => Ok(Value::String(s.clone())),
            Node::UnaryMinus(operand) => {
                let value = self.evaluate(operand, context)?;
                self.negate(value)
            }
            Node::Identifier(name) => Ok(self.resolve_identifier(name)),
            Node::ArrayLiteral(entries) => self.eval_array(entries, context),
            Node::VariablePath(segments) => {
                let path = segments.join(".");
                match context.get(&path) {
                    Some(value) => Ok(value.clone()),
                    None => {
                        trace!("variable ${} not found in context", path);
                        Ok(Value::Null)
                    }
                }
            }
            Node::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(Argument::value(arg), context))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::DeferredCall(DeferredCall::new(name.as_str(), args)))
            }
        }
    }

    fn resolve_identifier(&self, name: &str) -> Value {
        if let Some(value) = constants::keyword(name) {
            return value;
        }
        if let Some(value) = self
            .constants
            .get(name)
            .or_else(|| constants::lookup(name))
        {
            return value.clone();
        }
        debug!("identifier {} is not a constant, deferring", name);
        Value::DeferredCall(DeferredCall::new(name, vec![]))
    }

    // Unkeyed entries go to one past the largest integer key so far.
    fn eval_array(&self, entries: &[ArrayEntry], context: &Context) -> EvalResult<Value> {
        let mut array = Array::new();
        for entry in entries {
            match &entry.key {
                Some(key) => {
                    let key = ArrayKey::from_value(&self.evaluate(key, context)?)?;
                    let value = self.evaluate(&entry.value, context)?;
                    array.insert(key, value);
                }
                None => {
                    let value = self.evaluate(&entry.value, context)?;
                    array.push(value).ok_or(EvalError::NextIndexOccupied)?;
                }
            }
        }
        Ok(Value::Array(array))
    }

    fn negate(&self, value: Value) -> EvalResult<Value> {
        match value.to_number() {
            Some(Value::Int(i)) => Ok(i
                .checked_neg()
                .map_or(Value::Float(-(i as f64)), Value::Int)),
            Some(Value::Float(f)) => Ok(Value::Float(-f)),
            _ => match self.unary_minus {
                UnaryMinusPolicy::Strict => Err(EvalError::UnsupportedOperand {
                    operation: "unary minus",
                    found: value.kind(),
                }),
                UnaryMinusPolicy::Lenient => {
                    debug!("unary minus on {}, using 0", value.kind());
                    Ok(Value::Int(0))
                }
            },
        }
    }
}

pub fn evaluate(node: &Node, context: &Context) -> EvalResult<Value> {
    Evaluator::default().evaluate(node, context)
}

pub fn evaluate_all(nodes: &[Node], context: &Context) -> EvalResult<Vec<Value>> {
    Evaluator::default().evaluate_all(nodes, context)
}
