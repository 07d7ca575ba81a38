//! Execution of deferred calls against a host object.
//!
//! Evaluation only ever describes calls. The [`MethodRunner`] takes the
//! evaluated arguments of one input and, when they consist of exactly one
//! [`DeferredCall`], executes it against a [`Target`]: nested calls in the
//! argument list run first, innermost outwards, and their results replace
//! them before the enclosing call is dispatched.

use std::collections::HashMap;

use mockall::automock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::eval::{DeferredCall, Value, ValueKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown method: {name}")]
    UnknownMethod { name: String },
    #[error("Method {name} expects {expected} arguments, got {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Method {name} expects {expected} for argument {index}, got {found}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: String,
        found: ValueKind,
    },
    #[error("Method {name} failed: {message}")]
    Failed { name: String, message: String },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Something deferred calls can be executed against.
#[automock]
pub trait Target {
    /// Invokes the method `name` with positional arguments.
    fn invoke(&mut self, name: &str, args: Vec<Value>) -> DispatchResult<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MethodRunner;

impl MethodRunner {
    pub fn new() -> Self {
        Self
    }

    /// Runs `values` against `target`.
    ///
    /// Anything other than a single deferred call is nothing to run and
    /// yields `Value::Null` without touching the target.
    pub fn run<T: Target + ?Sized>(
        &self,
        values: Vec<Value>,
        target: &mut T,
    ) -> DispatchResult<Value> {
        let mut values = values.into_iter();
        match (values.next(), values.next()) {
            (Some(Value::DeferredCall(call)), None) => self.dispatch(call, target),
            _ => {
                debug!("nothing to run");
                Ok(Value::Null)
            }
        }
    }

    // Deferred calls inside array arguments are passed through as they are.
    fn dispatch<T: Target + ?Sized>(
        &self,
        call: DeferredCall,
        target: &mut T,
    ) -> DispatchResult<Value> {
        let DeferredCall { name, args } = call;
        let args = args
            .into_iter()
            .map(|arg| match arg {
                Value::DeferredCall(inner) => self.dispatch(inner, target),
                other => Ok(other),
            })
            .collect::<DispatchResult<Vec<_>>>()?;

        debug!("dispatching {} with {} arguments", name, args.len());
        target.invoke(&name, args).map_err(|e| {
            warn!("dispatch of {} failed: {}", name, e);
            e
        })
    }
}

type Handler = Box<dyn FnMut(Vec<Value>) -> DispatchResult<Value> + Send>;

struct Registration {
    arity: Option<usize>,
    handler: Handler,
}

/// A [`Target`] backed by a table of named closures.
#[derive(Default)]
pub struct HandlerTarget {
    handlers: HashMap<String, Registration>,
}

impl HandlerTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous one. The
    /// handler validates its own arguments.
    pub fn register<S, F>(&mut self, name: S, handler: F) -> &mut Self
    where
        S: Into<String>,
        F: FnMut(Vec<Value>) -> DispatchResult<Value> + Send + 'static,
    {
        self.insert(name.into(), None, Box::new(handler))
    }

    /// Registers `handler` under `name`; calls with any other number of
    /// arguments fail with `DispatchError::ArgumentCount` before it runs.
    pub fn register_with_arity<S, F>(&mut self, name: S, arity: usize, handler: F) -> &mut Self
    where
        S: Into<String>,
        F: FnMut(Vec<Value>) -> DispatchResult<Value> + Send + 'static,
    {
        self.insert(name.into(), Some(arity), Box::new(handler))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn insert(&mut self, name: String, arity: Option<usize>, handler: Handler) -> &mut Self {
        self.handlers.insert(name, Registration { arity, handler });
        self
    }
}

impl Target for HandlerTarget {
    fn invoke(&mut self, name: &str, args: Vec<Value>) -> DispatchResult<Value> {
        let registration = self
            .handlers
            .get_mut(name)
            .ok_or_else(|| DispatchError::UnknownMethod {
                name: name.to_string(),
            })?;

        if let Some(expected) = registration.arity {
            if args.len() != expected {
                return Err(DispatchError::ArgumentCount {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                });
            }
        }

        (registration.handler)(args)
    }
}

impl std::fmt::Debug for HandlerTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerTarget")
            .field("handlers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    fn call(name: &str, args: Vec<Value>) -> Value {
        Value::DeferredCall(DeferredCall::new(name, args))
    }

    #[test]
    fn test_nothing_to_run() {
        let mut target = MockTarget::new();
        target.expect_invoke().never();
        let runner = MethodRunner::new();

        assert_eq!(runner.run(vec![], &mut target), Ok(Value::Null));
        assert_eq!(runner.run(vec![Value::Int(1)], &mut target), Ok(Value::Null));
        assert_eq!(
            runner.run(vec![call("a", vec![]), call("b", vec![])], &mut target),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_inner_calls_run_first() {
        let mut target = MockTarget::new();
        let mut seq = Sequence::new();

        target
            .expect_invoke()
            .withf(|name, args| name == "rand" && *args == vec![Value::Int(1), Value::Int(5)])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Value::Int(3)));
        target
            .expect_invoke()
            .withf(|name, args| name == "double" && *args == vec![Value::Int(3)])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Value::Int(6)));
        target
            .expect_invoke()
            .withf(|name, args| name == "now" && args.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Value::from("today")));
        target
            .expect_invoke()
            .withf(|name, args| {
                name == "pick"
                    && *args == vec![Value::Int(6), Value::from("today"), Value::Bool(true)]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Value::from("done")));

        // pick(double(rand(1, 5)), now(), true)
        let input = call(
            "pick",
            vec![
                call("double", vec![call("rand", vec![Value::Int(1), Value::Int(5)])]),
                call("now", vec![]),
                Value::Bool(true),
            ],
        );
        let result = MethodRunner::new().run(vec![input], &mut target);
        assert_eq!(result, Ok(Value::from("done")));
    }

    #[test]
    fn test_arrays_are_not_searched() {
        let mut target = MockTarget::new();
        let nested = Value::from(vec![call("inner", vec![])]);
        let expected = nested.clone();
        target
            .expect_invoke()
            .withf(move |name, args| name == "outer" && *args == vec![expected.clone()])
            .times(1)
            .returning(|_, _| Ok(Value::Null));

        let result = MethodRunner::new().run(vec![call("outer", vec![nested])], &mut target);
        assert_eq!(result, Ok(Value::Null));
    }

    #[test]
    fn test_failure_aborts_run() {
        let mut target = HandlerTarget::new();
        target.register("outer", |_| Ok(Value::from("unreachable")));

        let result = MethodRunner::new().run(
            vec![call("outer", vec![call("missing", vec![])])],
            &mut target,
        );
        assert_eq!(
            result,
            Err(DispatchError::UnknownMethod {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_handler_target_arity() {
        let mut target = HandlerTarget::new();
        target.register_with_arity("rand", 2, |args| {
            let min = args[0].as_int().unwrap_or_default();
            Ok(Value::Int(min))
        });

        assert!(target.contains("rand"));
        assert_eq!(
            target.invoke("rand", vec![Value::Int(4), Value::Int(9)]),
            Ok(Value::Int(4))
        );
        assert_eq!(
            target.invoke("rand", vec![Value::Int(4)]),
            Err(DispatchError::ArgumentCount {
                name: "rand".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_handler_target_keeps_state() {
        let mut calls = 0;
        let mut target = HandlerTarget::new();
        target.register("counter", move |_| {
            calls += 1;
            Ok(Value::Int(calls))
        });

        target.invoke("counter", vec![]).unwrap();
        assert_eq!(target.invoke("counter", vec![]), Ok(Value::Int(2)));
    }
}
