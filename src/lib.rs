//! # primitives: PHP-style literal arguments with deferred calls
//!
//! Turns a comma-separated argument string written in a small PHP-literal
//! syntax into runtime values:
//!
//! ```text
//! randomElements(['a', 'b', 'c'], rand(1, 5)), M_PI, $user->name, -0x1F
//! ```
//!
//! Numbers, strings, arrays, constants and `$variable->paths` become plain
//! [`Value`]s. Function calls, and bare words that are not known constants,
//! become [`DeferredCall`]s: descriptions of calls that are only executed
//! later, by the [`MethodRunner`], against a host object implementing
//! [`Target`].
//!
//! ## Pipeline
//!
//! ```text
//! input → Parser → Node trees → Evaluator (+ Context) → Values → MethodRunner (+ Target)
//! ```
//!
//! - [`parser`] splits the input on top-level commas and parses every
//!   argument into an [`ast::Node`].
//! - [`eval`] turns nodes into values, reading variables from a [`Context`].
//! - [`runner`] dispatches a deferred call tree, innermost calls first.
//!
//! [`Primitives`] bundles the three behind one configured entry point.

pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod parser;
pub mod runner;

// Re-exports
pub use ast::*;
pub use config::{EvaluatorConfig, ParserConfig, PrimitivesConfig, UnaryMinusPolicy};
pub use error::*;
pub use eval::{
    Array, ArrayKey, Context, DeferredCall, EvalError, EvalResult, Evaluator, Value, ValueKind,
};
pub use parser::{ParseError, Parser};
pub use runner::{DispatchError, DispatchResult, HandlerTarget, MethodRunner, Target};

use tracing::instrument;

/// Result of [`Primitives::parse_method`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMethod {
    /// `name(args...)`, with the arguments evaluated.
    Method { name: String, args: Vec<Value> },
    /// The input was not shaped like a call and was evaluated as a plain
    /// argument list.
    Values(Vec<Value>),
}

#[derive(Debug, Clone, Default)]
pub struct Primitives {
    parser: Parser,
    evaluator: Evaluator,
    runner: MethodRunner,
}

impl Primitives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PrimitivesConfig) -> Self {
        Self {
            parser: Parser::new(config.parser),
            evaluator: Evaluator::new(config.evaluator),
            runner: MethodRunner::new(),
        }
    }

    /// Parses `input` and evaluates every argument against `context`.
    #[instrument(level = "debug", skip(self, context))]
    pub fn parse_string(&self, input: &str, context: &Context) -> PrimitivesResult<Vec<Value>> {
        let nodes = self.parser.parse(input)?;
        Ok(self.evaluator.evaluate_all(&nodes, context)?)
    }

    /// Same pipeline as [`parse_string`](Self::parse_string); calls, nested
    /// ones included, come back as [`DeferredCall`]s ready for
    /// [`run_values`](Self::run_values).
    pub fn parse_methods(&self, input: &str, context: &Context) -> PrimitivesResult<Vec<Value>> {
        self.parse_string(input, context)
    }

    /// Splits `name(args...)` into the method name and its evaluated
    /// arguments.
    ///
    /// Input that does not end in `)` is evaluated as a plain argument list
    /// instead. Returns `None` when the input ends in `)` but has no `(` or
    /// the part before the first `(` is not a valid name.
    #[instrument(level = "debug", skip(self, context))]
    pub fn parse_method(
        &self,
        input: &str,
        context: &Context,
    ) -> PrimitivesResult<Option<ParsedMethod>> {
        let input = input.trim();
        let Some(inner) = input.strip_suffix(')') else {
            return Ok(Some(ParsedMethod::Values(
                self.parse_string(input, context)?,
            )));
        };

        let Some((name, args)) = inner.split_once('(') else {
            return Ok(None);
        };
        let name = name.trim_end();
        if !is_method_name(name) {
            tracing::debug!("{:?} is not a method name", name);
            return Ok(None);
        }

        Ok(Some(ParsedMethod::Method {
            name: name.to_string(),
            args: self.parse_string(args, context)?,
        }))
    }

    /// Raw text of every top-level argument.
    pub fn split_arguments(&self, input: &str) -> PrimitivesResult<Vec<String>> {
        Ok(self.parser.split_arguments(input)?)
    }

    /// Raw text and optional `name:` of every top-level argument.
    pub fn split_named_arguments(&self, input: &str) -> PrimitivesResult<Vec<NamedArgument>> {
        Ok(self.parser.parse_named_arguments(input)?)
    }

    /// Parses and evaluates `input`, then runs it against `target` if it is
    /// a single call. Anything else yields `Value::Null`.
    #[instrument(level = "debug", skip(self, context, target))]
    pub fn run<T: Target + ?Sized>(
        &self,
        input: &str,
        context: &Context,
        target: &mut T,
    ) -> PrimitivesResult<Value> {
        let values = self.parse_methods(input, context)?;
        self.run_values(values, target)
    }

    /// Runs already evaluated values against `target`.
    pub fn run_values<T: Target + ?Sized>(
        &self,
        values: Vec<Value>,
        target: &mut T,
    ) -> PrimitivesResult<Value> {
        Ok(self.runner.run(values, target)?)
    }
}

fn is_method_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }

    #[test]
    fn test_parse_method() {
        let primitives = Primitives::new();
        let context = Context::new();

        assert_eq!(
            primitives
                .parse_method(r#"randomElement(["foo", "bar"], 3)"#, &context)
                .unwrap(),
            Some(ParsedMethod::Method {
                name: "randomElement".to_string(),
                args: vec![
                    Value::from(vec![Value::from("foo"), Value::from("bar")]),
                    Value::Int(3)
                ],
            })
        );
        assert_eq!(
            primitives
                .parse_method(r#"invalidSyntax"one,two")"#, &context)
                .unwrap(),
            None
        );
        assert_eq!(
            primitives.parse_method("1, 'two'", &context).unwrap(),
            Some(ParsedMethod::Values(vec![Value::Int(1), Value::from("two")]))
        );
    }

    #[test]
    fn test_parse_method_uses_context() {
        let primitives = Primitives::new();
        let context = Context::new().with("limit", 4i64);

        assert_eq!(
            primitives.parse_method("  take ($limit) ", &context).unwrap(),
            Some(ParsedMethod::Method {
                name: "take".to_string(),
                args: vec![Value::Int(4)],
            })
        );
    }

    #[test]
    fn test_parse_method_bad_name() {
        let primitives = Primitives::new();
        assert_eq!(
            primitives
                .parse_method("1abc(2)", &Context::new())
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_with_config() {
        let config = PrimitivesConfig::from_json_str(
            r#"{ "parser": { "max_depth": 1 }, "evaluator": { "unary_minus": "lenient" } }"#,
        )
        .unwrap();
        let primitives = Primitives::with_config(config);
        let context = Context::new();

        assert_eq!(
            primitives.parse_string("-'abc'", &context).unwrap(),
            vec![Value::Int(0)]
        );
        assert!(matches!(
            primitives.parse_string("[[1]]", &context),
            Err(Error::Syntax(ParseError::TooDeep { limit: 1, .. }))
        ));
    }

    #[test]
    fn test_errors_convert() {
        let primitives = Primitives::new();
        let context = Context::new();

        assert!(matches!(
            primitives.parse_string("-[1]", &context),
            Err(Error::Eval(EvalError::UnsupportedOperand { .. }))
        ));
        assert!(matches!(
            primitives.run("missing()", &context, &mut HandlerTarget::new()),
            Err(Error::Dispatch(DispatchError::UnknownMethod { .. }))
        ));
    }

    #[test]
    fn test_method_name() {
        assert!(is_method_name("randomElements"));
        assert!(is_method_name("_x1"));
        assert!(!is_method_name(""));
        assert!(!is_method_name("a b"));
        assert!(!is_method_name(r#"invalidSyntax"one,two""#));
    }
}
