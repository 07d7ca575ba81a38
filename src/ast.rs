use core::fmt;

// Expression tree produced by the parser, one root per top-level argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    UnaryMinus(Box<Node>),
    // true / false / null, a named constant, or an unknown word
    Identifier(String),
    ArrayLiteral(Vec<ArrayEntry>),
    // $a->b->c => ["a", "b", "c"]
    VariablePath(Vec<String>),
    Call { name: String, args: Vec<Argument> },
}

impl Node {
    pub fn int(value: i64) -> Self {
        Node::IntLiteral(value)
    }

    pub fn string<S: Into<String>>(value: S) -> Self {
        Node::StringLiteral(value.into())
    }

    pub fn ident<S: Into<String>>(name: S) -> Self {
        Node::Identifier(name.into())
    }

    pub fn negate(node: Node) -> Self {
        Node::UnaryMinus(Box::new(node))
    }

    pub fn variable<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::VariablePath(segments.into_iter().map(Into::into).collect())
    }

    pub fn call<S: Into<String>>(name: S, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            args: args.into_iter().map(Argument::Positional).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEntry {
    pub key: Option<Node>,
    pub value: Node,
}

impl ArrayEntry {
    pub fn positional(value: Node) -> Self {
        Self { key: None, value }
    }

    pub fn keyed(key: Node, value: Node) -> Self {
        Self {
            key: Some(key),
            value,
        }
    }
}

// Call arguments. The name of a named argument is kept for inspection only;
// evaluation treats both forms positionally.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Named { name: String, value: Node },
    Positional(Node),
}

impl Argument {
    pub fn value(&self) -> &Node {
        match self {
            Argument::Named { value, .. } => value,
            Argument::Positional(value) => value,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Argument::Named { name, .. } => Some(name),
            Argument::Positional(_) => None,
        }
    }
}

/// A top-level argument split out of a call-like argument list without
/// being evaluated. `text` is the raw source of the value, `name` the
/// optional `name:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArgument {
    pub text: String,
    pub name: Option<String>,
}

impl fmt::Display for NamedArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}
