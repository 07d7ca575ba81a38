use core::fmt;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use super::evaluator::EvalError;

lazy_static! {
    // Leading-numeric prefix of a string, the way PHP reads "5 apples".
    static ref NUMERIC_PREFIX: Regex =
        Regex::new(r"^[ \t\n\r\v\f]*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")
            .unwrap_or_else(|e| panic!("invalid numeric prefix pattern: {}", e));
}

/// Runtime value produced by evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Array),
    DeferredCall(DeferredCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ValueKind {
    #[strum(serialize = "null")]
    Null,
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "float")]
    Float,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "array")]
    Array,
    #[strum(serialize = "deferred call")]
    DeferredCall,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::DeferredCall(_) => ValueKind::DeferredCall,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_deferred_call(&self) -> Option<&DeferredCall> {
        match self {
            Value::DeferredCall(call) => Some(call),
            _ => None,
        }
    }

    /// Numeric reading of a scalar: ints and floats as they are, booleans
    /// and null as 0/1, strings by their leading numeric prefix.
    /// Arrays, deferred calls and strings without a numeric prefix have none.
    pub fn to_number(&self) -> Option<Value> {
        match self {
            Value::Int(_) | Value::Float(_) => Some(self.clone()),
            Value::Bool(b) => Some(Value::Int(i64::from(*b))),
            Value::Null => Some(Value::Int(0)),
            Value::String(s) => numeric_prefix(s),
            Value::Array(_) | Value::DeferredCall(_) => None,
        }
    }
}

fn numeric_prefix(s: &str) -> Option<Value> {
    let number = NUMERIC_PREFIX.captures(s)?.get(1)?.as_str();
    if number.contains(['.', 'e', 'E']) {
        return number.parse::<f64>().ok().map(Value::Float);
    }
    // integral strings too large for i64 fall back to float
    number
        .parse::<i64>()
        .map(Value::Int)
        .or_else(|_| number.parse::<f64>().map(Value::Float))
        .ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => write!(f, "1"),
            Value::Bool(false) => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_nan() => write!(f, "NAN"),
            Value::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x > 0.0 { "INF" } else { "-INF" })
            }
            Value::Float(x) if *x != 0.0 && (x.abs() >= 1e15 || x.abs() < 1e-4) => {
                write_exponent(f, *x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) => write!(f, "Array"),
            Value::DeferredCall(call) => write!(f, "{}(...)", call.name),
        }
    }
}

/// A call that evaluation described but did not execute.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredCall {
    pub name: String,
    pub args: Vec<Value>,
}

// PHP style: `1.0E+25`, `1.5E-7`
fn write_exponent(f: &mut fmt::Formatter, x: f64) -> fmt::Result {
    let formatted = format!("{:e}", x);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let point = if mantissa.contains('.') { "" } else { ".0" };
    let sign = if exponent.starts_with('-') { "" } else { "+" };
    write!(f, "{}{}E{}{}", mantissa, point, sign, exponent)
}

impl DeferredCall {
    pub fn new<S: Into<String>>(name: S, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl ArrayKey {
    /// Normalizes a value into an array key the way PHP does.
    pub fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Int(i) => Ok(ArrayKey::Int(*i)),
            Value::Bool(b) => Ok(ArrayKey::Int(i64::from(*b))),
            Value::Float(f) => Ok(ArrayKey::Int(f.trunc() as i64)),
            Value::Null => Ok(ArrayKey::Str(String::new())),
            Value::String(s) => Ok(ArrayKey::from(s.as_str())),
            Value::Array(_) | Value::DeferredCall(_) => Err(EvalError::IllegalKey {
                found: value.kind(),
            }),
        }
    }
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self {
        ArrayKey::Int(i)
    }
}

// "7" and "-3" are integer keys, "07", "+7" and "-0" stay strings
impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(i) if i.to_string() == s => ArrayKey::Int(i),
            _ => ArrayKey::Str(s.to_string()),
        }
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        match ArrayKey::from(s.as_str()) {
            ArrayKey::Int(i) => ArrayKey::Int(i),
            ArrayKey::Str(_) => ArrayKey::Str(s),
        }
    }
}

impl From<ArrayKey> for Value {
    fn from(key: ArrayKey) -> Self {
        match key {
            ArrayKey::Int(i) => Value::Int(i),
            ArrayKey::Str(s) => Value::String(s),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{}", i),
            ArrayKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Insertion-ordered PHP array.
#[derive(Debug, Clone, Default)]
pub struct Array {
    entries: IndexMap<ArrayKey, Value>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the next free integer index and returns it. `None` when
    /// the largest integer key is already `i64::MAX`.
    pub fn push(&mut self, value: Value) -> Option<ArrayKey> {
        let next = self
            .entries
            .keys()
            .filter_map(|key| match key {
                ArrayKey::Int(i) => Some(*i),
                ArrayKey::Str(_) => None,
            })
            .max()
            .map_or(Some(0), |max| max.checked_add(1))?;
        self.entries.insert(ArrayKey::Int(next), value);
        Some(ArrayKey::Int(next))
    }

    /// Inserts or overwrites; an overwritten entry keeps its position.
    pub fn insert<K: Into<ArrayKey>>(&mut self, key: K, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get<K: Into<ArrayKey>>(&self, key: K) -> Option<&Value> {
        self.entries.get(&key.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, ArrayKey, Value> {
        self.entries.iter()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, ArrayKey, Value> {
        self.entries.values()
    }

    /// True when the keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(index, key)| *key == ArrayKey::Int(index as i64))
    }
}

// order-sensitive, unlike IndexMap's own equality
impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .enumerate()
                .map(|(index, value)| (ArrayKey::Int(index as i64), value))
                .collect(),
        }
    }
}

impl<K: Into<ArrayKey>> FromIterator<(K, Value)> for Array {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

impl IntoIterator for Array {
    type Item = (ArrayKey, Value);
    type IntoIter = indexmap::map::IntoIter<ArrayKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = (&'a ArrayKey, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, ArrayKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values.into_iter().collect())
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<DeferredCall> for Value {
    fn from(call: DeferredCall) -> Self {
        Value::DeferredCall(call)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Array(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
