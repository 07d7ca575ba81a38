use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use crate::{Error, PrimitivesResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PrimitivesConfig {
    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParserConfig {
    // brackets, parentheses and unary minus signs combined
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EvaluatorConfig {
    #[serde(default)]
    pub unary_minus: UnaryMinusPolicy,

    // shadows the built-in constant table
    #[serde(default = "HashMap::new")]
    pub constants: HashMap<String, serde_json::Value>,
}

/// What `-x` does when `x` has no numeric reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnaryMinusPolicy {
    /// Fail with `EvalError::UnsupportedOperand`.
    #[default]
    Strict,
    /// Treat the operand as zero.
    Lenient,
}

fn default_max_depth() -> usize {
    64
}

impl PrimitivesConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> PrimitivesResult<Self> {
        from_file(path)
    }

    pub fn from_json_str(s: &str) -> PrimitivesResult<Self> {
        from_str(s)
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> PrimitivesResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> PrimitivesResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}
