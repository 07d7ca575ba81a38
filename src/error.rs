use thiserror::Error;

use crate::eval::EvalError;
use crate::parser::ParseError;
use crate::runner::DispatchError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("Config error: {0}")]
    Config(String),
}

pub type PrimitivesResult<T> = Result<T, Error>;
