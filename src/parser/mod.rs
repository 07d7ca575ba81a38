//! Grammar for PHP-literal-like argument lists.
//!
//! An input is first split on its top-level commas ([`split`]), then every
//! segment is parsed on its own into a [`Node`] tree with nom. One bad
//! segment aborts the whole parse; there is no recovery.
//!
//! ```text
//! expression := "-"* primary
//! primary    := number | string | array | variable | call | identifier
//!             | "(" expression ")"
//! array      := "[" entries "]" | "array" "(" entries ")"
//! entries    := (expression ("=>" expression)?) ("," ...)* ","?
//! variable   := "$" identifier ("->" identifier)*
//! call       := identifier "(" ((identifier ":")? expression) ("," ...)* ","? ")"
//! ```

pub mod literal;
pub mod split;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, not, opt, peek},
    error::{context, VerboseError},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use thiserror::Error;
use tracing::instrument;

use crate::ast::{Argument, ArrayEntry, NamedArgument, Node};
use crate::config::ParserConfig;

use self::literal::{parse_number, parse_string_literal};
use self::split::{split_top_level, Segment};

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unbalanced delimiter '{delimiter}' at position {position}")]
    UnbalancedDelimiter { delimiter: char, position: usize },
    #[error("Unterminated string starting with {quote} at position {position}")]
    UnterminatedString { quote: char, position: usize },
    #[error("Empty argument at index {index}")]
    EmptyArgument { index: usize },
    #[error("Nesting deeper than {limit} levels at position {position}")]
    TooDeep { limit: usize, position: usize },
    #[error("Invalid syntax in argument {index} at position {position} `{segment}`: {message}")]
    InvalidSegment {
        index: usize,
        position: usize,
        segment: String,
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parses every top-level argument of `input` into an expression tree.
    #[instrument(level = "debug", skip(self))]
    pub fn parse(&self, input: &str) -> Result<Vec<Node>, ParseError> {
        self.segments(input)?
            .into_iter()
            .enumerate()
            .map(|(index, segment)| parse_segment(index, segment.offset, segment.text))
            .collect()
    }

    /// Splits a call-like argument list into raw argument texts, each with
    /// its optional `name:` prefix removed and returned separately. Every
    /// argument is checked to parse, but none is evaluated.
    #[instrument(level = "debug", skip(self))]
    pub fn parse_named_arguments(&self, input: &str) -> Result<Vec<NamedArgument>, ParseError> {
        self.segments(input)?
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let (text, name) = match argument_name(segment.text) {
                    Ok((rest, name)) => (rest.trim(), Some(name.to_string())),
                    Err(_) => (segment.text, None),
                };
                let position = segment.offset + segment.text.len() - text.len();
                parse_segment(index, position, text).map(|_| NamedArgument {
                    text: text.to_string(),
                    name,
                })
            })
            .collect()
    }

    /// Returns the raw text of every top-level argument, after checking that
    /// each one parses.
    #[instrument(level = "debug", skip(self))]
    pub fn split_arguments(&self, input: &str) -> Result<Vec<String>, ParseError> {
        self.segments(input)?
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                parse_segment(index, segment.offset, segment.text)
                    .map(|_| segment.text.to_string())
            })
            .collect()
    }

    fn segments<'a>(&self, input: &'a str) -> Result<Vec<Segment<'a>>, ParseError> {
        split_top_level(input, self.config.max_depth)
    }
}

pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    Parser::default().parse(input)
}

pub fn parse_named_arguments(input: &str) -> Result<Vec<NamedArgument>, ParseError> {
    Parser::default().parse_named_arguments(input)
}

pub fn split_arguments(input: &str) -> Result<Vec<String>, ParseError> {
    Parser::default().split_arguments(input)
}

fn parse_segment(index: usize, position: usize, text: &str) -> Result<Node, ParseError> {
    match all_consuming(ws(parse_expression))(text) {
        Ok((_, node)) => Ok(node),
        Err(e) => {
            let message = match e {
                nom::Err::Incomplete(needed) => format!("Incomplete input, {:?}", needed),
                nom::Err::Error(e) | nom::Err::Failure(e) => nom::error::convert_error(text, e),
            };
            tracing::debug!("segment {} failed to parse: {}", index, message);
            Err(ParseError::InvalidSegment {
                index,
                position,
                segment: text.to_string(),
                message,
            })
        }
    }
}

// `name:` prefix of a named argument; `::` is not a name separator
fn argument_name(input: &str) -> ParserResult<&str> {
    terminated(identifier, tuple((multispace0, char(':'), not(char(':')))))(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_expression(input: &str) -> ParserResult<Node> {
    context(
        "expression",
        map(
            pair(many0(ws(char('-'))), parse_primary),
            |(signs, operand)| signs.into_iter().fold(operand, |node, _| Node::negate(node)),
        ),
    )(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_primary(input: &str) -> ParserResult<Node> {
    ws(alt((
        parse_number,
        parse_string_literal,
        parse_array,
        parse_variable,
        parse_call,
        map(identifier, |name| Node::Identifier(name.to_string())),
        delimited(char('('), parse_expression, ws(char(')'))),
    )))(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_array(input: &str) -> ParserResult<Node> {
    context(
        "array",
        map(
            alt((
                delimited(char('['), parse_array_entries, ws(char(']'))),
                preceded(
                    terminated(tag_no_case("array"), peek(ws(char('(')))),
                    delimited(ws(char('(')), parse_array_entries, ws(char(')'))),
                ),
            )),
            Node::ArrayLiteral,
        ),
    )(input)
}

fn parse_array_entries(input: &str) -> ParserResult<Vec<ArrayEntry>> {
    terminated(
        separated_list0(ws(char(',')), parse_array_entry),
        opt(ws(char(','))),
    )(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_array_entry(input: &str) -> ParserResult<ArrayEntry> {
    map(
        pair(parse_expression, opt(preceded(ws(tag("=>")), parse_expression))),
        |(first, second)| match second {
            Some(value) => ArrayEntry::keyed(first, value),
            None => ArrayEntry::positional(first),
        },
    )(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_variable(input: &str) -> ParserResult<Node> {
    context(
        "variable",
        map(
            preceded(
                char('$'),
                pair(identifier, many0(preceded(ws(tag("->")), identifier))),
            ),
            |(head, tail)| {
                let mut segments = vec![head.to_string()];
                segments.extend(tail.into_iter().map(String::from));
                Node::VariablePath(segments)
            },
        ),
    )(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_call(input: &str) -> ParserResult<Node> {
    context(
        "call",
        map(
            pair(
                identifier,
                delimited(ws(char('(')), parse_arguments, ws(char(')'))),
            ),
            |(name, args)| Node::Call {
                name: name.to_string(),
                args,
            },
        ),
    )(input)
}

fn parse_arguments(input: &str) -> ParserResult<Vec<Argument>> {
    terminated(
        separated_list0(ws(char(',')), parse_argument),
        opt(ws(char(','))),
    )(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_argument(input: &str) -> ParserResult<Argument> {
    alt((
        map(pair(argument_name, parse_expression), |(name, value)| {
            Argument::Named {
                name: name.to_string(),
                value,
            }
        }),
        map(parse_expression, Argument::Positional),
    ))(input)
}

fn identifier(input: &str) -> ParserResult<&str> {
    let id_chars = |c: char| c.is_alphanumeric() || c == '_';
    let start_chars = |c: char| c.is_alphabetic() || c == '_';

    take_while1(start_chars)(input).and_then(|(rest, first)| {
        let (rest, others) = take_while(id_chars)(rest)?;
        Ok((rest, &input[..first.len() + others.len()]))
    })
}

/// Skips surrounding whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> ParserResult<'a, O>
where
    F: FnMut(&'a str) -> ParserResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}
