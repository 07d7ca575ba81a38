//! Numeric and string literal parsers.
//!
//! Numbers follow PHP's literal rules: decimal, octal (`0755`, `0o755`),
//! binary (`0b1010`) and hexadecimal (`0x1F`) integers, and floats written
//! with a decimal point and/or an exponent. Integer literals that do not fit
//! into an `i64` become floats, as PHP does.
//!
//! Strings come in the two PHP flavours. Single-quoted strings only know the
//! `\'` and `\\` escapes; double-quoted strings understand the usual control
//! escapes plus octal, hex and unicode code points. Interpolation is not
//! supported, so `$` inside a double-quoted string is plain text.

use std::iter::Peekable;
use std::str::CharIndices;

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, digit0, digit1, hex_digit1, oct_digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    error::{context, ErrorKind, ParseError as NomParseError, VerboseError},
    sequence::{preceded, tuple},
};
use tracing::instrument;

use super::ParserResult;
use crate::ast::Node;

#[instrument(level = "debug", skip(input))]
pub fn parse_number(input: &str) -> ParserResult<Node> {
    context("number", alt((parse_float, parse_integer)))(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_float(input: &str) -> ParserResult<Node> {
    context(
        "float literal",
        map_res(
            alt((
                recognize(tuple((digit1, char('.'), digit0, opt(exponent)))),
                recognize(tuple((char('.'), digit1, opt(exponent)))),
                recognize(tuple((digit1, exponent))),
            )),
            |s: &str| s.parse::<f64>().map(Node::FloatLiteral),
        ),
    )(input)
}

fn exponent(input: &str) -> ParserResult<&str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

#[instrument(level = "debug", skip(input))]
fn parse_integer(input: &str) -> ParserResult<Node> {
    context(
        "integer literal",
        alt((
            map(preceded(tag_no_case("0x"), hex_digit1), |digits| {
                integer_node(digits, 16)
            }),
            map(
                preceded(
                    tag_no_case("0b"),
                    take_while1(|c: char| c == '0' || c == '1'),
                ),
                |digits| integer_node(digits, 2),
            ),
            map(preceded(tag_no_case("0o"), oct_digit1), |digits| {
                integer_node(digits, 8)
            }),
            map_res(digit1, decimal_or_octal),
        )),
    )(input)
}

// A leading zero switches to octal; `089` is not a valid literal.
fn decimal_or_octal(digits: &str) -> Result<Node, &'static str> {
    if digits.len() > 1 && digits.starts_with('0') {
        if digits.chars().all(|c| c.is_digit(8)) {
            Ok(integer_node(digits, 8))
        } else {
            Err("invalid octal literal")
        }
    } else {
        Ok(integer_node(digits, 10))
    }
}

fn integer_node(digits: &str, radix: u32) -> Node {
    match i64::from_str_radix(digits, radix) {
        Ok(value) => Node::IntLiteral(value),
        Err(_) => Node::FloatLiteral(digits.chars().fold(0.0, |acc, c| {
            acc * f64::from(radix) + c.to_digit(radix).map(f64::from).unwrap_or_default()
        })),
    }
}

#[instrument(level = "debug", skip(input))]
pub fn parse_string_literal(input: &str) -> ParserResult<Node> {
    context("string literal", map(parse_quoted, Node::StringLiteral))(input)
}

/// Parses a single- or double-quoted string and returns its unescaped
/// content.
pub fn parse_quoted(input: &str) -> ParserResult<String> {
    let mut chars = input.char_indices().peekable();
    let quote = match chars.next() {
        Some((_, quote @ ('\'' | '"'))) => quote,
        _ => return Err(nom_error(input, ErrorKind::Char)),
    };

    let mut content = String::new();
    while let Some((position, c)) = chars.next() {
        if c == quote {
            return Ok((&input[position + c.len_utf8()..], content));
        }
        if c != '\\' {
            content.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            break;
        };
        if quote == '\'' {
            unescape_single(escaped, &mut content);
        } else {
            unescape_double(escaped, &mut chars, &mut content);
        }
    }

    Err(nom_error(input, ErrorKind::Eof))
}

fn unescape_single(escaped: char, content: &mut String) {
    match escaped {
        '\'' | '\\' => content.push(escaped),
        other => {
            content.push('\\');
            content.push(other);
        }
    }
}

fn unescape_double(escaped: char, chars: &mut Peekable<CharIndices>, content: &mut String) {
    match escaped {
        '"' | '\\' | '$' => content.push(escaped),
        'n' => content.push('\n'),
        't' => content.push('\t'),
        'r' => content.push('\r'),
        'v' => content.push('\u{0B}'),
        'e' => content.push('\u{1B}'),
        'f' => content.push('\u{0C}'),
        '0'..='7' => {
            let mut code = escaped.to_digit(8).unwrap_or_default();
            for _ in 0..2 {
                match chars.peek().and_then(|(_, c)| c.to_digit(8)) {
                    Some(digit) => {
                        code = code * 8 + digit;
                        chars.next();
                    }
                    None => break,
                }
            }
            // PHP works on bytes; \400 and above wrap around
            content.push(char::from((code & 0xFF) as u8));
        }
        'x' => {
            let mut code = None;
            for _ in 0..2 {
                match chars.peek().and_then(|(_, c)| c.to_digit(16)) {
                    Some(digit) => {
                        code = Some(code.unwrap_or(0) * 16 + digit);
                        chars.next();
                    }
                    None => break,
                }
            }
            match code {
                Some(code) => content.push(char::from(code as u8)),
                None => content.push_str("\\x"),
            }
        }
        'u' => unescape_unicode(chars, content),
        other => {
            content.push('\\');
            content.push(other);
        }
    }
}

// \u{1F600}; anything malformed is kept verbatim
fn unescape_unicode(chars: &mut Peekable<CharIndices>, content: &mut String) {
    if chars.peek().map(|(_, c)| *c) != Some('{') {
        content.push_str("\\u");
        return;
    }
    chars.next();

    let mut digits = String::new();
    while let Some((_, c)) = chars.peek() {
        if !c.is_ascii_hexdigit() {
            break;
        }
        digits.push(*c);
        chars.next();
    }

    let closed = chars.peek().map(|(_, c)| *c) == Some('}');
    let decoded = u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .filter(|_| closed);
    match decoded {
        Some(c) => {
            chars.next();
            content.push(c);
        }
        None => {
            content.push_str("\\u{");
            content.push_str(&digits);
        }
    }
}

fn nom_error(input: &str, kind: ErrorKind) -> nom::Err<VerboseError<&str>> {
    nom::Err::Error(VerboseError::from_error_kind(input, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_literals() {
        let cases = [
            ("0", 0),
            ("42", 42),
            ("0123", 83),
            ("0o17", 15),
            ("0b11111111", 255),
            ("0B101", 5),
            ("0x1F", 31),
            ("9223372036854775807", i64::MAX),
        ];

        for (input, expected) in cases {
            let (rest, node) = parse_number(input).unwrap();
            assert_eq!(rest, "", "input: {}", input);
            assert_eq!(node, Node::IntLiteral(expected), "input: {}", input);
        }
    }

    #[test]
    fn test_integer_overflow_becomes_float() {
        let (_, node) = parse_number("9223372036854775808").unwrap();
        assert_eq!(node, Node::FloatLiteral(9223372036854775808.0));

        let (_, node) = parse_number("0xFFFFFFFFFFFFFFFF").unwrap();
        assert_eq!(node, Node::FloatLiteral(18446744073709551615.0));
    }

    #[test]
    fn test_invalid_octal() {
        assert!(parse_number("089").is_err());
    }

    #[test]
    fn test_float_literals() {
        let cases = [
            ("32.32", 32.32),
            ("1.", 1.0),
            (".5", 0.5),
            ("1e3", 1000.0),
            ("2.5E-3", 0.0025),
            ("1.5e+2", 150.0),
        ];

        for (input, expected) in cases {
            let (rest, node) = parse_number(input).unwrap();
            assert_eq!(rest, "", "input: {}", input);
            assert_eq!(node, Node::FloatLiteral(expected), "input: {}", input);
        }
    }

    #[test]
    fn test_number_stops_at_delimiter() {
        let (rest, node) = parse_number("12, 3").unwrap();
        assert_eq!(node, Node::IntLiteral(12));
        assert_eq!(rest, ", 3");
    }

    #[test]
    fn test_single_quoted() {
        let (rest, s) = parse_quoted(r"'it\'s a \\ \n'").unwrap();
        assert_eq!(rest, "");
        assert_eq!(s, r"it's a \ \n");
    }

    #[test]
    fn test_double_quoted() {
        let (rest, s) = parse_quoted(r#""say \"hi\"\n\t\$x \q""#).unwrap();
        assert_eq!(rest, "");
        assert_eq!(s, "say \"hi\"\n\t$x \\q");
    }

    #[test]
    fn test_double_quoted_code_points() {
        let (_, s) = parse_quoted(r#""\101\x42\u{1F600}""#).unwrap();
        assert_eq!(s, "AB\u{1F600}");

        let (_, s) = parse_quoted(r#""\xZZ\u{zz}""#).unwrap();
        assert_eq!(s, "\\xZZ\\u{zz}");
    }

    #[test]
    fn test_quote_of_the_other_kind_is_plain() {
        let (_, s) = parse_quoted(r#"'""'"#).unwrap();
        assert_eq!(s, "\"\"");
        let (_, s) = parse_quoted(r#""''""#).unwrap();
        assert_eq!(s, "''");
    }

    #[test]
    fn test_unterminated_string() {
        assert!(parse_quoted("'open").is_err());
        assert!(parse_quoted(r#""trailing\"#).is_err());
    }

    #[test]
    fn test_string_leaves_rest() {
        let (rest, node) = parse_string_literal("'a', 'b'").unwrap();
        assert_eq!(node, Node::StringLiteral("a".to_string()));
        assert_eq!(rest, ", 'b'");
    }
}
