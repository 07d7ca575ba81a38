use super::ParseError;

/// One top-level argument of an input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Splits `input` on commas that are not nested inside brackets,
/// parentheses or quotes.
///
/// Delimiters must balance and strings must be closed. A single trailing
/// comma is accepted; any other empty argument is an error. Whitespace-only
/// input yields no segments.
///
/// Every opening bracket and every unary minus nests the expression one
/// level deeper; more than `max_depth` levels is [`ParseError::TooDeep`].
pub fn split_top_level(input: &str, max_depth: usize) -> Result<Vec<Segment<'_>>, ParseError> {
    let mut segments = Vec::new();
    // (opener, position, depth inside it)
    let mut open: Vec<(char, usize, usize)> = Vec::new();
    let mut start = 0;
    let mut signs = 0;
    let mut previous: Option<char> = None;
    let mut chars = input.char_indices();

    while let Some((position, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let depth = open.last().map_or(0, |&(_, _, depth)| depth);
        if c == '-' && (signs > 0 || starts_operand(previous)) {
            signs += 1;
            if depth + signs > max_depth {
                return Err(ParseError::TooDeep {
                    limit: max_depth,
                    position,
                });
            }
            previous = Some(c);
            continue;
        }
        let nested = depth + signs + 1;
        signs = 0;
        previous = Some(c);

        match c {
            '\'' | '"' => {
                let mut closed = false;
                while let Some((_, next)) = chars.next() {
                    if next == '\\' {
                        chars.next();
                    } else if next == c {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ParseError::UnterminatedString { quote: c, position });
                }
            }
            '(' | '[' => {
                if nested > max_depth {
                    return Err(ParseError::TooDeep {
                        limit: max_depth,
                        position,
                    });
                }
                open.push((c, position, nested));
            }
            ')' | ']' => match open.pop() {
                Some((opener, _, _)) if closer_of(opener) == c => {}
                _ => {
                    return Err(ParseError::UnbalancedDelimiter {
                        delimiter: c,
                        position,
                    })
                }
            },
            ',' if open.is_empty() => {
                segments.push(segment(input, start, position));
                start = position + 1;
                previous = None;
            }
            _ => {}
        }
    }

    if let Some((opener, position, _)) = open.pop() {
        return Err(ParseError::UnbalancedDelimiter {
            delimiter: opener,
            position,
        });
    }

    let last = segment(input, start, input.len());
    if segments.is_empty() && last.text.is_empty() {
        return Ok(segments);
    }
    if !last.text.is_empty() {
        segments.push(last);
    }

    match segments.iter().position(|s| s.text.is_empty()) {
        Some(index) => Err(ParseError::EmptyArgument { index }),
        None => Ok(segments),
    }
}

// A `-` after one of these is a sign rather than part of `->` or `1e-5`.
fn starts_operand(previous: Option<char>) -> bool {
    matches!(previous, None | Some('(' | '[' | ',' | '>' | ':'))
}

fn closer_of(opener: char) -> char {
    if opener == '(' {
        ')'
    } else {
        ']'
    }
}

fn segment(input: &str, start: usize, end: usize) -> Segment<'_> {
    let raw = &input[start..end];
    let leading = raw.len() - raw.trim_start().len();
    Segment {
        text: raw.trim(),
        offset: start + leading,
    }
}
