//! Query string compiler.
//!
//! Built from `nom` combinators over `VerboseError`. Every committed branch
//! is wrapped in `cut`, so the innermost `context` names the failure and its
//! input gives the byte position reported in `DemoError::QuerySyntax`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{anychar, char, one_of, satisfy},
    combinator::{cut, eof, map, map_opt, peek, recognize, value},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{fold_many0, many0, many1},
    sequence::{delimited, pair, preceded},
    Finish, IResult,
};

use super::{CompareOp, Predicate, Step};
use crate::error::{DemoError, Result};
use crate::value::Value;

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Compiles `source` into a list of steps.
pub(super) fn parse(source: &str) -> Result<Vec<Step>> {
    query(source)
        .finish()
        .map(|(_, steps)| steps)
        .map_err(|err| syntax_error(source, &err))
}

/// Converts a nom error into a positioned syntax error.
fn syntax_error(source: &str, err: &VerboseError<&str>) -> DemoError {
    let stopped = err.errors.first().map_or("", |(input, _)| *input);
    let (at, reason) = err
        .errors
        .iter()
        .find_map(|(input, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some((*input, *ctx)),
            _ => None,
        })
        .unwrap_or((stopped, "invalid query"));

    let found = match stopped.trim_start().chars().next() {
        Some(c) => format!("found '{c}'"),
        None => "found end of query".to_owned(),
    };
    DemoError::query_syntax(source.len().saturating_sub(at.len()), format!("{reason}, {found}"))
}

fn ws(input: &str) -> ParseResult<'_, &str> {
    take_while(char::is_whitespace)(input)
}

fn query(input: &str) -> ParseResult<'_, Vec<Step>> {
    let (input, _) = ws(input)?;
    let (input, _) = context("query must start with '$'", char('$'))(input)?;
    let (input, steps) = many0(preceded(ws, step))(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = context("unexpected character", eof)(input)?;
    Ok((input, steps))
}

fn step(input: &str) -> ParseResult<'_, Step> {
    alt((
        map(preceded(char('.'), cut(field_name)), Step::Field),
        preceded(char('['), cut(bracket)),
    ))(input)
}

fn identifier(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn field_name(input: &str) -> ParseResult<'_, String> {
    context("expected field name", map(identifier, str::to_owned))(input)
}

/// Consumes a closing delimiter, reporting end of input as an unterminated bracket.
fn close<'a>(delimiter: char, expected: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, char> {
    move |input: &'a str| {
        let reason = if input.is_empty() {
            "unterminated bracket"
        } else {
            expected
        };
        context(reason, char(delimiter))(input)
    }
}

/// Parses the inside of `[...]`; the opening bracket is already consumed.
fn bracket(input: &str) -> ParseResult<'_, Step> {
    let (input, _) = ws(input)?;
    let (input, _) = context("unterminated bracket", peek(anychar))(input)?;
    let (input, step) = context(
        "expected '*', quoted name or filter in brackets",
        alt((
            value(Step::Wildcard, char('*')),
            map(quoted, Step::Field),
            map(preceded(char('?'), cut(filter)), Step::Predicate),
        )),
    )(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = close(']', "expected ']'")(input)?;
    Ok((input, step))
}

/// Parses `(@.path op literal)`; the `?` is already consumed.
fn filter(input: &str) -> ParseResult<'_, Predicate> {
    let (input, _) = ws(input)?;
    let (input, _) = context("expected '('", char('('))(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = context("predicate must start with '@'", char('@'))(input)?;
    let (input, path) = context(
        "predicate needs a field after '@'",
        many1(preceded(char('.'), cut(field_name))),
    )(input)?;
    let (input, _) = ws(input)?;
    let (input, op) = operator(input)?;
    let (input, _) = ws(input)?;
    let (input, literal) = literal(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = close(')', "expected ')'")(input)?;
    Ok((input, Predicate { path, op, literal }))
}

fn operator(input: &str) -> ParseResult<'_, CompareOp> {
    context(
        "unrecognized operator",
        alt((
            value(CompareOp::Eq, tag("==")),
            value(CompareOp::Ne, tag("!=")),
            value(CompareOp::Le, tag("<=")),
            value(CompareOp::Ge, tag(">=")),
            value(CompareOp::Lt, tag("<")),
            value(CompareOp::Gt, tag(">")),
        )),
    )(input)
}

fn literal(input: &str) -> ParseResult<'_, Value> {
    context(
        "invalid literal",
        alt((
            map(quoted, Value::String),
            number,
            map_opt(identifier, |word| match word {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            }),
        )),
    )(input)
}

fn number(input: &str) -> ParseResult<'_, Value> {
    peek(one_of("+-0123456789"))(input)?;
    context("invalid number", cut(map_opt(number_text, parse_number)))(input)
}

fn number_text(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        one_of("+-0123456789"),
        take_while(|c: char| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+')),
    ))(input)
}

/// Floats when the text has a fraction or exponent, integers otherwise.
fn parse_number(text: &str) -> Option<Value> {
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Integer)
    }
}

/// Parses a single- or double-quoted string with backslash escapes.
fn quoted(input: &str) -> ParseResult<'_, String> {
    let (_, quote) = peek(one_of("'\""))(input)?;
    context(
        "unterminated string literal",
        cut(delimited(char(quote), string_body(quote), char(quote))),
    )(input)
}

fn string_body<'a>(quote: char) -> impl FnMut(&'a str) -> ParseResult<'a, String> {
    fold_many0(
        alt((
            preceded(char('\\'), context("invalid escape", cut(one_of("\\'\"")))),
            satisfy(move |c| c != quote && c != '\\'),
        )),
        String::new,
        |mut out, c| {
            out.push(c);
            out
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn predicate(steps: &[Step]) -> &Predicate {
        match steps.last() {
            Some(Step::Predicate(p)) => p,
            other => panic!("expected predicate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_steps() {
        let steps = parse("$.players[*][?(@.class!='other')]").unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], Step::Field("players".into()));
        assert_eq!(steps[1], Step::Wildcard);
        let p = predicate(&steps);
        assert_eq!(p.path, vec!["class".to_string()]);
        assert_eq!(p.op, CompareOp::Ne);
        assert_eq!(p.literal, Value::from("other"));
    }

    #[test]
    fn test_parse_root_only() {
        assert!(parse("$").unwrap().is_empty());
        assert!(parse("  $  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_operators() {
        let cases = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            (">=", CompareOp::Ge),
        ];
        for (symbol, op) in cases {
            let steps = parse(&format!("$[?(@.health {symbol} 100)]")).unwrap();
            assert_eq!(predicate(&steps).op, op, "operator {symbol}");
        }
    }

    #[test]
    fn test_parse_literals() {
        let literal = |src: &str| predicate(&parse(src).unwrap()).literal.clone();
        assert_eq!(literal("$[?(@.a == -12)]"), Value::Integer(-12));
        assert_eq!(literal("$[?(@.a == 2.5)]"), Value::Float(2.5));
        assert_eq!(literal("$[?(@.a == 1e3)]"), Value::Float(1000.0));
        assert_eq!(literal("$[?(@.a == true)]"), Value::Boolean(true));
        assert_eq!(literal("$[?(@.a == \"blu\")]"), Value::from("blu"));
        assert_eq!(literal(r"$[?(@.a == 'a\\b')]"), Value::from(r"a\b"));
    }

    #[test]
    fn test_parse_nested_predicate_path() {
        let steps = parse("$.players[*][?(@.position.z > 0)]").unwrap();
        assert_eq!(
            predicate(&steps).path,
            vec!["position".to_string(), "z".to_string()]
        );
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("players", "must start with '$'"),
            ("$.players[*", "unterminated bracket"),
            ("$.players[", "unterminated bracket"),
            ("$[?(@.class = 'x')]", "unrecognized operator"),
            ("$[?(@.class =< 'x')]", "unrecognized operator"),
            ("$[?(@.class == 'x)]", "unterminated string literal"),
            ("$['open", "unterminated string literal"),
            ("$[?(@ == 1)]", "needs a field"),
            ("$[?(@.a == maybe)]", "invalid literal"),
            ("$[?(@.a == 1.2.3)]", "invalid number"),
            ("$[?(@.a == 99999999999999999999)]", "invalid number"),
            ("$.", "expected field name"),
            ("$..players", "expected field name"),
            ("$[?(@.a == 1]", "expected ')'"),
            ("$ players", "unexpected character"),
        ];

        for (source, reason) in cases {
            let err = parse(source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::QuerySyntax, "{source}");
            assert!(
                err.to_string().contains(reason),
                "{source}: {err} should mention {reason}"
            );
        }
    }

    #[test]
    fn test_error_position() {
        let err = parse("$.players[?(@.x ~ 1)]").unwrap_err();
        assert!(matches!(err, DemoError::QuerySyntax { position: 16, .. }));
    }
}
