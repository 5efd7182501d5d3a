use std::ops::Deref;

use nom::character::complete::char;
use nom::combinator::{all_consuming, opt};
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use nom::{
    branch::alt,
    combinator::map,
    multi::many0,
    sequence::{pair, preceded},
    IResult,
};

use crate::expr::{query::Query, step::PathStep};

use self::step::parse_step;
use self::utils::cut_with;

pub(crate) mod step;
pub(crate) mod string;
pub(crate) mod utils;

pub(crate) type PResult<'a, O> = IResult<&'a str, O, ParserError<&'a str>>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParserError<I> {
    #[error("found '{open}', but missing '{close}'")]
    Unclosed { input: I, open: char, close: char },
    #[error("found empty '[]'")]
    EmptyBracket(I),
    #[error("expected a field after '.'")]
    DanglingSeparator(I),
    #[error("invalid condition path {path:?}: {message}")]
    Condition {
        input: I,
        path: String,
        message: String,
    },
    #[error("unrecognized symbol")]
    Nom(I, ErrorKind),
}

impl<I> ParserError<I> {
    fn input(&self) -> &I {
        match self {
            ParserError::Unclosed { input, .. } => input,
            ParserError::EmptyBracket(input) => input,
            ParserError::DanglingSeparator(input) => input,
            ParserError::Condition { input, .. } => input,
            ParserError::Nom(input, _) => input,
        }
    }
}

impl<I: Deref<Target = str>> ParserError<I> {
    /// The 1-indexed character position of the error within `input`
    ///
    /// The remaining input held by the error may be any sub-slice of `input`, e.g., the key of
    /// a condition.
    pub(crate) fn calculate_position(&self, input: &str) -> usize {
        let rest: &str = self.input();
        let offset = (rest.as_ptr() as usize)
            .checked_sub(input.as_ptr() as usize)
            .filter(|offset| *offset <= input.len())
            .unwrap_or_else(|| input.len().saturating_sub(rest.len()));
        input.get(..offset).map_or(0, |s| s.chars().count()) + 1
    }
}

impl<I> ParseError<I> for ParserError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self::Nom(input, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I> ContextError<I> for ParserError<I> {
    fn add_context(_input: I, _ctx: &'static str, other: Self) -> Self {
        other
    }
}

impl<I, E> FromExternalError<I, E> for ParserError<I> {
    fn from_external_error(input: I, kind: ErrorKind, _: E) -> Self {
        Self::Nom(input, kind)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_leading_separator(input: &str) -> PResult<PathStep> {
    let _ = char::<_, ParserError<&str>>('.')(input)?;
    Err(nom::Err::Failure(ParserError::DanglingSeparator(input)))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_following_step(input: &str) -> PResult<PathStep> {
    alt((
        preceded(char('.'), cut_with(parse_step, ParserError::DanglingSeparator)),
        parse_step,
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_query(input: &str) -> PResult<Query> {
    map(
        opt(pair(
            alt((parse_step, parse_leading_separator)),
            many0(parse_following_step),
        )),
        |steps| match steps {
            Some((first, rest)) => {
                let mut steps = Vec::with_capacity(rest.len() + 1);
                steps.push(first);
                steps.extend(rest);
                Query { steps }
            }
            None => Query::default(),
        },
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_query_main(input: &str) -> PResult<Query> {
    all_consuming(parse_query)(input)
}

/// Wrap an error from a nested path, keeping the position it points to
pub(crate) fn nested_error<'a>(
    path: &'a str,
    err: nom::Err<ParserError<&'a str>>,
) -> ParserError<&'a str> {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => ParserError::Condition {
            input: *e.input(),
            path: path.to_owned(),
            message: e.to_string(),
        },
        nom::Err::Incomplete(_) => ParserError::Nom(path, ErrorKind::Complete),
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "trace")]
    use test_log::test;

    use super::{parse_query, parse_query_main, ParserError};
    use crate::expr::step::PathStep;

    fn literal(s: &str) -> PathStep {
        PathStep::Literal(s.to_owned())
    }

    #[test]
    fn dotted_paths() {
        let (_, q) = parse_query_main("a.b.c").unwrap();
        assert_eq!(q.steps, vec![literal("a"), literal("b"), literal("c")]);
        let (_, q) = parse_query_main("").unwrap();
        assert!(q.is_empty());
        let (_, q) = parse_query_main("*.$length").unwrap();
        assert_eq!(q.steps, vec![literal("*"), literal("$length")]);
    }

    #[test]
    fn brackets() {
        let (_, q) = parse_query_main("a.b.[c.f]").unwrap();
        assert_eq!(q.steps, vec![literal("a"), literal("b"), literal("c.f")]);
        let (_, q) = parse_query_main("a[b]c").unwrap();
        assert_eq!(q.steps, vec![literal("a"), literal("b"), literal("c")]);
        let (_, q) = parse_query_main("a['x.*']").unwrap();
        assert_eq!(q.steps, vec![literal("a"), PathStep::Verbatim("x.*".to_owned())]);
    }

    #[test]
    fn no_tail() {
        assert!(parse_query("a.b]").is_ok());
        assert!(parse_query_main("a.b]").is_err());
    }

    #[test]
    fn error_variants() {
        let err = |s| match parse_query_main(s) {
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => e,
            other => panic!("expected an error for {s}, got {other:?}"),
        };
        assert!(matches!(err("a.b[c"), ParserError::Unclosed { open: '[', .. }));
        assert!(matches!(err("a{x=1"), ParserError::Unclosed { open: '{', .. }));
        assert!(matches!(err("a[]"), ParserError::EmptyBracket(_)));
        assert!(matches!(err("a..b"), ParserError::DanglingSeparator(_)));
        assert!(matches!(err("a."), ParserError::DanglingSeparator(_)));
        assert!(matches!(err(".a"), ParserError::DanglingSeparator(_)));
        assert!(matches!(err("a}"), ParserError::Nom(..)));
        assert!(matches!(err("a{b..c=1}"), ParserError::Condition { .. }));
    }

    #[test]
    fn positions() {
        let pos = |s: &str| match parse_query_main(s) {
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => e.calculate_position(s),
            other => panic!("expected an error for {s}, got {other:?}"),
        };
        assert_eq!(pos("a.b[c"), 4);
        assert_eq!(pos("a..b"), 3);
        assert_eq!(pos(".a"), 1);
        assert_eq!(pos("ab]"), 3);
        assert_eq!(pos("é.]"), 3);
        assert_eq!(pos("x{b..c=1}"), 5);
    }
}
