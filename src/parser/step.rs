use nom::bytes::complete::{take_till, take_till1};
use nom::character::complete::char;
use nom::combinator::opt;
use nom::{
    branch::alt,
    combinator::map,
    sequence::{preceded, terminated},
};

use crate::expr::step::{Condition, Conditional, PathStep};

use super::string::parse_quoted_key;
use super::utils::cut_with;
use super::{nested_error, parse_query_main, PResult, ParserError};

fn is_reserved(c: char) -> bool {
    matches!(c, '.' | '{' | '}' | '[' | ']')
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_field(input: &str) -> PResult<&str> {
    take_till1(is_reserved)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_literal_step(input: &str) -> PResult<PathStep> {
    map(parse_field, |s| PathStep::Literal(s.to_owned()))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_bracket_body(input: &str) -> PResult<PathStep> {
    alt((
        map(terminated(parse_quoted_key, char(']')), PathStep::Verbatim),
        map(terminated(take_till1(|c| c == ']'), char(']')), |s: &str| {
            PathStep::Literal(s.to_owned())
        }),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_bracket_step(input: &str) -> PResult<PathStep> {
    preceded(
        char('['),
        cut_with(parse_bracket_body, |rest: &str| {
            if rest.starts_with(']') {
                ParserError::EmptyBracket(input)
            } else {
                ParserError::Unclosed {
                    input,
                    open: '[',
                    close: ']',
                }
            }
        }),
    )(input)
}

/// Compile the `k1=v1,k2=v2` body of a conditional step
///
/// Blank keys are dropped, a pair without `=` requires an empty string, and a repeated key
/// replaces the earlier condition.
fn parse_conditions(body: &str) -> Result<Vec<Condition>, ParserError<&str>> {
    let mut keys: Vec<&str> = vec![];
    let mut conditions: Vec<Condition> = vec![];
    for pair in body.split(',') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        let (_, path) = parse_query_main(key).map_err(|e| nested_error(key, e))?;
        let condition = Condition {
            path,
            value: value.to_owned(),
        };
        match keys.iter().position(|k| *k == key) {
            Some(i) => conditions[i] = condition,
            None => {
                keys.push(key);
                conditions.push(condition);
            }
        }
    }
    Ok(conditions)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_conditional_step(input: &str) -> PResult<PathStep> {
    let (open, pattern) = opt(parse_field)(input)?;
    let (rest, body) = preceded(
        char('{'),
        cut_with(terminated(take_till(|c| c == '}'), char('}')), |_| {
            ParserError::Unclosed {
                input: open,
                open: '{',
                close: '}',
            }
        }),
    )(open)?;
    let conditions = parse_conditions(body).map_err(nom::Err::Failure)?;
    Ok((
        rest,
        PathStep::Conditional(Conditional {
            pattern: pattern.unwrap_or_default().to_owned(),
            conditions,
        }),
    ))
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_step(input: &str) -> PResult<PathStep> {
    alt((parse_conditional_step, parse_bracket_step, parse_literal_step))(input)
}
