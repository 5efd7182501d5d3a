use nom::bytes::complete::{is_not, take_while_m_n};
use nom::character::complete::char;
use nom::combinator::verify;
use nom::{
    branch::alt,
    combinator::{map, map_opt, map_res, value},
    multi::fold_many0,
    sequence::{delimited, preceded},
};

use super::PResult;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_unicode_escape(input: &str) -> PResult<char> {
    let hex = take_while_m_n(1, 6, |c: char| c.is_ascii_hexdigit());
    let code = map_res(
        preceded(char('u'), delimited(char('{'), hex, char('}'))),
        |hex| u32::from_str_radix(hex, 16),
    );
    map_opt(code, char::from_u32)(input)
}

fn parse_escape(quote: char) -> impl Fn(&str) -> PResult<char> {
    move |input: &str| {
        preceded(
            char('\\'),
            alt((
                parse_unicode_escape,
                value('\n', char('n')),
                value('\t', char('t')),
                value('\r', char('r')),
                value('\\', char('\\')),
                value(quote, char(quote)),
            )),
        )(input)
    }
}

enum Chunk<'a> {
    Text(&'a str),
    Escaped(char),
}

fn parse_chunk(quote: char) -> impl Fn(&str) -> PResult<Chunk<'_>> {
    move |input: &str| {
        let text = match quote {
            '\'' => is_not("'\\"),
            _ => is_not("\"\\"),
        };
        alt((
            map(verify(text, |s: &str| !s.is_empty()), Chunk::Text),
            map(parse_escape(quote), Chunk::Escaped),
        ))(input)
    }
}

fn parse_quoted(quote: char) -> impl Fn(&str) -> PResult<String> {
    move |input: &str| {
        delimited(
            char(quote),
            fold_many0(parse_chunk(quote), String::new, |mut s, chunk| {
                match chunk {
                    Chunk::Text(t) => s.push_str(t),
                    Chunk::Escaped(c) => s.push(c),
                }
                s
            }),
            char(quote),
        )(input)
    }
}

/// Parse a single- or double-quoted key, resolving escape sequences
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_quoted_key(input: &str) -> PResult<String> {
    alt((parse_quoted('\''), parse_quoted('"')))(input)
}
