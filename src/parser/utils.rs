use nom::{IResult, Parser};

use super::ParserError;

/// Turn a recoverable error from `parser` into a failure carrying a specific error
///
/// The error is built from the input given to `parser`, so its position points at the start of
/// whatever `parser` was expected to recognize.
pub(crate) fn cut_with<I, O, F, E>(
    mut parser: F,
    err: E,
) -> impl FnMut(I) -> IResult<I, O, ParserError<I>>
where
    I: Clone,
    F: Parser<I, O, ParserError<I>>,
    E: Fn(I) -> ParserError<I>,
{
    move |input: I| match parser.parse(input.clone()) {
        Err(nom::Err::Error(_)) => Err(nom::Err::Failure(err(input))),
        rest => rest,
    }
}
