use std::ops::Deref;

use crate::parser::ParserError;

/// Boxed error returned by record methods
pub type MethodError = Box<dyn std::error::Error + Send + Sync>;

/// Top level error type for the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path expression could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Navigating a value failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    /// An assertion document could not be compiled
    #[error(transparent)]
    Build(#[from] BuildError),
    /// An assertion document is not valid JSON
    #[error("invalid assertion document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error type for path expression parsing errors
#[derive(Debug, Clone, thiserror::Error)]
#[error("{err}")]
pub struct ParseError {
    err: Box<ErrorImpl>,
}

impl ParseError {
    /// Get the 1-indexed error position
    pub fn position(&self) -> usize {
        self.err.position
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.err.message
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("at position {position}, {message}")]
struct ErrorImpl {
    position: usize,
    message: Box<str>,
}

impl<I> From<(I, ParserError<I>)> for ParseError
where
    I: Deref<Target = str> + std::fmt::Debug,
{
    fn from((input, pe): (I, ParserError<I>)) -> Self {
        #[cfg(feature = "trace")]
        tracing::trace!(input = %input.to_string(), parser_error = ?pe);
        let position = pe.calculate_position(&input);
        let message = pe.to_string().into();
        Self {
            err: Box::new(ErrorImpl { position, message }),
        }
    }
}

/// Error raised while navigating a value
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// A method used as a path step returned an error
    #[error("call {name}: {source}")]
    Method {
        /// The method name
        name: String,
        /// The error returned by the method
        source: MethodError,
    },
}

/// Error raised while compiling an assertion document
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The top level of the document is not an object
    #[error("assertion document must be an object, got {0}")]
    NotAnObject(&'static str),
    /// A value in the document cannot be used as a filter
    #[error("unsupported {kind} value at {field}")]
    Unsupported {
        /// The key path leading to the value
        field: String,
        /// The JSON type of the value
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use crate::{Error, ObjPath, ParseError};
    #[cfg(feature = "trace")]
    use test_log::test;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ParseError>();
        assert_send::<Error>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<ParseError>();
        assert_sync::<Error>();
    }

    #[test]
    fn position_is_one_indexed() {
        let err = ObjPath::parse("a.b[c").unwrap_err();
        assert_eq!(err.position(), 4);
        assert_eq!(err.message(), "found '[', but missing ']'");
        assert_eq!(err.to_string(), "at position 4, found '[', but missing ']'");
    }
}
