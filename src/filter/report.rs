//! Explanations of why a filter did not match
use std::fmt;

use serde::Serialize;

/// One reason a filter did not match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailDetail {
    /// A value was found but did not satisfy the expectation
    Mismatch {
        /// The dotted keys leading to the value
        field: String,
        /// The expected string
        expected: String,
        /// The string form of the value found
        actual: String,
    },
    /// A key of the filter led to no value
    NoMatch {
        /// The dotted keys leading to the key
        field: String,
    },
    /// A key of the filter is malformed
    BadSyntax {
        /// The dotted keys leading to the key
        field: String,
        /// What is wrong with the key
        message: String,
    },
    /// Navigating the value failed
    Error {
        /// The dotted keys leading to the failure
        field: String,
        /// The error
        message: String,
    },
    /// The filter did not match the root value
    Unmatched,
    /// The filter is empty
    NoAssert,
}

impl FailDetail {
    /// The dotted keys this detail refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            FailDetail::Mismatch { field, .. }
            | FailDetail::NoMatch { field }
            | FailDetail::BadSyntax { field, .. }
            | FailDetail::Error { field, .. } => Some(field.as_str()),
            FailDetail::Unmatched | FailDetail::NoAssert => None,
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self {
            FailDetail::Mismatch { field, .. }
            | FailDetail::NoMatch { field }
            | FailDetail::BadSyntax { field, .. }
            | FailDetail::Error { field, .. } => Some(field),
            FailDetail::Unmatched | FailDetail::NoAssert => None,
        }
    }

    /// Prepend the key of the enclosing filter to the field of this detail
    pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
        if let Some(field) = self.field_mut() {
            *field = join(prefix, field);
        }
        self
    }
}

/// Join two dotted paths, skipping empty parts
pub(crate) fn join(prefix: &str, field: &str) -> String {
    match (prefix.is_empty(), field.is_empty()) {
        (true, _) => field.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}.{field}"),
    }
}

impl fmt::Display for FailDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailDetail::Mismatch {
                field,
                expected,
                actual,
            } => write!(f, "expect {field} to be \"{expected}\", actual: \"{actual}\""),
            FailDetail::NoMatch { field } => write!(f, "no match at {field}"),
            FailDetail::BadSyntax { field, message } => {
                write!(f, "bad syntax at {field}: {message}")
            }
            FailDetail::Error { field, message } => {
                write!(f, "unexpected error at {field}: {message}")
            }
            FailDetail::Unmatched => write!(f, "expect match, got none"),
            FailDetail::NoAssert => write!(f, "no assert"),
        }
    }
}

/// The outcome of checking an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The value matched
    Passed,
    /// The value did not match
    Failed,
    /// There was nothing to check
    NoAssert,
}

/// An ordered list of [`FailDetail`]s, empty when a filter matched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report(Vec<FailDetail>);

impl Report {
    pub(crate) fn no_assert() -> Self {
        Self(vec![FailDetail::NoAssert])
    }

    /// The details, in the order they were found
    pub fn details(&self) -> &[FailDetail] {
        &self.0
    }

    /// Take the details
    pub fn into_details(self) -> Vec<FailDetail> {
        self.0
    }

    /// Get the number of details
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no details
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over the details
    pub fn iter(&self) -> std::slice::Iter<'_, FailDetail> {
        self.0.iter()
    }

    /// Classify the report
    pub fn status(&self) -> Status {
        match self.0.as_slice() {
            [] => Status::Passed,
            [FailDetail::NoAssert] => Status::NoAssert,
            _ => Status::Failed,
        }
    }

    /// Check if the report has no details
    pub fn is_passed(&self) -> bool {
        self.status() == Status::Passed
    }

    /// Check if the report stems from an empty assertion
    pub fn is_no_assert(&self) -> bool {
        self.status() == Status::NoAssert
    }

    /// Check if the report explains a failed match
    pub fn is_failed(&self) -> bool {
        self.status() == Status::Failed
    }

    pub(crate) fn push(&mut self, detail: FailDetail) {
        self.0.push(detail);
    }

    pub(crate) fn append_prefixed(&mut self, prefix: &str, other: Report) {
        self.0.extend(other.0.into_iter().map(|d| d.prefixed(prefix)));
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn prepend(&mut self, detail: FailDetail) {
        self.0.insert(0, detail);
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, detail) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}

impl From<Vec<FailDetail>> for Report {
    fn from(details: Vec<FailDetail>) -> Self {
        Self(details)
    }
}

impl IntoIterator for Report {
    type Item = FailDetail;

    type IntoIter = std::vec::IntoIter<FailDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
