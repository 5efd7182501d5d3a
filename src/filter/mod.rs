//! Filters compiled from JSON documents
//!
//! A filter document is a JSON object whose keys are path expressions or `$`-prefixed
//! operators, and whose values are either expected scalars or nested filter documents:
//!
//! ```json
//! {
//!     "# comments are ignored": "",
//!     "a.b.c": 23345,
//!     "a.d": {"$gt": "100", "$length": 3},
//!     "a.e": "$.a.b.c"
//! }
//! ```
//!
//! Applying a filter to a set of candidates produces the candidates that satisfy it, along
//! with a [`Report`] explaining why nothing matched when none do.
use serde_json::Value;

use crate::{error::BuildError, expr::query::Query, object::Object, ObjPath};

use self::report::join;

pub mod op;
pub mod report;

pub use op::Op;
pub use report::{FailDetail, Report, Status};

/// The prefix of an expected string that refers to another part of the queried value
pub const REFERENCE_PREFIX: &str = "$.";

/// The result of applying a filter to a set of candidates
#[derive(Debug, Default)]
pub struct Filtered<'a> {
    /// The candidates that satisfy the filter, in their original order
    pub survivors: Vec<Object<'a>>,
    /// Why no candidate satisfied the filter, empty if any did
    pub report: Report,
}

impl<'a> Filtered<'a> {
    /// Check if at least one candidate satisfied the filter
    pub fn is_match(&self) -> bool {
        !self.survivors.is_empty()
    }

    fn finish(survivors: Vec<Object<'a>>, mut report: Report) -> Self {
        if !survivors.is_empty() {
            report.clear();
        }
        Self { survivors, report }
    }
}

/// A compiled filter document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// An expected scalar
    Scalar(ScalarMatch),
    /// A set of keyed filters that must all hold
    Composite(CompositeMatch),
}

impl FilterNode {
    /// Compile a decoded filter document
    ///
    /// Strings, numbers and booleans compile to a [`ScalarMatch`] on their string form, and
    /// objects to a [`CompositeMatch`]. Arrays and nulls are not supported.
    pub fn build(value: &Value) -> Result<Self, BuildError> {
        build_at(value, "")
    }

    /// Apply the filter to a set of candidates
    ///
    /// References of the form `$.path` are resolved from `root`.
    pub fn filter<'a>(&self, candidates: Vec<Object<'a>>, root: &Object<'a>) -> Filtered<'a> {
        match self {
            FilterNode::Scalar(s) => s.filter(candidates, root),
            FilterNode::Composite(c) => c.filter(candidates, root),
        }
    }

    /// Check if the filter is a composite without keys
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterNode::Composite(c) if c.is_empty())
    }
}

/// The JSON type of a value, for error messages
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn build_at(value: &Value, field: &str) -> Result<FilterNode, BuildError> {
    match value {
        Value::String(s) => Ok(FilterNode::Scalar(ScalarMatch::new(s.clone()))),
        Value::Number(n) => Ok(FilterNode::Scalar(ScalarMatch::new(n.to_string()))),
        Value::Bool(b) => Ok(FilterNode::Scalar(ScalarMatch::new(b.to_string()))),
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                let key = key.trim();
                if key.is_empty() || key.starts_with('#') {
                    continue;
                }
                let node = build_at(value, &join(field, key))?;
                entries.push(Entry::new(key, node));
            }
            Ok(FilterNode::Composite(CompositeMatch { entries }))
        }
        Value::Null | Value::Array(_) => Err(BuildError::Unsupported {
            field: field.to_owned(),
            kind: kind_name(value),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reference {
    Literal,
    Path(Query),
    Invalid(String),
}

/// A leaf of a filter document
///
/// A candidate satisfies the match if it is a primitive whose string form equals the expected
/// string. If the expected string starts with `$.`, the rest is a path resolved from the root
/// of the queried value, and the candidate must equal every value found there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMatch {
    expected: String,
    reference: Reference,
}

impl ScalarMatch {
    /// Create a match for an expected string
    pub fn new(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        let reference = match expected.strip_prefix(REFERENCE_PREFIX) {
            None => Reference::Literal,
            Some(path) => match ObjPath::parse(path) {
                Ok(path) => Reference::Path(path.as_query().clone()),
                Err(e) => Reference::Invalid(e.to_string()),
            },
        };
        Self {
            expected,
            reference,
        }
    }

    /// The expected string, as written in the filter document
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Apply the match using equality
    pub fn filter<'a>(&self, candidates: Vec<Object<'a>>, root: &Object<'a>) -> Filtered<'a> {
        self.filter_with(Op::Eq, candidates, root)
    }

    /// Apply the match using an operator
    #[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, skip(root), ret))]
    pub fn filter_with<'a>(
        &self,
        op: Op,
        candidates: Vec<Object<'a>>,
        root: &Object<'a>,
    ) -> Filtered<'a> {
        let mut report = Report::default();
        if candidates.is_empty() {
            return Filtered::default();
        }
        let references = match &self.reference {
            Reference::Literal => None,
            Reference::Invalid(message) => {
                report.push(FailDetail::BadSyntax {
                    field: String::new(),
                    message: format!("invalid reference {:?}: {message}", self.expected),
                });
                return Filtered::finish(vec![], report);
            }
            Reference::Path(query) => match query.query_objects(vec![root.clone()]) {
                // nothing to compare against
                Ok(found) if found.is_empty() => return Filtered::default(),
                Ok(found) => Some(found),
                Err(e) => {
                    report.push(FailDetail::Error {
                        field: String::new(),
                        message: e.to_string(),
                    });
                    return Filtered::finish(vec![], report);
                }
            },
        };
        let mut survivors = vec![];
        for candidate in candidates {
            let actual = display_value(&candidate);
            let failed = match &references {
                None => (!op.check(&actual, &self.expected)).then(|| self.expected.clone()),
                Some(references) => references.iter().find_map(|r| match r.str_value() {
                    Some(expected) if candidate.str_value().is_some() && op.check(&actual, expected) => {
                        None
                    }
                    _ => Some(display_value(r)),
                }),
            };
            match failed {
                None if candidate.str_value().is_some() => survivors.push(candidate),
                None => report.push(FailDetail::Mismatch {
                    field: String::new(),
                    expected: self.expected.clone(),
                    actual,
                }),
                Some(expected) => report.push(FailDetail::Mismatch {
                    field: String::new(),
                    expected,
                    actual,
                }),
            }
        }
        Filtered::finish(survivors, report)
    }
}

fn display_value(object: &Object<'_>) -> String {
    match object.str_value() {
        Some(s) => s.to_owned(),
        None => object.to_json().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Operator(Op),
    Path(Query),
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    target: Target,
    node: FilterNode,
}

impl Entry {
    fn new(key: &str, node: FilterNode) -> Self {
        let target = if key.starts_with('$') {
            Target::Operator(Op::from_key(key))
        } else {
            match ObjPath::parse(key) {
                Ok(path) => Target::Path(path.as_query().clone()),
                Err(e) => Target::Invalid(e.to_string()),
            }
        };
        Self {
            key: key.to_owned(),
            target,
            node,
        }
    }

    /// Apply the entry to one candidate
    fn apply<'a>(&self, candidate: &Object<'a>, root: &Object<'a>) -> Filtered<'a> {
        let mut report = Report::default();
        match (&self.target, &self.node) {
            (Target::Operator(Op::Length), FilterNode::Scalar(s)) => {
                s.filter_with(Op::Eq, vec![candidate.length()], root)
            }
            (Target::Operator(op), FilterNode::Scalar(s)) => {
                s.filter_with(*op, vec![candidate.clone()], root)
            }
            (Target::Operator(_), FilterNode::Composite(_)) => {
                report.push(FailDetail::BadSyntax {
                    field: String::new(),
                    message: format!("operator {key} expects a scalar value", key = self.key),
                });
                Filtered::finish(vec![], report)
            }
            (Target::Invalid(message), _) => {
                report.push(FailDetail::BadSyntax {
                    field: String::new(),
                    message: message.clone(),
                });
                Filtered::finish(vec![], report)
            }
            (Target::Path(query), node) => match query.query_objects(vec![candidate.clone()]) {
                Ok(children) => node.filter(children, root),
                Err(e) => {
                    report.push(FailDetail::Error {
                        field: String::new(),
                        message: e.to_string(),
                    });
                    Filtered::finish(vec![], report)
                }
            },
        }
    }
}

/// A set of keyed filters that must all hold for a candidate
///
/// A key starting with `$` is an [`Op`] applied to the candidate itself, and requires a scalar
/// value. Any other key is a path expression navigated from the candidate, and holds if at
/// least one of the objects it leads to satisfies the nested filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeMatch {
    entries: Vec<Entry>,
}

impl CompositeMatch {
    /// Check if there are no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The keys, in the order they are checked
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Apply every key to every candidate
    #[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, skip(self, root), ret))]
    pub fn filter<'a>(&self, candidates: Vec<Object<'a>>, root: &Object<'a>) -> Filtered<'a> {
        let mut survivors = vec![];
        let mut report = Report::default();
        for candidate in candidates {
            let mut holds = true;
            for entry in &self.entries {
                let outcome = entry.apply(&candidate, root);
                if outcome.is_match() {
                    continue;
                }
                holds = false;
                if outcome.report.is_empty() {
                    report.push(FailDetail::NoMatch {
                        field: entry.key.clone(),
                    });
                } else {
                    report.append_prefixed(&entry.key, outcome.report);
                }
            }
            if holds {
                survivors.push(candidate);
            }
        }
        Filtered::finish(survivors, report)
    }
}
