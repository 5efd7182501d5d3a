use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    error::BuildError,
    filter::{kind_name, FailDetail, FilterNode, Filtered, Report},
    object::ToObject,
    Error,
};

/// A compiled assertion document
///
/// # Usage
///
/// ```rust
/// # use serde_json::json;
/// # use objpath::Assertion;
/// # fn main() -> Result<(), objpath::Error> {
/// let assertion = Assertion::parse(r#"{"a.d": {"$contains": "2BB_4"}}"#)?;
/// let report = assertion.check(&json!({"a": {"d": "1_2BB_3"}}));
/// assert_eq!(
///     report.to_string(),
///     "expect match, got none\nexpect a.d.$contains to be \"2BB_4\", actual: \"1_2BB_3\""
/// );
/// assert!(assertion.matches(&json!({"a": {"d": "x_2BB_4"}})));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assertion {
    filter: Option<FilterNode>,
}

impl Assertion {
    /// Compile an assertion from JSON text
    ///
    /// Blank text, or `null`, produces an empty assertion.
    pub fn parse(document: &str) -> Result<Self, Error> {
        if document.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(document)?;
        Ok(Self::from_value(&value)?)
    }

    /// Compile an assertion from a decoded JSON document
    pub fn from_value(value: &Value) -> Result<Self, BuildError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => Ok(Self {
                filter: Some(FilterNode::build(value)?),
            }),
            other => Err(BuildError::NotAnObject(kind_name(other))),
        }
    }

    /// Check if the assertion has nothing to check
    pub fn is_empty(&self) -> bool {
        self.filter.as_ref().map_or(true, FilterNode::is_empty)
    }

    /// Apply the assertion to a value
    ///
    /// The survivors hold the root of `value` if it satisfies the assertion.
    pub fn filter<'a, T>(&self, value: &'a T) -> Filtered<'a>
    where
        T: ToObject + ?Sized,
    {
        let root = value.to_object();
        let filter = match &self.filter {
            Some(filter) if !filter.is_empty() => filter,
            _ => {
                return Filtered {
                    survivors: root.into_iter().collect(),
                    report: Report::no_assert(),
                }
            }
        };
        let Some(root) = root else {
            return Filtered {
                survivors: vec![],
                report: Report::from(vec![FailDetail::Unmatched]),
            };
        };
        let mut out = filter.filter(vec![root.clone()], &root);
        if out.survivors.is_empty() {
            out.report.prepend(FailDetail::Unmatched);
        }
        out
    }

    /// Apply the assertion to a value and explain the outcome
    pub fn check<T>(&self, value: &T) -> Report
    where
        T: ToObject + ?Sized,
    {
        self.filter(value).report
    }

    /// Check if a value satisfies a non-empty assertion
    pub fn matches<T>(&self, value: &T) -> bool
    where
        T: ToObject + ?Sized,
    {
        self.check(value).is_passed()
    }
}

impl std::str::FromStr for Assertion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Assertion::parse(s)
    }
}

impl<'de> Deserialize<'de> for Assertion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Assertion::from_value(&value).map_err(serde::de::Error::custom)
    }
}
