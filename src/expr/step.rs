//! Types representing the steps of a path expression
use std::fmt;

use crate::{error::EvaluationError, object::Object};

use super::{
    glob::glob_match,
    query::{Query, Queryable},
};

/// The pseudo-field producing the length of an object
pub const LENGTH: &str = "$length";

/// The field selecting every child of a composite
pub const WILDCARD: &str = "*";

/// One compiled step of a path expression
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PathStep {
    /// A child key, `*`, `$length`, or a glob pattern
    ///
    /// When the key is not a child of a composite, a method with the same name is invoked
    /// instead.
    Literal(String),
    /// A child key matched exactly
    Verbatim(String),
    /// Children matching a pattern and a set of conditions
    Conditional(Conditional),
}

impl PathStep {
    /// Check if the step is rendered inside brackets
    pub(crate) fn is_bracketed(&self) -> bool {
        match self {
            PathStep::Literal(name) => needs_brackets(name),
            PathStep::Verbatim(_) => true,
            PathStep::Conditional(_) => false,
        }
    }

    /// Optionally get the key of a literal step
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            PathStep::Literal(name) => Some(name),
            _ => None,
        }
    }

    /// Optionally get the key of a verbatim step
    pub fn as_verbatim(&self) -> Option<&str> {
        match self {
            PathStep::Verbatim(name) => Some(name),
            _ => None,
        }
    }

    /// Optionally get a conditional step
    pub fn as_conditional(&self) -> Option<&Conditional> {
        match self {
            PathStep::Conditional(c) => Some(c),
            _ => None,
        }
    }
}

fn needs_brackets(name: &str) -> bool {
    name.is_empty() || name.contains(['.', '{', '}', '['])
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Literal(name) if needs_brackets(name) => write!(f, "[{name}]"),
            PathStep::Literal(name) => write!(f, "{name}"),
            PathStep::Verbatim(name) => {
                write!(f, "[\"")?;
                for c in name.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"]")
            }
            PathStep::Conditional(c) => write!(f, "{c}"),
        }
    }
}

impl Queryable for PathStep {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Path Step", level = "trace", parent = None, ret, err))]
    fn query<'a>(&self, current: &Object<'a>) -> Result<Vec<Object<'a>>, EvaluationError> {
        match self {
            PathStep::Literal(name) => query_literal(name, current),
            PathStep::Verbatim(name) => Ok(current
                .as_composite()
                .and_then(|c| c.get_child(name))
                .cloned()
                .into_iter()
                .collect()),
            PathStep::Conditional(c) => c.query(current),
        }
    }
}

fn query_literal<'a>(name: &str, current: &Object<'a>) -> Result<Vec<Object<'a>>, EvaluationError> {
    let composite = match current {
        Object::Primitive(_) if name == LENGTH => return Ok(vec![current.length()]),
        Object::Primitive(_) => return Ok(vec![]),
        Object::Composite(c) => c,
    };
    if name == WILDCARD {
        return Ok(composite.children().map(|(_, child)| child.clone()).collect());
    }
    if name == LENGTH {
        return Ok(vec![current.length()]);
    }
    if name.contains('*') {
        return Ok(composite
            .children()
            .filter(|(key, _)| glob_match(name, key))
            .map(|(_, child)| child.clone())
            .collect());
    }
    if let Some(child) = composite.get_child(name) {
        return Ok(vec![child.clone()]);
    }
    match composite.invoke_method(name, &[]) {
        None => Ok(vec![]),
        Some(Ok(value)) => Ok(Object::from_json(value).into_iter().collect()),
        Some(Err(source)) => Err(EvaluationError::Method {
            name: name.to_owned(),
            source,
        }),
    }
}

/// Selects the children whose key matches a pattern and which satisfy every condition
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Conditional {
    /// A glob pattern for the child keys, an empty pattern matches only the empty key
    pub pattern: String,
    /// The conditions, each of which a selected child must satisfy
    pub conditions: Vec<Condition>,
}

/// A path relative to a child and the string one of its results must equal
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Condition {
    /// The path navigated from the child
    pub path: Query,
    /// The required string form
    pub value: String,
}

impl Conditional {
    fn holds(&self, child: &Object<'_>) -> Result<bool, EvaluationError> {
        for condition in &self.conditions {
            let found = condition.path.query_objects(vec![child.clone()])?;
            if !found
                .iter()
                .any(|o| o.str_value() == Some(condition.value.as_str()))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Queryable for Conditional {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Conditional", level = "trace", parent = None, ret, err))]
    fn query<'a>(&self, current: &Object<'a>) -> Result<Vec<Object<'a>>, EvaluationError> {
        let Some(composite) = current.as_composite() else {
            return Ok(vec![]);
        };
        let mut result = Vec::new();
        for (key, child) in composite.children() {
            if !glob_match(&self.pattern, key) {
                continue;
            }
            if self.holds(child)? {
                result.push(child.clone());
            }
        }
        Ok(result)
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{pattern}{{", pattern = self.pattern)?;
        for (i, c) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{path}={value}", path = c.path, value = c.value)?;
        }
        write!(f, "}}")
    }
}
