//! Types representing compiled path expressions
use crate::{error::EvaluationError, object::Object};

use super::step::PathStep;

/// Navigate from one object to the objects it leads to
pub trait Queryable {
    /// Produce the objects reached from `current`, in order
    fn query<'a>(&self, current: &Object<'a>) -> Result<Vec<Object<'a>>, EvaluationError>;
}

/// Represents a compiled path expression
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Query {
    /// The steps of the path, applied in order
    pub steps: Vec<PathStep>,
}

impl Query {
    /// Check if the path has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step of the path to a set of candidates
    ///
    /// The results of each step are the concatenation of the results for each candidate, in
    /// candidate order. Evaluation stops as soon as a step produces nothing.
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Main Query", level = "trace", parent = None, ret, err))]
    pub fn query_objects<'a>(
        &self,
        candidates: Vec<Object<'a>>,
    ) -> Result<Vec<Object<'a>>, EvaluationError> {
        let mut query = candidates;
        for step in &self.steps {
            if query.is_empty() {
                break;
            }
            let mut new_query = Vec::new();
            for q in &query {
                new_query.append(&mut step.query(q)?);
            }
            query = new_query;
        }
        Ok(query)
    }
}

impl Queryable for Query {
    fn query<'a>(&self, current: &Object<'a>) -> Result<Vec<Object<'a>>, EvaluationError> {
        self.query_objects(vec![current.clone()])
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 && !step.is_bracketed() {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    #[cfg(feature = "trace")]
    use test_log::test;

    use crate::{object::wrap, ObjPath};

    #[test]
    fn results_keep_candidate_order() {
        let value = json!({
            "a": [{"x": 1}, {"x": 2}, {"y": 3}, {"x": 4}]
        });
        let path = ObjPath::parse("a.*.x").unwrap();
        let root = wrap(&value).unwrap();
        let found = path.as_query().query_objects(vec![root]).unwrap();
        let found: Vec<Option<&str>> = found.iter().map(|o| o.str_value()).collect();
        assert_eq!(found, vec![Some("1"), Some("2"), Some("4")]);
    }

    #[test]
    fn empty_path_returns_candidates() {
        let value = json!({"a": 1});
        let root = wrap(&value).unwrap();
        let path = ObjPath::parse("").unwrap();
        let found = path.as_query().query_objects(vec![root.clone()]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_same_value(&root));
    }

    #[test]
    fn display_round_trip() {
        for s in [
            "a.b.c",
            "a[c.f].d",
            "a[\"x]y\"]",
            "list.{name=bob,age=}",
            "a.user_*{role.name=admin}.id",
            "*.$length",
        ] {
            let path = ObjPath::parse(s).unwrap();
            let again = ObjPath::parse(&path.to_string()).unwrap();
            assert_eq!(path, again, "{s} rendered as {path}");
        }
    }
}
