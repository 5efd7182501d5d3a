use crate::{
    error::EvaluationError, filter::Report, node::NodeList, object::ToObject, Assertion, ObjPath,
};

/// Extension trait that allows for path queries and assertions directly on any [`ToObject`]
///
/// ## Usage
/// ```rust
/// use serde_json::json;
/// use objpath::{Assertion, ObjPath, ObjPathExt};
///
/// # fn main() -> Result<(), objpath::Error> {
/// let value = json!({"foo": ["bar", "baz"]});
/// let path = ObjPath::parse("foo.*")?;
/// let nodes = value.obj_path(&path)?;
/// assert_eq!(nodes.str_values(), vec![Some("bar"), Some("baz")]);
///
/// let assertion = Assertion::parse(r#"{"foo.*": "baz"}"#)?;
/// assert!(value.check_assertion(&assertion).is_passed());
/// # Ok(())
/// # }
/// ```
pub trait ObjPathExt {
    /// Query a value with a parsed path
    fn obj_path(&self, path: &ObjPath) -> Result<NodeList<'_>, EvaluationError>;

    /// Check a value against a compiled assertion
    fn check_assertion(&self, assertion: &Assertion) -> Report;
}

impl<T: ToObject + ?Sized> ObjPathExt for T {
    fn obj_path(&self, path: &ObjPath) -> Result<NodeList<'_>, EvaluationError> {
        path.query(self)
    }

    fn check_assertion(&self, assertion: &Assertion) -> Report {
        assertion.check(self)
    }
}
