use std::str::FromStr;

use serde::{de::Visitor, Deserialize, Serialize};

use crate::{
    error::EvaluationError,
    expr::query::Query,
    node::NodeList,
    object::{Object, ToObject},
    parser::parse_query_main,
    ParseError,
};

/// A parsed path expression
///
/// A path is a sequence of steps separated by `.`:
///
/// * `name` selects the child with that key, `*` selects every child, and a key containing `*`
///   is a glob matched against every child key. Within a glob `?` matches any one character and
///   `\` makes the next character match itself.
/// * `$length` produces the number of children of a composite, or the number of characters of
///   a primitive
/// * `[a.b]` selects the key `a.b` without splitting it on `.`, and `["a*"]` selects a key
///   exactly, without globbing
/// * `pattern{k1=v1,k2=v2}` selects the children whose key matches the glob `pattern` and for
///   which each relative path `k` leads to a value equal to `v`. Use `*{...}` to consider every
///   child, since an empty pattern only matches the empty key.
///
/// # Usage
///
/// ```rust
/// # use serde_json::json;
/// # use objpath::ObjPath;
/// # fn main() -> Result<(), objpath::Error> {
/// let path = ObjPath::parse("users.*{role=admin}.name")?;
/// let value = json!({
///     "users": [
///         {"name": "alice", "role": "admin"},
///         {"name": "bob", "role": "user"}
///     ]
/// });
/// let nodes = path.query(&value)?;
/// assert_eq!(nodes.to_json(), vec![json!("alice")]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ObjPath(Query);

impl ObjPath {
    /// Create an [`ObjPath`] by parsing a path expression
    ///
    /// # Example
    /// ```rust
    /// # use objpath::ObjPath;
    /// let path = ObjPath::parse("a.b.[c.d]").expect("valid path");
    /// assert!(ObjPath::parse("a.[]").is_err());
    /// ```
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        let (_, path) = parse_query_main(path_str).map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => (path_str, e),
            nom::Err::Incomplete(_) => unreachable!("we do not use streaming parsers"),
        })?;
        Ok(Self(path))
    }

    /// Query a value using this [`ObjPath`]
    ///
    /// An absent value, or a path that leads nowhere, produces an empty [`NodeList`].
    pub fn query<'b, T>(&self, value: &'b T) -> Result<NodeList<'b>, EvaluationError>
    where
        T: ToObject + ?Sized,
    {
        match value.to_object() {
            Some(root) => self.query_objects(vec![root]),
            None => Ok(NodeList::default()),
        }
    }

    /// Query from a set of already wrapped objects
    pub fn query_objects<'b>(
        &self,
        candidates: Vec<Object<'b>>,
    ) -> Result<NodeList<'b>, EvaluationError> {
        self.0.query_objects(candidates).map(Into::into)
    }

    /// The compiled steps of this path
    pub fn as_query(&self) -> &Query {
        &self.0
    }
}

impl FromStr for ObjPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjPath::parse(s)
    }
}

impl std::fmt::Display for ObjPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{path}", path = self.0)
    }
}

impl Serialize for ObjPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ObjPathVisitor;

        impl<'de> Visitor<'de> for ObjPathVisitor {
            type Value = ObjPath;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a string representing a path expression")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                ObjPath::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(ObjPathVisitor)
    }
}
