//! Types representing the results of a query
use std::slice::Iter;

use serde::Serialize;
use serde_json::Value;

use crate::object::Object;

/// A list of objects resulting from a query
///
/// Each object is a view over a value within the original queried value.
#[derive(Debug, Default, Serialize, Clone)]
pub struct NodeList<'a>(Vec<Object<'a>>);

impl<'a> NodeList<'a> {
    /// Extract _at most_ one node from a [`NodeList`]
    ///
    /// # Usage
    /// ```rust
    /// # use serde_json::json;
    /// # use objpath::{AtMostOneError, ObjPath};
    /// # fn main() -> Result<(), objpath::Error> {
    /// let value = json!({"foo": ["bar", "baz"]});
    /// let nodes = ObjPath::parse("foo.0")?.query(&value)?;
    /// let node = nodes.at_most_one().unwrap();
    /// assert_eq!(node.and_then(|n| n.str_value()), Some("bar"));
    /// let nodes = ObjPath::parse("foo.*")?.query(&value)?;
    /// assert!(matches!(nodes.at_most_one(), Err(AtMostOneError(2))));
    /// # Ok(())
    /// # }
    /// ```
    pub fn at_most_one(&self) -> Result<Option<&Object<'a>>, AtMostOneError> {
        if self.0.len() > 1 {
            Err(AtMostOneError(self.0.len()))
        } else {
            Ok(self.0.first())
        }
    }

    /// Extract _exactly_ one node from a [`NodeList`]
    ///
    /// # Usage
    /// ```rust
    /// # use serde_json::json;
    /// # use objpath::{ExactlyOneError, ObjPath};
    /// # fn main() -> Result<(), objpath::Error> {
    /// let value = json!({"foo": ["bar", "baz"]});
    /// let nodes = ObjPath::parse("foo.1")?.query(&value)?;
    /// assert_eq!(nodes.exactly_one().unwrap().str_value(), Some("baz"));
    /// let nodes = ObjPath::parse("foo.2")?.query(&value)?;
    /// assert!(nodes.exactly_one().unwrap_err().is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn exactly_one(&self) -> Result<&Object<'a>, ExactlyOneError> {
        match self.0.as_slice() {
            [] => Err(ExactlyOneError::Empty),
            [node] => Ok(node),
            nodes => Err(ExactlyOneError::MoreThanOne(nodes.len())),
        }
    }

    /// Extract all nodes yielded by the query
    pub fn all(self) -> Vec<Object<'a>> {
        self.0
    }

    /// Get the length of a [`NodeList`]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if a [`NodeList`] is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over a [`NodeList`]
    ///
    /// Note that [`NodeList`] also implements [`IntoIterator`].
    pub fn iter(&self) -> Iter<'_, Object<'a>> {
        self.0.iter()
    }

    /// Returns the first node in the [`NodeList`], or `None` if it is empty
    pub fn first(&self) -> Option<&Object<'a>> {
        self.0.first()
    }

    /// Returns the last node in the [`NodeList`], or `None` if it is empty
    pub fn last(&self) -> Option<&Object<'a>> {
        self.0.last()
    }

    /// Returns the node at the given index in the [`NodeList`], or `None` if the given index is
    /// out of bounds.
    pub fn get(&self, index: usize) -> Option<&Object<'a>> {
        self.0.get(index)
    }

    /// The string forms of the nodes, `None` for composites
    pub fn str_values(&self) -> Vec<Option<&str>> {
        self.0.iter().map(Object::str_value).collect()
    }

    /// Produce the queried values as [`serde_json::Value`]s
    ///
    /// # Usage
    /// ```rust
    /// # use serde_json::json;
    /// # use objpath::ObjPath;
    /// # fn main() -> Result<(), objpath::Error> {
    /// let value = json!({"a": {"b": {"c": 23345}}});
    /// let nodes = ObjPath::parse("a.b.*")?.query(&value)?;
    /// assert_eq!(nodes.to_json(), vec![json!(23345)]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_json(&self) -> Vec<Value> {
        self.0.iter().map(Object::to_json).collect()
    }
}

impl<'a> From<Vec<Object<'a>>> for NodeList<'a> {
    fn from(nodes: Vec<Object<'a>>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = Object<'a>;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b NodeList<'a> {
    type Item = &'b Object<'a>;

    type IntoIter = Iter<'b, Object<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Error produced when expecting no more than one node from a query
#[derive(Debug, thiserror::Error)]
#[error("nodelist expected to contain at most one entry, but instead contains {0} entries")]
pub struct AtMostOneError(pub usize);

/// Error produced when expecting exactly one node from a query
#[derive(Debug, thiserror::Error)]
pub enum ExactlyOneError {
    /// The query resulted in an empty [`NodeList`]
    #[error("nodelist expected to contain one entry, but is empty")]
    Empty,
    /// The query resulted in a [`NodeList`] containing more than one node
    #[error("nodelist expected to contain one entry, but instead contains {0} entries")]
    MoreThanOne(usize),
}

impl ExactlyOneError {
    /// Check that it is the `Empty` variant
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Check that it is the `MoreThanOne` variant
    pub fn is_more_than_one(&self) -> bool {
        matches!(self, Self::MoreThanOne(_))
    }

    /// Extract the number of nodes, if it was more than one, or `None` otherwise
    pub fn as_more_than_one(&self) -> Option<usize> {
        match self {
            ExactlyOneError::Empty => None,
            ExactlyOneError::MoreThanOne(u) => Some(*u),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    #[cfg(feature = "trace")]
    use test_log::test;

    use crate::ObjPath;

    #[test]
    fn api_functions() {
        let value = json!({"foo": [1, {"x": 2}, "three"]});
        let nodes = ObjPath::parse("foo.*").unwrap().query(&value).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.first().unwrap().str_value(), Some("1"));
        assert_eq!(nodes.last().unwrap().str_value(), Some("three"));
        assert!(nodes.get(1).unwrap().str_value().is_none());
        assert!(nodes.get(3).is_none());
        assert_eq!(nodes.str_values(), vec![Some("1"), None, Some("three")]);
        assert_eq!(
            serde_json::to_value(&nodes).unwrap(),
            json!([1, {"x": 2}, "three"])
        );
        let err = nodes.exactly_one().unwrap_err();
        assert_eq!(err.as_more_than_one(), Some(3));
        let values: Vec<_> = (&nodes).into_iter().map(|o| o.to_json()).collect();
        assert_eq!(values, nodes.to_json());
        assert_eq!(nodes.all().len(), 3);
    }
}
