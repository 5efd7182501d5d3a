//! A read-only view over native values
//!
//! Every value that can be queried is first wrapped into an [`Object`], which is either a
//! [`Primitive`] (strings, numbers, booleans) or a [`Composite`] (sequences, maps, records).
//! Wrapping never copies the native value: an [`Object`] borrows from it and derives child
//! objects lazily, the first time they are needed.
use std::{borrow::Cow, collections::HashMap, fmt, rc::Rc};

use once_cell::unsync::OnceCell;
use serde::{ser::SerializeMap, ser::SerializeSeq, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::MethodError;

use self::adapter::Container;
use self::record::{Record, RecordSource};

mod adapter;
pub mod record;

pub use adapter::ToObject;

/// Wrap a native value into an [`Object`]
///
/// Returns `None` when the value is absent, e.g., `None`, `null`, or a shape that cannot be
/// traversed such as a function pointer.
pub fn wrap<T: ToObject + ?Sized>(value: &T) -> Option<Object<'_>> {
    value.to_object()
}

/// A read-only view over a native value
#[derive(Clone)]
pub enum Object<'a> {
    /// A leaf value
    Primitive(Primitive<'a>),
    /// A value with named children
    Composite(Composite<'a>),
}

impl<'a> Object<'a> {
    /// Wrap a native value, see [`wrap`]
    pub fn wrap<T: ToObject + ?Sized>(value: &'a T) -> Option<Self> {
        value.to_object()
    }

    /// Wrap a record using its declared [`Schema`][record::Schema]
    pub fn record<R: Record>(record: &'a R) -> Self {
        Self::Composite(Composite::new(Source::Record(record)))
    }

    /// Build an object that owns the given JSON value
    ///
    /// This is used for values that do not exist in the queried value, e.g., the results of
    /// record methods.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Scalar::Bool(b).into()),
            Value::Number(n) => Some(Scalar::Number(Cow::Owned(n)).into()),
            Value::String(s) => Some(Scalar::String(Cow::Owned(s)).into()),
            v @ (Value::Array(_) | Value::Object(_)) => {
                Some(Self::Composite(Composite::new(Source::Owned(v))))
            }
        }
    }

    pub(crate) fn container(container: &'a dyn Container) -> Self {
        Self::Composite(Composite::new(Source::Container(container)))
    }

    /// Optionally produce self as a [`Primitive`]
    pub fn as_primitive(&self) -> Option<&Primitive<'a>> {
        match self {
            Object::Primitive(p) => Some(p),
            Object::Composite(_) => None,
        }
    }

    /// Optionally produce self as a [`Composite`]
    pub fn as_composite(&self) -> Option<&Composite<'a>> {
        match self {
            Object::Composite(c) => Some(c),
            Object::Primitive(_) => None,
        }
    }

    /// The canonical string form of a primitive, `None` for composites
    pub fn str_value(&self) -> Option<&str> {
        self.as_primitive().map(Primitive::str_value)
    }

    /// The length of this object as a new primitive
    ///
    /// For a primitive this is the number of characters in its string form, for a composite it
    /// is the number of children.
    pub fn length(&self) -> Object<'a> {
        let n = match self {
            Object::Primitive(p) => p.str_value().chars().count(),
            Object::Composite(c) => c.children_len(),
        };
        Scalar::Uint(n as u64).into()
    }

    /// Check if two objects are views over the same native value
    ///
    /// Composites are compared by the address of the value they wrap, primitives by value.
    pub fn is_same_value(&self, other: &Object<'_>) -> bool {
        match (self, other) {
            (Object::Primitive(a), Object::Primitive(b)) => {
                a.value == b.value && a.str_value() == b.str_value()
            }
            (Object::Composite(a), Object::Composite(b)) => match (a.address(), b.address()) {
                (Some(x), Some(y)) => std::ptr::eq(x, y),
                _ => std::ptr::eq(
                    Rc::as_ptr(&a.0).cast::<()>(),
                    Rc::as_ptr(&b.0).cast::<()>(),
                ),
            },
            _ => false,
        }
    }

    /// Produce the value viewed by this object as a [`serde_json::Value`]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl<'a> From<Scalar<'a>> for Object<'a> {
    fn from(value: Scalar<'a>) -> Self {
        Self::Primitive(Primitive::new(value))
    }
}

impl<'a> From<Primitive<'a>> for Object<'a> {
    fn from(value: Primitive<'a>) -> Self {
        Self::Primitive(value)
    }
}

impl fmt::Debug for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Primitive(p) => f.debug_tuple("Primitive").field(&p.str_value()).finish(),
            Object::Composite(c) => f
                .debug_struct("Composite")
                .field("kind", &c.kind())
                .field("len", &c.children_len())
                .finish(),
        }
    }
}

impl fmt::Display for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Primitive(p) => write!(f, "{}", p.str_value()),
            Object::Composite(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Object<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Object::Primitive(p) => p.value.serialize(serializer),
            Object::Composite(c) if c.kind() == Kind::Sequence => {
                let len = c.children_len();
                let mut seq = serializer.serialize_seq(Some(len))?;
                for i in 0..len {
                    seq.serialize_element(&c.get_child(&i.to_string()))?;
                }
                seq.end()
            }
            Object::Composite(c) => {
                let mut map = serializer.serialize_map(Some(c.children_len()))?;
                for (key, child) in c.children() {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
        }
    }
}

/// The native value behind a [`Primitive`]
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    /// A string
    String(Cow<'a, str>),
    /// A boolean
    Bool(bool),
    /// A signed integer
    Int(i64),
    /// An unsigned integer
    Uint(u64),
    /// A floating point number
    Float(f64),
    /// A JSON number, kept in its decoded form
    Number(Cow<'a, Number>),
}

impl<'a> Scalar<'a> {
    fn canonical(&self) -> Cow<'a, str> {
        match self {
            Scalar::String(s) => s.clone(),
            Scalar::Bool(true) => Cow::Borrowed("true"),
            Scalar::Bool(false) => Cow::Borrowed("false"),
            Scalar::Int(i) => Cow::Owned(i.to_string()),
            Scalar::Uint(u) => Cow::Owned(u.to_string()),
            Scalar::Float(f) => Cow::Owned(format_float(*f)),
            Scalar::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

/// Format a float with its shortest round-trip digits
///
/// Decimal exponents below -4 or above 5 switch to scientific notation with a signed exponent
/// of at least two digits, e.g. `1e+06` or `2.5e-07`. Infinities read `+Inf` and `-Inf`.
pub(crate) fn format_float<F: fmt::LowerExp>(f: F) -> String {
    let sci = format!("{f:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return match sci.as_str() {
            "inf" => "+Inf".to_owned(),
            "-inf" => "-Inf".to_owned(),
            _ => sci,
        };
    };
    let exp: i32 = exp.parse().unwrap_or_default();
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(m) => ("-", m),
        None => ("", mantissa),
    };
    let digits = mantissa.replace('.', "");
    let point = exp + 1;
    if point <= 0 {
        let zeros = "0".repeat(point.unsigned_abs() as usize);
        format!("{sign}0.{zeros}{digits}")
    } else {
        let point = point as usize;
        if point >= digits.len() {
            let zeros = "0".repeat(point - digits.len());
            format!("{sign}{digits}{zeros}")
        } else {
            format!("{sign}{}.{}", &digits[..point], &digits[point..])
        }
    }
}

impl Serialize for Scalar<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Uint(u) => serializer.serialize_u64(*u),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Number(n) => n.serialize(serializer),
        }
    }
}

/// A leaf value: a string, number, or boolean
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<'a> {
    value: Scalar<'a>,
    text: Cow<'a, str>,
}

impl<'a> Primitive<'a> {
    /// Create a primitive, deriving its canonical string form from the value
    pub fn new(value: Scalar<'a>) -> Self {
        let text = value.canonical();
        Self { value, text }
    }

    /// Create a primitive whose string form differs from the canonical form of its value
    pub(crate) fn with_text(value: Scalar<'a>, text: String) -> Self {
        Self {
            value,
            text: Cow::Owned(text),
        }
    }

    /// The native value
    pub fn value(&self) -> &Scalar<'a> {
        &self.value
    }

    /// The string form used for comparisons
    pub fn str_value(&self) -> &str {
        &self.text
    }
}

/// The shape of a [`Composite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Children are keyed by their decimal index
    Sequence,
    /// Children are keyed by their map key
    Map,
    /// Children are the declared fields of a record
    Record,
}

pub(crate) enum Source<'a> {
    Container(&'a dyn Container),
    Record(&'a dyn RecordSource),
    Owned(Value),
}

/// A value with children, e.g., a sequence, a map, or a record
///
/// Cloning a composite is cheap, and clones share the memoized children.
#[derive(Clone)]
pub struct Composite<'a>(Rc<CompositeInner<'a>>);

struct CompositeInner<'a> {
    source: Source<'a>,
    children: OnceCell<Children<'a>>,
}

struct Children<'a> {
    entries: Vec<(String, Object<'a>)>,
    index: HashMap<String, usize>,
}

impl<'a> Children<'a> {
    fn new(raw: Vec<(String, Option<Object<'a>>)>) -> Self {
        let entries: Vec<(String, Object<'a>)> = raw
            .into_iter()
            .filter_map(|(key, child)| child.map(|c| (key, c)))
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();
        Self { entries, index }
    }
}

impl<'a> Composite<'a> {
    pub(crate) fn new(source: Source<'a>) -> Self {
        Self(Rc::new(CompositeInner {
            source,
            children: OnceCell::new(),
        }))
    }

    fn memoized(&self) -> &Children<'a> {
        self.0.children.get_or_init(|| {
            let raw = match self.0.source {
                Source::Container(c) => c.children(),
                Source::Record(r) => r.children(),
                Source::Owned(ref v) => owned_children(v),
            };
            Children::new(raw)
        })
    }

    fn address(&self) -> Option<*const ()> {
        match self.0.source {
            Source::Container(c) => Some(c as *const dyn Container as *const ()),
            Source::Record(r) => Some(r as *const dyn RecordSource as *const ()),
            Source::Owned(_) => None,
        }
    }

    /// The shape of the wrapped value
    pub fn kind(&self) -> Kind {
        match self.0.source {
            Source::Container(c) => c.kind(),
            Source::Record(_) => Kind::Record,
            Source::Owned(Value::Array(_)) => Kind::Sequence,
            Source::Owned(_) => Kind::Map,
        }
    }

    /// The number of children in the wrapped value
    ///
    /// This counts absent children, e.g., `null` entries of a JSON object, which are otherwise
    /// skipped.
    pub fn children_len(&self) -> usize {
        match self.0.source {
            Source::Container(c) => c.children_len(),
            Source::Record(r) => r.children_len(),
            Source::Owned(Value::Array(ref a)) => a.len(),
            Source::Owned(Value::Object(ref o)) => o.len(),
            Source::Owned(_) => 0,
        }
    }

    /// Visit each child in order until `f` returns `false`
    pub fn range_children<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Object<'a>) -> bool,
    {
        for (key, child) in &self.memoized().entries {
            if !f(key, child) {
                return;
            }
        }
    }

    /// Iterate over the present children and their keys
    pub fn children(&self) -> impl Iterator<Item = (&str, &Object<'a>)> {
        self.memoized()
            .entries
            .iter()
            .map(|(key, child)| (key.as_str(), child))
    }

    /// Get the child with the given key
    pub fn get_child(&self, key: &str) -> Option<&Object<'a>> {
        let children = self.memoized();
        children
            .index
            .get(key)
            .and_then(|&i| children.entries.get(i))
            .map(|(_, child)| child)
    }

    /// Invoke a method on the wrapped value
    ///
    /// Returns `None` if the wrapped value does not provide a method with the given name.
    pub fn invoke_method(&self, name: &str, args: &[&str]) -> Option<Result<Value, MethodError>> {
        match self.0.source {
            Source::Record(r) => r.invoke(name, args),
            Source::Container(_) | Source::Owned(_) => None,
        }
    }
}

impl fmt::Debug for Composite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("kind", &self.kind())
            .field("len", &self.children_len())
            .finish()
    }
}

fn owned_children<'a>(value: &Value) -> Vec<(String, Option<Object<'a>>)> {
    match value {
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), Object::from_json(v.clone())))
            .collect(),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| (k.clone(), Object::from_json(v.clone())))
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    #[cfg(feature = "trace")]
    use test_log::test;

    use super::{wrap, Kind, Object, Scalar};

    #[test]
    fn absent_values() {
        assert!(wrap(&json!(null)).is_none());
        assert!(wrap(&Option::<i32>::None).is_none());
        assert!(wrap(&Some(Box::new(Option::<&str>::None))).is_none());
    }

    #[test]
    fn canonical_strings() {
        assert_eq!(wrap(&23345_i32).unwrap().str_value(), Some("23345"));
        assert_eq!(wrap(&-7_i8).unwrap().str_value(), Some("-7"));
        assert_eq!(wrap(&u64::MAX).unwrap().str_value(), Some("18446744073709551615"));
        assert_eq!(wrap(&true).unwrap().str_value(), Some("true"));
        assert_eq!(wrap(&0.1_f32).unwrap().str_value(), Some("0.1"));
        assert_eq!(wrap(&8.95_f64).unwrap().str_value(), Some("8.95"));
        assert_eq!(wrap(&1.0_f64).unwrap().str_value(), Some("1"));
        assert_eq!(wrap(&-0.25_f64).unwrap().str_value(), Some("-0.25"));
        assert_eq!(wrap(&123456.0_f64).unwrap().str_value(), Some("123456"));
        assert_eq!(wrap(&1e6_f64).unwrap().str_value(), Some("1e+06"));
        assert_eq!(wrap(&1e21_f64).unwrap().str_value(), Some("1e+21"));
        assert_eq!(wrap(&1.5e-300_f64).unwrap().str_value(), Some("1.5e-300"));
        assert_eq!(wrap(&0.0001_f64).unwrap().str_value(), Some("0.0001"));
        assert_eq!(wrap(&1e-7_f64).unwrap().str_value(), Some("1e-07"));
        assert_eq!(wrap(&-2.5e-7_f32).unwrap().str_value(), Some("-2.5e-07"));
        assert_eq!(wrap(&f64::INFINITY).unwrap().str_value(), Some("+Inf"));
        assert_eq!(wrap(&f64::NEG_INFINITY).unwrap().str_value(), Some("-Inf"));
        assert_eq!(wrap(&f64::NAN).unwrap().str_value(), Some("NaN"));
        assert_eq!(wrap("abc").unwrap().str_value(), Some("abc"));
    }

    #[test]
    fn json_numbers_keep_precision() {
        let value: serde_json::Value = serde_json::from_str("[12345678901234567890123, 1.50]").unwrap();
        let obj = wrap(&value).unwrap();
        let list = obj.as_composite().unwrap();
        assert_eq!(list.get_child("0").unwrap().str_value(), Some("12345678901234567890123"));
        assert_eq!(list.get_child("1").unwrap().str_value(), Some("1.50"));
    }

    #[test]
    fn sequence_children() {
        let value = vec![Some("a"), None, Some("c")];
        let obj = wrap(&value).unwrap();
        let list = obj.as_composite().unwrap();
        assert_eq!(list.kind(), Kind::Sequence);
        assert_eq!(list.children_len(), 3);
        let keys: Vec<&str> = list.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["0", "2"]);
        assert!(list.get_child("1").is_none());
        assert_eq!(list.get_child("2").unwrap().str_value(), Some("c"));
        assert_eq!(obj.to_json(), json!(["a", null, "c"]));
    }

    #[test]
    fn map_children_are_memoized() {
        let value = json!({"a": {"b": 1}});
        let obj = wrap(&value).unwrap();
        let map = obj.as_composite().unwrap();
        let first = map.get_child("a").unwrap().clone();
        let second = map.get_child("a").unwrap();
        match (&first, second) {
            (Object::Composite(x), Object::Composite(y)) => {
                assert!(std::rc::Rc::ptr_eq(&x.0, &y.0))
            }
            _ => panic!("expected composites"),
        }
    }

    #[test]
    fn range_children_stops_early() {
        let value = json!({"a": 1, "b": 2, "c": 3});
        let obj = wrap(&value).unwrap();
        let mut seen = vec![];
        obj.as_composite().unwrap().range_children(|key, _| {
            seen.push(key.to_owned());
            key != "b"
        });
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn length() {
        let value = json!({"a": "héllo", "b": null});
        let obj = wrap(&value).unwrap();
        assert_eq!(obj.length().str_value(), Some("2"));
        let a = obj.as_composite().unwrap().get_child("a").unwrap();
        assert_eq!(a.length().str_value(), Some("5"));
    }

    #[test]
    fn owned_objects() {
        let obj = Object::from_json(json!({"x": [1, 2]})).unwrap();
        let map = obj.as_composite().unwrap();
        assert_eq!(map.kind(), Kind::Map);
        let x = map.get_child("x").unwrap();
        assert_eq!(x.as_composite().unwrap().children_len(), 2);
        assert_eq!(obj.to_json(), json!({"x": [1, 2]}));
        assert!(Object::from_json(json!(null)).is_none());
    }

    #[test]
    fn same_value() {
        let value = json!({"a": [1]});
        let x = wrap(&value).unwrap();
        let y = wrap(&value).unwrap();
        assert!(x.is_same_value(&y));
        let other = json!({"a": [1]});
        assert!(!x.is_same_value(&wrap(&other).unwrap()));
        let one: Object<'_> = Scalar::Int(1).into();
        assert!(one.is_same_value(&Scalar::Int(1).into()));
    }

    #[test]
    fn same_owned_value() {
        let owned = Object::from_json(json!({"a": [1]})).unwrap();
        assert!(owned.is_same_value(&owned.clone()));
        let value = json!({"a": [1]});
        let borrowed = wrap(&value).unwrap();
        assert!(!owned.is_same_value(&borrowed));
        assert!(!borrowed.is_same_value(&owned));
        let copy = Object::from_json(json!({"a": [1]})).unwrap();
        assert!(!owned.is_same_value(&copy));
    }
}
