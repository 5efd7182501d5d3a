use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, VecDeque},
    fmt::Display,
    hash::BuildHasher,
    rc::Rc,
    sync::{
        mpsc::{Receiver, Sender, SyncSender},
        Arc,
    },
};

use serde_json::{Map, Number, Value};

use super::{format_float, Kind, Object, Primitive, Scalar};

/// Convert a native value into an [`Object`]
///
/// Returning `None` means the value is absent and will not appear as a child of its parent.
///
/// Implement this for a record type by delegating to [`Object::record`]:
///
/// ```rust
/// # use objpath::{Object, ToObject, Record, Schema};
/// # use once_cell::sync::Lazy;
/// struct Point {
///     x: i32,
/// }
///
/// impl Record for Point {
///     fn schema() -> &'static Schema<Self> {
///         static SCHEMA: Lazy<Schema<Point>> = Lazy::new(|| {
///             Schema::builder()
///                 .field("x", |p: &Point| &p.x)
///                 .build()
///                 .expect("valid schema")
///         });
///         &SCHEMA
///     }
/// }
///
/// impl ToObject for Point {
///     fn to_object(&self) -> Option<Object<'_>> {
///         Some(Object::record(self))
///     }
/// }
/// ```
pub trait ToObject {
    /// Produce an [`Object`] view over `self`
    fn to_object(&self) -> Option<Object<'_>>;
}

/// A native value with keyed children
pub(crate) trait Container {
    fn kind(&self) -> Kind;

    fn children_len(&self) -> usize;

    fn children(&self) -> Vec<(String, Option<Object<'_>>)>;
}

impl ToObject for str {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Scalar::String(Cow::Borrowed(self)).into())
    }
}

impl ToObject for String {
    fn to_object(&self) -> Option<Object<'_>> {
        self.as_str().to_object()
    }
}

impl ToObject for Cow<'_, str> {
    fn to_object(&self) -> Option<Object<'_>> {
        self.as_ref().to_object()
    }
}

impl ToObject for char {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Scalar::String(Cow::Owned(self.to_string())).into())
    }
}

impl ToObject for bool {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Scalar::Bool(*self).into())
    }
}

macro_rules! signed {
    ($($t:ty),*) => {
        $(
            impl ToObject for $t {
                fn to_object(&self) -> Option<Object<'_>> {
                    Some(Scalar::Int(*self as i64).into())
                }
            }
        )*
    };
}

macro_rules! unsigned {
    ($($t:ty),*) => {
        $(
            impl ToObject for $t {
                fn to_object(&self) -> Option<Object<'_>> {
                    Some(Scalar::Uint(*self as u64).into())
                }
            }
        )*
    };
}

signed!(i8, i16, i32, i64, isize);
unsigned!(u8, u16, u32, u64, usize);

impl ToObject for i128 {
    fn to_object(&self) -> Option<Object<'_>> {
        match i64::try_from(*self) {
            Ok(i) => Some(Scalar::Int(i).into()),
            Err(_) => {
                Some(Primitive::with_text(Scalar::Float(*self as f64), self.to_string()).into())
            }
        }
    }
}

impl ToObject for u128 {
    fn to_object(&self) -> Option<Object<'_>> {
        match u64::try_from(*self) {
            Ok(u) => Some(Scalar::Uint(u).into()),
            Err(_) => {
                Some(Primitive::with_text(Scalar::Float(*self as f64), self.to_string()).into())
            }
        }
    }
}

impl ToObject for f32 {
    fn to_object(&self) -> Option<Object<'_>> {
        // the string form uses single precision, so 0.1_f32 reads "0.1"
        Some(Primitive::with_text(Scalar::Float(f64::from(*self)), format_float(*self)).into())
    }
}

impl ToObject for f64 {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Scalar::Float(*self).into())
    }
}

impl<T: ToObject> ToObject for Option<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        self.as_ref().and_then(ToObject::to_object)
    }
}

impl<T: ToObject + ?Sized> ToObject for &T {
    fn to_object(&self) -> Option<Object<'_>> {
        (**self).to_object()
    }
}

impl<T: ToObject + ?Sized> ToObject for &mut T {
    fn to_object(&self) -> Option<Object<'_>> {
        (**self).to_object()
    }
}

impl<T: ToObject + ?Sized> ToObject for Box<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        self.as_ref().to_object()
    }
}

impl<T: ToObject + ?Sized> ToObject for Rc<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        self.as_ref().to_object()
    }
}

impl<T: ToObject + ?Sized> ToObject for Arc<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        self.as_ref().to_object()
    }
}

macro_rules! sequence {
    ($($t:ty => [$($g:tt)*]),*) => {
        $(
            impl<$($g)*> Container for $t {
                fn kind(&self) -> Kind {
                    Kind::Sequence
                }

                fn children_len(&self) -> usize {
                    self.len()
                }

                fn children(&self) -> Vec<(String, Option<Object<'_>>)> {
                    self.iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v.to_object()))
                        .collect()
                }
            }

            impl<$($g)*> ToObject for $t {
                fn to_object(&self) -> Option<Object<'_>> {
                    Some(Object::container(self))
                }
            }
        )*
    };
}

sequence!(
    Vec<T> => [T: ToObject],
    VecDeque<T> => [T: ToObject],
    [T; N] => [T: ToObject, const N: usize]
);

impl<K: Display, V: ToObject, S: BuildHasher> Container for HashMap<K, V, S> {
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn children_len(&self) -> usize {
        self.len()
    }

    fn children(&self) -> Vec<(String, Option<Object<'_>>)> {
        let mut children: Vec<(String, Option<Object<'_>>)> = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_object()))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));
        children
    }
}

impl<K: Display, V: ToObject, S: BuildHasher> ToObject for HashMap<K, V, S> {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Object::container(self))
    }
}

impl<K: Display, V: ToObject> Container for BTreeMap<K, V> {
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn children_len(&self) -> usize {
        self.len()
    }

    fn children(&self) -> Vec<(String, Option<Object<'_>>)> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_object()))
            .collect()
    }
}

impl<K: Display, V: ToObject> ToObject for BTreeMap<K, V> {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Object::container(self))
    }
}

impl Container for Map<String, Value> {
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn children_len(&self) -> usize {
        self.len()
    }

    fn children(&self) -> Vec<(String, Option<Object<'_>>)> {
        self.iter()
            .map(|(k, v)| (k.clone(), v.to_object()))
            .collect()
    }
}

impl ToObject for Map<String, Value> {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Object::container(self))
    }
}

impl ToObject for Number {
    fn to_object(&self) -> Option<Object<'_>> {
        Some(Scalar::Number(Cow::Borrowed(self)).into())
    }
}

impl ToObject for Value {
    fn to_object(&self) -> Option<Object<'_>> {
        match self {
            Value::Null => None,
            Value::Bool(b) => b.to_object(),
            Value::Number(n) => n.to_object(),
            Value::String(s) => s.to_object(),
            Value::Array(list) => list.to_object(),
            Value::Object(map) => map.to_object(),
        }
    }
}

impl<T> ToObject for Sender<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        None
    }
}

impl<T> ToObject for SyncSender<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        None
    }
}

impl<T> ToObject for Receiver<T> {
    fn to_object(&self) -> Option<Object<'_>> {
        None
    }
}

macro_rules! fn_pointer {
    ($($arg:ident),*) => {
        impl<R, $($arg),*> ToObject for fn($($arg),*) -> R {
            fn to_object(&self) -> Option<Object<'_>> {
                None
            }
        }
    };
}

fn_pointer!();
fn_pointer!(A);
fn_pointer!(A, B);
fn_pointer!(A, B, C);
