//! Declared shapes for user-defined record types
//!
//! A record exposes a fixed set of named fields, optionally lifted from embedded records, and
//! a set of named methods that can be invoked from a path step.
use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::Value;

use crate::error::MethodError;

use super::{adapter::ToObject, Object};

type Accessor<R> = Arc<dyn for<'r> Fn(&'r R) -> Option<Object<'r>> + Send + Sync>;
type Method<R> = Arc<dyn Fn(&R, &[&str]) -> Result<Value, MethodError> + Send + Sync>;

fn accessor<R, F>(f: F) -> Accessor<R>
where
    F: for<'r> Fn(&'r R) -> Option<Object<'r>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A user-defined type with a declared [`Schema`]
pub trait Record: Sized + 'static {
    /// The schema of this record type
    ///
    /// This is typically built once and stored in a `once_cell::sync::Lazy`.
    fn schema() -> &'static Schema<Self>;
}

/// Error raised when a [`Schema`] declares conflicting names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two fields share a name at the shallowest embedding depth it is declared at
    #[error("ambiguous field {0:?}")]
    AmbiguousField(String),
    /// Two methods share a name at the shallowest embedding depth it is declared at
    #[error("ambiguous method {0:?}")]
    AmbiguousMethod(String),
}

/// The resolved fields and methods of a [`Record`]
pub struct Schema<R> {
    fields: Vec<Entry<Accessor<R>>>,
    methods: Vec<Entry<Method<R>>>,
    method_index: HashMap<String, usize>,
}

struct Entry<T> {
    name: String,
    depth: usize,
    value: T,
}

impl<R: Record> Schema<R> {
    /// Start declaring a schema
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder {
            fields: vec![],
            methods: vec![],
        }
    }

    /// The names of the resolved fields, in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|e| e.name.as_str())
    }

    /// The names of the resolved methods, in declaration order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|e| e.name.as_str())
    }

    pub(crate) fn children<'r>(&self, record: &'r R) -> Vec<(String, Option<Object<'r>>)> {
        self.fields
            .iter()
            .map(|e| (e.name.clone(), (e.value)(record)))
            .collect()
    }

    pub(crate) fn invoke(
        &self,
        record: &R,
        name: &str,
        args: &[&str],
    ) -> Option<Result<Value, MethodError>> {
        let i = *self.method_index.get(name)?;
        let method = &self.methods.get(i)?.value;
        Some(method(record, args))
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field(
                "fields",
                &self.fields.iter().map(|e| &e.name).collect::<Vec<_>>(),
            )
            .field(
                "methods",
                &self.methods.iter().map(|e| &e.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Declares the fields and methods of a [`Record`]
///
/// Names are resolved when calling [`build`][SchemaBuilder::build]: a name declared directly on
/// the record hides the same name lifted from an embedded record, and so on down the embedding
/// chain. Two declarations of one name at the same depth are an error.
pub struct SchemaBuilder<R> {
    fields: Vec<Entry<Accessor<R>>>,
    methods: Vec<Entry<Method<R>>>,
}

impl<R> fmt::Debug for SchemaBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("fields", &self.fields.iter().map(|e| &e.name).collect::<Vec<_>>())
            .field(
                "methods",
                &self.methods.iter().map(|e| &e.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<R: Record> SchemaBuilder<R> {
    /// Declare a field
    pub fn field<T, F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        T: ToObject + ?Sized + 'static,
        F: for<'r> Fn(&'r R) -> &'r T + Send + Sync + 'static,
    {
        self.fields.push(Entry {
            name: name.into(),
            depth: 0,
            value: accessor(move |r| f(r).to_object()),
        });
        self
    }

    /// Declare a method
    ///
    /// A method returning [`Value::Null`] produces no object.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R, &[&str]) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        self.methods.push(Entry {
            name: name.into(),
            depth: 0,
            value: Arc::new(f),
        });
        self
    }

    /// Lift the resolved fields and methods of an embedded record
    ///
    /// When `f` returns `None` the lifted fields are absent and the lifted methods return null.
    pub fn embed<E, F>(mut self, f: F) -> Self
    where
        E: Record,
        F: for<'r> Fn(&'r R) -> Option<&'r E> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let schema = E::schema();
        for field in &schema.fields {
            let get = Arc::clone(&f);
            let inner = Arc::clone(&field.value);
            self.fields.push(Entry {
                name: field.name.clone(),
                depth: field.depth + 1,
                value: accessor(move |r| get(r).and_then(|e| inner(e))),
            });
        }
        for method in &schema.methods {
            let get = Arc::clone(&f);
            let inner = Arc::clone(&method.value);
            self.methods.push(Entry {
                name: method.name.clone(),
                depth: method.depth + 1,
                value: Arc::new(move |r: &R, args: &[&str]| match get(r) {
                    Some(e) => inner(e, args),
                    None => Ok(Value::Null),
                }),
            });
        }
        self
    }

    /// Resolve precedence and produce the [`Schema`]
    pub fn build(self) -> Result<Schema<R>, SchemaError> {
        let fields = resolve(self.fields).map_err(SchemaError::AmbiguousField)?;
        let methods = resolve(self.methods).map_err(SchemaError::AmbiguousMethod)?;
        let method_index = methods
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Ok(Schema {
            fields,
            methods,
            method_index,
        })
    }
}

/// Keep the shallowest declaration of each name, preserving the order names first appear in
///
/// Returns the offending name if it is declared more than once at its shallowest depth.
fn resolve<T>(entries: Vec<Entry<T>>) -> Result<Vec<Entry<T>>, String> {
    let mut slots: Vec<(Entry<T>, bool)> = vec![];
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        match index.get(&entry.name) {
            None => {
                index.insert(entry.name.clone(), slots.len());
                slots.push((entry, false));
            }
            Some(&i) => {
                let slot = &mut slots[i];
                if entry.depth < slot.0.depth {
                    *slot = (entry, false);
                } else if entry.depth == slot.0.depth {
                    slot.1 = true;
                }
            }
        }
    }
    if let Some((entry, _)) = slots.iter().find(|(_, ambiguous)| *ambiguous) {
        return Err(entry.name.clone());
    }
    Ok(slots.into_iter().map(|(entry, _)| entry).collect())
}

/// Object-safe view over a [`Record`] used by [`Object`]
pub(crate) trait RecordSource {
    fn children_len(&self) -> usize;

    fn children(&self) -> Vec<(String, Option<Object<'_>>)>;

    fn invoke(&self, name: &str, args: &[&str]) -> Option<Result<Value, MethodError>>;
}

impl<R: Record> RecordSource for R {
    fn children_len(&self) -> usize {
        R::schema().fields.len()
    }

    fn children(&self) -> Vec<(String, Option<Object<'_>>)> {
        R::schema().children(self)
    }

    fn invoke(&self, name: &str, args: &[&str]) -> Option<Result<Value, MethodError>> {
        R::schema().invoke(self, name, args)
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};
    #[cfg(feature = "trace")]
    use test_log::test;

    use super::{Record, Schema, SchemaError};
    use crate::object::{Kind, Object};

    struct Inner {
        id: u32,
        label: &'static str,
    }

    impl Record for Inner {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: Lazy<Schema<Inner>> = Lazy::new(|| {
                Schema::builder()
                    .field("id", |r: &Inner| &r.id)
                    .field("label", |r: &Inner| &r.label)
                    .method("Describe", |r: &Inner, _| Ok(json!(format!("#{}", r.id))))
                    .build()
                    .unwrap()
            });
            &SCHEMA
        }
    }

    struct Outer {
        label: String,
        inner: Option<Inner>,
    }

    impl Record for Outer {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: Lazy<Schema<Outer>> = Lazy::new(|| {
                Schema::builder()
                    .field("label", |r: &Outer| &r.label)
                    .embed(|r: &Outer| r.inner.as_ref())
                    .build()
                    .unwrap()
            });
            &SCHEMA
        }
    }

    #[test]
    fn shallow_fields_win() {
        let names: Vec<&str> = Outer::schema().field_names().collect();
        assert_eq!(names, vec!["label", "id"]);
        let outer = Outer {
            label: "outer".to_owned(),
            inner: Some(Inner { id: 7, label: "inner" }),
        };
        let obj = Object::record(&outer);
        let rec = obj.as_composite().unwrap();
        assert_eq!(rec.kind(), Kind::Record);
        assert_eq!(rec.get_child("label").unwrap().str_value(), Some("outer"));
        assert_eq!(rec.get_child("id").unwrap().str_value(), Some("7"));
    }

    #[test]
    fn embedded_methods_are_lifted() {
        let outer = Outer {
            label: "outer".to_owned(),
            inner: Some(Inner { id: 7, label: "inner" }),
        };
        let obj = Object::record(&outer);
        let rec = obj.as_composite().unwrap();
        let value = rec.invoke_method("Describe", &[]).unwrap().unwrap();
        assert_eq!(value, json!("#7"));
        assert!(rec.invoke_method("Missing", &[]).is_none());
    }

    #[test]
    fn absent_embedded_record() {
        let outer = Outer {
            label: "outer".to_owned(),
            inner: None,
        };
        let obj = Object::record(&outer);
        let rec = obj.as_composite().unwrap();
        assert_eq!(rec.children_len(), 2);
        assert!(rec.get_child("id").is_none());
        let value = rec.invoke_method("Describe", &[]).unwrap().unwrap();
        assert_eq!(value, Value::Null);
    }

    struct Left;
    struct Right;
    struct Both {
        left: Left,
        right: Right,
    }

    impl Record for Left {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: Lazy<Schema<Left>> = Lazy::new(|| {
                Schema::builder()
                    .field("name", |_: &Left| "left")
                    .build()
                    .unwrap()
            });
            &SCHEMA
        }
    }

    impl Record for Right {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: Lazy<Schema<Right>> = Lazy::new(|| {
                Schema::builder()
                    .field("name", |_: &Right| "right")
                    .method("Ping", |_: &Right, _| Ok(json!("pong")))
                    .build()
                    .unwrap()
            });
            &SCHEMA
        }
    }

    #[test]
    fn ambiguous_names() {
        let err = Schema::<Both>::builder()
            .embed(|b: &Both| Some(&b.left))
            .embed(|b: &Both| Some(&b.right))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::AmbiguousField("name".to_owned()));
        assert_eq!(err.to_string(), "ambiguous field \"name\"");

        let err = Schema::<Right>::builder()
            .method("Ping", |_: &Right, _| Ok(json!(1)))
            .method("Ping", |_: &Right, _| Ok(json!(2)))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::AmbiguousMethod("Ping".to_owned()));
    }

    #[test]
    fn shallow_declaration_resolves_ambiguity() {
        let schema = Schema::<Both>::builder()
            .embed(|b: &Both| Some(&b.left))
            .embed(|b: &Both| Some(&b.right))
            .field("name", |_: &Both| "both")
            .build()
            .unwrap();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["name"]);
        let both = Both { left: Left, right: Right };
        let children = schema.children(&both);
        assert_eq!(children[0].1.as_ref().unwrap().str_value(), Some("both"));
    }

    impl Record for Both {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: Lazy<Schema<Both>> = Lazy::new(|| {
                Schema::builder()
                    .field("name", |_: &Both| "both")
                    .build()
                    .unwrap()
            });
            &SCHEMA
        }
    }
}
