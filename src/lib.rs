//! This crate lets you query in-memory values with dotted path expressions, and assert on their
//! structure with JSON filter documents.
//!
//! Values are viewed through the [`Object`] model: anything implementing [`ToObject`] can be
//! queried, including [`serde_json::Value`], the standard collections, scalars, and your own
//! structs once they declare a [`Schema`] through the [`Record`] trait.
//!
//! # Features
//!
//! This crate provides three key abstractions:
//!
//! * The [`ObjPath`] struct, which represents a parsed path expression.
//! * The [`NodeList`] struct, which represents the result of querying a value with an
//!   [`ObjPath`].
//! * The [`Assertion`] struct, which represents a compiled filter document, and produces a
//!   [`Report`] explaining why a value does not match it.
//!
//! In addition, the [`ObjPathExt`] trait extends every [`ToObject`] type with the
//! [`obj_path`][ObjPathExt::obj_path] and [`check_assertion`][ObjPathExt::check_assertion]
//! methods.
//!
//! # Usage
//!
//! ## Querying
//!
//! Path expressions are parsed with [`ObjPath::parse`], and can then be used to query any
//! number of values:
//!
//! ```rust
//! use serde_json::json;
//! use objpath::ObjPath;
//!
//! # fn main() -> Result<(), objpath::Error> {
//! let value = json!({"a": {"b": {"c": 23345}, "d": {"e": "234", "f": "1234"}}});
//! let path = ObjPath::parse("a.d.*")?;
//! let nodes = path.query(&value)?;
//! assert_eq!(nodes.str_values(), vec![Some("234"), Some("1234")]);
//!
//! let path = ObjPath::parse("a.d.$length")?;
//! assert_eq!(path.query(&value)?.exactly_one().unwrap().str_value(), Some("2"));
//! # Ok(())
//! # }
//! ```
//!
//! Keys that contain `.` can be written in brackets, and children can be selected by the value
//! of their own descendants with a conditional step:
//!
//! ```rust
//! # use serde_json::json;
//! # fn main() -> Result<(), objpath::Error> {
//! let value = json!({
//!     "pods": {
//!         "web-1": {"status": {"phase": "Running"}},
//!         "web-2": {"status": {"phase": "Pending"}},
//!         "db-1": {"status": {"phase": "Running"}}
//!     },
//!     "app.kubernetes.io/name": "web"
//! });
//! let nodes = objpath::query(&value, "pods.web-*{status.phase=Running}")?;
//! assert_eq!(nodes.len(), 1);
//! let nodes = objpath::query(&value, "[app.kubernetes.io/name]")?;
//! assert_eq!(nodes.first().and_then(|n| n.str_value()), Some("web"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Asserting
//!
//! A filter document maps path expressions to expected values. Nested objects apply a filter to
//! whatever the path leads to, and `$`-prefixed keys apply an [`Op`] to the value itself.
//! Expected strings starting with `$.` refer to another part of the value:
//!
//! ```rust
//! # use serde_json::json;
//! # fn main() -> Result<(), objpath::Error> {
//! let value = json!({"a": {"b": {"c": 23345}, "d": {"e": "234", "f": "1234"}}});
//! let report = objpath::assert(&value, r#"{
//!     "a.b.c": 23345,
//!     "a.d.*": {"$contains": "234", "$lt": "$.a.b.c"},
//!     "a.d": {"$length": 2}
//! }"#)?;
//! assert!(report.is_passed());
//!
//! let report = objpath::assert(&value, r#"{"a.d.e": "2345"}"#)?;
//! assert_eq!(
//!     report.to_string(),
//!     "expect match, got none\nexpect a.d.e to be \"2345\", actual: \"234\""
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Records
//!
//! Structs take part by declaring their fields, embedded records, and methods once:
//!
//! ```rust
//! use once_cell::sync::Lazy;
//! use objpath::{Object, Record, Schema, ToObject};
//! use serde_json::Value;
//!
//! struct Meta {
//!     name: String,
//! }
//!
//! impl Record for Meta {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Meta>> = Lazy::new(|| {
//!             Schema::builder()
//!                 .field("name", |m: &Meta| &m.name)
//!                 .method("Upper", |m: &Meta, _: &[&str]| Ok(Value::from(m.name.to_uppercase())))
//!                 .build()
//!                 .expect("valid schema")
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! struct Pod {
//!     meta: Meta,
//!     labels: Vec<String>,
//! }
//!
//! impl Record for Pod {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Pod>> = Lazy::new(|| {
//!             Schema::builder()
//!                 .embed(|p: &Pod| Some(&p.meta))
//!                 .field("labels", |p: &Pod| &p.labels)
//!                 .build()
//!                 .expect("valid schema")
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! impl ToObject for Pod {
//!     fn to_object(&self) -> Option<Object<'_>> {
//!         Some(Object::record(self))
//!     }
//! }
//!
//! # fn main() -> Result<(), objpath::Error> {
//! let pod = Pod {
//!     meta: Meta { name: "web".to_owned() },
//!     labels: vec!["a".to_owned(), "b".to_owned()],
//! };
//! assert_eq!(objpath::query(&pod, "name")?.str_values(), vec![Some("web")]);
//! assert_eq!(objpath::query(&pod, "Upper")?.str_values(), vec![Some("WEB")]);
//! assert_eq!(objpath::query(&pod, "labels.$length")?.str_values(), vec![Some("2")]);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! * `trace`: instrument the parser, path steps, and filters with [`tracing`][tracing]
//!
//! [tracing]: https://docs.rs/tracing
#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::todo,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::if_let_mutex,
    clippy::mismatched_target_os,
    clippy::await_holding_lock,
    clippy::match_on_vec_items,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::fn_params_excessive_bools,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    clippy::str_to_string,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    missing_debug_implementations,
    missing_docs
)]
#![allow(elided_lifetimes_in_paths, clippy::type_complexity)]
#![forbid(unsafe_code)]

mod assert;
mod error;
mod ext;
pub mod expr;
pub mod filter;
mod node;
pub mod object;
mod parser;
mod path;

pub use assert::Assertion;
pub use error::{BuildError, Error, EvaluationError, MethodError, ParseError};
pub use ext::ObjPathExt;
pub use filter::{FailDetail, FilterNode, Filtered, Op, Report, Status};
pub use node::{AtMostOneError, ExactlyOneError, NodeList};
pub use object::record::{Record, Schema, SchemaBuilder, SchemaError};
pub use object::{wrap, Composite, Kind, Object, Primitive, Scalar, ToObject};
pub use path::ObjPath;

/// Parse a path expression and query a value with it
///
/// An absent value produces an empty [`NodeList`].
pub fn query<'a, T>(value: &'a T, path: &str) -> Result<NodeList<'a>, Error>
where
    T: ToObject + ?Sized,
{
    Ok(ObjPath::parse(path)?.query(value)?)
}

/// Compile an assertion document and check a value against it
pub fn assert<T>(value: &T, document: &str) -> Result<Report, Error>
where
    T: ToObject + ?Sized,
{
    Ok(Assertion::parse(document)?.check(value))
}
