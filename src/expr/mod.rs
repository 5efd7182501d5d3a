//! Compiled path expressions and the steps they are made of
pub mod glob;
pub mod query;
pub mod step;
