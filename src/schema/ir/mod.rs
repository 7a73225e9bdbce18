//! Intermediate representation for binding generation.
//!
//! The pipeline runs raw schema -> [`resolve`]/[`normalize`] ->
//! [`model::SchemaModel`] -> [`codegen`] -> [`emit`].

pub mod codegen;
pub mod emit;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod types;
pub mod utils;
