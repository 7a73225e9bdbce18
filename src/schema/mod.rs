//! Module schema to GDScript binding generator.
//!
//! This module parses SpacetimeDB raw module schemas and generates GDScript
//! bindings with:
//! - `Resource` subclasses for table rows and shared types
//! - Tagged-union classes with ordinal helpers
//! - Async reducer call stubs over the runtime singleton

pub mod emitter;
pub mod error;
pub mod ir;
pub mod output;
pub mod spec;

pub use emitter::generate;
pub use error::SchemaError;
