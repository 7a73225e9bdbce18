//! Error taxonomy for the binding-generation pipeline.
//!
//! Per-declaration failures (`UnresolvedRef`, `Cycle`, `UnsupportedType`) are
//! caught by the normalizer, which skips the offending declaration with a
//! warning and keeps going. Run-level failures (`Parse`, `EnumOverflow`,
//! `MissingModule`) abort the whole run before any file is written.

use thiserror::Error;

/// An error raised while resolving types or normalizing a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document itself could not be deserialized.
    #[error("failed to parse module schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// A `Ref` node points outside the typespace.
    #[error("type reference {index} is out of bounds (typespace has {len} entries)")]
    UnresolvedRef { index: usize, len: usize },

    /// A resolution chain revisited a typespace index before completing.
    /// The target binding shape has no indirection, so cycles are
    /// unrepresentable and the type cannot be emitted.
    #[error("type resolution entered a cycle at typespace index {index}")]
    Cycle { index: usize },

    /// A node shape the resolver does not recognize; the caller may fall
    /// back to an untyped placeholder field.
    #[error("unsupported algebraic type shape: {kind}")]
    UnsupportedType { kind: String },

    /// A tagged union with more variants than the 8-bit discriminant allows.
    #[error("tagged union '{name}' has {count} variants; the discriminant allows at most 254")]
    EnumOverflow { name: String, count: usize },

    /// No module identifier was supplied for the run.
    #[error("module identifier is missing or empty")]
    MissingModule,
}
