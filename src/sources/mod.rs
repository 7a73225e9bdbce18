//! Schema sources.
//!
//! Raw module schemas come from a running SpacetimeDB host over HTTP.

pub mod remote;
