//! GDScript binding emitter for module schemas.
//!
//! This module is a thin wrapper around the IR-based code generation.
//! The pipeline is:
//! 1. Parse: schema JSON -> RawSchema
//! 2. Normalize: RawSchema -> SchemaModel (all schema logic resolved)
//! 3. Codegen: SchemaModel -> GdClass artifacts (GDScript AST)
//! 4. Emit: GdClass -> String (via Emit trait)

use crate::schema::error::SchemaError;
use crate::schema::ir::codegen::{codegen_artifacts, Artifact};
use crate::schema::ir::normalize::normalize_schema;
use crate::schema::spec::RawSchema;

/// Generate every GDScript artifact for one module from its schema JSON.
pub fn generate(schema_json: &str, module: &str) -> Result<Vec<Artifact>, SchemaError> {
    // Parse raw schema document
    let raw = RawSchema::from_json(schema_json)?;

    // Normalize to the schema model (all resolution happens here)
    let model = normalize_schema(&raw, module)?;

    // Generate GDScript AST artifacts
    Ok(codegen_artifacts(&model))
}
