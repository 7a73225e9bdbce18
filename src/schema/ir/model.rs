//! Normalized schema model.
//!
//! The shape the emitter consumes: declaration order is preserved from the
//! schema document, every field carries its resolved type, and table
//! metadata is already attached to the struct it describes.

use crate::schema::ir::resolve::ResolvedType;

/// Everything generable from one module's schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    /// Module identifier, used for file names and the reducer class name.
    pub module: String,
    pub structs: Vec<StructDescriptor>,
    pub enums: Vec<EnumDescriptor>,
    pub reducers: Vec<ReducerDescriptor>,
}

/// A record declaration, optionally backed by a table.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    pub name: String,
    /// Index of the declaration in the typespace.
    pub type_index: usize,
    pub fields: Vec<FieldDescriptor>,
    pub table: Option<TableBinding>,
}

impl StructDescriptor {
    pub fn is_table(&self) -> bool {
        self.table.is_some()
    }
}

/// A named, resolved field or reducer parameter.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub resolved: ResolvedType,
}

/// Table metadata attached to a struct declaration.
#[derive(Debug, Clone)]
pub struct TableBinding {
    pub table_name: String,
    /// Name of the primary-key field, when the table declares one that
    /// maps onto a known field.
    pub primary_key: Option<String>,
}

/// A tagged-union declaration.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    pub name: String,
    pub type_index: usize,
    pub variants: Vec<VariantDescriptor>,
}

/// One variant of a tagged union. A unit variant (empty record payload)
/// carries no payload type.
#[derive(Debug, Clone)]
pub struct VariantDescriptor {
    pub name: String,
    pub payload: Option<ResolvedType>,
}

/// A callable reducer with its context parameters already stripped.
#[derive(Debug, Clone)]
pub struct ReducerDescriptor {
    pub name: String,
    pub params: Vec<FieldDescriptor>,
}
