//! Normalization of a raw schema document into a [`SchemaModel`].
//!
//! Declarations are processed in document order. A malformed declaration is
//! skipped with a warning and the rest of the schema still generates; only
//! run-level problems (an oversized tagged union, a missing module name)
//! abort normalization outright.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::schema::error::SchemaError;
use crate::schema::ir::model::{
    EnumDescriptor, FieldDescriptor, ReducerDescriptor, SchemaModel, StructDescriptor,
    TableBinding, VariantDescriptor,
};
use crate::schema::ir::resolve::{ResolvedType, Resolver, TypeSpace};
use crate::schema::ir::types::GdType;
use crate::schema::spec::{AlgebraicTypeNode, RawSchema, RawTable};

/// A tagged union's discriminant is one byte, with one value reserved for
/// the unknown sentinel.
const MAX_ENUM_VARIANTS: usize = 254;

/// Engine-native declarations that never become generated classes.
const NATIVE_TYPES: &[&str] = &["Vector2", "Vector3"];

/// Reducer parameters of this type are injected by the host and never
/// appear in the call surface.
const REDUCER_CONTEXT: &str = "ReducerContext";

/// Normalize one module's raw schema into the emitter's model.
pub fn normalize_schema(raw: &RawSchema, module: &str) -> Result<SchemaModel, SchemaError> {
    if module.trim().is_empty() {
        return Err(SchemaError::MissingModule);
    }

    let space = TypeSpace::from_raw(raw);
    let mut resolver = Resolver::new(&space);
    let mut table_map = collect_tables(raw, &space);

    let mut model = SchemaModel {
        module: module.to_string(),
        ..SchemaModel::default()
    };

    for entry in &raw.types {
        let Some(name) = entry.name.name.as_deref() else {
            warn!("skipping a type declaration without a name");
            continue;
        };
        if NATIVE_TYPES.contains(&name) {
            debug!(name, "native type, no class generated");
            continue;
        }
        let Some(index) = entry.ty else {
            warn!(name, "type declaration has no typespace reference");
            continue;
        };
        let Some(node) = space.node(index) else {
            warn!(name, index, "type declaration points outside the typespace");
            continue;
        };

        match node {
            AlgebraicTypeNode::Product(product) => {
                let mut fields = Vec::with_capacity(product.elements.len());
                let mut poisoned = false;
                for element in &product.elements {
                    let Some(field_name) = element.name() else {
                        warn!(name, "skipping an unnamed record field");
                        continue;
                    };
                    match resolver.resolve(&element.algebraic_type) {
                        Ok(resolved) => fields.push(FieldDescriptor {
                            name: field_name.to_string(),
                            resolved,
                        }),
                        Err(err @ SchemaError::UnsupportedType { .. }) => {
                            warn!(name, field = field_name, %err, "field falls back to Variant");
                            fields.push(FieldDescriptor {
                                name: field_name.to_string(),
                                resolved: ResolvedType::unknown(),
                            });
                        }
                        Err(err) => {
                            warn!(name, field = field_name, %err, "skipping declaration");
                            poisoned = true;
                            break;
                        }
                    }
                }
                if poisoned {
                    continue;
                }
                model.structs.push(StructDescriptor {
                    name: name.to_string(),
                    type_index: index,
                    fields,
                    table: table_map.remove(&index),
                });
            }
            AlgebraicTypeNode::Sum(sum) => {
                if sum.is_option() {
                    warn!(name, "optional-shaped declaration, no class generated");
                    continue;
                }
                if sum.variants.len() > MAX_ENUM_VARIANTS {
                    return Err(SchemaError::EnumOverflow {
                        name: name.to_string(),
                        count: sum.variants.len(),
                    });
                }
                let mut variants = Vec::with_capacity(sum.variants.len());
                let mut poisoned = false;
                for variant in &sum.variants {
                    let Some(variant_name) = variant.name() else {
                        warn!(name, "skipping an unnamed union variant");
                        continue;
                    };
                    let payload = match &variant.algebraic_type {
                        AlgebraicTypeNode::Product(p) if p.elements.is_empty() => None,
                        other => match resolver.resolve(other) {
                            Ok(resolved) => Some(resolved),
                            Err(err @ SchemaError::UnsupportedType { .. }) => {
                                warn!(
                                    name,
                                    variant = variant_name,
                                    %err,
                                    "variant payload falls back to Variant"
                                );
                                Some(ResolvedType::unknown())
                            }
                            Err(err) => {
                                warn!(name, variant = variant_name, %err, "skipping declaration");
                                poisoned = true;
                                break;
                            }
                        },
                    };
                    variants.push(VariantDescriptor {
                        name: variant_name.to_string(),
                        payload,
                    });
                }
                if poisoned {
                    continue;
                }
                model.enums.push(EnumDescriptor {
                    name: name.to_string(),
                    type_index: index,
                    variants,
                });
            }
            other => {
                warn!(name, node = ?other, "declaration is neither a record nor a union");
            }
        }
    }

    for binding in table_map.values() {
        warn!(
            table = %binding.table_name,
            "table has no matching type declaration"
        );
    }

    for raw_reducer in &raw.reducers {
        if raw_reducer.lifecycle.is_some() {
            debug!(reducer = %raw_reducer.name, "skipping lifecycle reducer");
            continue;
        }
        let mut params = Vec::with_capacity(raw_reducer.params.elements.len());
        let mut poisoned = false;
        for element in &raw_reducer.params.elements {
            let Some(param_name) = element.name() else {
                warn!(reducer = %raw_reducer.name, "unnamed parameter, skipping reducer");
                poisoned = true;
                break;
            };
            match resolver.resolve(&element.algebraic_type) {
                Ok(resolved) => {
                    if resolved.ty == GdType::Named(REDUCER_CONTEXT.to_string()) {
                        debug!(reducer = %raw_reducer.name, param = param_name, "context param dropped");
                        continue;
                    }
                    params.push(FieldDescriptor {
                        name: param_name.to_string(),
                        resolved,
                    });
                }
                Err(err) => {
                    warn!(reducer = %raw_reducer.name, param = param_name, %err, "skipping reducer");
                    poisoned = true;
                    break;
                }
            }
        }
        if poisoned {
            continue;
        }
        model.reducers.push(ReducerDescriptor {
            name: raw_reducer.name.clone(),
            params,
        });
    }

    Ok(model)
}

/// Index table declarations by their row type. When several tables share a
/// row type, or a table lists several primary-key columns, the last one
/// wins with a warning.
fn collect_tables(raw: &RawSchema, space: &TypeSpace) -> HashMap<usize, TableBinding> {
    let mut map = HashMap::new();
    for table in &raw.tables {
        let Some(name) = table.name.as_deref() else {
            warn!("skipping a table declaration without a name");
            continue;
        };
        let Some(index) = table.product_type_ref else {
            warn!(table = name, "table has no row type reference");
            continue;
        };
        let primary_key = primary_key_field(table, name, index, space);
        let binding = TableBinding {
            table_name: name.to_string(),
            primary_key,
        };
        if map.insert(index, binding).is_some() {
            warn!(table = name, "multiple tables share a row type; keeping the last");
        }
    }
    map
}

fn primary_key_field(
    table: &RawTable,
    name: &str,
    index: usize,
    space: &TypeSpace,
) -> Option<String> {
    let columns = table.primary_key.as_slice();
    let column = match columns {
        [] => {
            warn!(table = name, "table declares no primary key");
            return None;
        }
        [only] => *only,
        [.., last] => {
            warn!(table = name, "multiple primary key columns; keeping the last");
            *last
        }
    };
    let Some(AlgebraicTypeNode::Product(product)) = space.node(index) else {
        warn!(table = name, "row type is not a record; ignoring primary key");
        return None;
    };
    let Some(element) = product.elements.get(column) else {
        warn!(table = name, column, "primary key column out of bounds");
        return None;
    };
    match element.name() {
        Some(field) => Some(field.to_string()),
        None => {
            warn!(table = name, column, "primary key column is unnamed");
            None
        }
    }
}
