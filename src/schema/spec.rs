//! Serde model for the raw module-schema JSON document.
//!
//! This is a minimal subset of the schema document served at
//! `/v1/database/{module}/schema?version=9`: the table and reducer
//! declarations plus the typespace of algebraic type nodes they reference.

use serde::Deserialize;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use std::fmt;

use super::error::SchemaError;

/// Root schema document.
#[derive(Debug, Default, Deserialize)]
pub struct RawSchema {
    #[serde(default)]
    pub tables: Vec<RawTable>,
    #[serde(default)]
    pub reducers: Vec<RawReducer>,
    /// Named-type entries mapping a display name to a typespace index.
    #[serde(default)]
    pub types: Vec<RawTypeEntry>,
    #[serde(default)]
    pub typespace: RawTypespace,
}

/// The flat, index-addressed collection of all type nodes in the schema.
#[derive(Debug, Default, Deserialize)]
pub struct RawTypespace {
    #[serde(default)]
    pub types: Vec<AlgebraicTypeNode>,
}

/// A table declaration backed by a `Product` node in the typespace.
#[derive(Debug, Deserialize)]
pub struct RawTable {
    pub name: Option<String>,
    pub product_type_ref: Option<usize>,
    /// Column indices marked as primary key. The server emits at most one,
    /// but the declaration format allows several.
    #[serde(default)]
    pub primary_key: Vec<usize>,
}

/// A reducer declaration.
#[derive(Debug, Deserialize)]
pub struct RawReducer {
    pub name: String,
    #[serde(default)]
    pub params: RawProduct,
    /// Lifecycle marker (`Init`, `OnConnect`, ...) for reducers the runtime
    /// invokes itself. Option-encoded as `{"some": ...}` / `{"none": []}`.
    #[serde(default)]
    pub lifecycle: OptionalLifecycle,
}

/// A named-type entry: `{ "name": { "scope": [], "name": "Player" }, "ty": 3 }`.
#[derive(Debug, Deserialize)]
pub struct RawTypeEntry {
    #[serde(default)]
    pub name: ScopedName,
    pub ty: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScopedName {
    #[serde(default)]
    pub scope: Vec<String>,
    pub name: Option<String>,
}

/// Option-encoded name: `{"some": "id"}` or `{"none": []}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionalName {
    pub some: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionalLifecycle {
    pub some: Option<serde_json::Value>,
}

impl OptionalLifecycle {
    pub fn is_some(&self) -> bool {
        self.some.is_some()
    }
}

/// An ordered element of a `Product` body, a `Sum` variant, or a reducer
/// parameter; all three share the same wire shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    #[serde(default)]
    pub name: OptionalName,
    pub algebraic_type: AlgebraicTypeNode,
}

impl RawElement {
    pub fn name(&self) -> Option<&str> {
        self.name.some.as_deref()
    }
}

/// A record body: an ordered sequence of named elements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// A tagged-union body: an ordered sequence of named variants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSum {
    #[serde(default)]
    pub variants: Vec<RawElement>,
}

impl RawSum {
    /// A sum is the canonical optional encoding iff it has exactly the two
    /// variants `some` then `none`, in that order.
    pub fn is_option(&self) -> bool {
        self.variants.len() == 2
            && self.variants[0].name() == Some("some")
            && self.variants[1].name() == Some("none")
    }
}

/// Primitive type tags carried inline in the typespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Str,
}

impl PrimitiveType {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "Bool" => PrimitiveType::Bool,
            "I8" => PrimitiveType::I8,
            "U8" => PrimitiveType::U8,
            "I16" => PrimitiveType::I16,
            "U16" => PrimitiveType::U16,
            "I32" => PrimitiveType::I32,
            "U32" => PrimitiveType::U32,
            "I64" => PrimitiveType::I64,
            "U64" => PrimitiveType::U64,
            "F32" => PrimitiveType::F32,
            "F64" => PrimitiveType::F64,
            "String" => PrimitiveType::Str,
            _ => return None,
        })
    }
}

/// One node in the structural type algebra.
///
/// Nodes are encoded as single-key JSON objects: `{"Ref": 3}`,
/// `{"Product": {...}}`, `{"U64": []}`. Unrecognized tags deserialize to
/// [`AlgebraicTypeNode::Unsupported`] so one exotic node cannot poison the
/// whole document.
#[derive(Debug, Clone)]
pub enum AlgebraicTypeNode {
    Primitive(PrimitiveType),
    Product(RawProduct),
    Sum(RawSum),
    Array(Box<AlgebraicTypeNode>),
    Ref(usize),
    Unsupported(String),
}

impl<'de> Deserialize<'de> for AlgebraicTypeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = AlgebraicTypeNode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key algebraic type node object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let Some(tag) = map.next_key::<String>()? else {
                    return Err(de::Error::custom("algebraic type node has no tag"));
                };

                let node = match tag.as_str() {
                    "Ref" => AlgebraicTypeNode::Ref(map.next_value::<usize>()?),
                    "Product" => AlgebraicTypeNode::Product(map.next_value::<RawProduct>()?),
                    "Sum" => AlgebraicTypeNode::Sum(map.next_value::<RawSum>()?),
                    "Array" => {
                        AlgebraicTypeNode::Array(Box::new(map.next_value::<AlgebraicTypeNode>()?))
                    }
                    other => match PrimitiveType::from_tag(other) {
                        Some(prim) => {
                            map.next_value::<IgnoredAny>()?;
                            AlgebraicTypeNode::Primitive(prim)
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                            AlgebraicTypeNode::Unsupported(other.to_string())
                        }
                    },
                };

                // Tolerate (and drop) any trailing keys.
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}

                Ok(node)
            }
        }

        deserializer.deserialize_map(NodeVisitor)
    }
}

impl RawSchema {
    /// Parse a raw schema document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(SchemaError::Parse)
    }
}
