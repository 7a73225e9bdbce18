//! Memoized resolution of typespace nodes to binding-ready types.
//!
//! Resolution walks the structural algebra down to a GDScript display type,
//! an optional BSATN wire tag, and a shape classification. `Ref` chains are
//! followed until they hit a named declaration, which becomes the display
//! type; unnamed chains keep walking. A per-typespace cache makes repeated
//! lookups O(1), and an explicit visiting stack turns reference cycles into
//! hard errors instead of unbounded recursion.

use std::collections::HashMap;
use std::fmt;

use crate::schema::error::SchemaError;
use crate::schema::ir::types::GdType;
use crate::schema::spec::{AlgebraicTypeNode, PrimitiveType, RawProduct, RawSchema};

/// Element name of the single-field product the host uses for identities.
const IDENTITY_ELEMENT: &str = "__identity__";
/// Element name of the single-field product the host uses for timestamps.
const TIMESTAMP_ELEMENT: &str = "__timestamp_micros_since_unix_epoch__";

/// BSATN wire tag attached to fields whose runtime type does not fully
/// determine the encoding. The vocabulary is closed: strings, booleans,
/// vectors and struct references need no tag and get none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireTag {
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
    Identity,
    Enum,
    /// An array of tagged elements: `vec_<inner>`. Nests for arrays of
    /// arrays.
    Vec(Box<WireTag>),
}

impl fmt::Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireTag::I8 => f.write_str("i8"),
            WireTag::U8 => f.write_str("u8"),
            WireTag::I16 => f.write_str("i16"),
            WireTag::U16 => f.write_str("u16"),
            WireTag::I32 => f.write_str("i32"),
            WireTag::U32 => f.write_str("u32"),
            WireTag::I64 => f.write_str("i64"),
            WireTag::U64 => f.write_str("u64"),
            WireTag::F32 => f.write_str("f32"),
            WireTag::F64 => f.write_str("f64"),
            WireTag::Identity => f.write_str("identity"),
            WireTag::Enum => f.write_str("enum"),
            WireTag::Vec(inner) => write!(f, "vec_{inner}"),
        }
    }
}

/// Shape classification of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
    /// Scalar, string, or an engine-native vector type.
    Primitive,
    /// A reference to a generated record class.
    Struct,
    /// A reference to a generated tagged-union class.
    Enum,
    /// A placeholder for a node the resolver could not classify.
    Unknown,
}

/// The outcome of resolving one typespace node.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Display type used in field and parameter annotations. For arrays
    /// this is already the `Array[T]` wrapper.
    pub ty: GdType,
    /// Wire tag metadata, when the type carries one.
    pub wire_tag: Option<WireTag>,
    pub is_array: bool,
    /// The type was wrapped in the canonical optional encoding. Optionals
    /// surface as the payload type itself; the flag is kept for callers
    /// that want to default such fields to `null`.
    pub is_optional: bool,
    pub kind: ResolvedKind,
}

impl ResolvedType {
    fn primitive(ty: GdType, wire_tag: Option<WireTag>) -> Self {
        ResolvedType {
            ty,
            wire_tag,
            is_array: false,
            is_optional: false,
            kind: ResolvedKind::Primitive,
        }
    }

    /// Placeholder for an unclassifiable node: an untagged `Variant` field.
    pub fn unknown() -> Self {
        ResolvedType {
            ty: GdType::Variant,
            wire_tag: None,
            is_array: false,
            is_optional: false,
            kind: ResolvedKind::Unknown,
        }
    }

    /// Wire tag rendered for `set_meta`, when present.
    pub fn wire_tag_str(&self) -> Option<String> {
        self.wire_tag.as_ref().map(ToString::to_string)
    }
}

/// The module's typespace: the node table plus the declaration names that
/// point into it.
#[derive(Debug)]
pub struct TypeSpace {
    nodes: Vec<AlgebraicTypeNode>,
    names: HashMap<usize, String>,
}

impl TypeSpace {
    /// Build the typespace from a parsed schema document. Named entries
    /// without a name or a target index are ignored here; the normalizer
    /// warns about them separately.
    pub fn from_raw(raw: &RawSchema) -> Self {
        let mut names = HashMap::new();
        for entry in &raw.types {
            if let (Some(name), Some(ty)) = (entry.name.name.as_deref(), entry.ty) {
                names.insert(ty, name.to_string());
            }
        }
        TypeSpace {
            nodes: raw.typespace.types.clone(),
            names,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&AlgebraicTypeNode> {
        self.nodes.get(index)
    }

    /// Declaration name of a typespace index, if one points at it.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }
}

/// Cycle-aware, memoizing resolver over one typespace.
#[derive(Debug)]
pub struct Resolver<'a> {
    space: &'a TypeSpace,
    cache: HashMap<usize, ResolvedType>,
    visiting: Vec<usize>,
}

impl<'a> Resolver<'a> {
    pub fn new(space: &'a TypeSpace) -> Self {
        Resolver {
            space,
            cache: HashMap::new(),
            visiting: Vec::new(),
        }
    }

    /// Resolve a structural node to its binding-ready form.
    pub fn resolve(&mut self, node: &AlgebraicTypeNode) -> Result<ResolvedType, SchemaError> {
        match node {
            AlgebraicTypeNode::Primitive(prim) => Ok(resolve_primitive(*prim)),
            AlgebraicTypeNode::Ref(index) => self.resolve_ref(*index),
            AlgebraicTypeNode::Array(inner) => {
                let element = self.resolve(inner)?;
                Ok(ResolvedType {
                    ty: GdType::Array(Box::new(element.ty)),
                    wire_tag: element.wire_tag.map(|tag| WireTag::Vec(Box::new(tag))),
                    is_array: true,
                    is_optional: false,
                    kind: element.kind,
                })
            }
            AlgebraicTypeNode::Product(product) => self.resolve_inline_product(product),
            AlgebraicTypeNode::Sum(sum) => {
                if sum.is_option() {
                    let mut payload = self.resolve(&sum.variants[0].algebraic_type)?;
                    payload.is_optional = true;
                    Ok(payload)
                } else {
                    Err(SchemaError::UnsupportedType {
                        kind: "anonymous tagged union".to_string(),
                    })
                }
            }
            AlgebraicTypeNode::Unsupported(tag) => Err(SchemaError::UnsupportedType {
                kind: tag.clone(),
            }),
        }
    }

    /// Resolve a typespace index, following the declaration name if one
    /// exists. Results are cached per index; only successful resolutions
    /// enter the cache so a transient failure is re-reported on every use.
    pub fn resolve_ref(&mut self, index: usize) -> Result<ResolvedType, SchemaError> {
        if let Some(cached) = self.cache.get(&index) {
            return Ok(cached.clone());
        }
        let Some(node) = self.space.node(index) else {
            return Err(SchemaError::UnresolvedRef {
                index,
                len: self.space.len(),
            });
        };
        if self.visiting.contains(&index) {
            return Err(SchemaError::Cycle { index });
        }

        self.visiting.push(index);
        let resolved = self.resolve_named(index, node);
        self.visiting.pop();

        if let Ok(resolved) = &resolved {
            self.cache.insert(index, resolved.clone());
        }
        resolved
    }

    fn resolve_named(
        &mut self,
        index: usize,
        node: &AlgebraicTypeNode,
    ) -> Result<ResolvedType, SchemaError> {
        let Some(name) = self.space.name_of(index) else {
            // Unnamed entries are structural only; keep walking.
            return self.resolve(node);
        };

        // Engine-native value types pass through as-is.
        match name {
            "Vector2" => return Ok(ResolvedType::primitive(GdType::Vector2, None)),
            "Vector3" => return Ok(ResolvedType::primitive(GdType::Vector3, None)),
            _ => {}
        }

        let name = name.to_string();
        match node {
            AlgebraicTypeNode::Product(_) => Ok(ResolvedType {
                ty: GdType::Named(name),
                wire_tag: None,
                is_array: false,
                is_optional: false,
                kind: ResolvedKind::Struct,
            }),
            AlgebraicTypeNode::Sum(sum) => {
                if sum.is_option() {
                    let mut payload = self.resolve(&sum.variants[0].algebraic_type)?;
                    payload.is_optional = true;
                    Ok(payload)
                } else {
                    Ok(ResolvedType {
                        ty: GdType::Named(name),
                        wire_tag: Some(WireTag::Enum),
                        is_array: false,
                        is_optional: false,
                        kind: ResolvedKind::Enum,
                    })
                }
            }
            // A named alias of a primitive, array, or further reference is
            // transparent; the declaration name does not survive into the
            // bindings.
            other => self.resolve(other),
        }
    }

    fn resolve_inline_product(&mut self, product: &RawProduct) -> Result<ResolvedType, SchemaError> {
        if let Some(special) = special_product(product) {
            return Ok(special);
        }
        if product.elements.len() == 1 && product.elements[0].name().is_none() {
            // Single-element wrapper; unwrap transparently.
            return self.resolve(&product.elements[0].algebraic_type);
        }
        Err(SchemaError::UnsupportedType {
            kind: "anonymous record".to_string(),
        })
    }
}

/// Recognize the host's special single-field products: identities become
/// `PackedByteArray` with the `identity` tag, timestamps become `int`
/// carried as `i64`.
fn special_product(product: &RawProduct) -> Option<ResolvedType> {
    if product.elements.len() != 1 {
        return None;
    }
    match product.elements[0].name() {
        Some(IDENTITY_ELEMENT) => Some(ResolvedType::primitive(
            GdType::PackedByteArray,
            Some(WireTag::Identity),
        )),
        Some(TIMESTAMP_ELEMENT) => {
            Some(ResolvedType::primitive(GdType::Int, Some(WireTag::I64)))
        }
        _ => None,
    }
}

fn resolve_primitive(prim: PrimitiveType) -> ResolvedType {
    match prim {
        PrimitiveType::Bool => ResolvedType::primitive(GdType::Bool, None),
        PrimitiveType::I8 => ResolvedType::primitive(GdType::Int, Some(WireTag::I8)),
        PrimitiveType::U8 => ResolvedType::primitive(GdType::Int, Some(WireTag::U8)),
        PrimitiveType::I16 => ResolvedType::primitive(GdType::Int, Some(WireTag::I16)),
        PrimitiveType::U16 => ResolvedType::primitive(GdType::Int, Some(WireTag::U16)),
        PrimitiveType::I32 => ResolvedType::primitive(GdType::Int, Some(WireTag::I32)),
        PrimitiveType::U32 => ResolvedType::primitive(GdType::Int, Some(WireTag::U32)),
        PrimitiveType::I64 => ResolvedType::primitive(GdType::Int, Some(WireTag::I64)),
        PrimitiveType::U64 => ResolvedType::primitive(GdType::Int, Some(WireTag::U64)),
        PrimitiveType::F32 => ResolvedType::primitive(GdType::Float, Some(WireTag::F32)),
        PrimitiveType::F64 => ResolvedType::primitive(GdType::Float, Some(WireTag::F64)),
        PrimitiveType::Str => ResolvedType::primitive(GdType::String, None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::spec::{OptionalName, RawElement, RawSum};

    fn named(name: &str, node: AlgebraicTypeNode) -> RawElement {
        RawElement {
            name: OptionalName {
                some: Some(name.to_string()),
            },
            algebraic_type: node,
        }
    }

    fn unnamed(node: AlgebraicTypeNode) -> RawElement {
        RawElement {
            name: OptionalName { some: None },
            algebraic_type: node,
        }
    }

    fn space(nodes: Vec<AlgebraicTypeNode>, names: &[(usize, &str)]) -> TypeSpace {
        TypeSpace {
            nodes,
            names: names
                .iter()
                .map(|(i, n)| (*i, (*n).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_primitive_tags() {
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);

        let u64 = resolver
            .resolve(&AlgebraicTypeNode::Primitive(PrimitiveType::U64))
            .unwrap();
        assert_eq!(u64.ty, GdType::Int);
        assert_eq!(u64.wire_tag_str().as_deref(), Some("u64"));

        let s = resolver
            .resolve(&AlgebraicTypeNode::Primitive(PrimitiveType::Str))
            .unwrap();
        assert_eq!(s.ty, GdType::String);
        assert!(s.wire_tag.is_none());

        let b = resolver
            .resolve(&AlgebraicTypeNode::Primitive(PrimitiveType::Bool))
            .unwrap();
        assert!(b.wire_tag.is_none());
    }

    #[test]
    fn test_array_wraps_type_and_tag() {
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let node = AlgebraicTypeNode::Array(Box::new(AlgebraicTypeNode::Primitive(
            PrimitiveType::U8,
        )));
        let resolved = resolver.resolve(&node).unwrap();
        assert_eq!(resolved.ty, GdType::Array(Box::new(GdType::Int)));
        assert_eq!(resolved.wire_tag_str().as_deref(), Some("vec_u8"));
        assert!(resolved.is_array);
    }

    #[test]
    fn test_array_of_untagged_elements_has_no_tag() {
        let space = space(
            vec![AlgebraicTypeNode::Product(RawProduct { elements: vec![] })],
            &[(0, "Player")],
        );
        let mut resolver = Resolver::new(&space);
        let node = AlgebraicTypeNode::Array(Box::new(AlgebraicTypeNode::Ref(0)));
        let resolved = resolver.resolve(&node).unwrap();
        assert_eq!(
            resolved.ty,
            GdType::Array(Box::new(GdType::Named("Player".to_string())))
        );
        assert!(resolved.wire_tag.is_none());
    }

    #[test]
    fn test_identity_product() {
        let product = RawProduct {
            elements: vec![named(
                "__identity__",
                AlgebraicTypeNode::Array(Box::new(AlgebraicTypeNode::Primitive(
                    PrimitiveType::U8,
                ))),
            )],
        };
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let resolved = resolver
            .resolve(&AlgebraicTypeNode::Product(product))
            .unwrap();
        assert_eq!(resolved.ty, GdType::PackedByteArray);
        assert_eq!(resolved.wire_tag_str().as_deref(), Some("identity"));
    }

    #[test]
    fn test_timestamp_product() {
        let product = RawProduct {
            elements: vec![named(
                "__timestamp_micros_since_unix_epoch__",
                AlgebraicTypeNode::Primitive(PrimitiveType::I64),
            )],
        };
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let resolved = resolver
            .resolve(&AlgebraicTypeNode::Product(product))
            .unwrap();
        assert_eq!(resolved.ty, GdType::Int);
        assert_eq!(resolved.wire_tag_str().as_deref(), Some("i64"));
    }

    #[test]
    fn test_option_sum_unwraps_to_payload() {
        let sum = RawSum {
            variants: vec![
                named("some", AlgebraicTypeNode::Primitive(PrimitiveType::Str)),
                named(
                    "none",
                    AlgebraicTypeNode::Product(RawProduct { elements: vec![] }),
                ),
            ],
        };
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let resolved = resolver.resolve(&AlgebraicTypeNode::Sum(sum)).unwrap();
        assert_eq!(resolved.ty, GdType::String);
        assert!(resolved.is_optional);
    }

    #[test]
    fn test_misordered_variants_are_not_optional() {
        let sum = RawSum {
            variants: vec![
                named(
                    "none",
                    AlgebraicTypeNode::Product(RawProduct { elements: vec![] }),
                ),
                named("some", AlgebraicTypeNode::Primitive(PrimitiveType::Str)),
            ],
        };
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let err = resolver.resolve(&AlgebraicTypeNode::Sum(sum)).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedType { .. }));
    }

    #[test]
    fn test_named_sum_resolves_to_enum_ref() {
        let sum = RawSum {
            variants: vec![
                named(
                    "Red",
                    AlgebraicTypeNode::Product(RawProduct { elements: vec![] }),
                ),
                named(
                    "Green",
                    AlgebraicTypeNode::Product(RawProduct { elements: vec![] }),
                ),
            ],
        };
        let space = space(vec![AlgebraicTypeNode::Sum(sum)], &[(0, "Color")]);
        let mut resolver = Resolver::new(&space);
        let resolved = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap();
        assert_eq!(resolved.ty, GdType::Named("Color".to_string()));
        assert_eq!(resolved.wire_tag_str().as_deref(), Some("enum"));
        assert_eq!(resolved.kind, ResolvedKind::Enum);
    }

    #[test]
    fn test_native_vector_names_bypass_structure() {
        let product = RawProduct {
            elements: vec![
                named("x", AlgebraicTypeNode::Primitive(PrimitiveType::F32)),
                named("y", AlgebraicTypeNode::Primitive(PrimitiveType::F32)),
            ],
        };
        let space = space(vec![AlgebraicTypeNode::Product(product)], &[(0, "Vector2")]);
        let mut resolver = Resolver::new(&space);
        let resolved = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap();
        assert_eq!(resolved.ty, GdType::Vector2);
        assert!(resolved.wire_tag.is_none());
        assert_eq!(resolved.kind, ResolvedKind::Primitive);
    }

    #[test]
    fn test_named_primitive_alias_is_transparent() {
        let space = space(
            vec![AlgebraicTypeNode::Primitive(PrimitiveType::U32)],
            &[(0, "UserId")],
        );
        let mut resolver = Resolver::new(&space);
        let resolved = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap();
        assert_eq!(resolved.ty, GdType::Int);
        assert_eq!(resolved.wire_tag_str().as_deref(), Some("u32"));
    }

    #[test]
    fn test_out_of_bounds_ref() {
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let err = resolver.resolve(&AlgebraicTypeNode::Ref(7)).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedRef { index: 7, len: 0 }));
    }

    #[test]
    fn test_ref_cycle_is_an_error() {
        let space = space(
            vec![AlgebraicTypeNode::Ref(1), AlgebraicTypeNode::Ref(0)],
            &[],
        );
        let mut resolver = Resolver::new(&space);
        let err = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap_err();
        assert!(matches!(err, SchemaError::Cycle { .. }));
    }

    #[test]
    fn test_self_cycle_is_an_error() {
        let space = space(vec![AlgebraicTypeNode::Ref(0)], &[]);
        let mut resolver = Resolver::new(&space);
        let err = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap_err();
        assert!(matches!(err, SchemaError::Cycle { index: 0 }));
    }

    #[test]
    fn test_cache_returns_same_resolution() {
        let space = space(
            vec![AlgebraicTypeNode::Primitive(PrimitiveType::F64)],
            &[],
        );
        let mut resolver = Resolver::new(&space);
        let first = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap();
        let second = resolver.resolve(&AlgebraicTypeNode::Ref(0)).unwrap();
        assert_eq!(first.ty, second.ty);
        assert_eq!(first.wire_tag, second.wire_tag);
    }

    #[test]
    fn test_unnamed_single_element_wrapper_unwraps() {
        let product = RawProduct {
            elements: vec![unnamed(AlgebraicTypeNode::Primitive(PrimitiveType::U16))],
        };
        let space = space(vec![], &[]);
        let mut resolver = Resolver::new(&space);
        let resolved = resolver
            .resolve(&AlgebraicTypeNode::Product(product))
            .unwrap();
        assert_eq!(resolved.wire_tag_str().as_deref(), Some("u16"));
    }
}
