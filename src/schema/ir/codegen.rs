//! Lowering of the normalized model into GDScript artifacts.
//!
//! One artifact per declaration plus one reducer module per schema module.
//! Table rows and shared types both become `Resource` subclasses carrying
//! their wire metadata in `set_meta` calls; reducers become static stubs
//! over the runtime singleton. Output is fully determined by the model, so
//! regenerating from the same schema rewrites identical files.

use crate::schema::ir::emit::Emit;
use crate::schema::ir::model::{
    EnumDescriptor, ReducerDescriptor, SchemaModel, StructDescriptor,
};
use crate::schema::ir::types::{
    GdClass, GdConst, GdExpr, GdFunction, GdLiteral, GdMatchArm, GdParam, GdStmt, GdType, GdVar,
};
use crate::schema::ir::utils::{to_lower_snake_case, to_pascal_case};

/// Directory for generated table-row classes, relative to the output root.
const TABLES_DIR: &str = "tables";
/// Directory for generated shared types, relative to the output root.
const TYPES_DIR: &str = "spacetime_types";

/// The runtime autoload the reducer stubs call into.
const RUNTIME_SINGLETON: &str = "SpacetimeDB";

/// What role a generated file plays in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Table,
    SharedType,
    ReducerModule,
    ReducerIndex,
}

/// One generated file: its path relative to the output root plus the class
/// to render into it.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: String,
    pub class: GdClass,
}

impl Artifact {
    pub fn render(&self) -> String {
        self.class.emit()
    }
}

/// Generate every artifact for one module, in declaration order followed by
/// the reducer module.
pub fn codegen_artifacts(model: &SchemaModel) -> Vec<Artifact> {
    let mut artifacts = Vec::new();
    for desc in &model.structs {
        let (kind, dir) = if desc.is_table() {
            (ArtifactKind::Table, TABLES_DIR)
        } else {
            (ArtifactKind::SharedType, TYPES_DIR)
        };
        artifacts.push(Artifact {
            kind,
            path: format!("{dir}/{}.gd", to_lower_snake_case(&desc.name)),
            class: struct_class(desc),
        });
    }
    for desc in &model.enums {
        artifacts.push(Artifact {
            kind: ArtifactKind::SharedType,
            path: format!("{TYPES_DIR}/{}.gd", to_lower_snake_case(&desc.name)),
            class: enum_class(desc),
        });
    }
    artifacts.push(Artifact {
        kind: ArtifactKind::ReducerModule,
        path: format!("reducers_{}.gd", model.module),
        class: reducer_module_class(model),
    });
    artifacts
}

/// Generate the root `reducers.gd` index that preloads every module's
/// reducer script.
pub fn codegen_reducer_index(modules: &[String], out_dir: &str) -> Artifact {
    let base = out_dir.trim_start_matches("res://").trim_matches('/');
    let mut class = GdClass::resource("Reducers");
    for module in modules {
        let path = if base.is_empty() {
            format!("res://reducers_{module}.gd")
        } else {
            format!("res://{base}/reducers_{module}.gd")
        };
        class.consts.push(GdConst {
            name: to_pascal_case(module),
            ty: None,
            value: GdExpr::call("preload", vec![GdExpr::str(path)]),
        });
    }
    Artifact {
        kind: ArtifactKind::ReducerIndex,
        path: "reducers.gd".to_string(),
        class,
    }
}

fn set_meta(key: String, value: String) -> GdStmt {
    GdStmt::Expr(GdExpr::call(
        "set_meta",
        vec![GdExpr::str(key), GdExpr::str(value)],
    ))
}

fn struct_class(desc: &StructDescriptor) -> GdClass {
    let class_name = to_pascal_case(&desc.name);
    let mut class = GdClass::resource(class_name.clone());

    for field in &desc.fields {
        class.vars.push(GdVar {
            name: field.name.clone(),
            ty: field.resolved.ty.clone(),
            exported: true,
            default: None,
        });
    }

    let mut init_body = Vec::new();
    if let Some(table) = &desc.table {
        init_body.push(set_meta("table_name".to_string(), table.table_name.clone()));
        if let Some(pk) = &table.primary_key {
            init_body.push(set_meta("primary_key".to_string(), pk.clone()));
        }
    }
    for field in &desc.fields {
        if let Some(tag) = field.resolved.wire_tag_str() {
            init_body.push(set_meta(format!("bsatn_type_{}", field.name), tag));
        }
    }
    init_body.push(GdStmt::Pass);
    class.functions.push(GdFunction {
        name: "_init".to_string(),
        is_static: false,
        params: Vec::new(),
        return_type: None,
        body: init_body,
    });

    class.functions.push(create_factory(&class_name, desc));
    class
}

/// `static func create(_a, _b) -> T`: construct, assign each field from its
/// underscore-prefixed parameter, return.
fn create_factory(class_name: &str, desc: &StructDescriptor) -> GdFunction {
    let params = desc
        .fields
        .iter()
        .map(|field| GdParam {
            name: format!("_{}", field.name),
            ty: Some(field.resolved.ty.clone()),
            default: None,
        })
        .collect();

    let mut body = vec![GdStmt::VarDecl {
        name: "result".to_string(),
        init: GdExpr::method_call(class_name, "new", vec![]),
    }];
    for field in &desc.fields {
        body.push(GdStmt::Assign {
            target: GdExpr::Member {
                object: Box::new(GdExpr::ident("result")),
                prop: field.name.clone(),
            },
            value: GdExpr::ident(format!("_{}", field.name)),
        });
    }
    body.push(GdStmt::Return(Some(GdExpr::ident("result"))));

    GdFunction {
        name: "create".to_string(),
        is_static: true,
        params,
        return_type: Some(GdType::Named(class_name.to_string())),
        body,
    }
}

fn enum_class(desc: &EnumDescriptor) -> GdClass {
    let class_name = to_pascal_case(&desc.name);
    let mut class = GdClass::resource(class_name.clone());

    // Payload wire tag per variant, empty string when the payload carries
    // none; the runtime uses this to decode tagged payloads.
    class.consts.push(GdConst {
        name: "enum_sub_classes".to_string(),
        ty: Some(GdType::Named("Array".to_string())),
        value: GdExpr::Array(
            desc.variants
                .iter()
                .map(|v| {
                    GdExpr::str(
                        v.payload
                            .as_ref()
                            .and_then(|p| p.wire_tag_str())
                            .unwrap_or_default(),
                    )
                })
                .collect(),
        ),
    });

    let value_default = match desc.variants.first() {
        Some(first) => GdExpr::ident(first.name.clone()),
        None => GdExpr::Literal(GdLiteral::Int(0)),
    };
    class.vars.push(GdVar {
        name: "value".to_string(),
        ty: GdType::Int,
        exported: false,
        default: Some(value_default),
    });
    class.vars.push(GdVar {
        name: "data".to_string(),
        ty: GdType::Variant,
        exported: false,
        default: None,
    });

    class.enum_block = Some(desc.variants.iter().map(|v| v.name.clone()).collect());

    class.functions.push(GdFunction {
        name: "_init".to_string(),
        is_static: false,
        params: Vec::new(),
        return_type: None,
        body: vec![set_meta("bsatn_type_value".to_string(), "i64".to_string())],
    });

    class.functions.push(parse_function(desc));
    class.functions.push(enum_create(&class_name));
    for variant in &desc.variants {
        let mut params = Vec::new();
        let mut args = vec![GdExpr::ident(variant.name.clone())];
        if let Some(payload) = &variant.payload {
            params.push(GdParam {
                name: "_data".to_string(),
                ty: Some(payload.ty.clone()),
                default: None,
            });
            args.push(GdExpr::ident("_data"));
        }
        class.functions.push(GdFunction {
            name: format!("create_{}", to_lower_snake_case(&variant.name)),
            is_static: true,
            params,
            return_type: Some(GdType::Named(class_name.clone())),
            body: vec![GdStmt::Return(Some(GdExpr::call("create", args)))],
        });
    }
    class
}

/// `static func parse(i) -> String`: variant name by ordinal, with an
/// unknown sentinel for out-of-range values.
fn parse_function(desc: &EnumDescriptor) -> GdFunction {
    let mut arms: Vec<GdMatchArm> = desc
        .variants
        .iter()
        .enumerate()
        .map(|(ordinal, variant)| GdMatchArm {
            pattern: ordinal.to_string(),
            body: vec![GdStmt::Return(Some(GdExpr::str(variant.name.clone())))],
        })
        .collect();
    arms.push(GdMatchArm {
        pattern: "_".to_string(),
        body: vec![
            GdStmt::Expr(GdExpr::Raw(
                r#"printerr("Enum does not have value for %d. This is out of bounds." % i)"#
                    .to_string(),
            )),
            GdStmt::Return(Some(GdExpr::str("Unknown"))),
        ],
    });
    GdFunction {
        name: "parse".to_string(),
        is_static: true,
        params: vec![GdParam::typed("i", GdType::Int)],
        return_type: Some(GdType::String),
        body: vec![GdStmt::Match {
            subject: GdExpr::ident("i"),
            arms,
        }],
    }
}

fn enum_create(class_name: &str) -> GdFunction {
    GdFunction {
        name: "create".to_string(),
        is_static: true,
        params: vec![
            GdParam::typed("type", GdType::Int),
            GdParam {
                name: "_data".to_string(),
                ty: Some(GdType::Variant),
                default: Some(GdExpr::Literal(GdLiteral::Null)),
            },
        ],
        return_type: Some(GdType::Named(class_name.to_string())),
        body: vec![
            GdStmt::VarDecl {
                name: "result".to_string(),
                init: GdExpr::method_call(class_name, "new", vec![]),
            },
            GdStmt::Assign {
                target: GdExpr::Member {
                    object: Box::new(GdExpr::ident("result")),
                    prop: "value".to_string(),
                },
                value: GdExpr::ident("type"),
            },
            GdStmt::Assign {
                target: GdExpr::Member {
                    object: Box::new(GdExpr::ident("result")),
                    prop: "data".to_string(),
                },
                value: GdExpr::ident("_data"),
            },
            GdStmt::Return(Some(GdExpr::ident("result"))),
        ],
    }
}

fn reducer_module_class(model: &SchemaModel) -> GdClass {
    let mut class = GdClass::resource(format!("{}Reducer", to_pascal_case(&model.module)));
    for reducer in &model.reducers {
        class.functions.push(reducer_stub(reducer));
    }
    class
}

/// One async call stub: fire the reducer, await the transaction update,
/// hand it to the callback.
fn reducer_stub(reducer: &ReducerDescriptor) -> GdFunction {
    let mut params: Vec<GdParam> = reducer
        .params
        .iter()
        .map(|p| GdParam {
            name: p.name.clone(),
            ty: Some(p.resolved.ty.clone()),
            default: None,
        })
        .collect();
    params.push(GdParam {
        name: "cb".to_string(),
        ty: Some(GdType::Callable),
        default: Some(GdExpr::Raw(
            "func(_t: TransactionUpdateData): pass".to_string(),
        )),
    });

    let args = GdExpr::Array(
        reducer
            .params
            .iter()
            .map(|p| GdExpr::ident(p.name.clone()))
            .collect(),
    );
    // Wire tags parallel to the argument list; untagged positions stay
    // as empty strings so the codec can index by position.
    let tags = GdExpr::Array(
        reducer
            .params
            .iter()
            .map(|p| GdExpr::str(p.resolved.wire_tag_str().unwrap_or_default()))
            .collect(),
    );
    GdFunction {
        name: reducer.name.clone(),
        is_static: true,
        params,
        return_type: Some(GdType::Void),
        body: vec![
            GdStmt::VarDecl {
                name: "id".to_string(),
                init: GdExpr::method_call(
                    RUNTIME_SINGLETON,
                    "call_reducer",
                    vec![GdExpr::str(reducer.name.clone()), args, tags],
                ),
            },
            GdStmt::VarDecl {
                name: "result".to_string(),
                init: GdExpr::Await(Box::new(GdExpr::method_call(
                    RUNTIME_SINGLETON,
                    "wait_for_reducer_response",
                    vec![GdExpr::ident("id")],
                ))),
            },
            GdStmt::Expr(GdExpr::method_call("cb", "call", vec![GdExpr::ident("result")])),
        ],
    }
}
