//! GDScript AST for binding emission.
//!
//! A deliberately small slice of the language: class-level declarations
//! (`class_name`, constants, exported variables, an anonymous `enum` block)
//! plus the handful of statements and expressions the binding templates
//! need. Anything that does not fit the AST goes through `Raw`.

/// A GDScript type annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdType {
    Int,
    Float,
    Bool,
    String,
    Variant,
    PackedByteArray,
    Vector2,
    Vector3,
    Callable,
    Void,
    /// A generated class: `Player`, `Color`, ...
    Named(String),
    /// Typed array: `Array[T]`
    Array(Box<GdType>),
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum GdLiteral {
    Str(String),
    Int(i64),
    Null,
}

/// A GDScript expression.
#[derive(Debug, Clone)]
pub enum GdExpr {
    /// Identifier: `result`
    Ident(String),
    /// Literal value: `"player"`, `42`, `null`
    Literal(GdLiteral),
    /// Call: `callee(a, b)`
    Call {
        callee: Box<GdExpr>,
        args: Vec<GdExpr>,
    },
    /// Member access: `SpacetimeDB.call_reducer`
    Member { object: Box<GdExpr>, prop: String },
    /// Array literal: `[a, b]`
    Array(Vec<GdExpr>),
    /// Await expression: `await expr`
    Await(Box<GdExpr>),
    /// Raw code that does not fit the AST
    Raw(String),
}

impl GdExpr {
    /// Shorthand for a string literal expression.
    pub fn str(s: impl Into<String>) -> Self {
        GdExpr::Literal(GdLiteral::Str(s.into()))
    }

    /// Shorthand for an identifier expression.
    pub fn ident(s: impl Into<String>) -> Self {
        GdExpr::Ident(s.into())
    }

    /// Shorthand for a free-function call: `name(args...)`.
    pub fn call(name: impl Into<String>, args: Vec<GdExpr>) -> Self {
        GdExpr::Call {
            callee: Box::new(GdExpr::Ident(name.into())),
            args,
        }
    }

    /// Shorthand for a method call: `object.method(args...)`.
    pub fn method_call(object: impl Into<String>, method: impl Into<String>, args: Vec<GdExpr>) -> Self {
        GdExpr::Call {
            callee: Box::new(GdExpr::Member {
                object: Box::new(GdExpr::Ident(object.into())),
                prop: method.into(),
            }),
            args,
        }
    }
}

/// A statement in a function body.
#[derive(Debug, Clone)]
pub enum GdStmt {
    /// `var name = init`
    VarDecl { name: String, init: GdExpr },
    /// `target = value`
    Assign { target: GdExpr, value: GdExpr },
    /// Expression statement
    Expr(GdExpr),
    /// `return` / `return expr`
    Return(Option<GdExpr>),
    /// `match subject:` with pattern arms
    Match {
        subject: GdExpr,
        arms: Vec<GdMatchArm>,
    },
    /// `pass`
    Pass,
}

/// One arm of a `match` statement. The pattern is kept as text (`0`, `_`).
#[derive(Debug, Clone)]
pub struct GdMatchArm {
    pub pattern: String,
    pub body: Vec<GdStmt>,
}

/// A function parameter, optionally typed and defaulted.
#[derive(Debug, Clone)]
pub struct GdParam {
    pub name: String,
    pub ty: Option<GdType>,
    pub default: Option<GdExpr>,
}

impl GdParam {
    pub fn typed(name: impl Into<String>, ty: GdType) -> Self {
        GdParam {
            name: name.into(),
            ty: Some(ty),
            default: None,
        }
    }
}

/// A function definition.
#[derive(Debug, Clone)]
pub struct GdFunction {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<GdParam>,
    pub return_type: Option<GdType>,
    pub body: Vec<GdStmt>,
}

/// A class-level variable, optionally `@export`ed.
#[derive(Debug, Clone)]
pub struct GdVar {
    pub name: String,
    pub ty: GdType,
    pub exported: bool,
    pub default: Option<GdExpr>,
}

/// A class-level constant.
#[derive(Debug, Clone)]
pub struct GdConst {
    pub name: String,
    pub ty: Option<GdType>,
    pub value: GdExpr,
}

/// One complete generated script file: a named class extending a base.
#[derive(Debug, Clone)]
pub struct GdClass {
    pub class_name: String,
    pub extends: String,
    pub consts: Vec<GdConst>,
    pub vars: Vec<GdVar>,
    /// Anonymous `enum { A, B, ... }` block, one entry per variant in
    /// ordinal order.
    pub enum_block: Option<Vec<String>>,
    pub functions: Vec<GdFunction>,
}

impl GdClass {
    /// An empty class extending `Resource`, the base of every artifact.
    pub fn resource(class_name: impl Into<String>) -> Self {
        GdClass {
            class_name: class_name.into(),
            extends: "Resource".to_string(),
            consts: Vec::new(),
            vars: Vec::new(),
            enum_block: None,
            functions: Vec::new(),
        }
    }
}
