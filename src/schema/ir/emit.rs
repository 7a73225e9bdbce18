//! GDScript emission via the `Emit` trait.
//!
//! Every AST node renders itself to text; emission is purely mechanical so
//! identical input always produces byte-identical output. Generated scripts
//! are tab-indented, matching the engine's own formatting.

use super::types::{
    GdClass, GdConst, GdExpr, GdFunction, GdLiteral, GdMatchArm, GdParam, GdStmt, GdType, GdVar,
};

/// Banner placed at the top of every generated file.
pub const GENERATED_BANNER: &str = "#Do not edit this file, it is generated automatically.";

/// Trait for emitting GDScript source from AST nodes.
pub trait Emit {
    /// Convert the AST node to its GDScript string representation.
    fn emit(&self) -> String;
}

impl Emit for GdType {
    fn emit(&self) -> String {
        match self {
            GdType::Int => "int".to_string(),
            GdType::Float => "float".to_string(),
            GdType::Bool => "bool".to_string(),
            GdType::String => "String".to_string(),
            GdType::Variant => "Variant".to_string(),
            GdType::PackedByteArray => "PackedByteArray".to_string(),
            GdType::Vector2 => "Vector2".to_string(),
            GdType::Vector3 => "Vector3".to_string(),
            GdType::Callable => "Callable".to_string(),
            GdType::Void => "void".to_string(),
            GdType::Named(name) => name.clone(),
            GdType::Array(inner) => format!("Array[{}]", inner.emit()),
        }
    }
}

impl Emit for GdLiteral {
    fn emit(&self) -> String {
        match self {
            GdLiteral::Str(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
            GdLiteral::Int(i) => i.to_string(),
            GdLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for GdExpr {
    fn emit(&self) -> String {
        match self {
            GdExpr::Ident(name) => name.clone(),
            GdExpr::Literal(lit) => lit.emit(),
            GdExpr::Call { callee, args } => {
                let args_str = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("{}({})", callee.emit(), args_str)
            }
            GdExpr::Member { object, prop } => format!("{}.{}", object.emit(), prop),
            GdExpr::Array(items) => {
                let items_str = items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("[{items_str}]")
            }
            GdExpr::Await(inner) => format!("await {}", inner.emit()),
            GdExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for GdParam {
    fn emit(&self) -> String {
        let mut out = self.name.clone();
        if let Some(ty) = &self.ty {
            out.push_str(": ");
            out.push_str(&ty.emit());
        }
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(&default.emit());
        }
        out
    }
}

impl Emit for GdStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl GdStmt {
    /// Emit with the given indentation depth (one tab per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "\t".repeat(indent);
        match self {
            GdStmt::VarDecl { name, init } => {
                format!("{prefix}var {name} = {}\n", init.emit())
            }
            GdStmt::Assign { target, value } => {
                format!("{prefix}{} = {}\n", target.emit(), value.emit())
            }
            GdStmt::Expr(expr) => format!("{prefix}{}\n", expr.emit()),
            GdStmt::Return(expr) => match expr {
                Some(e) => format!("{prefix}return {}\n", e.emit()),
                None => format!("{prefix}return\n"),
            },
            GdStmt::Match { subject, arms } => {
                let mut out = format!("{prefix}match {}:\n", subject.emit());
                for arm in arms {
                    out.push_str(&arm.emit_indented(indent + 1));
                }
                out
            }
            GdStmt::Pass => format!("{prefix}pass\n"),
        }
    }
}

impl GdMatchArm {
    fn emit_indented(&self, indent: usize) -> String {
        let prefix = "\t".repeat(indent);
        // A lone return collapses onto the pattern line, `0: return "Red"`.
        if let [GdStmt::Return(Some(expr))] = self.body.as_slice() {
            return format!("{prefix}{}: return {}\n", self.pattern, expr.emit());
        }
        let mut out = format!("{prefix}{}:\n", self.pattern);
        for stmt in &self.body {
            out.push_str(&stmt.emit_indented(indent + 1));
        }
        out
    }
}

impl Emit for GdFunction {
    fn emit(&self) -> String {
        let mut out = String::new();
        if self.is_static {
            out.push_str("static ");
        }
        let params = self
            .params
            .iter()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("func {}({params})", self.name));
        if let Some(ret) = &self.return_type {
            out.push_str(&format!(" -> {}", ret.emit()));
        }
        out.push_str(":\n");
        if self.body.is_empty() {
            out.push_str("\tpass\n");
        } else {
            for stmt in &self.body {
                out.push_str(&stmt.emit_indented(1));
            }
        }
        out
    }
}

impl Emit for GdConst {
    fn emit(&self) -> String {
        match &self.ty {
            Some(ty) => format!("const {}: {} = {}\n", self.name, ty.emit(), self.value.emit()),
            None => format!("const {} = {}\n", self.name, self.value.emit()),
        }
    }
}

impl Emit for GdVar {
    fn emit(&self) -> String {
        let export = if self.exported { "@export " } else { "" };
        match &self.default {
            Some(default) => format!(
                "{export}var {}: {} = {}\n",
                self.name,
                self.ty.emit(),
                default.emit()
            ),
            None => format!("{export}var {}: {}\n", self.name, self.ty.emit()),
        }
    }
}

impl Emit for GdClass {
    fn emit(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        sections.push(format!(
            "{GENERATED_BANNER}\nclass_name {} extends {}\n",
            self.class_name, self.extends
        ));

        if !self.consts.is_empty() || !self.vars.is_empty() {
            let mut block = String::new();
            for c in &self.consts {
                block.push_str(&c.emit());
            }
            for v in &self.vars {
                block.push_str(&v.emit());
            }
            sections.push(block);
        }

        if let Some(variants) = &self.enum_block {
            let mut block = String::from("enum {\n");
            let lines: Vec<String> = variants.iter().map(|v| format!("\t{v}")).collect();
            block.push_str(&lines.join(",\n"));
            block.push_str("\n}\n");
            sections.push(block);
        }

        for func in &self.functions {
            sections.push(func.emit());
        }

        sections.join("\n")
    }
}
