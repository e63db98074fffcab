//! Rust 方言：`impl Implementation` 上的安全方法 + 从头文件合成的 `mod ffi`

use std::fmt::Write as _;
use std::path::Path;

use super::{Dialect, FnCx, line, render_expr, violation_consts};
use crate::backend::call::Call;
use crate::backend::signature::Signature;
use crate::backend::types::TypeTables;
use crate::error::{GenError, GenResult};
use crate::frontend::ast::{CType, Declaration, Header, ScalarKind, TypeKey};
use crate::middle::ir::{Elem, Expr, Ret, Stmt, Violation};
use crate::middle::tables::{EnumCategory, RuleTables};
use crate::project::Target;

const PREAMBLE: &str = include_str!("preamble_rust.in");

const FN: &str = "    ";
const BODY: &str = "        ";
const ARM: &str = "            ";

/// 规范短名里不能按大小写拆开的
const SNAKE_OVERRIDES: [(&str, &str); 2] = [("kL", "kl"), ("kU", "ku")];

pub struct RustDialect {
    types: TypeTables,
}

impl RustDialect {
    pub fn new() -> Self {
        let key = |kind: ScalarKind, pointer: bool| TypeKey { kind, pointer };
        let types = TypeTables {
            elems: crate::fast_map! {
                Elem::Char => "u8",
                Elem::Int => "i32",
                Elem::F32 => "f32",
                Elem::F64 => "f64",
                Elem::C64 => "Complex32",
                Elem::C128 => "Complex64",
            },
            int: "isize",
            slice: "&[{elem}]",
            slice_mut: "&mut [{elem}]",
            enums: crate::fast_map! {
                EnumCategory::Transpose => "Transpose",
                EnumCategory::Uplo => "Uplo",
                EnumCategory::Diag => "Diag",
                EnumCategory::Side => "Side",
            },
            enum_variant: "{enum}::{variant}",
            marshal: crate::fast_map! {
                key(ScalarKind::Int, false) => "c_int_of({name})",
                key(ScalarKind::Index, false) => "{name} as usize",
                key(ScalarKind::Char, false) => "{name} as c_char",
                key(ScalarKind::Float, false) => "{name}",
                key(ScalarKind::Double, false) => "{name}",
                key(ScalarKind::Float, true) => "{name}",
                key(ScalarKind::Double, true) => "{name}",
                key(ScalarKind::Int, true) => "{name}.cast()",
                key(ScalarKind::Char, true) => "{name}.cast()",
                key(ScalarKind::Void, true) => "{name}.cast()",
            },
            marshal_enum: "{name}",
            marshal_order: "ffi::{enum}::{variant}",
            array_addr: "_{name}",
            coefficient_addr: "ptr::from_ref(&{name})",
            returns: crate::fast_map! {
                ScalarKind::Float => ("f32", "{call}"),
                ScalarKind::Double => ("f64", "{call}"),
                ScalarKind::Int => ("isize", "{call} as isize"),
                ScalarKind::Index => ("isize", "{call} as isize"),
            },
        };
        Self { types }
    }
}

impl Default for RustDialect {
    fn default() -> Self {
        Self::new()
    }
}

/// `incX` -> `inc_x`，`rowA` -> `row_a`
pub fn snake_case(canonical: &str) -> String {
    if let Some((_, s)) = SNAKE_OVERRIDES.iter().find(|(c, _)| *c == canonical) {
        return s.to_string();
    }
    let mut out = String::with_capacity(canonical.len() + 2);
    for (i, ch) in canonical.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

impl Dialect for RustDialect {
    fn target(&self) -> Target { Target::Rust }

    fn types(&self) -> &TypeTables { &self.types }

    fn ident(&self, canonical: &str) -> String { snake_case(canonical) }

    fn fn_name(&self, blas: &str) -> String { blas.to_string() }

    fn groups_params(&self) -> bool { false }

    fn native_call(&self, native: &str, args: &str) -> String {
        format!("ffi::{native}({args})")
    }

    fn violation(&self, v: Violation) -> String {
        match v {
            Violation::BadTranspose => "BAD_TRANSPOSE".into(),
            Violation::BadUplo => "BAD_UPLO".into(),
            Violation::BadDiag => "BAD_DIAG".into(),
            Violation::BadSide => "BAD_SIDE".into(),
            Violation::BadFlag => "BAD_FLAG".into(),
            Violation::NegativeDim(d) => format!("{}_LT_0", d.ident().to_uppercase()),
            Violation::ZeroInc(x) => format!("ZERO_INC_{}", x.letter()),
            Violation::BadLd(m) => format!("BAD_LD_{}", m.letter()),
            Violation::ShortArray(a) => format!("SHORT_{}", a.ident().to_uppercase()),
        }
    }

    fn native_variant(&self, ty: &str, variant: &str) -> String {
        format!("ffi::{ty}::{variant}")
    }

    fn one(&self, elem: Elem) -> String {
        match elem {
            Elem::C64 => "Complex32::new(1.0, 0.0)".into(),
            Elem::C128 => "Complex64::new(1.0, 0.0)".into(),
            Elem::F32 | Elem::F64 => "1.0".into(),
            Elem::Char | Elem::Int => "1".into(),
        }
    }

    fn len(&self, array: &str) -> String { format!("len({array})") }

    fn body_indent(&self) -> &'static str { BODY }

    fn fn_indent(&self) -> &'static str { FN }

    fn doc_line(&self, text: &str) -> String {
        if text.is_empty() { format!("{FN}///") } else { format!("{FN}/// {text}") }
    }

    fn preamble(&self, header: &Header, _rules: &RuleTables) -> String {
        let consts = violation_consts(self, |name, msg| format!("const {name}: &str = {msg:?};"));
        PREAMBLE.replace("{header}", &header_name(header)).replace("{violations}", &consts)
    }

    fn epilogue(&self, header: &Header) -> GenResult<String> {
        let mut out = String::from("}\n\n");
        write_ffi(header, &mut out)?;
        Ok(out)
    }

    fn open_fn(&self, sig: &Signature, out: &mut String) {
        let mut params = String::from("&self");
        for p in &sig.params {
            let _ = write!(params, ", {}: {}", p.name, p.ty);
        }
        let _ = write!(out, "{FN}pub fn {}({params})", sig.name);
        if let Some(ret) = sig.ret {
            let _ = write!(out, " -> {ret}");
        }
        out.push_str(" {\n");
    }

    fn stmt(&self, s: &Stmt, fx: &FnCx<'_>, out: &mut String) -> GenResult<()> {
        match s {
            Stmt::EnumSwitch { var, category, native, arms, exhaustive, err } => {
                let v = self.ident(var);
                line(out, BODY, &format!("let {v} = match {v} {{"));
                for (lib, nat) in arms {
                    let lib = fx.mapper.library_variant(*category, lib);
                    line(out, ARM, &format!("{lib} => {},", self.native_variant(native, nat)));
                }
                if !exhaustive {
                    line(out, ARM, &format!("_ => panic!(\"{{{}}}\"),", self.violation(*err)));
                }
                line(out, BODY, "};");
            }
            Stmt::Guard { cond, err } => {
                line(out, BODY, &format!("if {} {{", render_expr(self, cond)));
                line(out, ARM, &format!("panic!(\"{{{}}}\");", self.violation(*err)));
                line(out, BODY, "}");
            }
            Stmt::Select { names, cond, then, otherwise } => {
                let names: Vec<_> = names.iter().map(|n| self.ident(n)).collect();
                let tuple = |es: &[Expr]| {
                    let parts: Vec<_> = es.iter().map(|e| render_expr(self, e)).collect();
                    if parts.len() == 1 { parts.join("") } else { format!("({})", parts.join(", ")) }
                };
                let lhs = if names.len() == 1 { names.join("") } else { format!("({})", names.join(", ")) };
                line(
                    out,
                    BODY,
                    &format!(
                        "let {lhs} = if {} {{ {} }} else {{ {} }};",
                        render_expr(self, cond),
                        tuple(&then[..]),
                        tuple(&otherwise[..])
                    ),
                );
            }
            Stmt::QuickReturn { cond, value } => {
                line(out, BODY, &format!("if {} {{", render_expr(self, cond)));
                match value {
                    Some(v) => line(out, ARM, &format!("return {};", ret_value(*v, fx.ret))),
                    None => line(out, ARM, "return;"),
                }
                line(out, BODY, "}");
            }
            Stmt::Address { var, mutable, .. } => {
                let v = self.ident(var);
                let (null, ptr) = if *mutable { ("ptr::null_mut()", "as_mut_ptr") } else { ("ptr::null()", "as_ptr") };
                line(out, BODY, &format!("let _{v} = if {v}.is_empty() {{ {null} }} else {{ {v}.{ptr}() }};"));
            }
            Stmt::Comment(text) => self.comment(text, out),
            Stmt::Blank => out.push('\n'),
        }
        Ok(())
    }

    fn call(&self, call: &Call, out: &mut String) {
        if call.returns {
            line(out, BODY, &format!("unsafe {{ {} }}", call.expr));
        } else {
            line(out, BODY, &format!("unsafe {{ {} }};", call.expr));
        }
    }

    fn close_fn(&self, out: &mut String) {
        line(out, FN, "}");
    }
}

fn ret_value(v: Ret, ret: &CType) -> &'static str {
    match (v, &ret.kind) {
        (Ret::MinusOne, _) => "-1",
        (Ret::Zero, ScalarKind::Float | ScalarKind::Double) => "0.0",
        (Ret::Zero, _) => "0",
    }
}

fn header_name(header: &Header) -> String {
    Path::new(&header.file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| header.file.clone())
}

/* =========================
 *        mod ffi
 * ========================= */

fn write_ffi(header: &Header, out: &mut String) -> GenResult<()> {
    out.push_str("mod ffi {\n");
    out.push_str("    #![allow(non_camel_case_types, non_snake_case, dead_code)]\n\n");
    out.push_str("    use std::ffi::{c_char, c_double, c_float, c_int, c_void};\n\n");

    for e in &header.enums {
        line(out, FN, "#[repr(C)]");
        line(out, FN, "#[derive(Clone, Copy, Debug, PartialEq, Eq)]");
        line(out, FN, &format!("pub enum {} {{", e.name));
        for (variant, value) in &e.variants {
            line(out, BODY, &format!("{variant} = {value},"));
        }
        line(out, FN, "}");
        out.push('\n');
    }

    let mut wrote_alias = false;
    for a in &header.aliases {
        if header.enum_def(&a.name).is_some() {
            continue;
        }
        let target = match a.target.as_str() {
            "int" => "c_int",
            "size_t" => "usize",
            "float" => "c_float",
            "double" => "c_double",
            "char" => "c_char",
            t if header.enum_def(t).is_some() => t,
            _ => continue,
        };
        line(out, FN, &format!("pub type {} = {target};", a.name));
        wrote_alias = true;
    }
    if wrote_alias {
        out.push('\n');
    }

    line(out, FN, "unsafe extern \"C\" {");
    for d in &header.decls {
        line(out, BODY, &prototype(d)?);
    }
    line(out, FN, "}");
    out.push_str("}\n");
    Ok(())
}

fn prototype(d: &Declaration) -> GenResult<String> {
    let mut params: Vec<String> = Vec::with_capacity(d.params.len() + 1);
    for p in &d.params {
        params.push(format!("{}: {}", param_name(&p.name), ffi_type(&p.ty, &d.name)?));
    }
    if d.variadic {
        params.push("...".into());
    }
    let mut s = format!("pub fn {}({})", d.name, params.join(", "));
    if !d.ret.is_void() {
        let _ = write!(s, " -> {}", ffi_type(&d.ret, &d.name)?);
    }
    s.push(';');
    Ok(s)
}

fn ffi_type(ty: &CType, routine: &str) -> GenResult<String> {
    let base = match &ty.kind {
        ScalarKind::Void if ty.pointer => "c_void",
        ScalarKind::Void => return Err(GenError::unsupported(routine, "`void` value type")),
        ScalarKind::Char => "c_char",
        ScalarKind::Int => "c_int",
        ScalarKind::Index => "usize",
        ScalarKind::Float => "c_float",
        ScalarKind::Double => "c_double",
        ScalarKind::Enum(n) => n.as_str(),
    };
    Ok(match (ty.pointer, ty.is_const) {
        (false, _) => base.to_string(),
        (true, true) => format!("*const {base}"),
        (true, false) => format!("*mut {base}"),
    })
}

/// C 形参名撞上 Rust 关键字时加后缀
fn param_name(name: &str) -> String {
    const KEYWORDS: [&str; 12] =
        ["type", "fn", "ref", "mut", "in", "impl", "match", "move", "self", "use", "where", "loop"];
    if KEYWORDS.contains(&name) { format!("{name}_") } else { name.to_string() }
}
