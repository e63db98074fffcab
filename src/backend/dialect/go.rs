//! Go（cgo）方言：`Implementation` 的方法集，直接调用 `C.cblas_*`

use std::fmt::Write as _;
use std::path::Path;

use super::{Dialect, FnCx, line, render_expr, violation_consts};
use crate::backend::call::Call;
use crate::backend::signature::Signature;
use crate::backend::types::TypeTables;
use crate::error::GenResult;
use crate::frontend::ast::{Header, ScalarKind, TypeKey};
use crate::middle::ir::{Elem, Ret, Stmt, Violation};
use crate::middle::tables::{EnumCategory, RuleTables};
use crate::project::Target;

const PREAMBLE: &str = include_str!("preamble_go.in");

const BODY: &str = "\t";
const NESTED: &str = "\t\t";

pub struct GoDialect {
    types: TypeTables,
}

impl GoDialect {
    pub fn new() -> Self {
        let key = |kind: ScalarKind, pointer: bool| TypeKey { kind, pointer };
        let types = TypeTables {
            elems: crate::fast_map! {
                Elem::Char => "byte",
                Elem::Int => "int32",
                Elem::F32 => "float32",
                Elem::F64 => "float64",
                Elem::C64 => "complex64",
                Elem::C128 => "complex128",
            },
            int: "int",
            slice: "[]{elem}",
            slice_mut: "[]{elem}",
            enums: crate::fast_map! {
                EnumCategory::Transpose => "blas.Transpose",
                EnumCategory::Uplo => "blas.Uplo",
                EnumCategory::Diag => "blas.Diag",
                EnumCategory::Side => "blas.Side",
            },
            enum_variant: "blas.{variant}",
            marshal: crate::fast_map! {
                key(ScalarKind::Int, false) => "C.int({name})",
                key(ScalarKind::Index, false) => "C.size_t({name})",
                key(ScalarKind::Char, false) => "C.char({name})",
                key(ScalarKind::Float, false) => "C.float({name})",
                key(ScalarKind::Double, false) => "C.double({name})",
                key(ScalarKind::Float, true) => "(*C.float)({name})",
                key(ScalarKind::Double, true) => "(*C.double)({name})",
                key(ScalarKind::Int, true) => "unsafe.Pointer({name})",
                key(ScalarKind::Char, true) => "unsafe.Pointer({name})",
                key(ScalarKind::Void, true) => "unsafe.Pointer({name})",
            },
            marshal_enum: "C.enum_{enum}({name})",
            marshal_order: "C.enum_{enum}(rowMajor)",
            array_addr: "_{name}",
            coefficient_addr: "&{name}",
            returns: crate::fast_map! {
                ScalarKind::Float => ("float32", "float32({call})"),
                ScalarKind::Double => ("float64", "float64({call})"),
                ScalarKind::Int => ("int", "int({call})"),
                ScalarKind::Index => ("int", "int({call})"),
            },
        };
        Self { types }
    }
}

impl Default for GoDialect {
    fn default() -> Self {
        Self::new()
    }
}

/// `sgemm` -> `Sgemm`
pub fn upper_case_first(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_uppercase().chain(cs).collect(),
        None => String::new(),
    }
}

impl Dialect for GoDialect {
    fn target(&self) -> Target { Target::Go }

    fn types(&self) -> &TypeTables { &self.types }

    fn ident(&self, canonical: &str) -> String { canonical.to_string() }

    fn fn_name(&self, blas: &str) -> String { upper_case_first(blas) }

    fn groups_params(&self) -> bool { true }

    fn native_call(&self, native: &str, args: &str) -> String {
        format!("C.{native}({args})")
    }

    fn violation(&self, v: Violation) -> String { v.camel_name() }

    fn native_variant(&self, _ty: &str, variant: &str) -> String {
        format!("C.{variant}")
    }

    fn one(&self, _elem: Elem) -> String { "1".into() }

    fn len(&self, array: &str) -> String { format!("len({array})") }

    fn body_indent(&self) -> &'static str { BODY }

    fn fn_indent(&self) -> &'static str { "" }

    fn doc_line(&self, text: &str) -> String {
        if text.is_empty() { "//".into() } else { format!("// {text}") }
    }

    fn preamble(&self, header: &Header, _rules: &RuleTables) -> String {
        let consts = violation_consts(self, |name, msg| format!("\t{name} = {msg:?}"));
        let file = Path::new(&header.file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| header.file.clone());
        PREAMBLE.replace("{header}", &file).replace("{violations}", &consts)
    }

    fn epilogue(&self, _header: &Header) -> GenResult<String> {
        Ok(String::new())
    }

    fn open_fn(&self, sig: &Signature, out: &mut String) {
        let params: Vec<_> = sig
            .params
            .iter()
            .map(|p| if p.elided { p.name.clone() } else { format!("{} {}", p.name, p.ty) })
            .collect();
        let _ = write!(out, "func (Implementation) {}({})", sig.name, params.join(", "));
        if let Some(ret) = sig.ret {
            let _ = write!(out, " {ret}");
        }
        out.push_str(" {\n");
    }

    fn stmt(&self, s: &Stmt, fx: &FnCx<'_>, out: &mut String) -> GenResult<()> {
        match s {
            // Go 的 switch 不要求穷尽，default 分支总是写出
            Stmt::EnumSwitch { var, category, arms, err, .. } => {
                line(out, BODY, &format!("switch {var} {{"));
                for (lib, nat) in arms {
                    line(out, BODY, &format!("case {}:", fx.mapper.library_variant(*category, lib)));
                    line(out, NESTED, &format!("{var} = C.{nat}"));
                }
                line(out, BODY, "default:");
                line(out, NESTED, &format!("panic({})", self.violation(*err)));
                line(out, BODY, "}");
            }
            Stmt::Guard { cond, err } => {
                line(out, BODY, &format!("if {} {{", render_expr(self, cond)));
                line(out, NESTED, &format!("panic({})", self.violation(*err)));
                line(out, BODY, "}");
            }
            Stmt::Select { names, cond, then, otherwise } => {
                let names = names.join(", ");
                let list = |es: &[crate::middle::ir::Expr]| {
                    es.iter().map(|e| render_expr(self, e)).collect::<Vec<_>>().join(", ")
                };
                line(out, BODY, &format!("var {names} {}", self.types.int));
                line(out, BODY, &format!("if {} {{", render_expr(self, cond)));
                line(out, NESTED, &format!("{names} = {}", list(&then[..])));
                line(out, BODY, "} else {");
                line(out, NESTED, &format!("{names} = {}", list(&otherwise[..])));
                line(out, BODY, "}");
            }
            Stmt::QuickReturn { cond, value } => {
                line(out, BODY, &format!("if {} {{", render_expr(self, cond)));
                match value {
                    Some(Ret::Zero) => line(out, NESTED, "return 0"),
                    Some(Ret::MinusOne) => line(out, NESTED, "return -1"),
                    None => line(out, NESTED, "return"),
                }
                line(out, BODY, "}");
            }
            Stmt::Address { var, elem, .. } => {
                let ty = fx.mapper.elem(*elem)?;
                line(out, BODY, &format!("var _{var} *{ty}"));
                line(out, BODY, &format!("if len({var}) > 0 {{"));
                line(out, NESTED, &format!("_{var} = &{var}[0]"));
                line(out, BODY, "}");
            }
            Stmt::Comment(text) => self.comment(text, out),
            Stmt::Blank => out.push('\n'),
        }
        Ok(())
    }

    fn call(&self, call: &Call, out: &mut String) {
        if call.returns {
            line(out, BODY, &format!("return {}", call.expr));
        } else {
            line(out, BODY, &call.expr);
        }
    }

    fn close_fn(&self, out: &mut String) {
        out.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::TypeMapper;
    use crate::frontend::ast::CType;
    use crate::middle::ir::{Dim, int, native, var};
    use crate::middle::rules::testutil::header;

    fn render(stmts: &[Stmt], elem_width: Option<crate::frontend::ast::ComplexWidth>) -> String {
        let d = GoDialect::new();
        let rules = RuleTables::cblas();
        let m = TypeMapper::new(d.types(), &rules, elem_width, "cblas_test");
        let ret = CType::void();
        let fx = FnCx { mapper: &m, ret: &ret };
        let mut out = String::new();
        for s in stmts {
            d.stmt(s, &fx, &mut out).unwrap();
        }
        out
    }

    #[test]
    fn enum_switch_always_has_a_default() {
        let s = Stmt::EnumSwitch {
            var: "ul".into(),
            category: EnumCategory::Uplo,
            native: "CBLAS_UPLO".into(),
            arms: vec![("Upper".into(), "CblasUpper".into()), ("Lower".into(), "CblasLower".into())],
            exhaustive: false,
            err: Violation::BadUplo,
        };
        assert_eq!(
            render(&[s], None),
            "\tswitch ul {\n\tcase blas.Upper:\n\t\tul = C.CblasUpper\n\tcase blas.Lower:\n\t\tul = C.CblasLower\n\
             \tdefault:\n\t\tpanic(badUplo)\n\t}\n"
        );
    }

    #[test]
    fn select_declares_then_assigns() {
        let s = Stmt::select(
            &["rowA", "colA"],
            var("tA").equals(native("CBLAS_TRANSPOSE", "CblasNoTrans")),
            vec![var("m"), var("k")],
            vec![var("k"), var("m")],
        );
        assert_eq!(
            render(&[s], None),
            "\tvar rowA, colA int\n\tif tA == C.CblasNoTrans {\n\t\trowA, colA = m, k\n\t} else {\n\t\trowA, colA = k, m\n\t}\n"
        );
    }

    #[test]
    fn guards_and_addresses() {
        let stmts = [
            Stmt::guard(var("kL").lt(int(0)), Violation::NegativeDim(Dim::KL)),
            Stmt::QuickReturn { cond: var("n").equals(int(0)), value: Some(Ret::MinusOne) },
            Stmt::Address { var: "y".into(), elem: Elem::C64, mutable: true },
        ];
        assert_eq!(
            render(&stmts, None),
            "\tif kL < 0 {\n\t\tpanic(kLLT0)\n\t}\n\tif n == 0 {\n\t\treturn -1\n\t}\n\
             \tvar _y *complex64\n\tif len(y) > 0 {\n\t\t_y = &y[0]\n\t}\n"
        );
    }

    #[test]
    fn preamble_names_the_header_and_lists_messages() {
        let h = header("");
        let pre = GoDialect::new().preamble(&h, &RuleTables::cblas());
        assert!(pre.starts_with("// Code generated by cblasgen from cblas.h; DO NOT EDIT.\n"));
        assert!(pre.contains("#include \"cblas.h\""));
        assert!(pre.contains("const (\n\tbadSide = \"blas: illegal side\"\n"));
        assert!(pre.contains("\tshortAP = \"blas: insufficient length of ap\"\n"));
        assert!(pre.contains("\tshortY = \"blas: insufficient length of y\"\n)\n"));
        assert!(pre.ends_with("// Generated cases ...\n\n"));
        assert_eq!(GoDialect::new().epilogue(&h).unwrap(), "");
    }

    #[test]
    fn exported_names_capitalise_the_first_letter() {
        assert_eq!(upper_case_first("izamax"), "Izamax");
        assert_eq!(GoDialect::new().fn_name("dgemm"), "Dgemm");
        assert_eq!(GoDialect::new().doc_line(""), "//");
    }
}
