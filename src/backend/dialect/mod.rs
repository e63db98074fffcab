//! 目标方言：一套类型表 + 命名约定 + 语句打印
//!
//! 规则产出的守卫 IR 与目标语言无关，方言只负责把它写成源码。
//! 表达式打印是共享的：两种目标的运算符优先级一致（C 系），
//! 只有叶子（变量名、长度、原生枚举子、数值 1）交给方言。

use std::fmt::Write as _;

use crate::backend::call::Call;
use crate::backend::signature::Signature;
use crate::backend::types::{TypeMapper, TypeTables};
use crate::error::GenResult;
use crate::frontend::ast::{CType, Header};
use crate::middle::ir::{BinOp, Elem, Expr, Stmt, Violation};
use crate::middle::tables::RuleTables;
use crate::project::Target;

pub mod go;
pub mod rust;

/// 渲染单个函数体时需要的上下文
pub struct FnCx<'a> {
    pub mapper: &'a TypeMapper<'a>,
    pub ret: &'a CType,
}

pub trait Dialect {
    fn target(&self) -> Target;

    fn types(&self) -> &TypeTables;

    /// 规范短名 -> 目标语言的局部名
    fn ident(&self, canonical: &str) -> String;

    /// 去前缀的 BLAS 名 -> 导出函数名
    fn fn_name(&self, blas: &str) -> String;

    /// 是否支持 `a, b int` 这种分组形参
    fn groups_params(&self) -> bool;

    fn native_call(&self, native: &str, args: &str) -> String;

    /// 违例消息常量的名字
    fn violation(&self, v: Violation) -> String;

    fn native_variant(&self, ty: &str, variant: &str) -> String;

    fn one(&self, elem: Elem) -> String;

    fn len(&self, array: &str) -> String;

    /// 函数体缩进
    fn body_indent(&self) -> &'static str;

    /// 函数头（及其文档注释）缩进
    fn fn_indent(&self) -> &'static str;

    fn doc_line(&self, line: &str) -> String;

    /// 文件头：手写部分、辅助函数、违例常量
    fn preamble(&self, header: &Header, rules: &RuleTables) -> String;

    /// 文件尾
    fn epilogue(&self, header: &Header) -> GenResult<String>;

    fn open_fn(&self, sig: &Signature, out: &mut String);

    fn stmt(&self, s: &Stmt, fx: &FnCx<'_>, out: &mut String) -> GenResult<()>;

    fn call(&self, call: &Call, out: &mut String);

    fn close_fn(&self, out: &mut String);

    /// 函数体里的行注释
    fn comment(&self, text: &str, out: &mut String) {
        let _ = writeln!(out, "{}// {text}", self.body_indent());
    }
}

pub fn dialect_for(target: Target) -> Box<dyn Dialect> {
    match target {
        Target::Rust => Box::new(rust::RustDialect::new()),
        Target::Go => Box::new(go::GoDialect::new()),
    }
}

/// 违例常量：固定顺序，逐字节稳定
pub fn violation_consts(d: &dyn Dialect, line: impl Fn(&str, &str) -> String) -> String {
    let mut out = String::new();
    for v in Violation::ALL {
        out.push_str(&line(&d.violation(v), &v.message()));
        out.push('\n');
    }
    out
}

pub fn render_expr(d: &dyn Dialect, e: &Expr) -> String {
    let mut out = String::new();
    write_expr(d, e, &mut out);
    out
}

fn write_expr(d: &dyn Dialect, e: &Expr, out: &mut String) {
    match e {
        Expr::Var(v) => out.push_str(&d.ident(v)),
        Expr::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Expr::One(elem) => out.push_str(&d.one(*elem)),
        Expr::Len(a) => out.push_str(&d.len(&d.ident(a))),
        Expr::Native { ty, variant } => out.push_str(&d.native_variant(ty, variant)),
        Expr::Max(a, b) | Expr::Min(a, b) => {
            out.push_str(if matches!(e, Expr::Max(..)) { "max(" } else { "min(" });
            write_expr(d, a, out);
            out.push_str(", ");
            write_expr(d, b, out);
            out.push(')');
        }
        Expr::Bin(op, l, r) => {
            operand(d, *op, l, false, out);
            let _ = write!(out, " {} ", op.symbol());
            operand(d, *op, r, true, out);
        }
    }
}

fn operand(d: &dyn Dialect, parent: BinOp, e: &Expr, right: bool, out: &mut String) {
    let wrap = match e {
        Expr::Bin(op, ..) => needs_parens(parent, *op, right),
        _ => false,
    };
    if wrap {
        out.push('(');
        write_expr(d, e, out);
        out.push(')');
    } else {
        write_expr(d, e, out);
    }
}

fn needs_parens(parent: BinOp, child: BinOp, right: bool) -> bool {
    let (p, c) = (parent.precedence(), child.precedence());
    if c < p {
        return true;
    }
    // `&&` 套在 `||` 里也加括号，两个目标的 lint 都要求
    if parent == BinOp::Or && child == BinOp::And {
        return true;
    }
    // 右侧同级：只有同一个可结合运算符才能去括号
    right && c == p && !(parent == child && matches!(parent, BinOp::Add | BinOp::Mul | BinOp::And | BinOp::Or))
}

/// 一行 `{indent}{text}\n`
pub(crate) fn line(out: &mut String, indent: &str, text: &str) {
    out.push_str(indent);
    out.push_str(text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dialect::go::GoDialect;
    use crate::backend::dialect::rust::RustDialect;
    use crate::middle::ir::{int, len, max, min, native, var};

    #[test]
    fn minimal_parentheses() {
        let go = GoDialect::new();
        let e = len("a").lt(var("lda") * (min(var("m"), var("n") + var("kL")) - 1) + var("kL") + var("kU") + 1);
        assert_eq!(render_expr(&go, &e), "len(a) < lda * (min(m, n + kL) - 1) + kL + kU + 1");

        let e = var("n") * (var("n") + 1) / 2;
        assert_eq!(render_expr(&go, &e), "n * (n + 1) / 2");

        let e = var("a") - (var("b") - var("c"));
        assert_eq!(render_expr(&go, &e), "a - (b - c)");

        let e = var("a") * (var("b") / var("c"));
        assert_eq!(render_expr(&go, &e), "a * (b / c)");

        let e = var("a") + (var("b") + var("c"));
        assert_eq!(render_expr(&go, &e), "a + b + c");
    }

    #[test]
    fn conjunctions_inside_disjunctions_keep_their_parentheses() {
        let go = GoDialect::new();
        let strided = var("incX")
            .gt(int(0))
            .and(len("x").le((var("lenX") - 1) * var("incX")))
            .or(var("incX").lt(int(0)).and(len("x").le((int(1) - var("lenX")) * var("incX"))));
        assert_eq!(
            render_expr(&go, &strided),
            "(incX > 0 && len(x) <= (lenX - 1) * incX) || (incX < 0 && len(x) <= (1 - lenX) * incX)"
        );
    }

    #[test]
    fn leaves_follow_the_dialect() {
        let rs = RustDialect::new();
        let e = var("tA").equals(native("CBLAS_TRANSPOSE", "CblasNoTrans"));
        assert_eq!(render_expr(&rs, &e), "t_a == ffi::CBLAS_TRANSPOSE::CblasNoTrans");
        let e = var("ldc").lt(max(int(1), var("n")));
        assert_eq!(render_expr(&rs, &e), "ldc < max(1, n)");
        let e = var("incY").equals(int(0)).or(len("y").lt(var("kU")));
        assert_eq!(render_expr(&rs, &e), "inc_y == 0 || len(y) < ku");
        assert_eq!(render_expr(&rs, &Expr::One(Elem::C128)), "Complex64::new(1.0, 0.0)");

        let go = GoDialect::new();
        let e = var("s").equals(native("CBLAS_SIDE", "CblasLeft"));
        assert_eq!(render_expr(&go, &e), "s == C.CblasLeft");
        assert_eq!(render_expr(&go, &Expr::One(Elem::C64)), "1");
    }
}
