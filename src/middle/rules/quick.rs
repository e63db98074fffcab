//! 退化尺寸快速返回：只在最后一个形参处触发一次，且排在长度检查之前，
//! 这样零尺寸调用传入空数组也不会被长度检查误拒

use super::RuleCtx;
use crate::frontend::ast::ScalarKind;
use crate::middle::classify::{Classified, Routine};
use crate::middle::ir::{Dim, Elem, Expr, Ret, Stmt, int, var};
use crate::middle::tables::Family;

pub const QUICK_RETURN: &str = "Quick return if possible.";
pub const TRIVIAL_LENGTHS: &str = "For zero matrix size the following slice length checks are trivially satisfied.";

pub fn quick_return(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    let r = cx.routine;
    if !r.is_last(c) || !r.has_dim(Dim::N) {
        return;
    }
    let n_or_neg_inc = || var("n").equals(int(0)).or(var("incX").lt(int(0)));

    let (cond, value) = match r.family {
        Family::Norm => (n_or_neg_inc(), Some(Ret::Zero)),
        Family::Scal => (n_or_neg_inc(), None),
        Family::Iamax => (n_or_neg_inc(), Some(Ret::MinusOne)),
        // k == 0 时只有 beta == 1 才真正什么都不用做；其余情况还要按 beta 缩放 C
        Family::Gemm => {
            let beta_one = match beta_elem(r) {
                Some(elem) => var("k").equals(int(0)).and(var("beta").equals(Expr::One(elem))),
                None => var("k").equals(int(0)),
            };
            (var("m").equals(int(0)).or(var("n").equals(int(0))).or(beta_one), None)
        }
        _ if r.has_dim(Dim::M) => (var("m").equals(int(0)).or(var("n").equals(int(0))), None),
        _ => {
            let value = (r.decl.ret.kind.is_real() && !r.decl.ret.pointer).then_some(Ret::Zero);
            (var("n").equals(int(0)), value)
        }
    };

    out.push(Stmt::Blank);
    out.push(Stmt::Comment(QUICK_RETURN.to_string()));
    out.push(Stmt::QuickReturn { cond, value });
    out.push(Stmt::Blank);
    out.push(Stmt::Comment(TRIVIAL_LENGTHS.to_string()));
}

/// gemm 的 beta 元素类型（实数按值，复数按地址）
fn beta_elem(r: &Routine<'_>) -> Option<Elem> {
    let beta = r.params.iter().find(|c| c.ident == "beta")?;
    match beta.param.ty.kind {
        ScalarKind::Float | ScalarKind::Double | ScalarKind::Void => Elem::of(&beta.param.ty, r.decl.complex),
        _ => None,
    }
}
