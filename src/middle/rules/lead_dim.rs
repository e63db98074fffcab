//! 前导维度下界：ld >= max(1, bound)，bound 按例程族推导
//!
//! 结果矩阵 C 永远不转置，所以 ldc 的下界固定为列数 n。

use super::RuleCtx;
use crate::middle::classify::{Classified, Role};
use crate::middle::ir::{Dim, Expr, Matrix, Stmt, Violation, int, max, native, var};
use crate::middle::tables::{EnumCategory, Family};

pub fn leading_dim(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    let Role::LeadingDim(m) = c.role else { return };
    let ld = || var(&c.ident);
    let bad = Violation::BadLd(m);
    let r = cx.routine;

    if m == Matrix::C {
        out.push(Stmt::guard(ld().lt(max(int(1), var("n"))), bad));
        return;
    }

    match r.family {
        Family::Gemm => {
            if m == Matrix::A {
                let mut ts = r.transposes();
                if let Some(ta) = ts.next() {
                    out.push(Stmt::select(
                        &["rowA", "colA"],
                        is_no_trans(cx, ta),
                        vec![var("m"), var("k")],
                        vec![var("k"), var("m")],
                    ));
                }
                if let Some(tb) = ts.next() {
                    out.push(Stmt::select(
                        &["rowB", "colB"],
                        is_no_trans(cx, tb),
                        vec![var("k"), var("n")],
                        vec![var("n"), var("k")],
                    ));
                }
                out.push(Stmt::guard(ld().lt(max(int(1), var("colA"))), bad));
            } else {
                out.push(Stmt::guard(ld().lt(max(int(1), var("colB"))), bad));
            }
        }
        Family::RankK => {
            if m == Matrix::A {
                if let Some(t) = r.transposes().next() {
                    out.push(Stmt::select(
                        &["row", "col"],
                        is_no_trans(cx, t),
                        vec![var("n"), var("k")],
                        vec![var("k"), var("n")],
                    ));
                }
            }
            out.push(Stmt::guard(ld().lt(max(int(1), var("col"))), bad));
        }
        // 与转置无关
        Family::Gbmv => {
            out.push(Stmt::guard(ld().lt(var("kL") + var("kU") + 1), bad));
        }
        // 带状存储：tbmv tbsv sbmv hbmv
        _ if r.has_dim(Dim::K) => {
            out.push(Stmt::guard(ld().lt(var("k") + 1), bad));
        }
        // symm hemm trmm trsm：方阵 A 作用在哪一侧
        _ if r.has_side() && m == Matrix::A => {
            if let Some(s) = r.find(|role| *role == Role::Side) {
                let left = native_of(cx, s, EnumCategory::Side, "Left");
                out.push(Stmt::select(&["k"], var(&s.ident).equals(left), vec![var("m")], vec![var("n")]));
            }
            out.push(Stmt::guard(ld().lt(max(int(1), var("k"))), bad));
        }
        _ => {
            out.push(Stmt::guard(ld().lt(max(int(1), var("n"))), bad));
        }
    }
}

/// `t == <原生 NoTrans>`
fn is_no_trans(cx: &RuleCtx<'_, '_>, t: &Classified<'_>) -> Expr {
    var(&t.ident).equals(native_of(cx, t, EnumCategory::Transpose, "NoTrans"))
}

fn native_of(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, cat: EnumCategory, library: &str) -> Expr {
    let ty = c.enum_type().unwrap_or_default();
    let variant = cx.tables.native(cat, library).unwrap_or(library);
    native(ty, variant)
}
