//! 数组长度下界：按存储形式和例程族给出公式
//!
//! - 带步长向量：`(inc > 0 && len <= (cnt-1)*inc) || (inc < 0 && len <= (1-cnt)*inc)`
//! - 稠密矩形：`ld*(rows-1)+cols`，行列由转置/侧向决定
//! - 打包：`n*(n+1)/2`
//! - 带状：考虑带宽偏移

use super::RuleCtx;
use crate::middle::classify::{Classified, Role, Storage};
use crate::middle::ir::{Dim, Expr, Matrix, Stmt, Vector, Violation, int, len, min, native, var};
use crate::middle::tables::{EnumCategory, Family};

pub fn slice_length(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    let Role::Array(storage) = c.role else { return };
    let r = cx.routine;
    let name = c.ident.as_str();
    let short = Violation::ShortArray(storage.array_name());
    let guard = |cond: Expr| Stmt::guard(cond, short);

    match storage {
        Storage::Packed => {
            out.push(guard(len(name).lt(var("n") * (var("n") + 1) / 2)));
            return;
        }
        Storage::Dense(Matrix::C) => {
            let rows = if r.has_dim(Dim::M) { "m" } else { "n" };
            out.push(guard(len(name).lt(dense("ldc", rows, var("n")))));
            return;
        }
        _ => {}
    }

    match r.family {
        // 快速返回已排除 incX <= 0
        Family::Norm | Family::Scal | Family::Iamax => {
            if storage == Storage::Strided(Vector::X) {
                out.push(guard(len(name).le((var("n") - 1) * var("incX"))));
            }
        }
        // row/col 已在前导维度规则里绑定
        Family::RankK => match storage {
            Storage::Dense(Matrix::A) => out.push(guard(len(name).lt(dense("lda", "row", var("col"))))),
            Storage::Dense(Matrix::B) => out.push(guard(len(name).lt(dense("ldb", "row", var("col"))))),
            _ => {}
        },
        // k == 0 时 A、B 不参与运算，长度不作要求
        Family::Gemm => match storage {
            Storage::Dense(Matrix::A) => {
                let short = len(name).lt(dense("lda", "rowA", var("colA")));
                out.push(guard(var("k").gt(int(0)).and(short)));
            }
            Storage::Dense(Matrix::B) => {
                let short = len(name).lt(dense("ldb", "rowB", var("colB")));
                out.push(guard(var("k").gt(int(0)).and(short)));
            }
            _ => {}
        },
        Family::Gbmv | Family::Gemv => match storage {
            Storage::Strided(Vector::X) => {
                if let Some(t) = r.transposes().next() {
                    let ty = t.enum_type().unwrap_or_default();
                    let no_trans = cx.tables.native(EnumCategory::Transpose, "NoTrans").unwrap_or("NoTrans");
                    out.push(Stmt::select(
                        &["lenX", "lenY"],
                        var(&t.ident).equals(native(ty, no_trans)),
                        vec![var("n"), var("m")],
                        vec![var("m"), var("n")],
                    ));
                }
                out.push(guard(strided(name, Vector::X, var("lenX"))));
            }
            Storage::Strided(Vector::Y) => out.push(guard(strided(name, Vector::Y, var("lenY")))),
            Storage::Band => {
                let rows = min(var("m"), var("n") + var("kL"));
                let bound = var("lda") * (rows - 1) + var("kL") + var("kU") + 1;
                out.push(guard(len(name).lt(bound)));
            }
            Storage::Dense(Matrix::A) => out.push(guard(len(name).lt(dense("lda", "m", var("n"))))),
            _ => {}
        },
        _ => match storage {
            Storage::Strided(v @ Vector::X) => {
                let cnt = if r.has_dim(Dim::M) { "m" } else { "n" };
                out.push(guard(strided(name, v, var(cnt))));
            }
            Storage::Strided(v @ Vector::Y) => out.push(guard(strided(name, v, var("n")))),
            Storage::Dense(Matrix::A) if r.has_side() => {
                out.push(guard(len(name).lt(dense("lda", "k", var("k")))));
            }
            Storage::Band => {
                out.push(guard(len(name).lt(var("lda") * (var("n") - 1) + var("k") + 1)));
            }
            Storage::Dense(Matrix::A) => {
                let rows = if r.has_dim(Dim::M) { "m" } else { "n" };
                out.push(guard(len(name).lt(dense("lda", rows, var("n")))));
            }
            Storage::Dense(Matrix::B) => out.push(guard(len(name).lt(dense("ldb", "m", var("n"))))),
            _ => {}
        },
    }
}

/// `ld*(rows-1)+cols`
fn dense(ld: &str, rows: &str, cols: Expr) -> Expr {
    var(ld) * (var(rows) - 1) + cols
}

fn strided(name: &str, v: Vector, cnt: Expr) -> Expr {
    let inc = || var(v.inc_ident());
    let forward = inc().gt(int(0)).and(len(name).le((cnt.clone() - 1) * inc()));
    let backward = inc().lt(int(0)).and(len(name).le((int(1) - cnt) * inc()));
    forward.or(backward)
}
