//! 枚举合法性：库侧取值显式翻译成原生取值，范围外即违例

use super::RuleCtx;
use crate::middle::classify::{Classified, Role};
use crate::middle::ir::{Stmt, Violation};
use crate::middle::tables::EnumCategory;

pub fn transpose(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    if let Role::Transpose(domain) = c.role {
        let arms = cx.tables.transpose_arms(domain);
        switch(cx, c, EnumCategory::Transpose, arms, out);
    }
}

pub fn uplo(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    if c.role == Role::Uplo {
        all_arms(cx, c, EnumCategory::Uplo, out);
    }
}

pub fn diag(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    if c.role == Role::Diag {
        all_arms(cx, c, EnumCategory::Diag, out);
    }
}

pub fn side(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    if c.role == Role::Side {
        all_arms(cx, c, EnumCategory::Side, out);
    }
}

fn all_arms(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, cat: EnumCategory, out: &mut Vec<Stmt>) {
    let arms = cx.tables.enums.get(&cat).map(|t| t.arms.clone()).unwrap_or_default();
    switch(cx, c, cat, arms, out);
}

fn switch(
    cx: &RuleCtx<'_, '_>,
    c: &Classified<'_>,
    cat: EnumCategory,
    arms: Vec<(&'static str, &'static str)>,
    out: &mut Vec<Stmt>,
) {
    let (Some(native), Some(err)) = (c.enum_type(), Violation::for_enum(cat)) else { return };
    let total = cx.tables.enums.get(&cat).map_or(0, |t| t.library_variants);
    out.push(Stmt::EnumSwitch {
        var: c.ident.clone(),
        category: cat,
        native: native.to_string(),
        exhaustive: arms.len() >= total,
        arms: arms.into_iter().map(|(l, n)| (l.to_string(), n.to_string())).collect(),
        err,
    });
}

#[cfg(test)]
mod tests {
    use crate::middle::rules::testutil::synth;

    #[test]
    fn hermitian_rank_update_accepts_only_conjugate_transpose() {
        let s = synth(
            "void cblas_cherk(const CBLAS_LAYOUT layout, const CBLAS_UPLO Uplo, const CBLAS_TRANSPOSE Trans,
                const int N, const int K, const float alpha, const void *A, const int lda,
                const float beta, void *C, const int ldc);",
        );
        assert_eq!(s[0], "switch t [NoTrans ConjTrans] else panic");
        assert_eq!(s[1], "switch ul [Upper Lower] else panic");
    }

    #[test]
    fn general_transpose_and_diag_are_exhaustive() {
        let s = synth(
            "void cblas_strmv(const CBLAS_LAYOUT layout, const CBLAS_UPLO Uplo, const CBLAS_TRANSPOSE TransA,
                const CBLAS_DIAG Diag, const int N, const float *A, const int lda, float *X, const int incX);",
        );
        assert_eq!(s[0], "switch tA [NoTrans Trans ConjTrans]");
        assert_eq!(s[1], "switch ul [Upper Lower] else panic");
        assert_eq!(s[2], "switch d [NonUnit Unit]");
    }

    #[test]
    fn symmetric_complex_routines_reject_conjugate_transpose() {
        let s = synth(
            "void cblas_zsyrk(const CBLAS_LAYOUT layout, const CBLAS_UPLO Uplo, const CBLAS_TRANSPOSE Trans,
                const int N, const int K, const void *alpha, const void *A, const int lda,
                const void *beta, void *C, const int ldc);",
        );
        assert_eq!(s[0], "switch t [NoTrans Trans] else panic");
    }
}
