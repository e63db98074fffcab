//! 包装函数签名：导出名、形参表、返回类型
//!
//! 存储次序形参不进签名（包装恒为行主序）；形参改用方言命名下的规范短名；
//! 方言支持分组形参时，与下一个形参类型相同的形参省略类型标注。

use crate::backend::dialect::Dialect;
use crate::backend::types::TypeMapper;
use crate::error::GenResult;
use crate::middle::classify::{Role, Routine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigParam {
    pub name: String,
    pub ty: String,
    /// 类型标注由下一个形参代写
    pub elided: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<SigParam>,
    pub ret: Option<&'static str>,
}

pub fn build_signature(
    r: &Routine<'_>,
    mapper: &TypeMapper<'_>,
    dialect: &dyn Dialect,
    elide_repeat: bool,
) -> GenResult<Signature> {
    let mut params = Vec::with_capacity(r.params.len());
    let mut keys = Vec::with_capacity(r.params.len());
    for c in r.params.iter().filter(|c| c.role != Role::Order) {
        let name = dialect.ident(&c.ident);
        let ty = mapper.map_type(&c.param.ty, &c.ident)?;
        keys.push(c.param.ty.key());
        params.push(SigParam { name, ty, elided: false });
    }

    if elide_repeat && dialect.groups_params() {
        for i in 0..params.len().saturating_sub(1) {
            params[i].elided = keys[i] == keys[i + 1] && params[i].ty == params[i + 1].ty;
        }
    }

    Ok(Signature {
        name: dialect.fn_name(r.blas),
        params,
        ret: mapper.return_type(&r.decl.ret)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dialect::{go::GoDialect, rust::RustDialect};
    use crate::middle::rules::testutil::header;
    use crate::middle::tables::RuleTables;

    const DGEMM: &str = "void cblas_dgemm(const CBLAS_LAYOUT layout, const CBLAS_TRANSPOSE TransA,
        const CBLAS_TRANSPOSE TransB, const int M, const int N, const int K, const double alpha,
        const double *A, const int lda, const double *B, const int ldb, const double beta,
        double *C, const int ldc);";

    fn sig(d: &dyn Dialect, proto: &str, elide: bool) -> Signature {
        let h = header(proto);
        let rules = RuleTables::cblas();
        let r = Routine::classify(&h.decls[0], &rules, "cblas_").unwrap();
        let m = TypeMapper::new(d.types(), &rules, r.decl.complex, &r.decl.name);
        build_signature(&r, &m, d, elide).unwrap()
    }

    fn render(s: &Signature) -> String {
        let ps: Vec<_> = s
            .params
            .iter()
            .map(|p| if p.elided { p.name.clone() } else { format!("{} {}", p.name, p.ty) })
            .collect();
        format!("{}({})", s.name, ps.join(", "))
    }

    #[test]
    fn go_groups_consecutive_parameters_of_one_type() {
        let s = sig(&GoDialect::new(), DGEMM, true);
        assert_eq!(
            render(&s),
            "Dgemm(tA, tB blas.Transpose, m, n, k int, alpha float64, a []float64, lda int, \
             b []float64, ldb int, beta float64, c []float64, ldc int)"
        );
        assert_eq!(s.ret, None);
    }

    #[test]
    fn elision_can_be_switched_off() {
        let s = sig(&GoDialect::new(), DGEMM, false);
        assert!(s.params.iter().all(|p| !p.elided));
        assert_eq!(s.params.len(), 13);
    }

    #[test]
    fn rust_names_are_snake_case_and_never_grouped() {
        let s = sig(&RustDialect::new(), DGEMM, true);
        let names: Vec<_> = s.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names[..3], ["t_a", "t_b", "m"]);
        assert!(s.params.iter().all(|p| !p.elided));
        assert_eq!(s.params[6].ty, "&[f64]");
        assert_eq!(s.params[11].ty, "&mut [f64]");

        let s = sig(
            &RustDialect::new(),
            "void cblas_cgbmv(const CBLAS_LAYOUT layout, const CBLAS_TRANSPOSE TransA, const int M, const int N,
                const int KL, const int KU, const void *alpha, const void *A, const int lda, const void *X,
                const int incX, const void *beta, void *Y, const int incY);",
            true,
        );
        assert_eq!(s.name, "cgbmv");
        assert_eq!(s.params[3].name, "kl");
        assert_eq!(s.params[4].name, "ku");
        assert_eq!(s.params[9].name, "inc_x");
        assert_eq!(s.params[5].ty, "Complex32");
    }

    #[test]
    fn index_reductions_return_a_signed_index() {
        let s = sig(&RustDialect::new(), "CBLAS_INDEX cblas_idamax(const int N, const double *X, const int incX);", true);
        assert_eq!(s.ret, Some("isize"));
        let s = sig(&GoDialect::new(), "CBLAS_INDEX cblas_idamax(const int N, const double *X, const int incX);", true);
        assert_eq!(render(&s), "Idamax(n int, x []float64, incX int)");
        assert_eq!(s.ret, Some("int"));
    }
}
