//! 校验规则集：有序的独立规则，每条规则对声明的每个形参各跑一遍
//!
//! 顺序即语义：后面的规则会引用前面规则引入的局部绑定
//! （例如 gemm 的长度检查用到前导维度规则绑定的 `rowA`/`colA`）。

use crate::middle::classify::{Classified, Routine};
use crate::middle::ir::Stmt;
use crate::middle::tables::RuleTables;

mod enums;
mod shape;
mod lead_dim;
mod inc;
mod quick;
mod length;
mod address;

/// 规则看到的只读上下文
pub struct RuleCtx<'a, 'd> {
    pub routine: &'a Routine<'d>,
    pub tables: &'a RuleTables,
}

pub type Rule = fn(&RuleCtx<'_, '_>, &Classified<'_>, &mut Vec<Stmt>);

/// 全局固定的规则顺序
pub const RULES: &[(&str, Rule)] = &[
    ("transpose", enums::transpose),
    ("uplo", enums::uplo),
    ("diag", enums::diag),
    ("side", enums::side),
    ("shape", shape::shape),
    ("leading_dim", lead_dim::leading_dim),
    ("zero_inc", inc::zero_inc),
    ("quick_return", quick::quick_return),
    ("slice_length", length::slice_length),
    ("address", address::address),
];

/// 规则 × 形参，产出一条声明的全部守卫语句
pub fn synthesize(routine: &Routine<'_>, tables: &RuleTables) -> Vec<Stmt> {
    let cx = RuleCtx { routine, tables };
    let mut out = Vec::new();
    for (name, rule) in RULES {
        let before = out.len();
        for c in &routine.params {
            rule(&cx, c, &mut out);
        }
        if out.len() > before {
            tracing::trace!(routine = %routine.decl.name, rule = name, stmts = out.len() - before, "rule fired");
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod testutil {
    //! 规则测试共用：从一行 C 原型构造 Routine
    use crate::diag::DiagSink;
    use crate::frontend::ast::Header;
    use crate::frontend::parser::parse_header;
    use crate::frontend::span::FileId;

    pub const PRELUDE: &str = "\
#define CBLAS_INDEX size_t
typedef enum CBLAS_LAYOUT {CblasRowMajor=101, CblasColMajor=102} CBLAS_LAYOUT;
typedef enum CBLAS_TRANSPOSE {CblasNoTrans=111, CblasTrans=112, CblasConjTrans=113} CBLAS_TRANSPOSE;
typedef enum CBLAS_UPLO {CblasUpper=121, CblasLower=122} CBLAS_UPLO;
typedef enum CBLAS_DIAG {CblasNonUnit=131, CblasUnit=132} CBLAS_DIAG;
typedef enum CBLAS_SIDE {CblasLeft=141, CblasRight=142} CBLAS_SIDE;
";

    pub fn header(protos: &str) -> Header {
        let src = format!("{PRELUDE}{protos}");
        let mut d = DiagSink::new();
        match parse_header(&src, FileId(0), "cblas.h", "cblas_", &mut d) {
            Ok(h) => h,
            Err(e) => panic!("{e}: {:?}", d.into_vec()),
        }
    }

    /// 把语句渲染成紧凑的调试文本，便于断言
    pub fn show(stmts: &[crate::middle::ir::Stmt]) -> Vec<String> {
        use crate::middle::ir::Stmt;
        stmts
            .iter()
            .map(|s| match s {
                Stmt::EnumSwitch { var, arms, exhaustive, .. } => {
                    let arms: Vec<_> = arms.iter().map(|(l, _)| l.as_str()).collect();
                    format!("switch {var} [{}]{}", arms.join(" "), if *exhaustive { "" } else { " else panic" })
                }
                Stmt::Guard { cond, err } => format!("if {cond} panic {}", err.camel_name()),
                Stmt::Select { names, cond, then, otherwise } => {
                    let t: Vec<_> = then.iter().map(|e| e.to_string()).collect();
                    let o: Vec<_> = otherwise.iter().map(|e| e.to_string()).collect();
                    format!("{} = {cond} ? {} : {}", names.join(","), t.join(","), o.join(","))
                }
                Stmt::QuickReturn { cond, value } => format!("if {cond} return {value:?}"),
                Stmt::Address { var, elem, mutable } => format!("&{var} {elem:?}{}", if *mutable { " mut" } else { "" }),
                Stmt::Comment(c) => format!("// {c}"),
                Stmt::Blank => String::new(),
            })
            .collect()
    }

    pub fn synth(proto: &str) -> Vec<String> {
        let h = header(proto);
        let t = crate::middle::tables::RuleTables::cblas();
        let r = crate::middle::classify::Routine::classify(&h.decls[0], &t, "cblas_").unwrap();
        show(&super::synthesize(&r, &t))
    }
}
