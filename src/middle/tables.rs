//! 规则用的声明式查表数据（命名、例程族、枚举类别与取值）
//!
//! 这些表以值的形式传进合成器，换一套表就能对接另一种方言的库；
//! 只做点查，输出顺序从不依赖它们的遍历顺序。

use crate::utils::fast::{FastMap, fast_map};

/// 五种枚举形参
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnumCategory {
    Order,
    Transpose,
    Uplo,
    Diag,
    Side,
}

impl EnumCategory {
    pub const ALL: [EnumCategory; 5] = [
        EnumCategory::Order,
        EnumCategory::Transpose,
        EnumCategory::Uplo,
        EnumCategory::Diag,
        EnumCategory::Side,
    ];
}

/// 例程族：只有这些族的边界公式与默认规则不同
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// 矩阵乘 `?gemm`
    Gemm,
    /// 秩 k 更新 `?syrk` `?syr2k` `?herk` `?her2k`
    RankK,
    /// 带状矩阵乘向量 `?gbmv`
    Gbmv,
    /// 一般矩阵乘向量 `?gemv`
    Gemv,
    /// 一维归约 `?nrm2` `?asum`
    Norm,
    /// 缩放 `?scal`
    Scal,
    /// 最大模下标 `i?amax`
    Iamax,
    Other,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Gemm => "gemm",
            Family::RankK => "rank-k",
            Family::Gbmv => "gbmv",
            Family::Gemv => "gemv",
            Family::Norm => "norm",
            Family::Scal => "scal",
            Family::Iamax => "iamax",
            Family::Other => "other",
        }
    }
}

/// 转置形参可接受的取值范围
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransDomain {
    /// NoTrans / Trans / ConjTrans
    General,
    /// 对称存储的复数例程：NoTrans / Trans
    Symmetric,
    /// Hermite 存储：NoTrans / ConjTrans
    Hermitian,
}

/// 一个枚举类别：库侧取值 -> 原生枚举子
#[derive(Clone, Debug)]
pub struct EnumTable {
    /// (库侧名, 原生枚举子)，按渲染顺序
    pub arms: Vec<(&'static str, &'static str)>,
    /// 库侧枚举的取值个数；大于 arms 时 switch 不穷尽
    pub library_variants: usize,
}

pub struct RuleTables {
    /// 冗长形参名 -> 规范短名（纯外观）
    pub naming: FastMap<&'static str, &'static str>,
    /// 去前缀的 BLAS 名 -> 族
    pub families: FastMap<String, Family>,
    /// 原生枚举类型名 -> 类别
    pub enum_types: FastMap<&'static str, EnumCategory>,
    pub enums: FastMap<EnumCategory, EnumTable>,
    /// 去前缀 BLAS 名的前缀 -> 转置取值范围；未命中即 General
    pub trans_domains: Vec<(&'static str, TransDomain)>,
}

impl RuleTables {
    /// 参考 CBLAS 的表
    pub fn cblas() -> Self {
        let naming = crate::fast_map! {
            "uplo" => "ul",
            "trans" => "t",
            "transA" => "tA",
            "transB" => "tB",
            "side" => "s",
            "diag" => "d",
        };

        let mut families = fast_map();
        let groups: [(&[&str], Family); 7] = [
            (&["sgemm", "dgemm", "cgemm", "zgemm"], Family::Gemm),
            (
                &[
                    "ssyrk", "dsyrk", "csyrk", "zsyrk", "ssyr2k", "dsyr2k", "csyr2k", "zsyr2k", "cherk", "zherk",
                    "cher2k", "zher2k",
                ],
                Family::RankK,
            ),
            (&["sgbmv", "dgbmv", "cgbmv", "zgbmv"], Family::Gbmv),
            (&["sgemv", "dgemv", "cgemv", "zgemv"], Family::Gemv),
            (&["snrm2", "dnrm2", "scnrm2", "dznrm2", "sasum", "dasum", "scasum", "dzasum"], Family::Norm),
            (&["sscal", "dscal", "cscal", "zscal", "csscal", "zdscal"], Family::Scal),
            (&["isamax", "idamax", "icamax", "izamax"], Family::Iamax),
        ];
        for (names, fam) in groups {
            for n in names {
                families.insert(n.to_string(), fam);
            }
        }

        let enum_types = crate::fast_map! {
            "CBLAS_ORDER" => EnumCategory::Order,
            "CBLAS_LAYOUT" => EnumCategory::Order,
            "CBLAS_TRANSPOSE" => EnumCategory::Transpose,
            "CBLAS_UPLO" => EnumCategory::Uplo,
            "CBLAS_DIAG" => EnumCategory::Diag,
            "CBLAS_SIDE" => EnumCategory::Side,
        };

        let enums = crate::fast_map! {
            EnumCategory::Order => EnumTable {
                arms: vec![("RowMajor", "CblasRowMajor"), ("ColMajor", "CblasColMajor")],
                library_variants: 2,
            },
            EnumCategory::Transpose => EnumTable {
                arms: vec![("NoTrans", "CblasNoTrans"), ("Trans", "CblasTrans"), ("ConjTrans", "CblasConjTrans")],
                library_variants: 3,
            },
            // 库侧 Uplo 还有 All，原生接口不接受
            EnumCategory::Uplo => EnumTable {
                arms: vec![("Upper", "CblasUpper"), ("Lower", "CblasLower")],
                library_variants: 3,
            },
            EnumCategory::Diag => EnumTable {
                arms: vec![("NonUnit", "CblasNonUnit"), ("Unit", "CblasUnit")],
                library_variants: 2,
            },
            EnumCategory::Side => EnumTable {
                arms: vec![("Left", "CblasLeft"), ("Right", "CblasRight")],
                library_variants: 2,
            },
        };

        let trans_domains = vec![
            ("ch", TransDomain::Hermitian),
            ("zh", TransDomain::Hermitian),
            ("cs", TransDomain::Symmetric),
            ("zs", TransDomain::Symmetric),
        ];

        RuleTables { naming, families, enum_types, enums, trans_domains }
    }

    pub fn shorten<'n>(&self, name: &'n str) -> &'n str {
        self.naming.get(name).copied().unwrap_or(name)
    }

    pub fn family(&self, blas: &str) -> Family {
        self.families.get(blas).copied().unwrap_or(Family::Other)
    }

    pub fn trans_domain(&self, blas: &str) -> TransDomain {
        self.trans_domains
            .iter()
            .find(|(p, _)| blas.starts_with(p))
            .map(|(_, d)| *d)
            .unwrap_or(TransDomain::General)
    }

    /// 库侧取值对应的原生枚举子
    pub fn native(&self, cat: EnumCategory, library: &str) -> Option<&'static str> {
        self.enums.get(&cat)?.arms.iter().find(|(l, _)| *l == library).map(|(_, n)| *n)
    }

    /// 某个转置取值范围内的 (库侧, 原生) 对
    pub fn transpose_arms(&self, domain: TransDomain) -> Vec<(&'static str, &'static str)> {
        let keep: &[&str] = match domain {
            TransDomain::General => &["NoTrans", "Trans", "ConjTrans"],
            TransDomain::Symmetric => &["NoTrans", "Trans"],
            TransDomain::Hermitian => &["NoTrans", "ConjTrans"],
        };
        self.enums
            .get(&EnumCategory::Transpose)
            .map(|t| t.arms.iter().filter(|(l, _)| keep.contains(l)).copied().collect())
            .unwrap_or_default()
    }
}

/// 原生名首字母小写：`TransA` -> `transA`，`KL` -> `kL`
pub fn lower_case_first(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_lowercase().chain(cs).collect(),
        None => String::new(),
    }
}
