//! 形参分类：每个形参一次性算出语义角色，所有规则只看角色不再比字符串
//!
//! 分类是全函数（每个形参恰有一个角色）且稳定（同输入同输出）；
//! 落在封闭文法之外的声明在这里就报 `Unsupported`。

use std::fmt;

use crate::error::{GenError, GenResult};
use crate::frontend::ast::{Declaration, Parameter, ScalarKind};
use crate::middle::ir::{ArrayName, Dim, Matrix, Vector};
use crate::middle::tables::{EnumCategory, Family, RuleTables, TransDomain, lower_case_first};
use crate::utils::fast::SmallVec16;

/// 数组的存储形式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Storage {
    /// 稠密矩形（行主序）
    Dense(Matrix),
    /// 带状矩阵 A
    Band,
    /// 打包三角/对称
    Packed,
    /// 带步长的向量
    Strided(Vector),
}

impl Storage {
    pub fn array_name(self) -> ArrayName {
        match self {
            Storage::Dense(Matrix::A) | Storage::Band => ArrayName::A,
            Storage::Dense(Matrix::B) => ArrayName::B,
            Storage::Dense(Matrix::C) => ArrayName::C,
            Storage::Packed => ArrayName::Ap,
            Storage::Strided(Vector::X) => ArrayName::X,
            Storage::Strided(Vector::Y) => ArrayName::Y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Order,
    Transpose(TransDomain),
    Uplo,
    Diag,
    Side,
    Dim(Dim),
    LeadingDim(Matrix),
    Stride(Vector),
    Array(Storage),
    /// 系数（alpha/beta 等）与其它按值传递的标量
    Scalar,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Order => write!(f, "order"),
            Role::Transpose(d) => write!(f, "transpose({d:?})"),
            Role::Uplo => write!(f, "triangle"),
            Role::Diag => write!(f, "diagonal"),
            Role::Side => write!(f, "side"),
            Role::Dim(d) => write!(f, "dim {}", d.ident()),
            Role::LeadingDim(m) => write!(f, "leading dim of {}", m.letter()),
            Role::Stride(v) => write!(f, "stride of {}", v.letter()),
            Role::Array(Storage::Dense(m)) => write!(f, "dense {}", m.letter()),
            Role::Array(Storage::Band) => write!(f, "band A"),
            Role::Array(Storage::Packed) => write!(f, "packed AP"),
            Role::Array(Storage::Strided(v)) => write!(f, "vector {}", v.letter()),
            Role::Scalar => write!(f, "scalar"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Classified<'d> {
    pub param: &'d Parameter,
    /// 规范短名（`tA`、`incX`、`kL`）
    pub ident: String,
    pub role: Role,
}

impl Classified<'_> {
    /// 枚举形参的原生类型名
    pub fn enum_type(&self) -> Option<&str> {
        match &self.param.ty.kind {
            ScalarKind::Enum(n) => Some(n),
            _ => None,
        }
    }
}

/// 一条声明连同它每个形参的角色
#[derive(Clone, Debug)]
pub struct Routine<'d> {
    pub decl: &'d Declaration,
    /// 去前缀的 BLAS 名
    pub blas: &'d str,
    pub family: Family,
    pub params: SmallVec16<Classified<'d>>,
}

impl<'d> Routine<'d> {
    pub fn classify(decl: &'d Declaration, tables: &RuleTables, prefix: &str) -> GenResult<Self> {
        if decl.variadic {
            return Err(GenError::unsupported(&decl.name, "variadic declarations are not wrapped"));
        }
        let blas = decl.blas_name(prefix);
        let family = tables.family(blas);

        let idents: SmallVec16<String> =
            decl.params.iter().map(|p| tables.shorten(&lower_case_first(&p.name)).to_string()).collect();
        let shape = Shape {
            has_k: idents.iter().any(|i| i == "k"),
            has_kl: idents.iter().any(|i| i == "kL"),
            partners: idents.iter().filter(|i| i.starts_with("ld") || i.starts_with("inc")).cloned().collect(),
        };

        let mut params = SmallVec16::new();
        for (p, ident) in decl.params.iter().zip(idents) {
            let role = classify_param(decl, p, &ident, blas, family, tables, &shape)?;
            params.push(Classified { param: p, ident, role });
        }
        Ok(Routine { decl, blas, family, params })
    }

    pub fn has_dim(&self, d: Dim) -> bool {
        self.params.iter().any(|c| c.role == Role::Dim(d))
    }

    pub fn has_side(&self) -> bool {
        self.params.iter().any(|c| c.role == Role::Side)
    }

    pub fn find(&self, pred: impl Fn(&Role) -> bool) -> Option<&Classified<'d>> {
        self.params.iter().find(|c| pred(&c.role))
    }

    /// 按出现顺序的转置形参（gemm 里依次对应 A、B）
    pub fn transposes(&self) -> impl Iterator<Item = &Classified<'d>> {
        self.params.iter().filter(|c| matches!(c.role, Role::Transpose(_)))
    }

    #[inline]
    pub fn is_last(&self, c: &Classified<'_>) -> bool {
        self.decl.is_last(c.param)
    }
}

/// 整条声明的形状线索，分类单个形参时要用
struct Shape {
    has_k: bool,
    has_kl: bool,
    /// 出现过的前导维度与步长形参
    partners: SmallVec16<String>,
}

impl Shape {
    fn has(&self, ident: &str) -> bool {
        self.partners.iter().any(|p| p == ident)
    }
}

fn classify_param(
    decl: &Declaration,
    p: &Parameter,
    ident: &str,
    blas: &str,
    family: Family,
    tables: &RuleTables,
    shape: &Shape,
) -> GenResult<Role> {
    let ty = &p.ty;

    if let ScalarKind::Enum(name) = &ty.kind {
        if ty.pointer {
            return Err(GenError::unsupported(&decl.name, format!("pointer to enum parameter `{}`", p.name)));
        }
        let cat = tables
            .enum_types
            .get(name.as_str())
            .copied()
            .ok_or_else(|| GenError::unsupported(&decl.name, format!("unknown enum type `{name}`")))?;
        return Ok(match cat {
            EnumCategory::Order => Role::Order,
            EnumCategory::Transpose => Role::Transpose(tables.trans_domain(blas)),
            EnumCategory::Uplo => Role::Uplo,
            EnumCategory::Diag => Role::Diag,
            EnumCategory::Side => Role::Side,
        });
    }

    if ty.pointer {
        if ty.kind == ScalarKind::Void && decl.complex.is_none() {
            return Err(GenError::unsupported(
                &decl.name,
                format!("`void *{}` without a complex element width", p.name),
            ));
        }
        let storage = match ident {
            "a" if shape.has_kl || (shape.has_k && !matches!(family, Family::Gemm | Family::RankK)) => Storage::Band,
            "a" => Storage::Dense(Matrix::A),
            "b" => Storage::Dense(Matrix::B),
            "c" => Storage::Dense(Matrix::C),
            "ap" => Storage::Packed,
            "x" => Storage::Strided(Vector::X),
            "y" => Storage::Strided(Vector::Y),
            // 复数系数按地址传递
            "alpha" | "beta" if ty.is_const => return Ok(Role::Scalar),
            _ => {
                return Err(GenError::unsupported(
                    &decl.name,
                    format!("pointer parameter `{}` has no array or coefficient role", p.name),
                ));
            }
        };
        // 没有前导维度/步长的数组无法给出长度下界
        let partner = match storage {
            Storage::Dense(m) => Some(m.ld_ident()),
            Storage::Band => Some("lda"),
            Storage::Strided(v) => Some(v.inc_ident()),
            Storage::Packed => None,
        };
        if let Some(partner) = partner
            && !shape.has(partner)
        {
            return Err(GenError::unsupported(
                &decl.name,
                format!("array `{}` comes without `{partner}`", p.name),
            ));
        }
        return Ok(Role::Array(storage));
    }

    if ty.kind == ScalarKind::Int || ty.kind == ScalarKind::Index {
        if let Some(d) = Dim::from_ident(ident) {
            return Ok(Role::Dim(d));
        }
        match ident {
            "lda" => return Ok(Role::LeadingDim(Matrix::A)),
            "ldb" => return Ok(Role::LeadingDim(Matrix::B)),
            "ldc" => return Ok(Role::LeadingDim(Matrix::C)),
            "incX" => return Ok(Role::Stride(Vector::X)),
            "incY" => return Ok(Role::Stride(Vector::Y)),
            _ => {}
        }
    }

    if ty.kind == ScalarKind::Void {
        return Err(GenError::unsupported(&decl.name, format!("`void` parameter `{}`", p.name)));
    }
    Ok(Role::Scalar)
}
