//! 与目标语言无关的守卫 IR：规则产出它，方言把它渲染成源码
//!
//! 变量名一律用规范短名（`tA`、`incX`、`rowA`），命名风格由方言决定。

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::frontend::ast::{CType, ComplexWidth, ScalarKind};
use crate::middle::tables::EnumCategory;
use crate::utils::fast::SmallVec2;

/* =========================
 *        元素类型
 * ========================= */

/// 数组元素 / 标量的数值类型（复数宽度来自声明上的标签）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Elem {
    Char,
    Int,
    F32,
    F64,
    C64,
    C128,
}

impl Elem {
    /// 指针或标量形参的元素类型；`void *` 需要声明的复数宽度
    pub fn of(ty: &CType, complex: Option<ComplexWidth>) -> Option<Elem> {
        Some(match ty.kind {
            ScalarKind::Char => Elem::Char,
            ScalarKind::Int | ScalarKind::Index => Elem::Int,
            ScalarKind::Float => Elem::F32,
            ScalarKind::Double => Elem::F64,
            ScalarKind::Void if ty.pointer => match complex? {
                ComplexWidth::C64 => Elem::C64,
                ComplexWidth::C128 => Elem::C128,
            },
            ScalarKind::Void | ScalarKind::Enum(_) => return None,
        })
    }
}

/* =========================
 *        维度/角色标签
 * ========================= */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dim {
    M,
    N,
    K,
    KL,
    KU,
}

impl Dim {
    pub fn from_ident(s: &str) -> Option<Dim> {
        Some(match s {
            "m" => Dim::M,
            "n" => Dim::N,
            "k" => Dim::K,
            "kL" => Dim::KL,
            "kU" => Dim::KU,
            _ => return None,
        })
    }

    pub fn ident(self) -> &'static str {
        match self {
            Dim::M => "m",
            Dim::N => "n",
            Dim::K => "k",
            Dim::KL => "kL",
            Dim::KU => "kU",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Matrix {
    A,
    B,
    C,
}

impl Matrix {
    pub fn letter(self) -> char {
        match self {
            Matrix::A => 'A',
            Matrix::B => 'B',
            Matrix::C => 'C',
        }
    }

    pub fn ld_ident(self) -> &'static str {
        match self {
            Matrix::A => "lda",
            Matrix::B => "ldb",
            Matrix::C => "ldc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vector {
    X,
    Y,
}

impl Vector {
    pub fn letter(self) -> char {
        match self {
            Vector::X => 'X',
            Vector::Y => 'Y',
        }
    }

    pub fn inc_ident(self) -> &'static str {
        match self {
            Vector::X => "incX",
            Vector::Y => "incY",
        }
    }
}

/// 数组名（用于长度违例）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayName {
    A,
    B,
    C,
    Ap,
    X,
    Y,
}

impl ArrayName {
    pub fn ident(self) -> &'static str {
        match self {
            ArrayName::A => "a",
            ArrayName::B => "b",
            ArrayName::C => "c",
            ArrayName::Ap => "ap",
            ArrayName::X => "x",
            ArrayName::Y => "y",
        }
    }
}

/* =========================
 *        违例
 * ========================= */

/// 生成代码里的前置条件违例：每一类都终止本次调用
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Violation {
    BadTranspose,
    BadUplo,
    BadDiag,
    BadSide,
    NegativeDim(Dim),
    ZeroInc(Vector),
    BadLd(Matrix),
    ShortArray(ArrayName),
    /// rotm 参数的 flag 不在 [-2, 1]
    BadFlag,
}

impl Violation {
    /// 渲染消息常量时的固定顺序
    pub const ALL: [Violation; 21] = [
        Violation::BadSide,
        Violation::BadTranspose,
        Violation::BadUplo,
        Violation::BadDiag,
        Violation::BadFlag,
        Violation::NegativeDim(Dim::M),
        Violation::NegativeDim(Dim::N),
        Violation::NegativeDim(Dim::K),
        Violation::NegativeDim(Dim::KL),
        Violation::NegativeDim(Dim::KU),
        Violation::BadLd(Matrix::A),
        Violation::BadLd(Matrix::B),
        Violation::BadLd(Matrix::C),
        Violation::ZeroInc(Vector::X),
        Violation::ZeroInc(Vector::Y),
        Violation::ShortArray(ArrayName::A),
        Violation::ShortArray(ArrayName::B),
        Violation::ShortArray(ArrayName::C),
        Violation::ShortArray(ArrayName::Ap),
        Violation::ShortArray(ArrayName::X),
        Violation::ShortArray(ArrayName::Y),
    ];

    pub fn for_enum(cat: EnumCategory) -> Option<Violation> {
        match cat {
            EnumCategory::Order => None,
            EnumCategory::Transpose => Some(Violation::BadTranspose),
            EnumCategory::Uplo => Some(Violation::BadUplo),
            EnumCategory::Diag => Some(Violation::BadDiag),
            EnumCategory::Side => Some(Violation::BadSide),
        }
    }

    /// 驼峰形式的名字：`badLdA`、`kLLT0`、`zeroIncX`、`shortAP`
    pub fn camel_name(self) -> String {
        match self {
            Violation::BadTranspose => "badTranspose".into(),
            Violation::BadUplo => "badUplo".into(),
            Violation::BadDiag => "badDiag".into(),
            Violation::BadSide => "badSide".into(),
            Violation::BadFlag => "badFlag".into(),
            Violation::NegativeDim(d) => format!("{}LT0", d.ident()),
            Violation::ZeroInc(v) => format!("zeroInc{}", v.letter()),
            Violation::BadLd(m) => format!("badLd{}", m.letter()),
            Violation::ShortArray(a) => format!("short{}", a.ident().to_uppercase()),
        }
    }

    pub fn message(self) -> String {
        match self {
            Violation::BadTranspose => "blas: illegal transpose".into(),
            Violation::BadUplo => "blas: illegal uplo".into(),
            Violation::BadDiag => "blas: illegal diag".into(),
            Violation::BadSide => "blas: illegal side".into(),
            Violation::BadFlag => "blas: illegal blas.Flag value".into(),
            Violation::NegativeDim(d) => format!("blas: {} < 0", d.ident()),
            Violation::ZeroInc(v) => format!("blas: zero {} index increment", v.letter().to_ascii_lowercase()),
            Violation::BadLd(m) => format!("blas: bad leading dimension of {}", m.letter()),
            Violation::ShortArray(a) => format!("blas: insufficient length of {}", a.ident()),
        }
    }
}

/* =========================
 *        表达式
 * ========================= */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    /// C 系的优先级：越大越紧
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div => 5,
            BinOp::Add | BinOp::Sub => 4,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => 3,
            BinOp::And => 2,
            BinOp::Or => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Var(String),
    Int(i64),
    /// 某数值类型的 1（`beta == 1`）
    One(Elem),
    /// 数组长度
    Len(String),
    /// 原生枚举常量，如 (`CBLAS_TRANSPOSE`, `CblasNoTrans`)
    Native { ty: String, variant: String },
    Max(Box<Expr>, Box<Expr>),
    Min(Box<Expr>, Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
}

pub fn var(name: &str) -> Expr { Expr::Var(name.to_string()) }
pub fn int(v: i64) -> Expr { Expr::Int(v) }
pub fn len(name: &str) -> Expr { Expr::Len(name.to_string()) }
pub fn max(a: Expr, b: Expr) -> Expr { Expr::Max(Box::new(a), Box::new(b)) }
pub fn min(a: Expr, b: Expr) -> Expr { Expr::Min(Box::new(a), Box::new(b)) }

pub fn native(ty: &str, variant: &str) -> Expr {
    Expr::Native { ty: ty.to_string(), variant: variant.to_string() }
}

impl Expr {
    fn bin(op: BinOp, l: Expr, r: Expr) -> Expr { Expr::Bin(op, Box::new(l), Box::new(r)) }

    pub fn lt(self, r: Expr) -> Expr { Expr::bin(BinOp::Lt, self, r) }
    pub fn le(self, r: Expr) -> Expr { Expr::bin(BinOp::Le, self, r) }
    pub fn gt(self, r: Expr) -> Expr { Expr::bin(BinOp::Gt, self, r) }
    pub fn ge(self, r: Expr) -> Expr { Expr::bin(BinOp::Ge, self, r) }
    pub fn equals(self, r: Expr) -> Expr { Expr::bin(BinOp::Eq, self, r) }
    pub fn differs(self, r: Expr) -> Expr { Expr::bin(BinOp::Ne, self, r) }
    pub fn and(self, r: Expr) -> Expr { Expr::bin(BinOp::And, self, r) }
    pub fn or(self, r: Expr) -> Expr { Expr::bin(BinOp::Or, self, r) }
}

macro_rules! arith {
    ($tr:ident, $f:ident, $op:expr) => {
        impl $tr for Expr {
            type Output = Expr;
            fn $f(self, r: Expr) -> Expr { Expr::bin($op, self, r) }
        }
        impl $tr<i64> for Expr {
            type Output = Expr;
            fn $f(self, r: i64) -> Expr { Expr::bin($op, self, Expr::Int(r)) }
        }
    };
}

arith!(Add, add, BinOp::Add);
arith!(Sub, sub, BinOp::Sub);
arith!(Mul, mul, BinOp::Mul);
arith!(Div, div, BinOp::Div);

/* =========================
 *        语句
 * ========================= */

/// 快速返回的返回值
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ret {
    /// 返回类型的零值
    Zero,
    /// 下标类归约的“未找到”
    MinusOne,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    /// 库侧枚举 -> 原生枚举（就地替换同名变量）；范围外的取值违例
    EnumSwitch {
        var: String,
        category: EnumCategory,
        /// 原生枚举类型名
        native: String,
        arms: Vec<(String, String)>,
        /// arms 是否覆盖了库侧全部取值
        exhaustive: bool,
        err: Violation,
    },
    /// `cond` 成立即违例
    Guard { cond: Expr, err: Violation },
    /// 按条件一次绑定一组局部变量
    Select {
        names: SmallVec2<String>,
        cond: Expr,
        then: SmallVec2<Expr>,
        otherwise: SmallVec2<Expr>,
    },
    QuickReturn { cond: Expr, value: Option<Ret> },
    /// `_x`：数组首元素地址，空数组为空指针
    Address { var: String, elem: Elem, mutable: bool },
    Comment(String),
    Blank,
}

impl Stmt {
    pub fn guard(cond: Expr, err: Violation) -> Stmt { Stmt::Guard { cond, err } }

    pub fn select(names: &[&str], cond: Expr, then: Vec<Expr>, otherwise: Vec<Expr>) -> Stmt {
        Stmt::Select {
            names: names.iter().map(|s| s.to_string()).collect(),
            cond,
            then: then.into_iter().collect(),
            otherwise: otherwise.into_iter().collect(),
        }
    }
}

/// 调试输出：类 C 的紧凑写法，只给测试和 `list` 用
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(v) => write!(f, "{v}"),
            Expr::Int(i) => write!(f, "{i}"),
            Expr::One(_) => write!(f, "1"),
            Expr::Len(v) => write!(f, "len({v})"),
            Expr::Native { variant, .. } => write!(f, "{variant}"),
            Expr::Max(a, b) => write!(f, "max({a}, {b})"),
            Expr::Min(a, b) => write!(f, "min({a}, {b})"),
            Expr::Bin(op, l, r) => write!(f, "({l} {} {r})", op.symbol()),
        }
    }
}
