//! 头文件输入模型：解析器产出、此后只读
//! - `Declaration` 的身份就是它的原生函数名
//! - 复数宽度标签在构造时一次算好，下游不再嗅探名字字符

use std::fmt;

use crate::frontend::span::{Position, Span};

/* =========================
 *        C 类型描述
 * ========================= */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Void,
    Char,
    Int,
    /// `size_t` / `CBLAS_INDEX`
    Index,
    Float,
    Double,
    /// 已解析到的 enum 名（别名已展开）
    Enum(String),
}

impl ScalarKind {
    #[inline]
    pub fn is_real(&self) -> bool { matches!(self, ScalarKind::Float | ScalarKind::Double) }
}

/// 一个形参或返回值的类型：标量种类 + 是否指针 + 是否 const
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CType {
    pub kind: ScalarKind,
    pub pointer: bool,
    pub is_const: bool,
    /// 头文件里的写法（`CBLAS_INDEX`、`enum CBLAS_ORDER`），仅用于出处注释
    pub spelling: String,
}

impl CType {
    pub fn void() -> Self {
        CType { kind: ScalarKind::Void, pointer: false, is_const: false, spelling: "void".into() }
    }

    #[inline]
    pub fn is_void(&self) -> bool { self.kind == ScalarKind::Void && !self.pointer }

    #[inline]
    pub fn is_void_ptr(&self) -> bool { self.kind == ScalarKind::Void && self.pointer }

    /// 查模板表用的键
    #[inline]
    pub fn key(&self) -> TypeKey {
        TypeKey { kind: self.kind.clone(), pointer: self.pointer }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const { write!(f, "const ")?; }
        write!(f, "{}", self.spelling)?;
        if self.pointer { write!(f, " *")?; }
        Ok(())
    }
}

/// (标量种类, 是否指针)：多个形参可共享同一个键，从而共享同一种编组策略
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub kind: ScalarKind,
    pub pointer: bool,
}

/// `void *` 形参在原生约定里是无类型的，宽度由声明显式携带
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComplexWidth {
    C64,
    C128,
}

impl ComplexWidth {
    /// 由去掉前缀后的 BLAS 名推断：
    /// `c*`、`?c*`（`z?` 除外）为单精度复数；`z*`、`?z*` 为双精度复数
    pub fn from_blas_name(blas: &str) -> Option<Self> {
        let b = blas.as_bytes();
        let (c0, c1) = (b.first().copied()?, b.get(1).copied().unwrap_or(0));
        if c0 == b'c' || (c1 == b'c' && c0 != b'z') {
            Some(ComplexWidth::C64)
        } else if c0 == b'z' || c1 == b'z' {
            Some(ComplexWidth::C128)
        } else {
            None
        }
    }
}

/* =========================
 *        声明
 * ========================= */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: CType,
    /// 在声明中的序号（从 0 开始）
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub params: Vec<Parameter>,
    pub ret: CType,
    pub pos: Position,
    pub span: Span,
    pub variadic: bool,
    /// `void *` 形参的复数元素宽度；按名字推断，`scopy` 这类实数例程也可能带上，只有 void 指针会用到
    pub complex: Option<ComplexWidth>,
}

impl Declaration {
    #[inline]
    pub fn is_last(&self, p: &Parameter) -> bool { p.index + 1 == self.params.len() }

    /// 去掉前缀后的 BLAS 名（无此前缀时原样返回）
    #[inline]
    pub fn blas_name<'a>(&'a self, prefix: &str) -> &'a str {
        self.name.strip_prefix(prefix).unwrap_or(&self.name)
    }
}

/// `enum NAME { A = 1, B };`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    /// (枚举子, 取值)；未写值的按 C 规则顺延
    pub variants: Vec<(String, i64)>,
}

/// `#define ALIAS target` / `typedef target ALIAS;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub target: String,
}

/// 一个头文件的全部产物，声明保持源顺序
#[derive(Clone, Debug, Default)]
pub struct Header {
    pub file: String,
    pub enums: Vec<EnumDef>,
    pub aliases: Vec<Alias>,
    pub decls: Vec<Declaration>,
}

impl Header {
    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }
}
