//! 类型映射：C 类型描述 -> 目标语言类型与原生调用实参
//!
//! 每种方言提供一套声明式的 `TypeTables`，`TypeMapper` 只负责查表和套模板。
//! 模板占位：`{name}` 形参名，`{elem}` 元素类型，`{enum}` 原生枚举类型名，
//! `{variant}` 枚举子，`{call}` 原生调用表达式。

use crate::error::{GenError, GenResult};
use crate::frontend::ast::{CType, ComplexWidth, ScalarKind, TypeKey};
use crate::middle::ir::Elem;
use crate::middle::tables::{EnumCategory, RuleTables};
use crate::utils::fast::FastMap;

/// 按地址传递的系数形参（复数系数在原生接口里是 `const void *`）
pub const COEFFICIENTS: [&str; 2] = ["alpha", "beta"];

#[inline]
pub fn is_coefficient(name: &str) -> bool {
    COEFFICIENTS.contains(&name)
}

pub struct TypeTables {
    /// 元素 -> 目标类型
    pub elems: FastMap<Elem, &'static str>,
    /// 维度、前导维度、步长与下标返回值
    pub int: &'static str,
    pub slice: &'static str,
    pub slice_mut: &'static str,
    /// 库侧枚举类型
    pub enums: FastMap<EnumCategory, &'static str>,
    /// 库侧枚举取值
    pub enum_variant: &'static str,
    /// 非指针按种类、指针按 (种类, 指针) 查编组模板；`{name}` 已是地址表达式
    pub marshal: FastMap<TypeKey, &'static str>,
    /// 枚举实参（已被校验规则换成原生取值）
    pub marshal_enum: &'static str,
    /// 存储次序实参：包装固定为行主序
    pub marshal_order: &'static str,
    /// 数组实参的地址绑定名
    pub array_addr: &'static str,
    /// 系数实参取地址
    pub coefficient_addr: &'static str,
    /// 返回类型与包装模板
    pub returns: FastMap<ScalarKind, (&'static str, &'static str)>,
}

/// 一条声明范围内的类型映射：复数宽度来自声明标签，不再看名字
pub struct TypeMapper<'t> {
    tables: &'t TypeTables,
    rules: &'t RuleTables,
    complex: Option<ComplexWidth>,
    /// 报错用
    routine: &'t str,
}

impl<'t> TypeMapper<'t> {
    pub fn new(tables: &'t TypeTables, rules: &'t RuleTables, complex: Option<ComplexWidth>, routine: &'t str) -> Self {
        Self { tables, rules, complex, routine }
    }

    pub fn elem(&self, e: Elem) -> GenResult<&'static str> {
        self.tables
            .elems
            .get(&e)
            .copied()
            .ok_or_else(|| GenError::unsupported(self.routine, format!("no target type for {e:?}")))
    }

    fn elem_of(&self, ty: &CType) -> GenResult<Elem> {
        Elem::of(ty, self.complex)
            .ok_or_else(|| GenError::unsupported(self.routine, format!("`{ty}` has no element type")))
    }

    /// 非枚举形参的目标类型
    pub fn map_type(&self, ty: &CType, name: &str) -> GenResult<String> {
        match ty.kind {
            ScalarKind::Enum(_) => self.map_enum(ty, name).map(|t| t.unwrap_or_default()),
            ScalarKind::Int | ScalarKind::Index if !ty.pointer => Ok(self.tables.int.to_string()),
            _ if ty.pointer && is_coefficient(name) => Ok(self.elem(self.elem_of(ty)?)?.to_string()),
            _ if ty.pointer => {
                let elem = self.elem(self.elem_of(ty)?)?;
                let tpl = if ty.is_const { self.tables.slice } else { self.tables.slice_mut };
                Ok(tpl.replace("{elem}", elem))
            }
            _ => Ok(self.elem(self.elem_of(ty)?)?.to_string()),
        }
    }

    /// 枚举形参的库侧类型；存储次序不出现在签名里，返回 None
    pub fn map_enum(&self, ty: &CType, _name: &str) -> GenResult<Option<String>> {
        let cat = self.category(ty)?;
        if cat == EnumCategory::Order {
            return Ok(None);
        }
        let lib = self
            .tables
            .enums
            .get(&cat)
            .ok_or_else(|| GenError::unsupported(self.routine, format!("no library enum for {cat:?}")))?;
        Ok(Some(lib.to_string()))
    }

    pub fn category(&self, ty: &CType) -> GenResult<EnumCategory> {
        let ScalarKind::Enum(name) = &ty.kind else {
            return Err(GenError::unsupported(self.routine, format!("`{ty}` is not an enum")));
        };
        self.rules
            .enum_types
            .get(name.as_str())
            .copied()
            .ok_or_else(|| GenError::unsupported(self.routine, format!("unknown enum type `{name}`")))
    }

    /// 库侧枚举取值的写法：`Transpose::NoTrans` / `blas.NoTrans`
    pub fn library_variant(&self, cat: EnumCategory, variant: &str) -> String {
        let lib = self.tables.enums.get(&cat).copied().unwrap_or_default();
        self.tables.enum_variant.replace("{enum}", lib).replace("{variant}", variant)
    }

    /// 非枚举形参的原生实参；`name` 为目标侧形参名
    pub fn marshal_expr(&self, name: &str, ty: &CType) -> GenResult<String> {
        let key = match &ty.kind {
            ScalarKind::Enum(_) => return self.marshal_enum_expr(name, ty),
            k => TypeKey { kind: k.clone(), pointer: ty.pointer },
        };
        let tpl = self
            .tables
            .marshal
            .get(&key)
            .ok_or_else(|| GenError::unsupported(self.routine, format!("no marshalling for `{ty}`")))?;
        let arg = if !ty.pointer {
            name.to_string()
        } else if is_coefficient(name) {
            self.tables.coefficient_addr.replace("{name}", name)
        } else {
            self.tables.array_addr.replace("{name}", name)
        };
        Ok(tpl.replace("{name}", &arg))
    }

    pub fn marshal_enum_expr(&self, name: &str, ty: &CType) -> GenResult<String> {
        let ScalarKind::Enum(native) = &ty.kind else {
            return Err(GenError::unsupported(self.routine, format!("`{ty}` is not an enum")));
        };
        if self.category(ty)? == EnumCategory::Order {
            let row_major = self.rules.native(EnumCategory::Order, "RowMajor").unwrap_or("CblasRowMajor");
            return Ok(self.tables.marshal_order.replace("{enum}", native).replace("{variant}", row_major));
        }
        Ok(self.tables.marshal_enum.replace("{enum}", native).replace("{name}", name))
    }

    /// 返回类型；void 为 None
    pub fn return_type(&self, ret: &CType) -> GenResult<Option<&'static str>> {
        if ret.is_void() {
            return Ok(None);
        }
        self.returns(ret).map(|(t, _)| Some(t))
    }

    /// 把原生调用包成目标返回类型
    pub fn wrap_return(&self, ret: &CType, call: &str) -> GenResult<String> {
        if ret.is_void() {
            return Ok(call.to_string());
        }
        self.returns(ret).map(|(_, wrap)| wrap.replace("{call}", call))
    }

    fn returns(&self, ret: &CType) -> GenResult<(&'static str, &'static str)> {
        if ret.pointer {
            return Err(GenError::unsupported(self.routine, format!("pointer return `{ret}`")));
        }
        self.tables
            .returns
            .get(&ret.kind)
            .copied()
            .ok_or_else(|| GenError::unsupported(self.routine, format!("unsupported return type `{ret}`")))
    }
}
