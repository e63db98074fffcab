//! 原生调用：逐个形参编组（含存储次序），再按返回类型包一层

use crate::backend::dialect::Dialect;
use crate::backend::types::TypeMapper;
use crate::error::GenResult;
use crate::middle::classify::Routine;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    /// 已按返回类型包装好的调用表达式
    pub expr: String,
    /// 是否需要把结果交还调用方
    pub returns: bool,
}

pub fn build_call(r: &Routine<'_>, mapper: &TypeMapper<'_>, dialect: &dyn Dialect) -> GenResult<Call> {
    let args = r
        .params
        .iter()
        .map(|c| mapper.marshal_expr(&dialect.ident(&c.ident), &c.param.ty))
        .collect::<GenResult<Vec<_>>>()?;
    let native = dialect.native_call(&r.decl.name, &args.join(", "));
    Ok(Call {
        expr: mapper.wrap_return(&r.decl.ret, &native)?,
        returns: !r.decl.ret.is_void(),
    })
}
