use super::RuleCtx;
use crate::middle::classify::{Classified, Role};
use crate::middle::ir::{Elem, Stmt};

/// 数组实参取首元素地址；空数组传空指针
pub fn address(cx: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    let Role::Array(_) = c.role else { return };
    let ty = &c.param.ty;
    // 分类阶段已拒绝没有复数宽度的 void *
    let Some(elem) = Elem::of(ty, cx.routine.decl.complex) else { return };
    out.push(Stmt::Address { var: c.ident.clone(), elem, mutable: !ty.is_const });
}
