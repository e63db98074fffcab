use super::RuleCtx;
use crate::middle::classify::{Classified, Role};
use crate::middle::ir::{Stmt, Violation, int, var};

/// 步长为 0 时迭代方向和步进都无定义
pub fn zero_inc(_: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    if let Role::Stride(v) = c.role {
        out.push(Stmt::guard(var(&c.ident).equals(int(0)), Violation::ZeroInc(v)));
    }
}
