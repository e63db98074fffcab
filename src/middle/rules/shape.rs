use super::RuleCtx;
use crate::middle::classify::{Classified, Role};
use crate::middle::ir::{Stmt, Violation, int, var};

/// 形状维度必须非负
pub fn shape(_: &RuleCtx<'_, '_>, c: &Classified<'_>, out: &mut Vec<Stmt>) {
    if let Role::Dim(d) = c.role {
        out.push(Stmt::guard(var(&c.ident).lt(int(0)), Violation::NegativeDim(d)));
    }
}
