//! 中端：形参分类、规则表与守卫 IR 的合成

pub mod tables;
pub mod ir;
pub mod classify;
pub mod rules;
