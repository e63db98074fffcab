// src/backend/mod.rs
// 输出侧：类型映射、签名与调用构造、目标方言、生成主循环、外部排版

pub mod types;
pub mod signature;
pub mod call;
pub mod dialect;
pub mod orchestrate;
pub mod format;
pub mod persist;
