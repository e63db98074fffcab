// src/lib.rs
//! cblasgen：从 CBLAS 头文件合成带前置条件检查的安全 BLAS 包装
//!
//! 流水线：`frontend`（头文件 -> 声明模型，参考源码 -> 文档）
//! -> `middle`（形参分类、校验规则、守卫 IR）
//! -> `backend`（类型映射、签名与调用、目标方言、排版、落盘）

pub mod utils;
pub mod error;
pub mod diag;
pub mod project;
pub mod frontend;
pub mod middle;
pub mod backend;
pub mod cli;

pub use backend::dialect::{Dialect, dialect_for};
pub use backend::orchestrate::{Generated, generate};
pub use error::{GenError, GenResult};
pub use middle::tables::RuleTables;
pub use project::{GenConfig, Target};
