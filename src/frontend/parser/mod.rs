//! 头文件解析：pest 语法 -> `Header`
//! 语法错误、未知类型、重名声明都记进 `DiagSink`，随后整体失败

use crate::diag::DiagSink;
use crate::error::{GenError, GenResult};
use crate::frontend::ast::*;
use crate::frontend::span::{FileId, Position, Span};
use crate::utils::fast::{FastMap, FastSet, fast_map, fast_set};
use anyhow::{anyhow, Result};
use pest::iterators::Pair;
use pest::Parser;

include!("header.rs");
include!("types.rs");
include!("util.rs");

#[derive(pest_derive::Parser)]
#[grammar = "./grammar/cblas.pest"]
pub struct CblasParser;
