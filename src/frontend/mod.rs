// src/frontend/mod.rs
// 输入侧：位置信息、声明模型、头文件解析、文档抄录

pub mod span;
pub mod ast;
pub mod parser;
pub mod docs;

use std::fs;
use std::path::Path;

use crate::diag::{DiagSink, SourceMap};
use crate::error::{GenError, GenResult};

/// 读入头文件并解析；源码登记进 `sm`，诊断写进 `diags`
pub fn load_header(path: &Path, prefix: &str, sm: &mut SourceMap, diags: &mut DiagSink) -> GenResult<ast::Header> {
    let src = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let fid = sm.add_file(path.display().to_string(), src);
    let src = sm.source(fid).unwrap_or_default();
    let header = parser::parse_header(src, fid, &name, prefix, diags)?;
    tracing::debug!(header = %path.display(), decls = header.decls.len(), enums = header.enums.len(), "header parsed");
    Ok(header)
}
