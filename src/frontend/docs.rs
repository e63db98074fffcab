//! 文档抄录：从一棵目标语言的参考源码树里收集 `fn name` / `func (Recv) Name`
//! 正上方连续的 `//` 注释行，按函数名索引
//!
//! - 文件按路径排序访问，同名函数第一次出现的为准
//! - 查询时若最后一行含标记串，丢掉最后两行（自动追加的免责声明和它前面的空注释行）

use std::fs;
use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{GenError, GenResult};
use crate::utils::fast::{FastMap, fast_map};

pub const DEFAULT_MARKER: &str = "Float32 implementations are autogenerated and not directly tested.";

/// 参考源码里函数头的写法：Rust 的 `pub fn x(` 与 Go 的 `func (T) X(` / `func X(`
const FN_HEADER: &str =
    r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?(?:fn\s+|func\s+(?:\([^)]*\)\s*)?)([A-Za-z_][A-Za-z0-9_]*)";

pub struct DocIndex {
    docs: FastMap<String, Vec<String>>,
    marker: String,
}

impl DocIndex {
    /// 遍历 `root` 下所有 `.rs` / `.go` 文件
    pub fn load(root: &Path, marker: &str) -> GenResult<Self> {
        if !root.exists() {
            return Err(GenError::Docs(format!("docs location `{}` does not exist", root.display())));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| GenError::Docs(e.to_string()))?;
            let path = entry.path();
            let wanted = path.extension().is_some_and(|ext| ext == "rs" || ext == "go");
            if entry.file_type().is_file() && wanted {
                let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
                files.push(text);
            }
        }
        let idx = Self::from_sources(files.iter().map(String::as_str), marker)?;
        tracing::debug!(root = %root.display(), files = files.len(), entries = idx.len(), "docs indexed");
        Ok(idx)
    }

    pub fn from_sources<'s>(sources: impl IntoIterator<Item = &'s str>, marker: &str) -> GenResult<Self> {
        let header = Regex::new(FN_HEADER).map_err(|e| GenError::Docs(e.to_string()))?;
        let mut docs: FastMap<String, Vec<String>> = fast_map();
        for src in sources {
            let mut pending: Vec<String> = Vec::new();
            for line in src.lines() {
                let t = line.trim_start();
                if let Some(text) = comment_text(t) {
                    pending.push(text.to_string());
                    continue;
                }
                // 属性行夹在注释和函数头之间时不打断
                if t.starts_with("#[") {
                    continue;
                }
                if let Some(cap) = header.captures(line) {
                    if !pending.is_empty() {
                        docs.entry(cap[1].to_string()).or_insert_with(|| pending.clone());
                    }
                }
                pending.clear();
            }
        }
        Ok(Self { docs, marker: marker.to_string() })
    }

    #[inline]
    pub fn len(&self) -> usize { self.docs.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// 去掉注释前缀后的各行；末行含标记串时去掉最后两行
    pub fn lookup(&self, name: &str) -> Option<&[String]> {
        let doc = self.docs.get(name)?;
        let last = doc.last()?;
        if !self.marker.is_empty() && last.contains(&self.marker) {
            return Some(&doc[..doc.len().saturating_sub(2)]);
        }
        Some(doc)
    }
}

/// `/// text`、`// text` -> `text`；模块级 `//!` 不算
fn comment_text(t: &str) -> Option<&str> {
    if t.starts_with("//!") {
        return None;
    }
    let body = t.strip_prefix("///").or_else(|| t.strip_prefix("//"))?;
    Some(body.strip_prefix(' ').unwrap_or(body))
}
