// src/project.rs
//! 生成配置：`Cblasgen.toml`（全部键可选，缺省即内建常量）
//!
//! 与编译器工程文件不同，这里的配置写坏了直接报错：
//! 生成期的任何错误都必须让整次运行失败。

use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GenError, GenResult};
use crate::frontend::docs::DEFAULT_MARKER;

pub const CONFIG_FILE: &str = "Cblasgen.toml";
pub const DOCS_ENV: &str = "CBLASGEN_DOCS";

/// 不生成的原生函数：要么需要手写包装，要么是厂商扩展
pub const DEFAULT_SKIP: &[&str] = &[
    "cblas_errprn",
    "cblas_xerbla",
    "cblas_srotg",
    "cblas_srotmg",
    "cblas_srotm",
    "cblas_drotg",
    "cblas_drotmg",
    "cblas_drotm",
    "cblas_crotg",
    "cblas_zrotg",
    "cblas_cdotu_sub",
    "cblas_cdotc_sub",
    "cblas_zdotu_sub",
    "cblas_zdotc_sub",
    // 厂商扩展
    "cblas_csrot",
    "cblas_zdrot",
];

/// 生成目标语言
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Rust,
    Go,
}

impl Target {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rust" | "rs" => Some(Target::Rust),
            "go" | "cgo" => Some(Target::Go),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Rust => "rust",
            Target::Go => "go",
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            Target::Rust => "blas.rs",
            Target::Go => "blas.go",
        }
    }
}

/// 输出排版开关
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    /// 每个函数体开头写 `declared at ...` 出处注释
    pub note_origin: bool,
    /// 函数之间空一行（抄录文档时总是空行）
    pub separate_funcs: bool,
    /// 相邻同类型形参省略类型标注（仅对支持分组形参的目标生效）
    pub elide_repeat: bool,
}

impl Default for Style {
    fn default() -> Self {
        Style { note_origin: true, separate_funcs: false, elide_repeat: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocsConfig {
    pub crib: bool,
    pub path: Option<PathBuf>,
    pub marker: String,
}

/// 解析完成的配置；相对路径已按配置文件所在目录展开
#[derive(Clone, Debug)]
pub struct GenConfig {
    pub root: PathBuf,
    pub header: PathBuf,
    output: Option<PathBuf>,
    pub target: Target,
    pub prefix: String,
    pub skip: Vec<String>,
    pub docs: DocsConfig,
    pub style: Style,
    pub format: Option<Vec<String>>,
}

/* ================================
 * TOML 形状
 * ================================ */

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CblasgenToml {
    #[serde(default)]
    generate: GenerateTable,
    #[serde(default)]
    docs: DocsTable,
    #[serde(default)]
    style: StyleTable,
    #[serde(default)]
    format: FormatTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenerateTable {
    header: Option<String>,
    output: Option<String>,
    target: Option<Target>,
    prefix: Option<String>,
    /// 整体替换默认排除集
    skip: Option<Vec<String>>,
    /// 在默认（或替换后的）排除集上追加
    #[serde(default)]
    extra_skip: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocsTable {
    crib: Option<bool>,
    path: Option<String>,
    marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleTable {
    note_origin: Option<bool>,
    separate_funcs: Option<bool>,
    elide_repeat: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormatTable {
    command: Option<Vec<String>>,
}

impl GenConfig {
    /// 不读任何文件的默认配置
    pub fn defaults(root: &Path) -> Self {
        GenConfig {
            root: root.to_path_buf(),
            header: root.join("cblas.h"),
            output: None,
            target: Target::default(),
            prefix: "cblas_".to_string(),
            skip: DEFAULT_SKIP.iter().map(|s| s.to_string()).collect(),
            docs: DocsConfig { crib: true, path: None, marker: DEFAULT_MARKER.to_string() },
            style: Style::default(),
            format: None,
        }
    }

    /// 输出文件；未显式配置时随目标语言取默认名
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(p) => p.clone(),
            None => self.root.join(self.target.default_output()),
        }
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = target;
    }

    /// 文档位置：配置优先，其次环境变量；开启抄录却找不到位置即失败
    pub fn docs_location(&self) -> GenResult<Option<PathBuf>> {
        resolve_docs_location(&self.docs, std::env::var_os(DOCS_ENV), &self.root)
    }

    fn apply(&mut self, raw: CblasgenToml) {
        let root = self.root.clone();
        let g = raw.generate;
        if let Some(h) = g.header {
            self.header = root.join(h);
        }
        if let Some(o) = g.output {
            self.output = Some(root.join(o));
        }
        if let Some(t) = g.target {
            self.target = t;
        }
        if let Some(p) = g.prefix {
            self.prefix = p;
        }
        if let Some(s) = g.skip {
            self.skip = s;
        }
        self.skip.extend(g.extra_skip);

        if let Some(c) = raw.docs.crib {
            self.docs.crib = c;
        }
        if let Some(p) = raw.docs.path {
            self.docs.path = Some(root.join(p));
        }
        if let Some(m) = raw.docs.marker {
            self.docs.marker = m;
        }

        let s = raw.style;
        self.style.note_origin = s.note_origin.unwrap_or(self.style.note_origin);
        self.style.separate_funcs = s.separate_funcs.unwrap_or(self.style.separate_funcs);
        self.style.elide_repeat = s.elide_repeat.unwrap_or(self.style.elide_repeat);

        self.format = raw.format.command.filter(|c| !c.is_empty());
    }
}

fn resolve_docs_location(docs: &DocsConfig, env: Option<OsString>, root: &Path) -> GenResult<Option<PathBuf>> {
    if !docs.crib {
        return Ok(None);
    }
    if let Some(p) = &docs.path {
        return Ok(Some(p.clone()));
    }
    match env {
        Some(v) if !v.is_empty() => Ok(Some(root.join(PathBuf::from(v)))),
        _ => Err(GenError::Docs(format!(
            "doc cribbing is enabled but no location is set; use [docs] path in {CONFIG_FILE} or {DOCS_ENV}"
        ))),
    }
}

/// 从当前工作目录加载：`Cblasgen.toml` 可选
pub fn load_from_cwd() -> GenResult<GenConfig> {
    let root = std::env::current_dir().map_err(|e| GenError::io(Path::new("."), e))?;
    load_from_dir(&root)
}

/// 从指定目录加载：没有配置文件时完全默认
pub fn load_from_dir(root: &Path) -> GenResult<GenConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!(root = %root.display(), "no {CONFIG_FILE}; using defaults");
        return Ok(GenConfig::defaults(root));
    }
    load_file(&path)
}

/// 加载显式给出的配置文件（必须存在）
pub fn load_file(path: &Path) -> GenResult<GenConfig> {
    let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    let raw = toml::from_str::<CblasgenToml>(&text).map_err(|e| GenError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut cfg = GenConfig::defaults(&root);
    cfg.apply(raw);
    tracing::debug!(config = %path.display(), target = cfg.target.name(), skip = cfg.skip.len(), "config loaded");
    Ok(cfg)
}
