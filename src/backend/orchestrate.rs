//! 生成主循环：按源顺序逐条声明拼出整个输出单元
//!
//! 跨声明的状态只有“已输出个数”（决定是否插空行），
//! 第 i 个函数的内容与第 i-1 个无关。

use crate::backend::call::build_call;
use crate::backend::dialect::{Dialect, FnCx};
use crate::backend::signature::build_signature;
use crate::backend::types::TypeMapper;
use crate::error::GenResult;
use crate::frontend::ast::{Declaration, Header};
use crate::frontend::docs::DocIndex;
use crate::middle::classify::Routine;
use crate::middle::rules::synthesize;
use crate::middle::tables::RuleTables;
use crate::project::{GenConfig, Style};
use crate::utils::fast::{FastSet, fast_set};

/// 一次生成的产物
#[derive(Clone, Debug)]
pub struct Generated {
    pub text: String,
    /// 合成出的包装函数个数
    pub emitted: usize,
    /// 因前缀或排除集被跳过的声明个数
    pub skipped: usize,
    /// 找不到文档的包装函数
    pub undocumented: Vec<String>,
}

/// 决定哪些声明参与生成
pub struct Selection<'c> {
    prefix: &'c str,
    skip: FastSet<&'c str>,
}

impl<'c> Selection<'c> {
    pub fn new(prefix: &'c str, skip: &'c [String]) -> Self {
        let mut set = fast_set();
        for s in skip {
            set.insert(s.as_str());
        }
        Self { prefix, skip: set }
    }

    pub fn from_config(cfg: &'c GenConfig) -> Self {
        Self::new(&cfg.prefix, &cfg.skip)
    }

    pub fn wants(&self, d: &Declaration) -> bool {
        d.name.starts_with(self.prefix) && !self.skip.contains(d.name.as_str())
    }
}

pub fn generate(
    header: &Header,
    cfg: &GenConfig,
    docs: Option<&DocIndex>,
    dialect: &dyn Dialect,
    rules: &RuleTables,
) -> GenResult<Generated> {
    generate_with(header, &Selection::from_config(cfg), cfg.style, docs, dialect, rules)
}

pub fn generate_with(
    header: &Header,
    sel: &Selection<'_>,
    style: Style,
    docs: Option<&DocIndex>,
    dialect: &dyn Dialect,
    rules: &RuleTables,
) -> GenResult<Generated> {
    let mut out = dialect.preamble(header, rules);
    let mut emitted = 0usize;
    let mut skipped = 0usize;
    let mut undocumented = Vec::new();

    for d in &header.decls {
        if !sel.wants(d) {
            tracing::debug!(decl = %d.name, "skipped");
            skipped += 1;
            continue;
        }
        if emitted != 0 && (style.separate_funcs || docs.is_some()) {
            out.push('\n');
        }
        emitted += 1;

        let r = Routine::classify(d, rules, sel.prefix)?;
        let name = dialect.fn_name(r.blas);
        if let Some(idx) = docs {
            match idx.lookup(&name) {
                Some(lines) => {
                    for l in lines {
                        out.push_str(&dialect.doc_line(l));
                        out.push('\n');
                    }
                }
                None => {
                    tracing::warn!(function = %name, "no documentation found");
                    undocumented.push(name.clone());
                }
            }
        }
        emit_function(&r, style, dialect, rules, &mut out)?;
        tracing::debug!(decl = %d.name, function = %name, family = r.family.name(), "emitted");
    }

    out.push_str(&dialect.epilogue(header)?);
    tracing::info!(
        header = %header.file,
        target = dialect.target().name(),
        emitted,
        skipped,
        "generation finished"
    );
    Ok(Generated { text: out, emitted, skipped, undocumented })
}

/// 签名、出处注释、守卫、原生调用
fn emit_function(
    r: &Routine<'_>,
    style: Style,
    dialect: &dyn Dialect,
    rules: &RuleTables,
    out: &mut String,
) -> GenResult<()> {
    let mapper = TypeMapper::new(dialect.types(), rules, r.decl.complex, &r.decl.name);
    let sig = build_signature(r, &mapper, dialect, style.elide_repeat)?;
    dialect.open_fn(&sig, out);

    if style.note_origin {
        let d = r.decl;
        dialect.comment(&format!("declared at {} {} {} ...", d.pos, d.ret, d.name), out);
        out.push('\n');
    }

    let fx = FnCx { mapper: &mapper, ret: &r.decl.ret };
    for s in synthesize(r, rules) {
        dialect.stmt(&s, &fx, out)?;
    }
    let call = build_call(r, &mapper, dialect)?;
    dialect.call(&call, out);
    dialect.close_fn(out);
    Ok(())
}

/// `list` 子命令的文本：每条声明的族与各形参角色
pub fn listing(header: &Header, sel: &Selection<'_>, rules: &RuleTables) -> String {
    let mut out = String::new();
    for d in &header.decls {
        if !sel.wants(d) {
            out.push_str(&format!("{}  (skipped)\n", d.name));
            continue;
        }
        match Routine::classify(d, rules, sel.prefix) {
            Ok(r) => {
                out.push_str(&format!("{}  [{}]  {}\n", d.name, r.family.name(), d.pos));
                for c in &r.params {
                    out.push_str(&format!("    {:<8} {:<24} {}\n", c.ident, c.param.ty.to_string(), c.role));
                }
            }
            Err(e) => out.push_str(&format!("{}  unsupported: {e}\n", d.name)),
        }
    }
    out
}
