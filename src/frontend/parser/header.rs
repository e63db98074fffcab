/* ================================
 * header 顶层入口
 * ================================ */

/// 别名链的最大展开深度，超过即视为环
const MAX_ALIAS_DEPTH: usize = 16;

/// 解析一个头文件。`prefix` 只用于给复数例程打元素宽度标签
pub fn parse_header(
    src: &str,
    file: FileId,
    file_name: &str,
    prefix: &str,
    diags: &mut DiagSink,
) -> GenResult<Header> {
    let errors_before = count_errors(diags);

    let mut pairs = match CblasParser::parse(Rule::header, src) {
        Ok(p) => p,
        Err(e) => {
            let span = pest_error_span(&e, file, src.len());
            diags.error("P0001", file_name, Some(span), e.variant.message().into_owned());
            return Err(GenError::Parse { file: file_name.to_string(), count: 1 });
        }
    };

    let mut b = HeaderBuilder::new(file, file_name);
    match pairs.next() {
        Some(root) => {
            if let Err(e) = b.walk(root, diags) {
                diags.error("P0000", file_name, None, e.to_string());
            }
        }
        None => diags.error("P0000", file_name, None, "empty parse tree"),
    }
    let header = b.finish(prefix, diags);

    let count = count_errors(diags) - errors_before;
    if count > 0 {
        return Err(GenError::Parse { file: file_name.to_string(), count });
    }
    tracing::debug!(
        file = file_name,
        decls = header.decls.len(),
        enums = header.enums.len(),
        "header parsed"
    );
    Ok(header)
}

fn count_errors(diags: &DiagSink) -> usize {
    diags.iter().filter(|d| d.severity == crate::diag::Severity::Error).count()
}

/// 尚未解析类型的原型
struct RawDecl {
    name: String,
    params: Vec<(String, RawType)>,
    ret: RawType,
    span: Span,
    pos: Position,
    variadic: bool,
}

struct HeaderBuilder<'a> {
    file: FileId,
    file_name: &'a str,
    enums: Vec<EnumDef>,
    /// (别名, 目标, 位置)；按源顺序
    aliases: Vec<(String, RawBase, Span)>,
    decls: Vec<RawDecl>,
}

impl<'a> HeaderBuilder<'a> {
    fn new(file: FileId, file_name: &'a str) -> Self {
        Self { file, file_name, enums: Vec::new(), aliases: Vec::new(), decls: Vec::new() }
    }

    fn walk(&mut self, root: Pair<Rule>, diags: &mut DiagSink) -> Result<()> {
        debug_assert_eq!(root.as_rule(), Rule::header);
        for it in root.into_inner() {
            match it.as_rule() {
                Rule::define_alias => self.define_alias(it)?,
                Rule::typedef_alias => self.typedef_alias(it)?,
                Rule::enum_decl | Rule::typedef_enum => self.enum_def(it, diags)?,
                Rule::fun_decl => self.fun_decl(it)?,
                // `extern "C" {` 守卫里留下的关键字
                Rule::directive | Rule::kw_extern | Rule::EOI => {}
                other => return Err(anyhow!("header: unexpected node: {:?}", other)),
            }
        }
        Ok(())
    }

    /// `#define NAME target`
    fn define_alias(&mut self, p: Pair<Rule>) -> Result<()> {
        let span = sp_of(&p, self.file);
        let mut ids = p.into_inner().filter(|x| x.as_rule() == Rule::ident);
        let name = ids.next().ok_or_else(|| anyhow!("define: missing name"))?.as_str().to_string();
        let target = ids.next().ok_or_else(|| anyhow!("define: missing target"))?.as_str();
        self.aliases.push((name, RawBase::from_word(target), span));
        Ok(())
    }

    /// `typedef <type> NAME;`
    fn typedef_alias(&mut self, p: Pair<Rule>) -> Result<()> {
        let span = sp_of(&p, self.file);
        let mut ty = None;
        let mut name = None;
        for x in p.into_inner() {
            match x.as_rule() {
                Rule::type_spec => ty = Some(build_type_spec(x, self.file)?),
                Rule::ident => name = Some(x.as_str().to_string()),
                _ => {}
            }
        }
        let ty = ty.ok_or_else(|| anyhow!("typedef: missing type"))?;
        let name = name.ok_or_else(|| anyhow!("typedef: missing name"))?;
        self.aliases.push((name, ty.base, span));
        Ok(())
    }

    /// `enum TAG {..};` 或 `typedef enum [TAG] {..} NAME;`
    /// 有 typedef 名时以它为准，标签名登记为指向它的别名
    fn enum_def(&mut self, p: Pair<Rule>, diags: &mut DiagSink) -> Result<()> {
        let span = sp_of(&p, self.file);
        let mut before = None;
        let mut after = None;
        let mut seen_body = false;
        let mut variants = Vec::new();
        for x in p.into_inner() {
            match x.as_rule() {
                Rule::ident if !seen_body => before = Some(x.as_str().to_string()),
                Rule::ident => after = Some(x.as_str().to_string()),
                Rule::enum_body => {
                    variants = build_enum_body(x)?;
                    seen_body = true;
                }
                _ => {}
            }
        }
        // `typedef enum {..} NAME;` 里唯一的 ident 出现在 body 之后
        let (tag, name) = match (before, after) {
            (tag, Some(name)) => (tag, name),
            (Some(name), None) => (None, name),
            (None, None) => return Err(anyhow!("enum: missing name")),
        };

        if self.enums.iter().any(|e| e.name == name) {
            diags.error("P0003", self.file_name, Some(span), format!("duplicate enum `{name}`"));
            return Ok(());
        }
        if let Some(tag) = tag.filter(|t| *t != name) {
            self.aliases.push((tag, RawBase::Named(name.clone()), span));
        }
        self.enums.push(EnumDef { name, variants });
        Ok(())
    }

    fn fun_decl(&mut self, p: Pair<Rule>) -> Result<()> {
        let span = sp_of(&p, self.file);
        let pos = pos_of(&p, self.file_name);
        let mut ret = None;
        let mut name = None;
        let mut params = Vec::new();
        let mut variadic = false;
        for x in p.into_inner() {
            match x.as_rule() {
                Rule::kw_extern => {}
                Rule::ret_type => ret = Some(build_pointer_type(x, self.file)?),
                Rule::ident => name = Some(x.as_str().to_string()),
                Rule::param_list => {
                    for q in x.into_inner() {
                        match q.as_rule() {
                            Rule::param => params.push(build_param(q, self.file)?),
                            Rule::ellipsis => variadic = true,
                            Rule::void_params => {}
                            other => return Err(anyhow!("param_list: unexpected node: {:?}", other)),
                        }
                    }
                }
                other => return Err(anyhow!("fun_decl: unexpected node: {:?}", other)),
            }
        }
        self.decls.push(RawDecl {
            name: name.ok_or_else(|| anyhow!("fun_decl: missing name"))?,
            params,
            ret: ret.ok_or_else(|| anyhow!("fun_decl: missing return type"))?,
            span,
            pos,
            variadic,
        });
        Ok(())
    }

    /* ---------- 收尾：解析类型、查重 ---------- */

    fn finish(self, prefix: &str, diags: &mut DiagSink) -> Header {
        let (aliases, decls) = self.resolve_types(prefix, diags);
        Header { file: self.file_name.to_string(), enums: self.enums, aliases, decls }
    }

    /// 顺别名链解析别名与全部原型的类型
    fn resolve_types(&self, prefix: &str, diags: &mut DiagSink) -> (Vec<Alias>, Vec<Declaration>) {
        let enum_names: FastSet<&str> = {
            let mut s = fast_set();
            for e in &self.enums {
                s.insert(e.name.as_str());
            }
            s
        };
        // 重复定义以最后一次为准（`#ifdef` 分支两边各有一份时，取 `#else` 一侧）
        let mut alias_map: FastMap<&str, &RawBase> = fast_map();
        for (name, target, span) in &self.aliases {
            if alias_map.insert(name.as_str(), target).is_some() {
                diags.warn("P0101", self.file_name, Some(*span), format!("redefinition of `{name}`; the last one wins"));
            }
        }
        let resolver = Resolver { enums: &enum_names, aliases: &alias_map };

        let mut aliases = Vec::new();
        let mut seen_alias: FastSet<&str> = fast_set();
        for (name, target, _) in self.aliases.iter().rev() {
            if !seen_alias.insert(name.as_str()) {
                continue;
            }
            // 从未被用到的坏别名不报错，只是不导出
            if let Ok(kind) = resolver.resolve(target) {
                let target = match kind {
                    ScalarKind::Enum(n) => n,
                    other => c_spelling(&other).to_string(),
                };
                aliases.push(Alias { name: name.clone(), target });
            }
        }
        aliases.reverse();

        let mut decls = Vec::with_capacity(self.decls.len());
        let mut seen: FastSet<&str> = fast_set();
        for raw in &self.decls {
            if !seen.insert(raw.name.as_str()) {
                diags.error("P0003", self.file_name, Some(raw.span), format!("duplicate declaration `{}`", raw.name));
                continue;
            }
            let mut ok = true;
            let lower = |t: &RawType, diags: &mut DiagSink| match resolver.resolve(&t.base) {
                Ok(kind) => Some(CType { kind, pointer: t.pointer, is_const: t.is_const, spelling: t.spelling.clone() }),
                Err(msg) => {
                    diags.error("P0002", self.file_name, Some(t.span), msg);
                    None
                }
            };
            let ret = lower(&raw.ret, diags);
            let mut params = Vec::with_capacity(raw.params.len());
            for (index, (name, t)) in raw.params.iter().enumerate() {
                match lower(t, diags) {
                    Some(ty) => params.push(Parameter { name: name.clone(), ty, index }),
                    None => ok = false,
                }
            }
            let (Some(ret), true) = (ret, ok) else { continue };

            let blas = raw.name.strip_prefix(prefix).unwrap_or(&raw.name);
            decls.push(Declaration {
                name: raw.name.clone(),
                params,
                ret,
                pos: raw.pos.clone(),
                span: raw.span,
                variadic: raw.variadic,
                complex: ComplexWidth::from_blas_name(blas),
            });
        }

        (aliases, decls)
    }
}

struct Resolver<'r> {
    enums: &'r FastSet<&'r str>,
    aliases: &'r FastMap<&'r str, &'r RawBase>,
}

impl Resolver<'_> {
    /// 顺着别名链走到内建标量或已定义的 enum
    fn resolve(&self, base: &RawBase) -> std::result::Result<ScalarKind, String> {
        let mut cur = base;
        for _ in 0..MAX_ALIAS_DEPTH {
            match cur {
                RawBase::Builtin(k) => return Ok(k.clone()),
                RawBase::Named(n) | RawBase::Enum(n) => {
                    if self.enums.contains(n.as_str()) {
                        return Ok(ScalarKind::Enum(n.clone()));
                    }
                    match self.aliases.get(n.as_str()) {
                        Some(next) => cur = *next,
                        None => return Err(format!("unknown type `{n}`")),
                    }
                }
            }
        }
        Err(format!("alias chain through `{}` does not terminate", base.word()))
    }
}
