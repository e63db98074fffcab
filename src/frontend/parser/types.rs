/* ================================
 * 类型：先按写法记下，收尾时再顺别名链解析
 * ================================ */

#[derive(Clone, Debug)]
enum RawBase {
    Builtin(ScalarKind),
    /// 裸名字：typedef / #define 别名或 typedef 过的 enum
    Named(String),
    /// `enum NAME`
    Enum(String),
}

impl RawBase {
    fn from_word(word: &str) -> Self {
        match builtin_kind(word) {
            Some(k) => RawBase::Builtin(k),
            None => RawBase::Named(word.to_string()),
        }
    }

    fn word(&self) -> &str {
        match self {
            RawBase::Builtin(k) => c_spelling(k),
            RawBase::Named(n) | RawBase::Enum(n) => n,
        }
    }
}

#[derive(Clone, Debug)]
struct RawType {
    base: RawBase,
    pointer: bool,
    is_const: bool,
    spelling: String,
    span: Span,
}

fn builtin_kind(word: &str) -> Option<ScalarKind> {
    Some(match word {
        "void" => ScalarKind::Void,
        "char" => ScalarKind::Char,
        "int" => ScalarKind::Int,
        "float" => ScalarKind::Float,
        "double" => ScalarKind::Double,
        "size_t" => ScalarKind::Index,
        _ => return None,
    })
}

fn c_spelling(k: &ScalarKind) -> &str {
    match k {
        ScalarKind::Void => "void",
        ScalarKind::Char => "char",
        ScalarKind::Int => "int",
        ScalarKind::Index => "size_t",
        ScalarKind::Float => "float",
        ScalarKind::Double => "double",
        ScalarKind::Enum(n) => n,
    }
}

/// type_spec = const? (enum_ty | base_ty | named_ty) const?
fn build_type_spec(p: Pair<Rule>, file: FileId) -> Result<RawType> {
    let span = sp_of(&p, file);
    let mut is_const = false;
    let mut base = None;
    let mut spelling = String::new();
    for x in p.into_inner() {
        match x.as_rule() {
            Rule::kw_const => is_const = true,
            Rule::base_ty => {
                let w = x.as_str();
                let k = builtin_kind(w).ok_or_else(|| anyhow!("base_ty: not a builtin: {w}"))?;
                spelling = w.to_string();
                base = Some(RawBase::Builtin(k));
            }
            Rule::enum_ty => {
                let id = first_ident(x)?;
                spelling = format!("enum {id}");
                base = Some(RawBase::Enum(id));
            }
            Rule::named_ty => {
                let id = first_ident(x)?;
                spelling = id.clone();
                base = Some(RawBase::Named(id));
            }
            other => return Err(anyhow!("type_spec: unexpected node: {:?}", other)),
        }
    }
    let base = base.ok_or_else(|| anyhow!("type_spec: missing base type"))?;
    Ok(RawType { base, pointer: false, is_const, spelling, span })
}

/// ret_type = type_spec ptr?
fn build_pointer_type(p: Pair<Rule>, file: FileId) -> Result<RawType> {
    let span = sp_of(&p, file);
    let mut ty = None;
    let mut pointer = false;
    for x in p.into_inner() {
        match x.as_rule() {
            Rule::type_spec => ty = Some(build_type_spec(x, file)?),
            Rule::ptr => pointer = true,
            other => return Err(anyhow!("type: unexpected node: {:?}", other)),
        }
    }
    let mut ty = ty.ok_or_else(|| anyhow!("type: missing type_spec"))?;
    ty.pointer = pointer;
    ty.span = span;
    Ok(ty)
}

/// param = type_spec ptr? ident
fn build_param(p: Pair<Rule>, file: FileId) -> Result<(String, RawType)> {
    let mut ty = None;
    let mut pointer = false;
    let mut name = None;
    let mut end = 0;
    for x in p.into_inner() {
        match x.as_rule() {
            Rule::type_spec => ty = Some(build_type_spec(x, file)?),
            Rule::ptr => {
                pointer = true;
                end = x.as_span().end();
            }
            Rule::ident => name = Some(x.as_str().to_string()),
            other => return Err(anyhow!("param: unexpected node: {:?}", other)),
        }
    }
    let mut ty = ty.ok_or_else(|| anyhow!("param: missing type"))?;
    if pointer {
        ty.pointer = true;
        ty.span.end = end;
    }
    Ok((name.ok_or_else(|| anyhow!("param: missing name"))?, ty))
}

/// 未写值的枚举子按 C 规则顺延（从 0 或上一个值 + 1）
fn build_enum_body(p: Pair<Rule>) -> Result<Vec<(String, i64)>> {
    let mut out = Vec::new();
    let mut next = 0i64;
    for e in p.into_inner() {
        let mut it = e.into_inner();
        let name = it.next().ok_or_else(|| anyhow!("enumerator: missing name"))?.as_str().to_string();
        let value = match it.next() {
            Some(v) => v.as_str().parse::<i64>().map_err(|_| anyhow!("invalid enum value: {}", v.as_str()))?,
            None => next,
        };
        next = value + 1;
        out.push((name, value));
    }
    Ok(out)
}
