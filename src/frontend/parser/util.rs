#[inline]
fn sp_of(rule: &Pair<Rule>, file: FileId) -> Span {
    let s = rule.as_span();
    Span { file, start: s.start(), end: s.end() }
}

#[inline]
fn pos_of(rule: &Pair<Rule>, file_name: &str) -> Position {
    let (line, col) = rule.as_span().start_pos().line_col();
    Position { file: file_name.to_string(), line, col }
}

fn first_ident(p: Pair<Rule>) -> Result<String> {
    p.into_inner()
        .find(|x| x.as_rule() == Rule::ident)
        .map(|x| x.as_str().to_string())
        .ok_or_else(|| anyhow!("expected identifier"))
}

/// pest 错误位置 -> 非空 Span（ariadne 需要至少一个字符宽）
fn pest_error_span(e: &pest::error::Error<Rule>, file: FileId, len: usize) -> Span {
    let (start, end) = match e.location {
        pest::error::InputLocation::Pos(p) => (p, p + 1),
        pest::error::InputLocation::Span((s, t)) => (s, t.max(s + 1)),
    };
    let start = start.min(len);
    Span { file, start, end: end.min(len).max(start) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (GenResult<Header>, DiagSink) {
        let mut d = DiagSink::new();
        let r = parse_header(src, FileId(0), "cblas.h", "cblas_", &mut d);
        (r, d)
    }

    const MINI: &str = r#"
#ifndef CBLAS_H
#define CBLAS_H
#include <stddef.h>

#ifdef __cplusplus
extern "C" {
#endif

/*
 * Enumerated and derived types
 */
#define CBLAS_INDEX size_t  /* this may vary between platforms */

typedef enum CBLAS_LAYOUT {CblasRowMajor=101, CblasColMajor=102} CBLAS_LAYOUT;
typedef enum CBLAS_TRANSPOSE {CblasNoTrans=111, CblasTrans=112, CblasConjTrans=113} CBLAS_TRANSPOSE;
enum CBLAS_PLAIN {PlainA, PlainB = 7, PlainC};
#define CBLAS_ORDER CBLAS_LAYOUT /* backward compatibility */

float  cblas_sasum(const int N, const float *X, const int incX);
CBLAS_INDEX cblas_icamax(const int N, const void *X, const int incX);
void cblas_sgemv(const CBLAS_LAYOUT layout,
                 const CBLAS_TRANSPOSE TransA, const int M, const int N,
                 const float alpha, const float *A, const int lda,
                 const float *X, const int incX, const float beta,
                 float *Y, const int incY);
void cblas_xerbla(int p, const char *rout, const char *form, ...);
void cblas_none(void);

#ifdef __cplusplus
}
#endif
#endif
"#;

    #[test]
    fn parses_enums_aliases_and_prototypes_in_order() {
        let (r, d) = parse(MINI);
        let h = r.unwrap_or_else(|e| panic!("{e}: {:?}", d.iter().collect::<Vec<_>>()));
        assert_eq!(h.enums.len(), 3);
        assert_eq!(h.enum_def("CBLAS_LAYOUT").unwrap().variants[0], ("CblasRowMajor".to_string(), 101));
        assert_eq!(
            h.enum_def("CBLAS_PLAIN").unwrap().variants,
            vec![("PlainA".to_string(), 0), ("PlainB".to_string(), 7), ("PlainC".to_string(), 8)]
        );
        assert!(h.aliases.contains(&Alias { name: "CBLAS_ORDER".into(), target: "CBLAS_LAYOUT".into() }));
        assert!(h.aliases.contains(&Alias { name: "CBLAS_INDEX".into(), target: "size_t".into() }));

        let names: Vec<_> = h.decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["cblas_sasum", "cblas_icamax", "cblas_sgemv", "cblas_xerbla", "cblas_none"]);

        let gemv = &h.decls[2];
        assert_eq!(gemv.params.len(), 12);
        assert_eq!(gemv.params[0].ty.kind, ScalarKind::Enum("CBLAS_LAYOUT".into()));
        assert_eq!(gemv.params[1].name, "TransA");
        assert!(gemv.params[5].ty.pointer && gemv.params[5].ty.is_const);
        assert!(gemv.params[10].ty.pointer && !gemv.params[10].ty.is_const);
        assert_eq!(gemv.pos.line, 22);
        assert!(gemv.ret.is_void());
    }

    #[test]
    fn index_alias_and_complex_tag_are_resolved() {
        let (r, _) = parse(MINI);
        let h = r.unwrap();
        let icamax = &h.decls[1];
        assert_eq!(icamax.ret.kind, ScalarKind::Index);
        assert_eq!(icamax.ret.spelling, "CBLAS_INDEX");
        assert!(icamax.params[1].ty.is_void_ptr());
        assert_eq!(icamax.complex, Some(ComplexWidth::C64));
        assert_eq!(h.decls[0].complex, None);
        assert!(h.decls[3].variadic);
        assert!(h.decls[4].params.is_empty());
    }

    #[test]
    fn cplusplus_guard_around_prototypes_is_transparent() {
        let src = "#ifdef __cplusplus\nextern \"C\" {\n#endif\n\
                   void cblas_sscal(const int N, const float alpha, float *X, const int incX);\n\
                   #ifdef __cplusplus\n}\n#endif\n";
        let (r, d) = parse(src);
        let h = r.unwrap_or_else(|e| panic!("{e}: {:?}", d.iter().collect::<Vec<_>>()));
        assert!(d.is_empty());
        assert_eq!(h.decls.len(), 1);
        assert_eq!(h.decls[0].name, "cblas_sscal");
        assert_eq!(h.decls[0].pos.line, 4);
    }

    #[test]
    fn extern_storage_class_on_a_prototype_is_accepted() {
        let (r, _) = parse("extern double cblas_dnrm2(const int N, const double *X, const int incX);\n");
        let h = r.unwrap();
        assert_eq!(h.decls[0].ret.kind, ScalarKind::Double);
        assert_eq!(h.decls[0].params.len(), 3);
    }

    #[test]
    fn syntax_error_is_reported_with_a_span() {
        let (r, d) = parse("void cblas_broken(const int N\n");
        assert!(matches!(r, Err(GenError::Parse { count: 1, .. })));
        let diag = d.iter().next().unwrap();
        assert_eq!(diag.code, "P0001");
        assert!(diag.span.is_some());
    }

    #[test]
    fn unknown_type_and_duplicates_are_errors() {
        let src = "void cblas_a(const blasint N);\nvoid cblas_b(void);\nvoid cblas_b(void);\n";
        let (r, d) = parse(src);
        assert!(matches!(r, Err(GenError::Parse { count: 2, .. })));
        let codes: Vec<_> = d.iter().map(|x| x.code.as_str()).collect();
        assert_eq!(codes, ["P0002", "P0003"]);
    }

    #[test]
    fn last_define_wins_with_a_warning() {
        let src = "#define CBLAS_INDEX long\n#define CBLAS_INDEX int\nCBLAS_INDEX cblas_isamax(const int N, const float *X, const int incX);\n";
        let (r, d) = parse(src);
        let h = r.unwrap();
        assert_eq!(h.decls[0].ret.kind, ScalarKind::Int);
        assert_eq!(d.iter().next().unwrap().code, "P0101");
    }
}
