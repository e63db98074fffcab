use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};

pub use crate::frontend::span::{FileId, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: String,
    pub file_id: String,       // 用于显示的“逻辑文件名/路径”字符串
    pub span: Option<Span>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Default, Clone)]
pub struct DiagSink {
    buf: Vec<Diagnostic>,
}

impl DiagSink {
    #[inline]
    pub fn new() -> Self { Self { buf: Vec::new() } }

    fn push<S: Into<String>>(&mut self, severity: Severity, code: &str, file_id: &str, span: Option<Span>, msg: S) {
        self.buf.push(Diagnostic {
            code: code.to_string(),
            file_id: file_id.to_string(),
            span,
            message: msg.into(),
            severity,
        });
    }

    pub fn error<S: Into<String>>(&mut self, code: &str, file_id: &str, span: Option<Span>, msg: S) {
        self.push(Severity::Error, code, file_id, span, msg);
    }

    pub fn warn<S: Into<String>>(&mut self, code: &str, file_id: &str, span: Option<Span>, msg: S) {
        self.push(Severity::Warning, code, file_id, span, msg);
    }

    #[inline] pub fn is_empty(&self) -> bool { self.buf.is_empty() }
    #[inline] pub fn len(&self) -> usize { self.buf.len() }
    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> { self.buf.iter() }
    #[inline] pub fn into_vec(self) -> Vec<Diagnostic> { self.buf }

    pub fn has_errors(&self) -> bool {
        self.buf.iter().any(|d| d.severity == Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if let Some(sp) = self.span {
            write!(f, "[{} {}] {} @{}..{}: {}", sev, self.code, self.file_id, sp.start, sp.end, self.message)
        } else {
            write!(f, "[{} {}] {}: {}", sev, self.code, self.file_id, self.message)
        }
    }
}

/* ================================
 * SourceMap：FileId -> (名字, 源码)
 * ================================ */

#[derive(Default)]
pub struct SourceMap {
    files: Vec<(String, String)>,
}

impl SourceMap {
    pub fn new() -> Self { Self::default() }

    pub fn add_file(&mut self, name: String, src: String) -> FileId {
        self.files.push((name, src));
        FileId(self.files.len() - 1)
    }

    pub fn name(&self, id: FileId) -> Option<&str> {
        self.files.get(id.0).map(|(n, _)| n.as_str())
    }

    pub fn source(&self, id: FileId) -> Option<&str> {
        self.files.get(id.0).map(|(_, s)| s.as_str())
    }
}

/// 用 ariadne 打印诊断；没有 span 或文件未注册的退化为单行输出
pub fn render_diagnostics_colored(diags: &[Diagnostic], sm: &SourceMap) {
    for d in diags {
        let Some(sp) = d.span else {
            eprintln!("{d}");
            continue;
        };
        let Some(src) = sm.source(sp.file) else {
            eprintln!("{d}");
            continue;
        };
        let name = sm.name(sp.file).unwrap_or(&d.file_id).to_string();
        let (kind, color) = match d.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let report = Report::build(kind, (name.clone(), sp.range()))
            .with_code(&d.code)
            .with_message(&d.message)
            .with_label(Label::new((name.clone(), sp.range())).with_message(&d.message).with_color(color))
            .finish();
        if report.eprint((name, Source::from(src))).is_err() {
            eprintln!("{d}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_tracks_errors_separately_from_warnings() {
        let mut d = DiagSink::new();
        d.warn("D0001", "blas.rs", None, "no docs for `sgemm`");
        assert!(!d.has_errors());
        d.error("P0001", "cblas.h", Some(Span { file: FileId(0), start: 3, end: 7 }), "expected `;`");
        assert!(d.has_errors());
        assert_eq!(d.len(), 2);
        let shown = d.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(shown[1], "[error P0001] cblas.h @3..7: expected `;`");
    }

    #[test]
    fn source_map_hands_out_sequential_ids() {
        let mut sm = SourceMap::new();
        let a = sm.add_file("a.h".into(), "int a;".into());
        let b = sm.add_file("b.h".into(), "int b;".into());
        assert_eq!((a, b), (FileId(0), FileId(1)));
        assert_eq!(sm.source(b), Some("int b;"));
        assert_eq!(sm.name(a), Some("a.h"));
        assert_eq!(sm.name(FileId(2)), None);
    }
}
