// src/cli/output.rs
use std::path::Path;

use crate::cli::colors::{ColorSupport, ansi};

/// 面向用户的状态行；诊断日志另走 tracing
pub struct OutputFormatter {
    color_support: ColorSupport,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self { color_support: ColorSupport::detect() }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color_support.is_enabled() {
            format!("{color}{text}{}", ansi::RESET)
        } else {
            text.to_string()
        }
    }

    /// `generate rust  cblas.h -> blas.rs  (142 fns, 0.08s, 96.3 KB)`
    pub fn success(&self, target: &str, header: &Path, output: &Path, emitted: usize, duration: f64, size: &str) {
        let header_rel = header.file_name().unwrap_or(header.as_os_str()).to_string_lossy();
        let output_rel = output.file_name().unwrap_or(output.as_os_str()).to_string_lossy();
        let line = format!("generate {target}  {header_rel} -> {output_rel}  ({emitted} fns, {duration:.2}s, {size})");
        println!("{}", self.paint(ansi::GREEN, &line));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.paint(ansi::RED, message));
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.paint(ansi::YELLOW, message));
    }

    pub fn info(&self, message: &str) {
        eprintln!("{}", self.paint(ansi::BLUE, message));
    }

    /// 次要信息（`list` 里被跳过的声明）
    pub fn dim(&self, message: &str) -> String {
        self.paint(ansi::DIM, message)
    }

    pub fn human_size(bytes: u64) -> String {
        if bytes >= 1_048_576 {
            format!("{:.1} MB", bytes as f64 / 1_048_576.0)
        } else if bytes >= 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{bytes} B")
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}
