// src/cli/colors.rs
use std::env;

/// 颜色支持检测
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSupport {
    Enabled,
    Disabled,
}

impl ColorSupport {
    /// NO_COLOR / FORCE_COLOR / TERM=dumb，其余默认开启
    pub fn detect() -> Self {
        Self::from_env(env::var("NO_COLOR").ok(), env::var("FORCE_COLOR").ok(), env::var("TERM").ok())
    }

    fn from_env(no_color: Option<String>, force: Option<String>, term: Option<String>) -> Self {
        if no_color.is_some() {
            return Self::Disabled;
        }
        if let Some(force) = force {
            return if force == "0" { Self::Disabled } else { Self::Enabled };
        }
        if term.as_deref() == Some("dumb") {
            return Self::Disabled;
        }
        Self::Enabled
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// ANSI 颜色代码
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
}
