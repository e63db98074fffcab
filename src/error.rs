//! 生成期错误：全部致命，出现即中止整次运行，不落盘任何半成品

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum GenError {
    #[error("{file}: {count} error(s) while reading declarations")]
    Parse { file: String, count: usize },

    #[error("`{name}`: {reason}")]
    Unsupported { name: String, reason: String },

    #[error("docs: {0}")]
    Docs(String),

    #[error("config `{}`: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("formatter `{command}` failed: {reason}")]
    Format { command: String, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type GenResult<T> = Result<T, GenError>;

impl GenError {
    pub fn unsupported(name: &str, reason: impl Into<String>) -> Self {
        GenError::Unsupported { name: name.to_string(), reason: reason.into() }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        GenError::Io { path: path.to_path_buf(), source }
    }
}
