//! 原子落盘：先写同目录临时文件，成功后改名覆盖；中途失败不留半成品

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{GenError, GenResult};

pub fn write_atomic(path: &Path, text: &str) -> GenResult<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GenError::io(dir, e))?;
    tmp.write_all(text.as_bytes()).map_err(|e| GenError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| GenError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| GenError::io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "written");
    Ok(())
}
