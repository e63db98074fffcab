//! 源位置信息（供 ariadne/DiagSink 与出处注释使用）

use std::fmt;
use std::ops::Range;

/// 逻辑文件 ID（与 SourceMap / ariadne 的文件缓存一一对应）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

impl FileId {
    pub const DUMMY: FileId = FileId(usize::MAX);
}

/// 半开区间 [start, end)，单位为字节偏移
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const DUMMY: Span = Span { file: FileId::DUMMY, start: 0, end: 0 };

    #[inline]
    pub fn range(&self) -> Range<usize> { self.start..self.end }
}

/// 人类可读的位置：`cblas.h:42:6`（行列均从 1 开始）
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}
