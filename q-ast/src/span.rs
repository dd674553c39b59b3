//! Source span tracking so diagnostics can point back at the offending node

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    pub fn new(id: u32) -> Self {
        FileId(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file:{}", self.0)
    }
}

/// Byte offset in a source file (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ByteOffset(pub u32);

impl ByteOffset {
    pub fn new(offset: u32) -> Self {
        ByteOffset(offset)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn advance(self, by: u32) -> Self {
        ByteOffset(self.0 + by)
    }
}

/// Span in a source file (inclusive start, exclusive end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub file_id: FileId,
    pub start: ByteOffset,
    pub end: ByteOffset,
}

impl Span {
    pub fn new(file_id: FileId, start: ByteOffset, end: ByteOffset) -> Self {
        Span { file_id, start, end }
    }

    pub fn len(self) -> u32 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    /// Combine two spans into a span that covers both
    pub fn merge(self, other: Span) -> Span {
        Span {
            file_id: self.file_id,
            start: ByteOffset(self.start.0.min(other.start.0)),
            end: ByteOffset(self.end.0.max(other.end.0)),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.file_id, self.start.0, self.end.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let file = FileId::new(3);
        let a = Span::new(file, ByteOffset::new(4), ByteOffset::new(9));
        let b = Span::new(file, ByteOffset::new(1), ByteOffset::new(6));

        let merged = a.merge(b);
        assert_eq!(merged.start, ByteOffset::new(1));
        assert_eq!(merged.end, ByteOffset::new(9));
        assert_eq!(merged.len(), 8);
        assert_eq!(merged.to_string(), "file:3:1..9");
    }

    #[test]
    fn test_default_span_is_empty() {
        assert!(Span::default().is_empty());
    }
}
