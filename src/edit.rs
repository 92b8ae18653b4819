use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A verified byte-span replacement in a configuration file.
///
/// Every injection and removal is planned as exactly one `Edit`. The planner
/// records what it expects to find in `[byte_start, byte_end)`; applying the
/// edit refuses to write if the file changed underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply() or apply_to() is called"]
pub struct Edit {
    /// Config file the edit targets
    pub file: PathBuf,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// Replacement text for [byte_start, byte_end)
    pub new_text: String,
    /// What the span must contain before the edit is applied
    pub expected_before: EditVerification,
}

/// Verification strategy for the replaced span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (used for large spans)
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("config file changed since it was read: {file}:{byte_start}")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in content of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("byte range [{byte_start}, {byte_end}) does not fall on character boundaries")]
    NotCharBoundary { byte_start: usize, byte_end: usize },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 validation error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result of writing an edit to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The span already holds `new_text`
    AlreadyApplied { file: PathBuf },
}

impl Edit {
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Pure insertion at `offset`.
    pub fn insert(file: impl Into<PathBuf>, offset: usize, text: impl Into<String>) -> Self {
        Self::new(file, offset, offset, text, "")
    }

    /// Pure deletion of `[byte_start, byte_end)` from `content`.
    pub fn delete(file: impl Into<PathBuf>, content: &str, byte_start: usize, byte_end: usize) -> Self {
        let expected = content.get(byte_start..byte_end).unwrap_or_default();
        Self::new(file, byte_start, byte_end, String::new(), expected)
    }

    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }

        let current = content
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::NotCharBoundary {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
            })?;

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: format!("{:?}", self.expected_before),
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to in-memory content, returning the new content.
    pub fn apply_to(&self, content: &str) -> Result<String, EditError> {
        self.validate(content)?;

        let mut updated = String::with_capacity(
            content.len() + self.new_text.len() - (self.byte_end - self.byte_start),
        );
        updated.push_str(&content[..self.byte_start]);
        updated.push_str(&self.new_text);
        updated.push_str(&content[self.byte_end..]);
        Ok(updated)
    }

    /// Apply this edit to the file system atomically.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let original = String::from_utf8(fs::read(&self.file)?)?;

        if let Some(current) = original.get(self.byte_start..self.byte_end) {
            if current == self.new_text && !self.expected_before.matches(current) {
                return Ok(EditResult::AlreadyApplied {
                    file: self.file.clone(),
                });
            }
        }

        let updated = self.apply_to(&original)?;
        atomic_write(&self.file, updated.as_bytes())?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_changed: self.new_text.len().max(self.byte_end - self.byte_start),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename, then bump mtime so opcode
/// caches that validate timestamps pick up the new contents.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    filetime::set_file_mtime(path, filetime::FileTime::now())?;
    Ok(())
}
