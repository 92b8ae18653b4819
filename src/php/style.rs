//! Formatting conventions detected from an existing config file.

use std::fmt;

/// `[ ... ]` or `array( ... )`.
///
/// Detected from the located literal and reused for every edit of that file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStyle {
    Short,
    Long,
}

impl ArrayStyle {
    pub fn open(self) -> &'static str {
        match self {
            ArrayStyle::Short => "[",
            ArrayStyle::Long => "array(",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            ArrayStyle::Short => "]",
            ArrayStyle::Long => ")",
        }
    }
}

impl fmt::Display for ArrayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayStyle::Short => write!(f, "short array"),
            ArrayStyle::Long => write!(f, "long array"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    #[default]
    Single,
    Double,
}

impl QuoteStyle {
    pub fn from_delimiter(delimiter: u8) -> Self {
        if delimiter == b'"' {
            QuoteStyle::Double
        } else {
            QuoteStyle::Single
        }
    }
}

/// Start offset of the line containing `offset`.
pub fn line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(content: &str, offset: usize) -> &str {
    let start = line_start(content, offset);
    let line = &content[start..];
    let width = line
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &line[..width]
}

/// One extra indentation level below `base`, tab-indented files get a tab.
pub fn nested_indent(base: &str) -> String {
    if base.starts_with('\t') {
        format!("{base}\t")
    } else {
        format!("{base}    ")
    }
}
