//! Locates the configuration array inside a PHP file and splits it into
//! entries.

use crate::php::codec::unquote;
use crate::php::errors::PhpError;
use crate::php::scanner::{matching_close, tokenize, Token, TokenKind};
use crate::php::style::{line_indent, line_start, ArrayStyle, QuoteStyle};
use std::fmt;
use std::ops::Range;

/// Where the target array literal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `return [ ... ];`
    Return,
    /// `'key' => [ ... ]`
    Key(&'static str),
    /// `new ConfigAggregator([ ... ])`, matched on the class short name
    Constructor(&'static [&'static str]),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Return => write!(f, "return statement"),
            Anchor::Key(key) => write!(f, "'{key}' key"),
            Anchor::Constructor(names) => write!(f, "new {}(...)", names.join("|")),
        }
    }
}

/// Syntactic shape of one array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryExpr {
    Quoted { value: String, quote: QuoteStyle },
    /// `Name::class`
    ClassRef(String),
    /// `new Name()` or `new Name`
    Instance(String),
    /// `new Name(args...)`, kept in place but never matched against a package
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Span of the element expression, without comma
    pub expr: Range<usize>,
    /// Offset of the separating comma, if any
    pub comma: Option<usize>,
    /// Full line span (including EOL) when the element sits on its own line
    pub line: Option<Range<usize>>,
    pub indent: String,
    pub value: EntryExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLiteral {
    pub style: ArrayStyle,
    /// `[` or `array(`
    pub open: Range<usize>,
    /// `]` or `)`
    pub close: Range<usize>,
    pub entries: Vec<Entry>,
}

impl ArrayLiteral {
    pub fn body(&self) -> Range<usize> {
        self.open.end..self.close.start
    }

    /// Every entry occupies its own line(s).
    pub fn is_multiline(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|entry| entry.line.is_some())
    }

    /// Quote style of the first quoted entry, single quotes otherwise.
    pub fn quote_style(&self) -> QuoteStyle {
        self.entries
            .iter()
            .find_map(|entry| match &entry.value {
                EntryExpr::Quoted { quote, .. } => Some(*quote),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Find the first array literal matching `anchor` and split its entries.
pub fn locate(source: &str, anchor: Anchor) -> Result<ArrayLiteral, PhpError> {
    let tokens = tokenize(source)?;

    let (style, bracket_idx, literal_start) =
        find_anchor(source, &tokens, anchor).ok_or_else(|| PhpError::AnchorNotFound {
            anchor: anchor.to_string(),
        })?;
    let close_idx = matching_close(&tokens, bracket_idx)?;

    let inner = &tokens[bracket_idx + 1..close_idx];
    let mut entries = Vec::new();
    let mut depth = 0i32;
    let mut element_start = 0;

    for (idx, token) in inner.iter().enumerate() {
        match token.kind {
            TokenKind::Open(_) => depth += 1,
            TokenKind::Close(_) => depth -= 1,
            TokenKind::Comma if depth == 0 => {
                entries.push(element(
                    source,
                    &inner[element_start..idx],
                    Some(token.start),
                )?);
                element_start = idx + 1;
            }
            _ => {}
        }
    }
    if element_start < inner.len() {
        entries.push(element(source, &inner[element_start..], None)?);
    }

    Ok(ArrayLiteral {
        style,
        open: literal_start..tokens[bracket_idx].end,
        close: tokens[close_idx].start..tokens[close_idx].end,
        entries,
    })
}

fn find_anchor(source: &str, tokens: &[Token], anchor: Anchor) -> Option<(ArrayStyle, usize, usize)> {
    (0..tokens.len()).find_map(|idx| {
        let token = &tokens[idx];
        match anchor {
            Anchor::Return if token.is_word(source, "return") => {
                array_open_at(source, tokens, idx + 1)
            }
            Anchor::Key(key) if token.kind == TokenKind::Str => {
                let (value, _) = unquote(token.text(source))?;
                let arrow = tokens.get(idx + 1)?;
                if value == key && arrow.kind == TokenKind::Arrow {
                    array_open_at(source, tokens, idx + 2)
                } else {
                    None
                }
            }
            Anchor::Constructor(names) if token.is_word(source, "new") => {
                let class = tokens.get(idx + 1)?;
                let paren = tokens.get(idx + 2)?;
                let short_name = class.text(source).rsplit('\\').next().unwrap_or_default();
                if class.kind == TokenKind::Word
                    && names.contains(&short_name)
                    && paren.kind == TokenKind::Open(b'(')
                {
                    array_open_at(source, tokens, idx + 3)
                } else {
                    None
                }
            }
            _ => None,
        }
    })
}

fn array_open_at(source: &str, tokens: &[Token], idx: usize) -> Option<(ArrayStyle, usize, usize)> {
    let token = tokens.get(idx)?;
    if token.kind == TokenKind::Open(b'[') {
        return Some((ArrayStyle::Short, idx, token.start));
    }
    if token.is_word(source, "array") && tokens.get(idx + 1)?.kind == TokenKind::Open(b'(') {
        return Some((ArrayStyle::Long, idx + 1, token.start));
    }
    None
}

fn element(source: &str, tokens: &[Token], comma: Option<usize>) -> Result<Entry, PhpError> {
    let (first, last) = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(PhpError::EmptyElement {
                offset: comma.unwrap_or_default(),
            })
        }
    };

    let expr = first.start..last.end;
    let value = classify(source, tokens)?;
    let line = own_line(source, &expr, comma);
    let indent = match &line {
        Some(range) => source[range.start..expr.start].to_string(),
        None => line_indent(source, expr.start).to_string(),
    };

    Ok(Entry {
        expr,
        comma,
        line,
        indent,
        value,
    })
}

/// Classify the tokens of a single element expression.
pub(crate) fn classify(source: &str, tokens: &[Token]) -> Result<EntryExpr, PhpError> {
    let unrecognized = || {
        let start = tokens.first().map_or(0, |t| t.start);
        let end = tokens.last().map_or(start, |t| t.end);
        PhpError::UnrecognizedEntry {
            offset: start,
            text: source[start..end].to_string(),
        }
    };

    match tokens {
        [single] if single.kind == TokenKind::Str => {
            let (value, quote) = unquote(single.text(source)).ok_or_else(unrecognized)?;
            Ok(EntryExpr::Quoted { value, quote })
        }
        [name, colons, class]
            if name.kind == TokenKind::Word
                && colons.kind == TokenKind::DoubleColon
                && class.is_word(source, "class") =>
        {
            Ok(EntryExpr::ClassRef(name.text(source).to_string()))
        }
        [new, name] if new.is_word(source, "new") && name.kind == TokenKind::Word => {
            Ok(EntryExpr::Instance(name.text(source).to_string()))
        }
        [new, name, open, rest @ ..]
            if new.is_word(source, "new")
                && name.kind == TokenKind::Word
                && open.kind == TokenKind::Open(b'(') =>
        {
            // The constructor call must span the whole element.
            if matching_close(tokens, 2)? != tokens.len() - 1 {
                return Err(unrecognized());
            }
            if rest.len() == 1 {
                Ok(EntryExpr::Instance(name.text(source).to_string()))
            } else {
                Ok(EntryExpr::Opaque)
            }
        }
        _ => Err(unrecognized()),
    }
}

fn own_line(source: &str, expr: &Range<usize>, comma: Option<usize>) -> Option<Range<usize>> {
    let start = line_start(source, expr.start);
    if !source[start..expr.start]
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
    {
        return None;
    }

    let tail_start = comma.map_or(expr.end, |offset| offset + 1);
    let newline = tail_start + source[tail_start..].find('\n')?;
    let rest = source[tail_start..newline].trim();
    if rest.is_empty() || rest.starts_with("//") || rest.starts_with('#') {
        Some(start..newline + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_short_return_array() {
        let source = "<?php\nreturn [\n    'Application',\n    'Foo\\Bar',\n];";
        let literal = locate(source, Anchor::Return).unwrap();
        assert_eq!(literal.style, ArrayStyle::Short);
        assert_eq!(literal.entries.len(), 2);
        assert!(literal.is_multiline());
        assert_eq!(literal.entries[0].indent, "    ");
        assert_eq!(
            literal.entries[1].value,
            EntryExpr::Quoted {
                value: "Foo\\Bar".to_string(),
                quote: QuoteStyle::Single
            }
        );
        assert_eq!(&source[literal.open.clone()], "[");
        assert_eq!(&source[literal.close.clone()], "]");
    }

    #[test]
    fn test_locate_long_return_array() {
        let source = "<?php\nreturn array(\n    'Application',\n);";
        let literal = locate(source, Anchor::Return).unwrap();
        assert_eq!(literal.style, ArrayStyle::Long);
        assert_eq!(&source[literal.open.clone()], "array(");
        assert_eq!(&source[literal.close.clone()], ")");
        assert_eq!(literal.entries.len(), 1);
    }

    #[test]
    fn test_locate_empty_literal() {
        let literal = locate("return [];", Anchor::Return).unwrap();
        assert!(literal.entries.is_empty());
        assert!(!literal.is_multiline());
        assert_eq!(literal.body(), 8..8);
    }

    #[test]
    fn test_locate_keyed_modules_array() {
        let source = "<?php\nreturn [\n    'modules' => [\n        'Application',\n    ],\n    'module_listener_options' => [],\n];";
        let literal = locate(source, Anchor::Key("modules")).unwrap();
        assert_eq!(literal.entries.len(), 1);
        assert_eq!(literal.entries[0].indent, "        ");
    }

    #[test]
    fn test_locate_constructor_array() {
        let source = "<?php\n$aggregator = new ConfigAggregator([\n    \\Laminas\\Db\\ConfigProvider::class,\n    new PhpFileProvider('config/autoload/*.php'),\n], $cachedConfigFile);";
        let literal = locate(source, Anchor::Constructor(&["ConfigAggregator"])).unwrap();
        assert_eq!(literal.entries.len(), 2);
        assert_eq!(
            literal.entries[0].value,
            EntryExpr::ClassRef("\\Laminas\\Db\\ConfigProvider".to_string())
        );
        assert_eq!(literal.entries[1].value, EntryExpr::Opaque);
    }

    #[test]
    fn test_locate_ignores_commented_entries() {
        let source = "return [\n    // 'Disabled',\n\n    'Enabled', // trailing note\n];";
        let literal = locate(source, Anchor::Return).unwrap();
        assert_eq!(literal.entries.len(), 1);
        let line = literal.entries[0].line.clone().unwrap();
        assert_eq!(&source[line], "    'Enabled', // trailing note\n");
    }

    #[test]
    fn test_locate_inline_array() {
        let literal = locate("return ['A', 'B'];", Anchor::Return).unwrap();
        assert_eq!(literal.entries.len(), 2);
        assert!(literal.entries.iter().all(|entry| entry.line.is_none()));
        assert!(!literal.is_multiline());
        assert!(literal.entries[1].comma.is_none());
    }

    #[test]
    fn test_locate_missing_anchor() {
        let result = locate("<?php\n$config = [];", Anchor::Return);
        assert!(matches!(result, Err(PhpError::AnchorNotFound { .. })));
    }

    #[test]
    fn test_locate_unrecognized_entry() {
        let result = locate("return [\n    include 'other.php',\n];", Anchor::Return);
        assert!(matches!(result, Err(PhpError::UnrecognizedEntry { .. })));

        let result = locate("return [\n    ...$modules,\n];", Anchor::Return);
        assert!(matches!(result, Err(PhpError::UnrecognizedEntry { .. })));
    }

    #[test]
    fn test_locate_unbalanced() {
        let result = locate("return [\n    'A',\n", Anchor::Return);
        assert!(matches!(result, Err(PhpError::UnbalancedBrackets { .. })));
    }

    #[test]
    fn test_locate_double_comma() {
        let result = locate("return ['A',, 'B'];", Anchor::Return);
        assert!(matches!(result, Err(PhpError::EmptyElement { .. })));
    }
}
