//! Rendering package identifiers as array elements and reading them back.

use crate::php::errors::PhpError;
use crate::php::matcher::{classify, EntryExpr};
use crate::php::scanner::{tokenize, TokenKind};
use crate::php::style::QuoteStyle;

const CONFIG_PROVIDER_SUFFIX: &str = "\\ConfigProvider";
const MODULE_SUFFIX: &str = "\\Module";

/// How a package is written into a particular config array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    /// `'Foo\Bar',` as used by module lists
    ModuleName,
    /// `\Foo\Bar\ConfigProvider::class,` as used by config aggregators
    ConfigProviderClass,
}

impl EntryFormat {
    /// Canonical identifier used for equality checks.
    ///
    /// Leading namespace separators are dropped; config provider identifiers
    /// also lose their `\ConfigProvider` suffix so `Foo\Bar` and
    /// `Foo\Bar\ConfigProvider` name the same package.
    pub fn normalize(self, package: &str) -> String {
        let name = package.trim().trim_start_matches('\\');
        match self {
            EntryFormat::ModuleName => name.to_string(),
            EntryFormat::ConfigProviderClass => name
                .strip_suffix(CONFIG_PROVIDER_SUFFIX)
                .unwrap_or(name)
                .to_string(),
        }
    }

    /// Element expression for `package`, without indentation or comma.
    pub fn render(self, package: &str, quote: QuoteStyle) -> String {
        let name = self.normalize(package);
        match self {
            EntryFormat::ModuleName => quote_string(&name, quote),
            EntryFormat::ConfigProviderClass => {
                format!("\\{name}{CONFIG_PROVIDER_SUFFIX}::class")
            }
        }
    }

    /// Package identifier registered by an existing element, if any.
    pub fn identifier(self, expr: &EntryExpr) -> Option<String> {
        match (self, expr) {
            (_, EntryExpr::Opaque) => None,
            (_, EntryExpr::Quoted { value, .. }) => Some(self.normalize(value)),
            (EntryFormat::ModuleName, EntryExpr::ClassRef(name) | EntryExpr::Instance(name)) => {
                let name = name.trim_start_matches('\\');
                Some(name.strip_suffix(MODULE_SUFFIX).unwrap_or(name).to_string())
            }
            (
                EntryFormat::ConfigProviderClass,
                EntryExpr::ClassRef(name) | EntryExpr::Instance(name),
            ) => Some(self.normalize(name)),
        }
    }

    /// Parse a single element as written in a config file (trailing comma
    /// allowed) back into the package it registers.
    pub fn parse(self, text: &str) -> Result<Option<String>, PhpError> {
        let mut tokens = tokenize(text)?;
        if tokens.last().is_some_and(|t| t.kind == TokenKind::Comma) {
            tokens.pop();
        }
        if tokens.is_empty() {
            return Err(PhpError::EmptyElement { offset: 0 });
        }
        let expr = classify(text, &tokens)?;
        Ok(self.identifier(&expr))
    }
}

/// Decode a PHP string literal, returning its value and delimiter style.
pub fn unquote(literal: &str) -> Option<(String, QuoteStyle)> {
    let delimiter = *literal.as_bytes().first()?;
    if !(delimiter == b'\'' || delimiter == b'"')
        || literal.len() < 2
        || !literal.ends_with(delimiter as char)
    {
        return None;
    }

    let inner = &literal[1..literal.len() - 1];
    let quote = QuoteStyle::from_delimiter(delimiter);
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            value.push('\\');
            break;
        };
        let decoded = match (quote, next) {
            (_, '\\') => Some('\\'),
            (QuoteStyle::Single, '\'') => Some('\''),
            (QuoteStyle::Double, '"') => Some('"'),
            (QuoteStyle::Double, '$') => Some('$'),
            (QuoteStyle::Double, 'n') => Some('\n'),
            (QuoteStyle::Double, 't') => Some('\t'),
            (QuoteStyle::Double, 'r') => Some('\r'),
            (QuoteStyle::Double, 'v') => Some('\u{0b}'),
            (QuoteStyle::Double, 'e') => Some('\u{1b}'),
            (QuoteStyle::Double, 'f') => Some('\u{0c}'),
            _ => None,
        };
        match decoded {
            Some(c) => value.push(c),
            None => {
                value.push('\\');
                value.push(next);
            }
        }
    }

    Some((value, quote))
}

fn quote_string(value: &str, quote: QuoteStyle) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    match quote {
        QuoteStyle::Single => {
            out.push('\'');
            let mut chars = value.chars().peekable();
            while let Some(ch) = chars.next() {
                match ch {
                    '\'' => out.push_str("\\'"),
                    '\\' if matches!(chars.peek(), None | Some('\\') | Some('\'')) => {
                        out.push_str("\\\\")
                    }
                    other => out.push(other),
                }
            }
            out.push('\'');
        }
        QuoteStyle::Double => {
            out.push('"');
            for ch in value.chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '$' => out.push_str("\\$"),
                    other => out.push(other),
                }
            }
            out.push('"');
        }
    }
    out
}
