//! Minimal PHP tokenizer.
//!
//! Only what the array matcher needs: words (including namespace
//! separators), variables, quoted strings, brackets, commas, `=>`, `::`
//! and `...`. Whitespace and comments are skipped; everything else becomes
//! a single-byte `Other` token.

use crate::php::errors::PhpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or qualified name, e.g. `return`, `\Foo\Bar`
    Word,
    /// `$name`
    Variable,
    /// Single or double quoted string literal
    Str,
    Open(u8),
    Close(u8),
    Comma,
    /// `=>`
    Arrow,
    /// `::`
    DoubleColon,
    /// `...`
    Ellipsis,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn is_word(&self, source: &str, word: &str) -> bool {
        self.kind == TokenKind::Word && self.text(source).eq_ignore_ascii_case(word)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'\\' || b >= 0x80
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, PhpError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        let start = pos;

        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = skip_line_comment(bytes, pos);
                continue;
            }
            b'#' => {
                pos = skip_line_comment(bytes, pos);
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_block_comment(bytes, pos)?;
                continue;
            }
            b'\'' | b'"' => {
                pos = skip_string(bytes, pos)?;
                tokens.push(Token {
                    kind: TokenKind::Str,
                    start,
                    end: pos,
                });
                continue;
            }
            b'(' | b'[' | b'{' => {
                pos += 1;
                tokens.push(Token {
                    kind: TokenKind::Open(b),
                    start,
                    end: pos,
                });
                continue;
            }
            b')' | b']' | b'}' => {
                pos += 1;
                tokens.push(Token {
                    kind: TokenKind::Close(b),
                    start,
                    end: pos,
                });
                continue;
            }
            b',' => {
                pos += 1;
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    start,
                    end: pos,
                });
                continue;
            }
            _ => {}
        }

        let kind = if b == b'=' && bytes.get(pos + 1) == Some(&b'>') {
            pos += 2;
            TokenKind::Arrow
        } else if b == b':' && bytes.get(pos + 1) == Some(&b':') {
            pos += 2;
            TokenKind::DoubleColon
        } else if bytes[pos..].starts_with(b"...") {
            pos += 3;
            TokenKind::Ellipsis
        } else if b == b'$' && bytes.get(pos + 1).copied().is_some_and(is_word_byte) {
            pos += 1;
            while pos < bytes.len() && is_word_byte(bytes[pos]) {
                pos += 1;
            }
            TokenKind::Variable
        } else if is_word_byte(b) {
            while pos < bytes.len() && is_word_byte(bytes[pos]) {
                pos += 1;
            }
            TokenKind::Word
        } else {
            // Advance a whole UTF-8 character so token ends stay on boundaries.
            pos += source[pos..].chars().next().map_or(1, char::len_utf8);
            TokenKind::Other(b)
        };

        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }

    Ok(tokens)
}

fn skip_line_comment(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos] != b'\n' {
        pos += 1;
    }
    pos
}

fn skip_block_comment(bytes: &[u8], start: usize) -> Result<usize, PhpError> {
    let mut pos = start + 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
            return Ok(pos + 2);
        }
        pos += 1;
    }
    Err(PhpError::Unterminated {
        offset: start,
        what: "block comment",
    })
}

fn skip_string(bytes: &[u8], start: usize) -> Result<usize, PhpError> {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b if b == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(PhpError::Unterminated {
        offset: start,
        what: "string literal",
    })
}

/// Index of the token closing the bracket opened at `open_idx`.
///
/// Every bracket kind is tracked on one stack so that `[` inside `(`
/// cannot close the outer literal early.
pub fn matching_close(tokens: &[Token], open_idx: usize) -> Result<usize, PhpError> {
    let mut stack: Vec<u8> = Vec::new();

    for (idx, token) in tokens.iter().enumerate().skip(open_idx) {
        match token.kind {
            TokenKind::Open(b) => stack.push(b),
            TokenKind::Close(b) => {
                let expected = match stack.pop() {
                    Some(b'(') => b')',
                    Some(b'[') => b']',
                    Some(_) => b'}',
                    None => {
                        return Err(PhpError::UnbalancedBrackets {
                            offset: token.start,
                        })
                    }
                };
                if b != expected {
                    return Err(PhpError::UnbalancedBrackets {
                        offset: token.start,
                    });
                }
                if stack.is_empty() {
                    return Ok(idx);
                }
            }
            _ => {}
        }
    }

    Err(PhpError::UnbalancedBrackets {
        offset: tokens.get(open_idx).map_or(0, |t| t.start),
    })
}
