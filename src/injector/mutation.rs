//! Splices rendered entries into an array literal and removes them again.
//!
//! Nothing here touches the file system: every operation produces an
//! [`Edit`] against the given content, which the caller applies in memory
//! or on disk.

use crate::edit::{Edit, EditError};
use crate::php::style::{line_indent, line_start, nested_indent};
use crate::php::{ArrayLiteral, LineEnding};
use std::path::Path;

/// Plan insertion of `rendered` (an element expression without comma)
/// before entry `index`; `index == entries.len()` appends.
pub fn plan_splice(
    file: &Path,
    content: &str,
    literal: &ArrayLiteral,
    index: usize,
    rendered: &str,
    eol: LineEnding,
) -> Edit {
    let eol = eol.as_str();
    let entries = &literal.entries;
    let index = index.min(entries.len());
    let body = literal.body();

    if entries.is_empty() {
        let body_text = &content[body.clone()];
        let open_indent = line_indent(content, literal.open.start);

        if body_text.trim().is_empty() {
            let new_body = format!(
                "{eol}{indent}{rendered},{eol}{open_indent}",
                indent = nested_indent(open_indent)
            );
            return Edit::new(file, body.start, body.end, new_body, body_text);
        }

        // Only comments inside: add a line above the closing bracket when it
        // sits on its own line, otherwise write the element inline.
        let close_line = line_start(content, literal.close.start);
        let close_prefix = &content[close_line..literal.close.start];
        if close_line > literal.open.end && close_prefix.trim().is_empty() {
            let text = format!("{}{rendered},{eol}", nested_indent(close_prefix));
            return Edit::insert(file, close_line, text);
        }
        return Edit::insert(file, literal.close.start, rendered.to_string());
    }

    if literal.is_multiline() {
        if let Some(next) = entries.get(index) {
            let line = next.line.clone().unwrap_or(next.expr.clone());
            let text = format!("{}{rendered},{eol}", next.indent);
            return Edit::insert(file, line.start, text);
        }

        let last = &entries[entries.len() - 1];
        let line = last.line.clone().unwrap_or(last.expr.clone());
        let text = format!("{}{rendered},{eol}", last.indent);
        if last.comma.is_some() {
            return Edit::insert(file, line.end, text);
        }

        // Last entry has no trailing comma: add one, keep the rest of its line.
        let tail = &content[last.expr.end..line.end];
        return Edit::new(
            file,
            last.expr.end,
            line.end,
            format!(",{tail}{text}"),
            tail,
        );
    }

    if let Some(next) = entries.get(index) {
        return Edit::insert(file, next.expr.start, format!("{rendered}, "));
    }

    let last = &entries[entries.len() - 1];
    match last.comma {
        Some(comma) => Edit::insert(file, comma + 1, format!(" {rendered},")),
        None => Edit::insert(file, last.expr.end, format!(", {rendered}")),
    }
}

/// Plan removal of entry `index`.
///
/// Own-line entries lose their whole line. Inline entries lose the element
/// plus the separator that joins it to its neighbour. An array left with
/// nothing but whitespace collapses to `[]` / `array()`.
pub fn plan_delete(file: &Path, content: &str, literal: &ArrayLiteral, index: usize) -> Edit {
    let entries = &literal.entries;
    let entry = &entries[index];
    let body = literal.body();

    let removal = match (&entry.line, literal.is_multiline()) {
        (Some(line), true) => line.clone(),
        _ => {
            if index == 0 {
                let end = match entries.get(1) {
                    Some(next) => next.expr.start,
                    None => entry.comma.map_or(entry.expr.end, |comma| comma + 1),
                };
                entry.expr.start..end
            } else {
                let previous = &entries[index - 1];
                match (entry.comma, previous.comma) {
                    (Some(comma), Some(previous_comma)) => previous_comma + 1..comma + 1,
                    _ => previous.expr.end..entry.expr.end,
                }
            }
        }
    };

    if entries.len() == 1 {
        let remaining_is_blank = content[body.start..removal.start].trim().is_empty()
            && content[removal.end..body.end].trim().is_empty();
        if remaining_is_blank {
            return Edit::delete(file, content, body.start, body.end);
        }
    }

    Edit::delete(file, content, removal.start, removal.end)
}

/// In-memory insertion, see [`plan_splice`].
pub fn splice(
    content: &str,
    literal: &ArrayLiteral,
    index: usize,
    rendered: &str,
) -> Result<String, EditError> {
    let edit = plan_splice(
        Path::new("<memory>"),
        content,
        literal,
        index,
        rendered,
        LineEnding::detect(content),
    );
    edit.apply_to(content)
}

/// In-memory removal, see [`plan_delete`].
pub fn delete_entry(content: &str, literal: &ArrayLiteral, index: usize) -> Result<String, EditError> {
    plan_delete(Path::new("<memory>"), content, literal, index).apply_to(content)
}
