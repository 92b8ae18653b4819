use crate::edit::{Edit, EditError};
use crate::injector::errors::InjectorError;
use crate::injector::target::ConfigTarget;
use crate::php::{locate, ArrayLiteral, EntryFormat, LineEnding};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One config file as read for a single install/update/remove operation.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    /// Text as it exists on disk ("" when the file is missing)
    original: String,
    /// Text the literal was located in; the target skeleton for blank files
    working: String,
    format: EntryFormat,
    literal: ArrayLiteral,
    identifiers: Vec<Option<String>>,
    line_ending: LineEnding,
}

impl ConfigFile {
    pub fn parse(
        path: impl Into<PathBuf>,
        content: &str,
        target: ConfigTarget,
    ) -> Result<Self, InjectorError> {
        let path = path.into();
        let working = match target.skeleton() {
            Some(skeleton) if is_blank(content) => {
                debug!(file = %path.display(), "blank config file, starting from skeleton");
                skeleton.to_string()
            }
            None if is_blank(content) => return Err(InjectorError::EmptyConfigFile { file: path }),
            _ => content.to_string(),
        };

        let literal = locate(&working, target.anchor()).map_err(|source| {
            InjectorError::MalformedConfigFile {
                file: path.clone(),
                source,
            }
        })?;

        let format = target.entry_format();
        let identifiers = literal
            .entries
            .iter()
            .map(|entry| format.identifier(&entry.value))
            .collect();

        debug!(
            file = %path.display(),
            style = %literal.style,
            entries = literal.entries.len(),
            "located config array"
        );

        Ok(Self {
            line_ending: LineEnding::detect(&working),
            path,
            original: content.to_string(),
            working,
            format,
            literal,
            identifiers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text the located literal's offsets refer to.
    pub fn content(&self) -> &str {
        &self.working
    }

    pub fn literal(&self) -> &ArrayLiteral {
        &self.literal
    }

    pub fn identifiers(&self) -> &[Option<String>] {
        &self.identifiers
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn format(&self) -> EntryFormat {
        self.format
    }

    pub fn is_from_skeleton(&self) -> bool {
        self.original != self.working
    }

    /// Entry indices registering `package`, in file order.
    pub fn positions_of(&self, package: &str) -> Vec<usize> {
        let wanted = self.format.normalize(package);
        self.identifiers
            .iter()
            .enumerate()
            .filter(|(_, id)| id.as_deref() == Some(wanted.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn is_registered(&self, package: &str) -> bool {
        !self.positions_of(package).is_empty()
    }

    /// Turn an edit planned against [`content`](Self::content) into one that
    /// applies to the text on disk.
    pub fn finalize(&self, edit: Edit) -> Result<Edit, EditError> {
        if !self.is_from_skeleton() {
            return Ok(edit);
        }
        let updated = edit.apply_to(&self.working)?;
        Ok(Edit::new(
            self.path.clone(),
            0,
            self.original.len(),
            updated,
            self.original.as_str(),
        ))
    }
}

/// Nothing but whitespace and an optional open tag.
pub(crate) fn is_blank(content: &str) -> bool {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    trimmed.strip_prefix("<?php").unwrap_or(trimmed).trim().is_empty()
}
