use crate::edit::{atomic_write, Edit, EditResult};
use crate::injector::config_file::{is_blank, ConfigFile};
use crate::injector::errors::InjectorError;
use crate::injector::io::HostIo;
use crate::injector::kind::InjectorKind;
use crate::injector::mutation::{plan_delete, plan_splice};
use crate::injector::placement::{insertion_index, InjectionContext};
use crate::injector::target::ConfigTarget;
use crate::safety::ProjectGuard;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Entry that component insertion keeps last unless configured otherwise.
pub const DEFAULT_SENTINEL: &str = "Application";

/// File contents around a planned change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file: PathBuf,
    pub before: String,
    pub after: String,
}

/// What [`ConfigInjector::plan_inject`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectPlan {
    Edit(Edit),
    AlreadyRegistered,
}

/// What [`ConfigInjector::plan_remove`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovePlan {
    /// Remove the first matching entry; later duplicates stay in place.
    Edit { edit: Edit, duplicates_remaining: usize },
    NotRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "InjectResult should be checked"]
pub enum InjectResult {
    Injected { file: PathBuf, kind: InjectorKind },
    AlreadyRegistered { file: PathBuf },
}

impl fmt::Display for InjectResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectResult::Injected { file, kind } => {
                write!(f, "Injected {} entry into {}", kind, file.display())
            }
            InjectResult::AlreadyRegistered { file } => {
                write!(f, "Already registered in {}", file.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RemoveResult should be checked"]
pub enum RemoveResult {
    Removed {
        file: PathBuf,
        duplicates_remaining: usize,
    },
    NotRegistered { file: PathBuf },
}

impl fmt::Display for RemoveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveResult::Removed {
                file,
                duplicates_remaining: 0,
            } => write!(f, "Removed from {}", file.display()),
            RemoveResult::Removed {
                file,
                duplicates_remaining,
            } => write!(
                f,
                "Removed from {} ({} duplicate entries left in place)",
                file.display(),
                duplicates_remaining
            ),
            RemoveResult::NotRegistered { file } => {
                write!(f, "Not registered in {}", file.display())
            }
        }
    }
}

/// Adds and removes package entries in one config file.
///
/// The injector holds no per-package state: every call reads the file,
/// decides, and writes at most once.
#[derive(Debug, Clone)]
pub struct ConfigInjector {
    target: ConfigTarget,
    file: PathBuf,
    sentinels: Vec<String>,
    guard: Option<ProjectGuard>,
}

impl ConfigInjector {
    /// Injector for `target` inside the application at `project_root`.
    pub fn new(target: ConfigTarget, project_root: impl AsRef<Path>) -> Self {
        Self {
            target,
            file: project_root.as_ref().join(target.relative_path()),
            sentinels: vec![DEFAULT_SENTINEL.to_string()],
            guard: None,
        }
    }

    /// Point the injector at an explicit file instead of the target's
    /// conventional location.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_sentinels<I, S>(mut self, sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentinels = sentinels.into_iter().map(Into::into).collect();
        self
    }

    /// Refuse to write files the guard rejects.
    pub fn with_guard(mut self, guard: ProjectGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn target(&self) -> ConfigTarget {
        self.target
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn registers_type(&self, kind: InjectorKind) -> bool {
        self.target.registers_type(kind)
    }

    pub fn types_allowed(&self) -> &'static [InjectorKind] {
        self.target.types_allowed()
    }

    /// Current file contents, `None` when the file does not exist.
    pub fn read_existing(&self) -> Result<Option<String>, InjectorError> {
        match fs::read_to_string(&self.file) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(InjectorError::Io {
                path: self.file.clone(),
                source,
            }),
        }
    }

    /// A missing or blank file registers nothing.
    pub fn is_registered(&self, package: &str) -> Result<bool, InjectorError> {
        match self.read_existing()? {
            Some(content) if !is_blank(&content) => Ok(ConfigFile::parse(
                &self.file,
                &content,
                self.target,
            )?
            .is_registered(package)),
            _ => Ok(false),
        }
    }

    /// Packages the file currently registers, in file order.
    pub fn registered_packages(&self) -> Result<Vec<String>, InjectorError> {
        match self.read_existing()? {
            Some(content) if !is_blank(&content) => {
                Ok(ConfigFile::parse(&self.file, &content, self.target)?
                    .identifiers()
                    .iter()
                    .flatten()
                    .cloned()
                    .collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Decide how `package` would be injected into `content`.
    pub fn plan_inject(
        &self,
        content: &str,
        package: &str,
        kind: InjectorKind,
        context: &InjectionContext,
    ) -> Result<InjectPlan, InjectorError> {
        let file = ConfigFile::parse(&self.file, content, self.target)?;

        if file.is_registered(package) {
            debug!(package, file = %self.file.display(), "already registered");
            return Ok(InjectPlan::AlreadyRegistered);
        }

        if !self.registers_type(kind) {
            return Err(InjectorError::UnsupportedInjectorType {
                kind,
                target: self.target.to_string(),
            });
        }

        let index = insertion_index(kind, file.identifiers(), context, &self.sentinels);
        let rendered = file
            .format()
            .render(package, file.literal().quote_style());
        debug!(package, %kind, index, entry = %rendered, "planned injection");

        let edit = plan_splice(
            file.path(),
            file.content(),
            file.literal(),
            index,
            &rendered,
            file.line_ending(),
        );
        Ok(InjectPlan::Edit(file.finalize(edit)?))
    }

    /// Decide how `package` would be removed from `content`.
    pub fn plan_remove(&self, content: &str, package: &str) -> Result<RemovePlan, InjectorError> {
        if is_blank(content) {
            debug!(package, file = %self.file.display(), "blank config file");
            return Ok(RemovePlan::NotRegistered);
        }
        let file = ConfigFile::parse(&self.file, content, self.target)?;
        let positions = file.positions_of(package);

        let Some(&first) = positions.first() else {
            debug!(package, file = %self.file.display(), "not registered");
            return Ok(RemovePlan::NotRegistered);
        };

        let edit = plan_delete(file.path(), file.content(), file.literal(), first);
        Ok(RemovePlan::Edit {
            edit: file.finalize(edit)?,
            duplicates_remaining: positions.len() - 1,
        })
    }

    /// Contents before and after injecting `package`, without writing.
    /// `None` when the package is already registered.
    pub fn preview_inject(
        &self,
        package: &str,
        kind: InjectorKind,
        context: &InjectionContext,
    ) -> Result<Option<Preview>, InjectorError> {
        let before = self.content_for_inject()?;
        match self.plan_inject(&before, package, kind, context)? {
            InjectPlan::AlreadyRegistered => Ok(None),
            InjectPlan::Edit(edit) => Ok(Some(Preview {
                file: self.file.clone(),
                after: edit.apply_to(&before)?,
                before,
            })),
        }
    }

    /// Contents before and after removing `package`, without writing.
    /// `None` when the package is not registered.
    pub fn preview_remove(&self, package: &str) -> Result<Option<Preview>, InjectorError> {
        let Some(before) = self.read_existing()? else {
            return Ok(None);
        };
        match self.plan_remove(&before, package)? {
            RemovePlan::NotRegistered => Ok(None),
            RemovePlan::Edit { edit, .. } => Ok(Some(Preview {
                file: self.file.clone(),
                after: edit.apply_to(&before)?,
                before,
            })),
        }
    }

    fn content_for_inject(&self) -> Result<String, InjectorError> {
        match self.read_existing()? {
            Some(content) => Ok(content),
            None if self.target.skeleton().is_some() => Ok(String::new()),
            None => Err(InjectorError::MissingConfigFile {
                file: self.file.clone(),
            }),
        }
    }

    /// Register `package` as a `kind` entry.
    ///
    /// Idempotent: an already registered package leaves the file untouched.
    pub fn inject(
        &self,
        package: &str,
        kind: InjectorKind,
        context: &InjectionContext,
        io: &mut dyn HostIo,
    ) -> Result<InjectResult, InjectorError> {
        let exists = self.file.exists();
        let content = self.content_for_inject()?;

        match self.plan_inject(&content, package, kind, context)? {
            InjectPlan::AlreadyRegistered => Ok(InjectResult::AlreadyRegistered {
                file: self.file.clone(),
            }),
            InjectPlan::Edit(edit) => {
                self.write(&edit, exists)?;
                io.write(&format!("Installing {package} in {}", self.target));
                info!(package, %kind, file = %self.file.display(), "injected");
                Ok(InjectResult::Injected {
                    file: self.file.clone(),
                    kind,
                })
            }
        }
    }

    /// Remove the first entry registering `package`, if any.
    pub fn remove(&self, package: &str, io: &mut dyn HostIo) -> Result<RemoveResult, InjectorError> {
        let not_registered = || RemoveResult::NotRegistered {
            file: self.file.clone(),
        };

        let Some(content) = self.read_existing()? else {
            return Ok(not_registered());
        };

        match self.plan_remove(&content, package)? {
            RemovePlan::NotRegistered => Ok(not_registered()),
            RemovePlan::Edit {
                edit,
                duplicates_remaining,
            } => {
                self.write(&edit, true)?;
                io.write(&format!("Removing {package} from {}", self.target));
                if duplicates_remaining > 0 {
                    warn!(
                        package,
                        file = %self.file.display(),
                        duplicates_remaining,
                        "duplicate entries left in place"
                    );
                    io.write(&format!(
                        "{package} is listed {duplicates_remaining} more time(s) in {}; \
                         remaining entries were left untouched",
                        self.target
                    ));
                }
                info!(package, file = %self.file.display(), "removed");
                Ok(RemoveResult::Removed {
                    file: self.file.clone(),
                    duplicates_remaining,
                })
            }
        }
    }

    fn write(&self, edit: &Edit, exists: bool) -> Result<(), InjectorError> {
        if let Some(guard) = &self.guard {
            guard.validate_path(&self.file)?;
        }

        if exists {
            match edit.apply()? {
                EditResult::Applied { bytes_changed, .. } => {
                    debug!(file = %self.file.display(), bytes_changed, "wrote config file");
                }
                EditResult::AlreadyApplied { .. } => {
                    debug!(file = %self.file.display(), "edit already present on disk");
                }
            }
            return Ok(());
        }

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|source| InjectorError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let created = edit.apply_to("")?;
        atomic_write(&self.file, created.as_bytes())?;
        debug!(file = %self.file.display(), "created config file");
        Ok(())
    }
}
