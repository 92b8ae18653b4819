use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keeps injector writes inside the application being configured.
///
/// Config files must resolve inside the application root, and never inside
/// its `vendor/` tree where installed packages live.
#[derive(Debug, Clone)]
pub struct ProjectGuard {
    project_root: PathBuf,
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside project: {path} (project: {project})")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("Path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl ProjectGuard {
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let project_root = project_root.as_ref().canonicalize()?;

        let mut forbidden_paths = Vec::new();
        if let Ok(vendor) = project_root.join("vendor").canonicalize() {
            forbidden_paths.push(vendor);
        }

        Ok(Self {
            project_root,
            forbidden_paths,
        })
    }

    /// Check that a config path is safe to write.
    ///
    /// The file itself may not exist yet (a skeleton is about to be created),
    /// so the nearest existing ancestor is canonicalized and the remaining
    /// components are re-attached.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let canonical = canonicalize_existing_prefix(&absolute)?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.project_root) {
            return Err(SafetyError::OutsideProject {
                path: canonical.to_path_buf(),
                project: self.project_root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if canonical.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical.to_path_buf(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

fn canonicalize_existing_prefix(path: &Path) -> Result<PathBuf, SafetyError> {
    if path.exists() {
        return Ok(path.canonicalize()?);
    }

    let normalized = normalize_lexically(path);
    let mut missing = Vec::new();
    let mut current = normalized.as_path();
    while !current.exists() {
        let name = current.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no existing ancestor for {}", path.display()),
            )
        })?;
        missing.push(name.to_os_string());
        current = current.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no existing ancestor for {}", path.display()),
            )
        })?;
    }

    let mut resolved = current.canonicalize()?;
    for name in missing.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_path_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path();
        let guard = ProjectGuard::new(project).unwrap();

        let file = project.join("config/modules.config.php");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"<?php return [];").unwrap();

        assert!(guard.validate_path(&file).is_ok());
        assert!(guard.validate_path("config/modules.config.php").is_ok());
    }

    #[test]
    fn test_validate_missing_file_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let resolved = guard.validate_path("config/modules.config.php").unwrap();
        assert!(resolved.ends_with("config/modules.config.php"));
    }

    #[test]
    fn test_validate_path_outside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("app");
        fs::create_dir_all(&project).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let outside = temp_dir.path().join("config.php");
        fs::write(&outside, b"").unwrap();

        let result = guard.validate_path(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn test_validate_parent_escape_in_missing_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("app");
        fs::create_dir_all(&project).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let result = guard.validate_path("missing/../../escape.php");
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn test_validate_path_in_vendor() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path();
        let vendor_config = project.join("vendor/acme/module/config");
        fs::create_dir_all(&vendor_config).unwrap();
        let file = vendor_config.join("module.config.php");
        fs::write(&file, b"").unwrap();

        let guard = ProjectGuard::new(project).unwrap();
        let result = guard.validate_path(&file);
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }
}
