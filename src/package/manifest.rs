//! The subset of `composer.json` the installer reads.

use crate::package::errors::PackageError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Directory application modules live in, relative to the project root.
const APPLICATION_MODULE_DIR: &str = "module/";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub require: BTreeMap<String, String>,
    #[serde(default)]
    pub autoload: Autoload,
    #[serde(default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Autoload {
    #[serde(rename = "psr-4", default)]
    pub psr4: BTreeMap<String, OneOrMany>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Extra {
    #[serde(default)]
    pub laminas: Option<InstallerExtra>,
    /// Legacy key used before the laminas rename
    #[serde(default)]
    pub zf: Option<InstallerExtra>,
}

/// `extra.laminas` section of a package.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InstallerExtra {
    #[serde(default)]
    pub component: OneOrMany,
    #[serde(default)]
    pub module: OneOrMany,
    #[serde(rename = "config-provider", default)]
    pub config_provider: OneOrMany,
}

/// A string or a list of strings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            OneOrMany::One(one) => std::slice::from_ref(one),
            OneOrMany::Many(many) => many,
        };
        items.iter().map(String::as_str).filter(|s| !s.trim().is_empty())
    }
}

/// What a package contributes, before it is mapped to an injector kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRole {
    ConfigProvider,
    Component,
    Module,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredEntity {
    pub name: String,
    pub role: EntityRole,
}

impl PackageManifest {
    pub fn from_json(input: &str) -> Result<Self, PackageError> {
        serde_json::from_str(input).map_err(|source| PackageError::Json { path: None, source })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| PackageError::Json {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// `extra.laminas`, falling back to `extra.zf`.
    pub fn installer_extra(&self) -> Option<&InstallerExtra> {
        self.extra.laminas.as_ref().or(self.extra.zf.as_ref())
    }

    /// Entities in injection order: config providers, components, modules.
    pub fn declared_entities(&self) -> Vec<DeclaredEntity> {
        let Some(extra) = self.installer_extra() else {
            return Vec::new();
        };

        let roles = [
            (&extra.config_provider, EntityRole::ConfigProvider),
            (&extra.component, EntityRole::Component),
            (&extra.module, EntityRole::Module),
        ];
        roles
            .into_iter()
            .flat_map(|(names, role)| {
                names.iter().map(move |name| DeclaredEntity {
                    name: name.to_string(),
                    role,
                })
            })
            .collect()
    }

    /// Modules and components, the names that appear in module lists.
    pub fn declared_modules(&self) -> Vec<String> {
        self.declared_entities()
            .into_iter()
            .filter(|entity| entity.role != EntityRole::ConfigProvider)
            .map(|entity| entity.name)
            .collect()
    }

    /// Modules that belong to the application itself: PSR-4 namespaces
    /// autoloaded from `module/`.
    pub fn application_modules(&self) -> Vec<String> {
        self.autoload
            .psr4
            .iter()
            .filter(|(_, paths)| {
                paths.iter().any(|path| {
                    path.trim_start_matches("./")
                        .starts_with(APPLICATION_MODULE_DIR)
                })
            })
            .map(|(namespace, _)| namespace.trim_end_matches('\\').to_string())
            .filter(|namespace| !namespace.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_entities() {
        let manifest = PackageManifest::from_json(
            r#"{
                "name": "laminas/laminas-form",
                "require": {"php": "^8.1", "laminas/laminas-hydrator": "^4.0"},
                "extra": {
                    "laminas": {
                        "component": "Laminas\\Form",
                        "config-provider": ["Laminas\\Form\\ConfigProvider"]
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name, "laminas/laminas-form");
        assert_eq!(
            manifest.declared_entities(),
            vec![
                DeclaredEntity {
                    name: "Laminas\\Form\\ConfigProvider".to_string(),
                    role: EntityRole::ConfigProvider,
                },
                DeclaredEntity {
                    name: "Laminas\\Form".to_string(),
                    role: EntityRole::Component,
                },
            ]
        );
        assert_eq!(manifest.declared_modules(), vec!["Laminas\\Form".to_string()]);
    }

    #[test]
    fn test_legacy_zf_extra() {
        let manifest =
            PackageManifest::from_json(r#"{"extra": {"zf": {"module": "Zend\\Router"}}}"#).unwrap();
        assert_eq!(manifest.declared_modules(), vec!["Zend\\Router".to_string()]);
    }

    #[test]
    fn test_no_extra_declares_nothing() {
        let manifest = PackageManifest::from_json(r#"{"name": "psr/log"}"#).unwrap();
        assert!(manifest.declared_entities().is_empty());
    }

    #[test]
    fn test_application_modules() {
        let manifest = PackageManifest::from_json(
            r#"{
                "autoload": {
                    "psr-4": {
                        "Application\\": "module/Application/src/",
                        "Blog\\": ["./module/Blog/src/"],
                        "App\\Lib\\": "src/"
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            manifest.application_modules(),
            vec!["Application".to_string(), "Blog".to_string()]
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = PackageManifest::from_json("{").unwrap_err();
        assert!(matches!(err, PackageError::Json { path: None, .. }));
    }
}
