use crate::injector::{ConfigTarget, DEFAULT_SENTINEL};
use serde::Deserialize;
use std::fmt;

/// Contents of `component-installer.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InstallerSettings {
    #[serde(default)]
    pub injector: InjectorSettings,
    #[serde(default)]
    pub packages: PackageSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InjectorSettings {
    /// Config targets in priority order
    #[serde(default = "default_targets")]
    pub targets: Vec<ConfigTarget>,
    /// Entries that component insertion keeps last
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,
    /// Also write to `development.config.php(.dist)`
    #[serde(default)]
    pub include_development: bool,
}

impl Default for InjectorSettings {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            sentinels: default_sentinels(),
            include_development: false,
        }
    }
}

impl InjectorSettings {
    /// Targets to consider, with development targets filtered out unless
    /// enabled.
    pub fn active_targets(&self) -> impl Iterator<Item = ConfigTarget> + '_ {
        self.targets
            .iter()
            .copied()
            .filter(|target| self.include_development || !target.is_development())
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageSettings {
    /// Packages whose entries are never injected
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl PackageSettings {
    pub fn is_ignored(&self, package: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == package)
    }
}

fn default_targets() -> Vec<ConfigTarget> {
    ConfigTarget::ALL.to_vec()
}

fn default_sentinels() -> Vec<String> {
    vec![DEFAULT_SENTINEL.to_string()]
}

impl InstallerSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.injector.targets.is_empty() {
            issues.push(ValidationIssue::EmptyTargetList);
        }

        for (idx, target) in self.injector.targets.iter().enumerate() {
            if self.injector.targets[..idx].contains(target) {
                issues.push(ValidationIssue::DuplicateTarget { target: *target });
            }
        }

        if self.injector.sentinels.iter().any(|s| s.trim().is_empty()) {
            issues.push(ValidationIssue::EmptyValue {
                field: "injector.sentinels",
            });
        }

        if self.packages.ignore.iter().any(|p| p.trim().is_empty()) {
            issues.push(ValidationIssue::EmptyValue {
                field: "packages.ignore",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyTargetList,
    DuplicateTarget { target: ConfigTarget },
    EmptyValue { field: &'static str },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyTargetList => {
                write!(f, "injector.targets must name at least one config target")
            }
            ValidationIssue::DuplicateTarget { target } => {
                write!(f, "config target '{}' is listed more than once", target.name())
            }
            ValidationIssue::EmptyValue { field } => {
                write!(f, "{field} contains an empty entry")
            }
        }
    }
}
