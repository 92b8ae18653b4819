use crate::injector::kind::InjectorKind;
use crate::php::{Anchor, EntryFormat};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const MODULE_KINDS: &[InjectorKind] = &[
    InjectorKind::Component,
    InjectorKind::Module,
    InjectorKind::DependencyModule,
    InjectorKind::BeforeApplicationModule,
];

const DEVELOPMENT_KINDS: &[InjectorKind] = &[InjectorKind::Component, InjectorKind::Module];

const PROVIDER_KINDS: &[InjectorKind] = &[InjectorKind::ConfigProvider];

const AGGREGATOR_CLASSES: &[&str] = &["ConfigAggregator", "ConfigManager"];

/// A known application config file and the injector rules that apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigTarget {
    /// `config/modules.config.php`
    Modules,
    /// `config/application.config.php`
    Application,
    /// `config/config.php` with a config aggregator
    ConfigAggregator,
    /// `config/development.config.php.dist`
    Development,
    /// `config/development.config.php`
    DevelopmentWork,
}

impl ConfigTarget {
    pub const ALL: [ConfigTarget; 5] = [
        ConfigTarget::Modules,
        ConfigTarget::Application,
        ConfigTarget::ConfigAggregator,
        ConfigTarget::Development,
        ConfigTarget::DevelopmentWork,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigTarget::Modules => "modules",
            ConfigTarget::Application => "application",
            ConfigTarget::ConfigAggregator => "config-aggregator",
            ConfigTarget::Development => "development",
            ConfigTarget::DevelopmentWork => "development-work",
        }
    }

    /// Path relative to the application root.
    pub fn relative_path(self) -> &'static str {
        match self {
            ConfigTarget::Modules => "config/modules.config.php",
            ConfigTarget::Application => "config/application.config.php",
            ConfigTarget::ConfigAggregator => "config/config.php",
            ConfigTarget::Development => "config/development.config.php.dist",
            ConfigTarget::DevelopmentWork => "config/development.config.php",
        }
    }

    pub fn anchor(self) -> Anchor {
        match self {
            ConfigTarget::Modules => Anchor::Return,
            ConfigTarget::ConfigAggregator => Anchor::Constructor(AGGREGATOR_CLASSES),
            ConfigTarget::Application
            | ConfigTarget::Development
            | ConfigTarget::DevelopmentWork => Anchor::Key("modules"),
        }
    }

    pub fn entry_format(self) -> EntryFormat {
        match self {
            ConfigTarget::ConfigAggregator => EntryFormat::ConfigProviderClass,
            _ => EntryFormat::ModuleName,
        }
    }

    pub fn types_allowed(self) -> &'static [InjectorKind] {
        match self {
            ConfigTarget::Modules | ConfigTarget::Application => MODULE_KINDS,
            ConfigTarget::ConfigAggregator => PROVIDER_KINDS,
            ConfigTarget::Development | ConfigTarget::DevelopmentWork => DEVELOPMENT_KINDS,
        }
    }

    pub fn registers_type(self, kind: InjectorKind) -> bool {
        self.types_allowed().contains(&kind)
    }

    /// Initial contents used when the file is missing or blank.
    pub fn skeleton(self) -> Option<&'static str> {
        match self {
            ConfigTarget::Modules => Some("<?php\n\nreturn [];\n"),
            _ => None,
        }
    }

    pub fn is_development(self) -> bool {
        matches!(
            self,
            ConfigTarget::Development | ConfigTarget::DevelopmentWork
        )
    }
}

impl fmt::Display for ConfigTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relative_path())
    }
}

impl FromStr for ConfigTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|target| target.name() == needle || target.relative_path() == needle)
            .ok_or_else(|| format!("unknown config target '{s}'"))
    }
}
