use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// What a package contributes to the application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectorKind {
    ConfigProvider,
    Component,
    Module,
    /// Module that must load after the modules it depends on
    DependencyModule,
    /// Module that must load before the application's own modules
    BeforeApplicationModule,
}

impl InjectorKind {
    pub const ALL: [InjectorKind; 5] = [
        InjectorKind::ConfigProvider,
        InjectorKind::Component,
        InjectorKind::Module,
        InjectorKind::DependencyModule,
        InjectorKind::BeforeApplicationModule,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InjectorKind::ConfigProvider => "config-provider",
            InjectorKind::Component => "component",
            InjectorKind::Module => "module",
            InjectorKind::DependencyModule => "dependency-module",
            InjectorKind::BeforeApplicationModule => "before-application-module",
        }
    }
}

impl fmt::Display for InjectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InjectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|kind| kind.as_str()).collect();
                format!("unknown injector kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
