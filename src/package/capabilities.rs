//! Host package manager capability detection.
//!
//! Resolved once at startup; everything downstream receives a [`HostApi`]
//! value instead of asking the host again.

use crate::package::errors::PackageError;
use semver::{Version, VersionReq};
use std::fmt;
use tracing::debug;

/// Plugin API generation of the host package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostApi {
    /// `installed.json` is a bare list of packages
    V1,
    /// `installed.json` wraps the list in `{"packages": [...]}` and the root
    /// package takes part in lookups
    #[default]
    V2,
}

impl HostApi {
    /// Classify a plugin API version string such as `2.6.0` or `1.1`.
    pub fn detect(plugin_api_version: &str) -> Result<Self, PackageError> {
        let version = parse_lenient(plugin_api_version)?;
        let legacy = VersionReq::parse("<2.0.0").map_err(|source| PackageError::InvalidApiVersion {
            version: plugin_api_version.to_string(),
            source,
        })?;

        let api = if legacy.matches(&version) {
            HostApi::V1
        } else {
            HostApi::V2
        };
        debug!(%version, ?api, "detected host plugin API");
        Ok(api)
    }

    pub fn includes_root_package(self) -> bool {
        self == HostApi::V2
    }
}

impl fmt::Display for HostApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostApi::V1 => write!(f, "plugin API 1.x"),
            HostApi::V2 => write!(f, "plugin API 2.x"),
        }
    }
}

/// Accept `2` and `2.1` as well as full `2.1.0`.
fn parse_lenient(input: &str) -> Result<Version, PackageError> {
    let trimmed = input.trim().trim_start_matches('v');
    let padded = match trimmed.matches('.').count() {
        0 => format!("{trimmed}.0.0"),
        1 => format!("{trimmed}.0"),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).map_err(|source| PackageError::InvalidApiVersion {
        version: input.to_string(),
        source,
    })
}
