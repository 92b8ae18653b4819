//! Package metadata the installer consumes from the host.

pub mod capabilities;
pub mod errors;
pub mod manifest;
pub mod repository;

pub use capabilities::HostApi;
pub use errors::PackageError;
pub use manifest::{DeclaredEntity, EntityRole, InstallerExtra, OneOrMany, PackageManifest};
pub use repository::{module_dependencies, InstalledRepository, PackageRepository, INSTALLED_JSON};
