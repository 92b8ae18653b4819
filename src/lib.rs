//! Component Installer: keeps PHP application config files in sync with
//! installed packages.
//!
//! Packages declare the modules, components and config providers they ship.
//! When a package is installed the matching entry is added to the
//! application's config array (`config/modules.config.php`,
//! `config/application.config.php`, `config/config.php`); when it is removed
//! the entry goes away again.
//!
//! # Architecture
//!
//! Every change to a config file compiles down to a single [`Edit`]: a
//! verified byte-span replacement. The `php` module locates the target array
//! and its entries; the `injector` module decides where an entry goes and
//! plans the edit. Nothing else in the file is reformatted.
//!
//! # Guarantees
//!
//! - Injecting an already registered package is a no-op
//! - Injecting then removing a package restores the file byte for byte,
//!   except that an empty array written over several lines comes back as `[]`
//! - Short (`[]`) and long (`array()`) array syntax is preserved
//! - Writes are atomic (tempfile + fsync + rename) and stay inside the
//!   application root
//!
//! # Example
//!
//! ```no_run
//! use component_installer::{ConfigInjector, ConfigTarget, InjectionContext, InjectorKind, NullIo};
//!
//! let injector = ConfigInjector::new(ConfigTarget::Modules, ".");
//! match injector.inject("Laminas\\Router", InjectorKind::Component, &InjectionContext::new(), &mut NullIo) {
//!     Ok(result) => println!("{result}"),
//!     Err(e) => eprintln!("injection failed: {e}"),
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod edit;
pub mod injector;
pub mod installer;
pub mod logging;
pub mod package;
pub mod php;
pub mod safety;

// Re-exports
pub use config::{load_from_path, load_from_str, load_or_default, ConfigError, InstallerSettings};
pub use discovery::{closest_matches, ConfigDiscovery};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use injector::{
    BufferedIo, ConfigInjector, ConfigTarget, HostIo, InjectResult, InjectionContext,
    InjectorChain, InjectorError, InjectorKind, NullIo, RemoveResult,
};
pub use installer::{ComponentInstaller, InjectionOutcome, RemovalOutcome};
pub use package::{HostApi, InstalledRepository, PackageError, PackageManifest, PackageRepository};
pub use php::{ArrayStyle, EntryFormat, PhpError};
pub use safety::{ProjectGuard, SafetyError};
