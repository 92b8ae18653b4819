use crate::package::capabilities::HostApi;
use crate::package::errors::PackageError;
use crate::package::manifest::PackageManifest;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Location of the installed package list, relative to the project root.
pub const INSTALLED_JSON: &str = "vendor/composer/installed.json";

/// Looks up metadata of packages known to the host.
pub trait PackageRepository {
    fn find_package(&self, name: &str) -> Option<&PackageManifest>;
}

/// Modules declared by the packages `package` requires.
///
/// Requirements the repository does not know about (platform packages,
/// packages not installed yet) contribute nothing.
pub fn module_dependencies(
    repository: &dyn PackageRepository,
    package: &PackageManifest,
) -> Vec<String> {
    let mut modules = Vec::new();
    for required in package.require.keys() {
        let Some(dependency) = repository.find_package(required) else {
            continue;
        };
        for module in dependency.declared_modules() {
            if !modules.contains(&module) {
                modules.push(module);
            }
        }
    }
    modules
}

#[derive(Deserialize)]
struct InstalledV2 {
    #[serde(default)]
    packages: Vec<PackageManifest>,
}

/// Packages recorded in `vendor/composer/installed.json`, plus the root
/// package when the host API includes it.
#[derive(Debug, Clone, Default)]
pub struct InstalledRepository {
    packages: Vec<PackageManifest>,
    root: Option<PackageManifest>,
}

impl InstalledRepository {
    pub fn new(packages: Vec<PackageManifest>) -> Self {
        Self {
            packages,
            root: None,
        }
    }

    pub fn with_root(mut self, root: PackageManifest) -> Self {
        self.root = Some(root);
        self
    }

    /// Load the installed package list for `project_root`.
    ///
    /// A missing `installed.json` yields an empty repository.
    pub fn load(project_root: impl AsRef<Path>, api: HostApi) -> Result<Self, PackageError> {
        let path = project_root.as_ref().join(INSTALLED_JSON);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no installed.json");
                return Ok(Self::default());
            }
            Err(source) => return Err(PackageError::Io { path, source }),
        };

        let json_error = |source| PackageError::Json {
            path: Some(path.clone()),
            source,
        };
        let packages = match api {
            HostApi::V1 => serde_json::from_str::<Vec<PackageManifest>>(&contents).map_err(json_error)?,
            HostApi::V2 => {
                serde_json::from_str::<InstalledV2>(&contents)
                    .map_err(json_error)?
                    .packages
            }
        };
        debug!(count = packages.len(), %api, "loaded installed packages");
        Ok(Self::new(packages))
    }

    pub fn packages(&self) -> &[PackageManifest] {
        &self.packages
    }

    pub fn root(&self) -> Option<&PackageManifest> {
        self.root.as_ref()
    }
}

impl PackageRepository for InstalledRepository {
    fn find_package(&self, name: &str) -> Option<&PackageManifest> {
        self.packages
            .iter()
            .chain(self.root.iter())
            .find(|package| package.name.eq_ignore_ascii_case(name))
    }
}
