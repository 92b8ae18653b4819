//! Host event handling: a package was installed, updated or removed.

use crate::config::PackageSettings;
use crate::injector::{
    ConfigTarget, HostIo, InjectResult, InjectionContext, InjectorChain, InjectorError,
    InjectorKind, RemoveResult,
};
use crate::package::{module_dependencies, EntityRole, PackageManifest, PackageRepository};
use tracing::{debug, info, warn};

/// Result of injecting one declared entity.
#[derive(Debug)]
pub struct InjectionOutcome {
    pub entity: String,
    pub kind: InjectorKind,
    /// `Ok(None)` when no config file accepts the kind
    pub result: Result<Option<InjectResult>, InjectorError>,
}

/// Result of removing one declared entity from one config file.
#[derive(Debug)]
pub struct RemovalOutcome {
    pub entity: String,
    pub target: ConfigTarget,
    pub result: Result<RemoveResult, InjectorError>,
}

pub struct ComponentInstaller {
    chain: InjectorChain,
    packages: PackageSettings,
    application_modules: Vec<String>,
}

impl ComponentInstaller {
    pub fn new(chain: InjectorChain) -> Self {
        Self {
            chain,
            packages: PackageSettings::default(),
            application_modules: Vec::new(),
        }
    }

    pub fn with_package_settings(mut self, packages: PackageSettings) -> Self {
        self.packages = packages;
        self
    }

    /// Modules of the root application, typically
    /// [`PackageManifest::application_modules`] of the root package.
    pub fn with_application_modules(mut self, modules: Vec<String>) -> Self {
        self.application_modules = modules;
        self
    }

    pub fn chain(&self) -> &InjectorChain {
        &self.chain
    }

    /// Kind a declared entity is injected as.
    pub fn kind_for(&self, role: EntityRole, dependencies: &[String]) -> InjectorKind {
        match role {
            EntityRole::ConfigProvider => InjectorKind::ConfigProvider,
            EntityRole::Component => InjectorKind::Component,
            EntityRole::Module if !dependencies.is_empty() => InjectorKind::DependencyModule,
            EntityRole::Module if !self.application_modules.is_empty() => {
                InjectorKind::BeforeApplicationModule
            }
            EntityRole::Module => InjectorKind::Module,
        }
    }

    /// Inject everything `package` declares. Also used for updates, since
    /// injection of an already registered entity is a no-op.
    pub fn on_package_installed(
        &self,
        package: &PackageManifest,
        repository: &dyn PackageRepository,
        io: &mut dyn HostIo,
    ) -> Vec<InjectionOutcome> {
        if self.skip(package, io) {
            return Vec::new();
        }

        let dependencies = module_dependencies(repository, package);
        let context = InjectionContext::new()
            .with_application_modules(self.application_modules.iter().cloned())
            .with_module_dependencies(dependencies.iter().cloned());

        let mut outcomes = Vec::new();
        for entity in package.declared_entities() {
            let kind = self.kind_for(entity.role, &dependencies);
            debug!(package = %package.name, entity = %entity.name, %kind, "injecting");

            let result = self.chain.inject(&entity.name, kind, &context, io);
            match &result {
                Ok(None) => io.write(&format!(
                    "No config file accepts {kind} entries; skipped {}",
                    entity.name
                )),
                Err(err) => {
                    warn!(entity = %entity.name, error = %err, "injection failed");
                    io.write(&format!("Unable to register {}: {err}", entity.name));
                }
                Ok(Some(_)) => {}
            }

            outcomes.push(InjectionOutcome {
                entity: entity.name,
                kind,
                result,
            });
        }
        outcomes
    }

    /// Remove everything `package` declares from every config file.
    pub fn on_package_uninstalled(
        &self,
        package: &PackageManifest,
        io: &mut dyn HostIo,
    ) -> Vec<RemovalOutcome> {
        if self.skip(package, io) {
            return Vec::new();
        }

        let mut outcomes = Vec::new();
        for entity in package.declared_entities() {
            for (target, result) in self.chain.remove(&entity.name, io) {
                if let Err(err) = &result {
                    warn!(entity = %entity.name, %target, error = %err, "removal failed");
                    io.write(&format!("Unable to remove {} from {target}: {err}", entity.name));
                }
                outcomes.push(RemovalOutcome {
                    entity: entity.name.clone(),
                    target,
                    result,
                });
            }
        }
        outcomes
    }

    fn skip(&self, package: &PackageManifest, io: &mut dyn HostIo) -> bool {
        if self.packages.is_ignored(&package.name) {
            info!(package = %package.name, "package is ignored");
            io.write(&format!("Skipping {}: listed in packages.ignore", package.name));
            return true;
        }
        if package.installer_extra().is_none() {
            debug!(package = %package.name, "package declares no config entries");
            return true;
        }
        false
    }
}
