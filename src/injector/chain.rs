use crate::injector::config_injector::{ConfigInjector, InjectResult, RemoveResult};
use crate::injector::errors::InjectorError;
use crate::injector::io::HostIo;
use crate::injector::kind::InjectorKind;
use crate::injector::placement::InjectionContext;
use crate::injector::target::ConfigTarget;
use tracing::debug;

/// Config injectors in priority order.
#[derive(Debug, Clone, Default)]
pub struct InjectorChain {
    injectors: Vec<ConfigInjector>,
}

impl InjectorChain {
    pub fn new(injectors: Vec<ConfigInjector>) -> Self {
        Self { injectors }
    }

    pub fn push(&mut self, injector: ConfigInjector) {
        self.injectors.push(injector);
    }

    pub fn injectors(&self) -> &[ConfigInjector] {
        &self.injectors
    }

    pub fn is_empty(&self) -> bool {
        self.injectors.is_empty()
    }

    /// Highest priority injector that accepts `kind`.
    pub fn accepting(&self, kind: InjectorKind) -> Option<&ConfigInjector> {
        self.injectors
            .iter()
            .find(|injector| injector.registers_type(kind))
    }

    /// Inject through the first injector that handles `kind`.
    ///
    /// Injectors that do not accept the kind are skipped without reading
    /// their file. `Ok(None)` means no injector in the chain accepts it.
    pub fn inject(
        &self,
        package: &str,
        kind: InjectorKind,
        context: &InjectionContext,
        io: &mut dyn HostIo,
    ) -> Result<Option<InjectResult>, InjectorError> {
        for injector in self.injectors.iter().filter(|i| i.registers_type(kind)) {
            match injector.inject(package, kind, context, io) {
                Err(err) if err.is_unsupported() => {
                    debug!(target_file = %injector.target(), "injector declined, trying next");
                }
                result => return result.map(Some),
            }
        }

        debug!(package, %kind, "no config file accepts this kind");
        Ok(None)
    }

    /// Remove `package` from every config file in the chain.
    ///
    /// Each target is attempted even if an earlier one fails.
    pub fn remove(
        &self,
        package: &str,
        io: &mut dyn HostIo,
    ) -> Vec<(ConfigTarget, Result<RemoveResult, InjectorError>)> {
        let mut results = Vec::with_capacity(self.injectors.len());
        for injector in &self.injectors {
            results.push((injector.target(), injector.remove(package, io)));
        }
        results
    }
}
