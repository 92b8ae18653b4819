//! Where a new entry goes, per injector kind.

use crate::injector::kind::InjectorKind;

/// Ordering inputs supplied by the host for one injection.
///
/// Built up front and passed into `inject` instead of being stored on the
/// injector, so a stale list from a previous package can never leak into
/// the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionContext {
    application_modules: Vec<String>,
    module_dependencies: Vec<String>,
}

impl InjectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modules that make up the consuming application itself.
    pub fn with_application_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.application_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Modules the package being injected depends on.
    pub fn with_module_dependencies<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.module_dependencies = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn application_modules(&self) -> &[String] {
        &self.application_modules
    }

    pub fn module_dependencies(&self) -> &[String] {
        &self.module_dependencies
    }
}

/// Index in `identifiers` before which the new entry is inserted
/// (`identifiers.len()` appends).
///
/// `identifiers` holds the normalized package of each existing entry, `None`
/// for entries that register nothing. `sentinels` are entries that component
/// insertion must keep after itself.
pub fn insertion_index(
    kind: InjectorKind,
    identifiers: &[Option<String>],
    context: &InjectionContext,
    sentinels: &[String],
) -> usize {
    let end = identifiers.len();
    let first_of = |names: &[String]| {
        identifiers
            .iter()
            .position(|id| id.as_ref().is_some_and(|id| names.contains(id)))
    };

    let before_sentinel = || first_of(sentinels).unwrap_or(end);
    let before_application = || first_of(context.application_modules()).unwrap_or_else(before_sentinel);

    match kind {
        InjectorKind::ConfigProvider | InjectorKind::Module => end,
        InjectorKind::Component => before_sentinel(),
        InjectorKind::BeforeApplicationModule => before_application(),
        InjectorKind::DependencyModule => {
            let dependencies = context.module_dependencies();
            identifiers
                .iter()
                .rposition(|id| id.as_ref().is_some_and(|id| dependencies.contains(id)))
                .map(|last| last + 1)
                .unwrap_or_else(|| {
                    if context.application_modules().is_empty() {
                        end
                    } else {
                        before_application()
                    }
                })
        }
    }
}
