//! Which known config targets an application actually has.

use crate::config::InjectorSettings;
use crate::injector::{ConfigInjector, ConfigTarget, InjectorChain};
use crate::php::{locate, PhpError};
use crate::safety::{ProjectGuard, SafetyError};
use std::fs;
use std::path::{Path, PathBuf};
use strsim::levenshtein;
use tracing::debug;

/// Largest edit distance, as a percentage of the name length, still offered
/// as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 40;

#[derive(Debug, Clone)]
pub struct ConfigDiscovery {
    project_root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The target's file exists and contains its anchor.
    ///
    /// A file whose array holds entries we cannot read still counts: the
    /// error is reported when the injector touches it.
    pub fn is_present(&self, target: ConfigTarget) -> bool {
        let path = self.project_root.join(target.relative_path());
        let Ok(content) = fs::read_to_string(&path) else {
            return false;
        };

        let present = !matches!(
            locate(&content, target.anchor()),
            Err(PhpError::AnchorNotFound { .. })
        );
        debug!(target_file = %target, present, "discovery");
        present
    }

    /// Present targets, in the given order.
    pub fn discover(&self, targets: impl IntoIterator<Item = ConfigTarget>) -> Vec<ConfigTarget> {
        targets
            .into_iter()
            .filter(|target| self.is_present(*target))
            .collect()
    }

    /// Injector chain over the present targets named by `settings`, with
    /// writes confined to the project.
    pub fn chain(&self, settings: &InjectorSettings) -> Result<InjectorChain, SafetyError> {
        let guard = ProjectGuard::new(&self.project_root)?;
        let injectors = self
            .discover(settings.active_targets())
            .into_iter()
            .map(|target| {
                ConfigInjector::new(target, &self.project_root)
                    .with_sentinels(settings.sentinels.iter().cloned())
                    .with_guard(guard.clone())
            })
            .collect();
        Ok(InjectorChain::new(injectors))
    }
}

/// Up to three `candidates` closest to `package`, nearest first.
pub fn closest_matches<'a>(package: &str, candidates: &'a [String]) -> Vec<&'a str> {
    let limit = (package.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
    let needle = package.to_lowercase();

    let mut scored: Vec<_> = candidates
        .iter()
        .map(|candidate| (candidate.as_str(), levenshtein(&needle, &candidate.to_lowercase())))
        .filter(|(_, distance)| *distance <= limit)
        .collect();
    scored.sort_by_key(|(_, distance)| *distance);
    scored.dedup_by_key(|(candidate, _)| *candidate);

    scored.into_iter().take(3).map(|(candidate, _)| candidate).collect()
}
