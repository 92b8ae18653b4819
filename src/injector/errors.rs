use crate::injector::kind::InjectorKind;
use crate::php::PhpError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InjectorError {
    #[error("malformed config file {}: {source}", file.display())]
    MalformedConfigFile {
        file: PathBuf,
        #[source]
        source: PhpError,
    },

    /// The injector cannot handle this kind; callers try the next injector.
    #[error("{target} does not accept {kind} entries")]
    UnsupportedInjectorType { kind: InjectorKind, target: String },

    #[error("config file does not exist: {}", file.display())]
    MissingConfigFile { file: PathBuf },

    /// Blank file for a target that has no skeleton to start from.
    #[error("config file is empty: {}", file.display())]
    EmptyConfigFile { file: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("edit error: {0}")]
    Edit(#[from] crate::edit::EditError),

    #[error("unsafe config path: {0}")]
    Safety(#[from] crate::safety::SafetyError),
}

impl InjectorError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, InjectorError::UnsupportedInjectorType { .. })
    }
}
