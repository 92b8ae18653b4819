//! Package entries in application config files.
//!
//! A [`ConfigInjector`] owns one config file. It reads the file, finds the
//! array the target registers packages in, plans a single [`Edit`] and
//! writes it. [`InjectorChain`] routes each kind to the first file that
//! accepts it.
//!
//! [`Edit`]: crate::edit::Edit

pub mod chain;
pub mod config_file;
pub mod config_injector;
pub mod errors;
pub mod io;
pub mod kind;
pub mod mutation;
pub mod placement;
pub mod target;

pub use chain::InjectorChain;
pub use config_file::ConfigFile;
pub use config_injector::{
    ConfigInjector, InjectPlan, InjectResult, Preview, RemovePlan, RemoveResult,
    DEFAULT_SENTINEL,
};
pub use errors::InjectorError;
pub use io::{BufferedIo, ConsoleIo, HostIo, NullIo};
pub use kind::InjectorKind;
pub use mutation::{delete_entry, plan_delete, plan_splice, splice};
pub use placement::{insertion_index, InjectionContext};
pub use target::ConfigTarget;
