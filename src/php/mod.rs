//! Text-level view of PHP configuration arrays.
//!
//! This is not a PHP parser. It recognizes the handful of shapes that
//! hand-written and generated config files use: a bracketed list of quoted
//! names, `Name::class` references and `new Name(...)` instances.

pub mod codec;
pub mod errors;
pub mod matcher;
pub mod scanner;
pub mod style;

pub use codec::{unquote, EntryFormat};
pub use errors::PhpError;
pub use matcher::{locate, Anchor, ArrayLiteral, Entry, EntryExpr};
pub use style::{ArrayStyle, LineEnding, QuoteStyle};
