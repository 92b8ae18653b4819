use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhpError {
    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { offset: usize, what: &'static str },

    #[error("unbalanced brackets at byte {offset}")]
    UnbalancedBrackets { offset: usize },

    #[error("no array literal found for {anchor}")]
    AnchorNotFound { anchor: String },

    #[error("empty array element at byte {offset}")]
    EmptyElement { offset: usize },

    #[error("unrecognized array element at byte {offset}: {text}")]
    UnrecognizedEntry { offset: usize, text: String },
}
