use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// Broad classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    Internal,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unexpected character {ch:?} at byte {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },

    #[error("invalid integer literal `{raw}`: {source}")]
    InvalidInteger {
        raw: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("{expected}, found {found}")]
    Syntax { expected: String, found: String },

    #[error("identifier `{name}` is already declared")]
    DuplicateIdentifier { name: String },

    #[error("undeclared identifier `{name}`")]
    UndeclaredIdentifier { name: String },

    #[error("internal error: pop with empty stack")]
    StackUnderflow,

    #[error("internal error: slot {slot} of `{name}` is not below stack height {height}")]
    SlotAboveStackTop {
        name: String,
        slot: usize,
        height: usize,
    },
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnexpectedCharacter { .. } | CompileError::InvalidInteger { .. } => {
                ErrorKind::Lexical
            }
            CompileError::Syntax { .. } => ErrorKind::Syntax,
            CompileError::DuplicateIdentifier { .. } | CompileError::UndeclaredIdentifier { .. } => {
                ErrorKind::Semantic
            }
            CompileError::StackUnderflow | CompileError::SlotAboveStackTop { .. } => {
                ErrorKind::Internal
            }
        }
    }
}
