//! Error types for the Hack assembler

use thiserror::Error;

/// Errors that can occur while translating a Hack program. Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("Line {line} could not be parsed: {source_line}")]
    MalformedLine { line: usize, source_line: String },

    #[error("Line {line}: label {label} was already declared")]
    DuplicateLabel { label: String, line: usize },

    #[error("Line {line}: address {value} does not fit in 15 bits")]
    OperandOutOfRange { value: String, line: usize },

    #[error("Line {line}: {mnemonic:?} is not a valid {kind} mnemonic")]
    UnknownMnemonic {
        kind: &'static str,
        mnemonic: String,
        line: usize,
    },

    #[error("Line {line}: no address left for variable {name}")]
    VariableSpaceExhausted { name: String, line: usize },

    #[error("Too many instructions, expected a maximum of 32768, got {count}")]
    ProgramTooLarge { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for assembler operations
pub type Result<T> = std::result::Result<T, AssemblerError>;
