//! Error types for the QASM frontend.

use thiserror::Error;

/// Errors that can occur during parsing or lowering.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at position {position}: {message}")]
    LexerError { position: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Undefined register, parameter or qubit name.
    #[error("Undefined identifier: {0}")]
    UndefinedIdentifier(String),

    /// Register or gate declared twice.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Gate name not in the default set and not user-defined.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Wrong number of qubit arguments.
    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Index past the end of a register.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// Broadcast over registers of unequal widths.
    #[error("Mismatched register widths in broadcast: {0}")]
    BroadcastMismatch(String),

    /// The program declares more qubits than the measurement path supports.
    #[error("Program declares {count} qubits, the maximum is {max}")]
    TooManyQubits { count: usize, max: usize },

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] grani_ir::IrError),

    /// Generic parse error.
    #[error("Parse error: {0}")]
    Generic(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
