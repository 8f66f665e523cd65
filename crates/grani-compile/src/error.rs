//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during transpilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The device has fewer qubits than the circuit needs.
    #[error(
        "Chip has {chip_qubit_num} qubits but the circuit needs {n_qubits}; \
         no transpilation performed"
    )]
    ChipTooSmall {
        /// Qubits required by the circuit.
        n_qubits: usize,
        /// Qubits available on the device.
        chip_qubit_num: usize,
    },

    /// The coupling graph has no path between a required pair.
    #[error("Coupling graph disconnected between physical qubits {} and {}", pair.0, pair.1)]
    Unroutable {
        /// The physical qubit pair with no connecting path.
        pair: (usize, usize),
    },

    /// An operation no pass knows how to handle.
    #[error("Unknown gate '{op_name}'")]
    UnknownGate {
        /// Name of the offending operation.
        op_name: String,
    },

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] grani_ir::IrError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
