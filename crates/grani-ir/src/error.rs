//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate references a qubit outside the circuit.
    #[error("Qubit {qubit} out of range for circuit with {n_qubits} qubits (gate: {gate})")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// The circuit size.
        n_qubits: usize,
        /// Name of the gate being appended.
        gate: &'static str,
    },

    /// A coupling edge references a qubit outside the device.
    #[error("Coupling endpoint {qubit} exceeds device size {num_qubits}")]
    EdgeOutOfRange {
        /// The offending physical qubit index.
        qubit: usize,
        /// The device size.
        num_qubits: usize,
    },

    /// Device config is syntactically valid JSON but semantically broken.
    #[error("Invalid device config: {0}")]
    InvalidDeviceConfig(String),

    /// Device config failed to parse as JSON.
    #[error("Failed to parse device config: {0}")]
    DeviceConfigJson(#[from] serde_json::Error),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
