//! Pass trait for transpilation passes.

use grani_ir::{Chip, Circuit};

use crate::error::CompileResult;

/// A transpilation pass that rewrites a circuit for a target device.
///
/// Passes are the unit of work in the pipeline: each one owns the circuit
/// exclusively while it runs and replaces the gate sequence wholesale.
/// Device-independent passes ignore the chip argument.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Run the pass on the given circuit.
    fn run(&self, circuit: &mut Circuit, chip: &Chip) -> CompileResult<()>;
}
