//! The transpilation pipeline.

use tracing::{debug, info};

use grani_ir::{Chip, Circuit};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{BasisDecomposition, ExpandThreeQubit, SabreRouting, Target, UsageRemap};

/// Runs the full lowering pipeline against one target device.
///
/// Stages, in order: size guard, three-qubit pre-decomposition, optional
/// usage remap, SABRE routing, basis decomposition. Each pass owns the
/// circuit exclusively while it runs; nothing is written on error.
///
/// # Example
///
/// ```rust
/// use grani_compile::{Target, Transpiler};
/// use grani_ir::{Chip, Circuit};
///
/// let mut circuit = Circuit::new(2);
/// circuit.h(0).unwrap();
/// circuit.cx(0, 1).unwrap();
///
/// let chip = Chip::linear(3);
/// Transpiler::new(Target::Ibmq)
///     .with_seed(7)
///     .transpile(&mut circuit, &chip)
///     .unwrap();
///
/// assert!(!circuit.initial_mapping().is_empty());
/// ```
pub struct Transpiler {
    target: Target,
    seed: Option<u64>,
    remap: bool,
}

impl Transpiler {
    /// Create a pipeline for the given target.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            seed: None,
            remap: false,
        }
    }

    /// Fix the router's starting-layout seed for reproducible output.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable the usage-based qubit remap ahead of routing.
    #[must_use]
    pub fn with_remap(mut self, remap: bool) -> Self {
        self.remap = remap;
        self
    }

    /// Run every stage on `circuit` for `chip`.
    pub fn transpile(&self, circuit: &mut Circuit, chip: &Chip) -> CompileResult<()> {
        let n_qubits = circuit.num_qubits();
        if n_qubits > chip.num_qubits() {
            return Err(CompileError::ChipTooSmall {
                n_qubits,
                chip_qubit_num: chip.num_qubits(),
            });
        }

        info!(
            target = self.target.name(),
            qubits = n_qubits,
            gates = circuit.num_gates(),
            "transpiling"
        );

        let routing = match self.seed {
            Some(seed) => SabreRouting::with_seed(seed),
            None => SabreRouting::new(),
        };

        let mut passes: Vec<Box<dyn Pass>> = vec![Box::new(ExpandThreeQubit)];
        if self.remap {
            passes.push(Box::new(UsageRemap));
        }
        passes.push(Box::new(routing));
        passes.push(Box::new(BasisDecomposition::new(self.target)));

        for pass in &passes {
            debug!(pass = pass.name(), "running pass");
            pass.run(circuit, chip)?;
            debug!(pass = pass.name(), gates = circuit.num_gates(), "pass complete");
        }

        info!(gates = circuit.num_gates(), "transpilation complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_guard() {
        let chip = Chip::linear(2);
        let mut circuit = Circuit::new(5);
        let err = Transpiler::new(Target::Ibmq)
            .transpile(&mut circuit, &chip)
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::ChipTooSmall {
                n_qubits: 5,
                chip_qubit_num: 2
            }
        ));
    }

    #[test]
    fn test_empty_circuit_is_a_noop() {
        let chip = Chip::linear(3);
        let mut circuit = Circuit::new(3);
        Transpiler::new(Target::Ionq)
            .with_seed(3)
            .transpile(&mut circuit, &chip)
            .unwrap();
        assert!(circuit.is_empty());
    }
}
