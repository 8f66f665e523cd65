//! The circuit container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::creg::Creg;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, Op};

/// An ordered sequence of gates over a fixed number of qubits.
///
/// The circuit is the single owner of its gate list; passes borrow it
/// mutably and replace the sequence wholesale with [`set_gates`].
/// Classical registers are carried by name for the frontend and emitter.
/// `initial_mapping` is empty until the router populates it with the
/// logical→physical layout in effect for the first emitted gate.
///
/// [`set_gates`]: Circuit::set_gates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    n_qubits: usize,
    gates: Vec<Gate>,
    cregs: BTreeMap<String, Creg>,
    initial_mapping: Vec<u32>,
}

impl Circuit {
    /// Create an empty circuit over `n_qubits` qubits.
    pub fn new(n_qubits: usize) -> Self {
        Self {
            n_qubits,
            gates: Vec::new(),
            cregs: BTreeMap::new(),
            initial_mapping: Vec::new(),
        }
    }

    /// Number of qubits, fixed at construction.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Number of gates currently in the sequence.
    #[inline]
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Whether the gate sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a gate, validating its qubit operands.
    pub fn push(&mut self, gate: Gate) -> IrResult<()> {
        for q in [Some(gate.qubit), gate.ctrl, gate.extra].into_iter().flatten() {
            if q as usize >= self.n_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit: q,
                    n_qubits: self.n_qubits,
                    gate: gate.name(),
                });
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Read-only view of the gate sequence, in execution order.
    #[inline]
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Replace the gate sequence.
    ///
    /// Used by passes that rewrite the whole circuit; the replacement is
    /// trusted to reference valid qubit indices (physical indices after
    /// routing may legitimately exceed `n_qubits`).
    pub fn set_gates(&mut self, gates: Vec<Gate>) {
        self.gates = gates;
    }

    /// Take the gate sequence, leaving the circuit empty.
    pub fn take_gates(&mut self) -> Vec<Gate> {
        std::mem::take(&mut self.gates)
    }

    /// Declare a classical register.
    pub fn add_creg(&mut self, name: impl Into<String>, width: usize) {
        self.cregs.insert(name.into(), Creg::new(width));
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&Creg> {
        self.cregs.get(name)
    }

    /// Record that bit `index` of register `name` measures `qubit`.
    pub fn bind_measure(&mut self, name: &str, index: usize, qubit: u32) {
        if let Some(creg) = self.cregs.get_mut(name) {
            creg.bind(index, qubit);
        }
    }

    /// Iterate classical registers in name order.
    pub fn cregs(&self) -> impl Iterator<Item = (&str, &Creg)> {
        self.cregs.iter().map(|(name, creg)| (name.as_str(), creg))
    }

    /// The logical→physical layout set by the router (empty before routing).
    #[inline]
    pub fn initial_mapping(&self) -> &[u32] {
        &self.initial_mapping
    }

    /// Set the logical→physical layout.
    pub fn set_initial_mapping(&mut self, mapping: Vec<u32>) {
        self.initial_mapping = mapping;
    }

    /// Per-operation gate counts, in name order.
    pub fn gate_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for gate in &self.gates {
            *counts.entry(gate.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Count gates with the given operation tag.
    pub fn count_op(&self, op: Op) -> usize {
        self.gates.iter().filter(|g| g.op == op).count()
    }

    // Convenience appenders for common gates.

    /// Append a Pauli-X.
    pub fn x(&mut self, qubit: u32) -> IrResult<()> {
        self.push(Gate::x(qubit))
    }

    /// Append a Hadamard.
    pub fn h(&mut self, qubit: u32) -> IrResult<()> {
        self.push(Gate::h(qubit))
    }

    /// Append a sqrt(X).
    pub fn sx(&mut self, qubit: u32) -> IrResult<()> {
        self.push(Gate::sx(qubit))
    }

    /// Append an RX rotation.
    pub fn rx(&mut self, theta: f64, qubit: u32) -> IrResult<()> {
        self.push(Gate::rx(theta, qubit))
    }

    /// Append an RY rotation.
    pub fn ry(&mut self, theta: f64, qubit: u32) -> IrResult<()> {
        self.push(Gate::ry(theta, qubit))
    }

    /// Append an RZ rotation.
    pub fn rz(&mut self, theta: f64, qubit: u32) -> IrResult<()> {
        self.push(Gate::rz(theta, qubit))
    }

    /// Append a CX.
    pub fn cx(&mut self, ctrl: u32, qubit: u32) -> IrResult<()> {
        self.push(Gate::cx(ctrl, qubit))
    }

    /// Append a CZ.
    pub fn cz(&mut self, ctrl: u32, qubit: u32) -> IrResult<()> {
        self.push(Gate::cz(ctrl, qubit))
    }

    /// Append a SWAP.
    pub fn swap(&mut self, a: u32, b: u32) -> IrResult<()> {
        self.push(Gate::swap(a, b))
    }

    /// Append a Toffoli.
    pub fn ccx(&mut self, a: u32, b: u32, c: u32) -> IrResult<()> {
        self.push(Gate::ccx(a, b, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_validates_bounds() {
        let mut circuit = Circuit::new(2);
        circuit.h(0).unwrap();
        circuit.cx(0, 1).unwrap();
        assert_eq!(circuit.num_gates(), 2);

        let err = circuit.cx(0, 2).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { qubit: 2, .. }));
    }

    #[test]
    fn test_creg_bindings() {
        let mut circuit = Circuit::new(2);
        circuit.add_creg("c", 2);
        circuit.bind_measure("c", 0, 0);
        circuit.bind_measure("c", 1, 1);

        let creg = circuit.creg("c").unwrap();
        assert_eq!(creg.width, 2);
        assert_eq!(creg.bound_qubits().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_gate_counts() {
        let mut circuit = Circuit::new(3);
        circuit.h(0).unwrap();
        circuit.h(1).unwrap();
        circuit.cx(0, 1).unwrap();

        let counts = circuit.gate_counts();
        assert_eq!(counts.get("h"), Some(&2));
        assert_eq!(counts.get("cx"), Some(&1));
        assert_eq!(circuit.count_op(Op::H), 2);
    }
}
