//! Usage-based logical qubit remapping.

use grani_ir::{Chip, Circuit};

use crate::error::CompileResult;
use crate::pass::Pass;

/// How many low indices are reserved for the least-used qubits. A GPU warp
/// of 32 threads spans 5 qubits of state, so packing the quiet qubits into
/// indices 0..4 reduces warp divergence when the output is simulated.
const PIVOT: usize = 5;

/// Permutes logical qubits so the five least-used ones occupy indices 0..4
/// and the rest fill the high end.
///
/// Consults no device information; intended to run before routing. When an
/// `initial_mapping` is already present it is composed with the
/// permutation so the layout keeps describing the same physical placement.
pub struct UsageRemap;

impl Pass for UsageRemap {
    fn name(&self) -> &'static str {
        "UsageRemap"
    }

    fn run(&self, circuit: &mut Circuit, _chip: &Chip) -> CompileResult<()> {
        let n_qubits = circuit.num_qubits();
        if n_qubits == 0 {
            return Ok(());
        }

        let mut usage = vec![0usize; n_qubits];
        for gate in circuit.gates() {
            for q in [Some(gate.qubit), gate.ctrl, gate.extra].into_iter().flatten() {
                if (q as usize) < n_qubits {
                    usage[q as usize] += 1;
                }
            }
        }

        // Sort qubits by ascending usage; the sort is stable, so ties keep
        // index order and the pass is deterministic.
        let mut by_usage: Vec<usize> = (0..n_qubits).collect();
        by_usage.sort_by_key(|&q| usage[q]);

        let pivot = PIVOT.min(n_qubits);
        let mut perm = vec![0u32; n_qubits];
        #[allow(clippy::cast_possible_truncation)]
        for (rank, &qubit) in by_usage.iter().enumerate() {
            let target = if rank < pivot {
                rank
            } else {
                n_qubits - 1 - (rank - pivot)
            };
            perm[qubit] = target as u32;
        }

        let mut gates = circuit.take_gates();
        for gate in &mut gates {
            gate.qubit = perm[gate.qubit as usize];
            gate.ctrl = gate.ctrl.map(|c| perm[c as usize]);
            gate.extra = gate.extra.map(|e| perm[e as usize]);
        }
        circuit.set_gates(gates);

        // Relabel the layout's logical side: the physical seat of old
        // logical l is now the seat of perm[l].
        if !circuit.initial_mapping().is_empty() {
            let old = circuit.initial_mapping().to_vec();
            let mut composed = vec![0u32; old.len()];
            for (logical, &physical) in old.iter().enumerate() {
                composed[perm[logical] as usize] = physical;
            }
            circuit.set_initial_mapping(composed);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grani_ir::Op;

    fn usage_of(circuit: &Circuit) -> Vec<usize> {
        let mut usage = vec![0usize; circuit.num_qubits()];
        for gate in circuit.gates() {
            for q in [Some(gate.qubit), gate.ctrl, gate.extra].into_iter().flatten() {
                usage[q as usize] += 1;
            }
        }
        usage
    }

    #[test]
    fn test_least_used_move_to_front() {
        let chip = Chip::full(8);
        let mut circuit = Circuit::new(8);
        // qubits 5, 6, 7 are the busy ones
        for _ in 0..4 {
            circuit.cx(5, 6).unwrap();
            circuit.h(7).unwrap();
        }
        circuit.h(0).unwrap();

        let before = usage_of(&circuit);
        UsageRemap.run(&mut circuit, &chip).unwrap();
        let after = usage_of(&circuit);

        // busiest qubits end up at the high indices
        let mut sorted_before = before.clone();
        sorted_before.sort_unstable();
        assert_eq!(&after[..5], &sorted_before[..5]);
        assert!(after[7] >= after[6]);
        assert_eq!(
            before.iter().sum::<usize>(),
            after.iter().sum::<usize>(),
            "remapping must not add or drop gate operands"
        );
    }

    #[test]
    fn test_composition_stays_a_permutation() {
        let chip = Chip::full(6);
        let mut circuit = Circuit::new(6);
        circuit.cx(0, 1).unwrap();
        circuit.cx(0, 2).unwrap();
        circuit.set_initial_mapping(vec![3, 4, 5, 0, 1, 2]);

        UsageRemap.run(&mut circuit, &chip).unwrap();

        let mut mapping = circuit.initial_mapping().to_vec();
        mapping.sort_unstable();
        assert_eq!(mapping, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_small_circuit_unchanged_shape() {
        let chip = Chip::full(3);
        let mut circuit = Circuit::new(3);
        circuit.cx(0, 1).unwrap();
        UsageRemap.run(&mut circuit, &chip).unwrap();

        assert_eq!(circuit.num_gates(), 1);
        assert_eq!(circuit.gates()[0].op, Op::CX);
        let g = &circuit.gates()[0];
        assert_ne!(g.ctrl.unwrap(), g.qubit);
    }
}
