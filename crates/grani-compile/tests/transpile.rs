//! End-to-end pipeline tests: routing invariants and full lowering.

use grani_compile::{ExpandThreeQubit, Pass, SabreRouting, Target, Transpiler};
use grani_ir::{Chip, Circuit, Gate, Op};

/// Logical (ctrl, qubit) pairs of the two-qubit gates, in order.
fn logical_pairs(circuit: &Circuit) -> Vec<(u32, u32)> {
    circuit
        .gates()
        .iter()
        .filter(|g| g.ctrl.is_some() && g.op != Op::MA)
        .map(|g| (g.ctrl.unwrap(), g.qubit))
        .collect()
}

/// Replay the routed output against the initial mapping, recovering the
/// logical pair behind every emitted two-qubit gate.
///
/// Panics if an emitted gate acts on a physical qubit that hosts no
/// logical qubit, i.e. if the SWAP trail does not account for the layout.
fn replay_routed(circuit: &Circuit, chip: &Chip) -> Vec<(u32, u32)> {
    let mut p2l: Vec<Option<u32>> = vec![None; chip.num_qubits()];
    for (logical, &physical) in circuit.initial_mapping().iter().enumerate() {
        p2l[physical as usize] = Some(logical as u32);
    }

    let mut recovered = Vec::new();
    for gate in circuit.gates() {
        let Some(ctrl) = gate.ctrl else { continue };
        let (pc, pq) = (ctrl as usize, gate.qubit as usize);
        if gate.op == Op::Swap {
            p2l.swap(pc, pq);
        } else {
            let lc = p2l[pc].expect("control hosts a logical qubit");
            let lq = p2l[pq].expect("target hosts a logical qubit");
            recovered.push((lc, lq));
        }
    }
    recovered
}

/// A small but non-trivial workload: mixed singles, crossing two-qubit
/// gates, and a Toffoli.
fn workload(n_qubits: usize) -> Circuit {
    let mut circuit = Circuit::new(n_qubits);
    circuit.h(0).unwrap();
    circuit.h(1).unwrap();
    circuit.cx(0, 3).unwrap();
    circuit.rz(0.25, 3).unwrap();
    circuit.cx(1, 2).unwrap();
    circuit.ccx(0, 1, 4).unwrap();
    circuit.cx(3, 4).unwrap();
    circuit.rx(0.5, 2).unwrap();
    circuit.cx(2, 0).unwrap();
    circuit.cz(1, 3).unwrap();
    circuit.x(4).unwrap();
    circuit
}

/// Expand and route the workload; return the circuit before basis lowering.
fn route_workload(chip: &Chip, seed: u64) -> Circuit {
    let mut circuit = workload(5);
    ExpandThreeQubit.run(&mut circuit, chip).unwrap();
    let reference_pairs = logical_pairs(&circuit);
    SabreRouting::with_seed(seed).run(&mut circuit, chip).unwrap();

    // soundness: replaying the SWAP trail recovers exactly the input
    // two-qubit gates, respecting per-qubit order
    let recovered = replay_routed(&circuit, chip);
    let mut sorted_recovered = recovered.clone();
    let mut sorted_reference = reference_pairs.clone();
    sorted_recovered.sort_unstable();
    sorted_reference.sort_unstable();
    assert_eq!(sorted_recovered, sorted_reference, "seed {seed}");

    for q in 0..5u32 {
        let per_qubit = |pairs: &[(u32, u32)]| {
            pairs
                .iter()
                .filter(|&&(a, b)| a == q || b == q)
                .copied()
                .collect::<Vec<_>>()
        };
        assert_eq!(
            per_qubit(&recovered),
            per_qubit(&reference_pairs),
            "gate order on qubit {q} not preserved (seed {seed})"
        );
    }

    circuit
}

#[test]
fn routed_two_qubit_gates_are_adjacent() {
    let chip = Chip::linear(6);
    for seed in 0..6 {
        let circuit = route_workload(&chip, seed);
        for gate in circuit.gates() {
            if let Some(ctrl) = gate.ctrl {
                assert!(
                    chip.is_adjacent(ctrl as usize, gate.qubit as usize),
                    "seed {seed}: {} on non-coupled pair ({ctrl}, {})",
                    gate.name(),
                    gate.qubit
                );
            }
        }
    }
}

#[test]
fn routed_indices_stay_on_chip() {
    let chip = Chip::star(7);
    for seed in 0..6 {
        let circuit = route_workload(&chip, seed);
        for gate in circuit.gates() {
            for q in [Some(gate.qubit), gate.ctrl, gate.extra].into_iter().flatten() {
                assert!((q as usize) < chip.num_qubits());
            }
        }
    }
}

#[test]
fn initial_mapping_is_a_permutation() {
    let chip = Chip::linear(8);
    for seed in 0..6 {
        let circuit = route_workload(&chip, seed);
        let mapping = circuit.initial_mapping();
        assert_eq!(mapping.len(), 5);
        let mut seen = vec![false; chip.num_qubits()];
        for &p in mapping {
            assert!(!seen[p as usize], "duplicate physical qubit {p}");
            seen[p as usize] = true;
        }
    }
}

#[test]
fn routing_is_deterministic_for_a_seed() {
    let chip = Chip::linear(6);
    let a = route_workload(&chip, 42);
    let b = route_workload(&chip, 42);
    assert_eq!(a.gates(), b.gates());
    assert_eq!(a.initial_mapping(), b.initial_mapping());
}

#[test]
fn distant_cx_on_linear_chain() {
    // A lone CX over distance 2: the warm-up rounds converge on an
    // adjacent placement, so the kept round needs no SWAP at all.
    let chip = Chip::linear(3);
    for seed in 0..8 {
        let mut circuit = Circuit::new(3);
        circuit.cx(0, 2).unwrap();
        SabreRouting::with_seed(seed).run(&mut circuit, &chip).unwrap();

        let cx_gates: Vec<&Gate> = circuit.gates().iter().filter(|g| g.op == Op::CX).collect();
        assert_eq!(cx_gates.len(), 1);
        for gate in circuit.gates() {
            let ctrl = gate.ctrl.unwrap();
            assert!(chip.is_adjacent(ctrl as usize, gate.qubit as usize));
        }

        let mut mapping = circuit.initial_mapping().to_vec();
        mapping.sort_unstable();
        assert_eq!(mapping, vec![0, 1, 2]);

        assert_eq!(replay_routed(&circuit, &chip), vec![(0, 2)]);
    }
}

#[test]
fn full_pipeline_ibmq_basis_closure() {
    let chip = Chip::linear(6);
    let mut circuit = workload(5);
    Transpiler::new(Target::Ibmq)
        .with_seed(5)
        .transpile(&mut circuit, &chip)
        .unwrap();

    for gate in circuit.gates() {
        assert!(
            matches!(gate.op, Op::Rz | Op::SX | Op::X | Op::CX | Op::I | Op::MA | Op::Reset),
            "unexpected op {} after ibmq lowering",
            gate.name()
        );
        if let Some(ctrl) = gate.ctrl {
            assert!(chip.is_adjacent(ctrl as usize, gate.qubit as usize));
        }
    }
}

#[test]
fn full_pipeline_ionq_basis_closure() {
    let chip = Chip::linear(6);
    let mut circuit = workload(5);
    Transpiler::new(Target::Ionq)
        .with_seed(5)
        .transpile(&mut circuit, &chip)
        .unwrap();

    for gate in circuit.gates() {
        assert!(
            matches!(gate.op, Op::Rz | Op::Rx | Op::Ry | Op::RXX | Op::I | Op::MA | Op::Reset),
            "unexpected op {} after ionq lowering",
            gate.name()
        );
    }
}

#[test]
fn full_pipeline_quafu_keeps_couplings() {
    let chip = Chip::star(6);
    let mut circuit = workload(5);
    Transpiler::new(Target::Quafu)
        .with_seed(9)
        .transpile(&mut circuit, &chip)
        .unwrap();

    for gate in circuit.gates() {
        if let Some(ctrl) = gate.ctrl {
            assert!(chip.is_adjacent(ctrl as usize, gate.qubit as usize));
        }
    }
}

#[test]
fn remap_then_route_composes() {
    use grani_compile::UsageRemap;

    let chip = Chip::linear(6);
    let mut circuit = workload(5);
    ExpandThreeQubit.run(&mut circuit, &chip).unwrap();
    UsageRemap.run(&mut circuit, &chip).unwrap();
    let reference_pairs = logical_pairs(&circuit);
    SabreRouting::with_seed(3).run(&mut circuit, &chip).unwrap();

    let mut recovered = replay_routed(&circuit, &chip);
    let mut reference = reference_pairs;
    recovered.sort_unstable();
    reference.sort_unstable();
    assert_eq!(recovered, reference);
}
