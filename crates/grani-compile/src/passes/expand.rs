//! Pre-decomposition of three-qubit gates.

use std::f64::consts::PI;

use grani_ir::{Chip, Circuit, Gate, Op};

use crate::error::CompileResult;
use crate::pass::Pass;

/// Rewrites every three-qubit gate into one- and two-qubit gates.
///
/// Runs before routing, which only understands arity ≤ 2. The expansions
/// are fixed algebraic identities; gates of arity ≤ 2 pass through
/// untouched, so the pass is idempotent.
pub struct ExpandThreeQubit;

impl Pass for ExpandThreeQubit {
    fn name(&self) -> &'static str {
        "ExpandThreeQubit"
    }

    fn run(&self, circuit: &mut Circuit, _chip: &Chip) -> CompileResult<()> {
        let gates = circuit.take_gates();
        let mut expanded = Vec::with_capacity(gates.len());

        for gate in gates {
            match (gate.op, gate.ctrl, gate.extra) {
                (Op::CCX, Some(b), Some(c)) => expand_ccx(gate.qubit, b, c, &mut expanded),
                (Op::CSwap, Some(b), Some(c)) => expand_cswap(gate.qubit, b, c, &mut expanded),
                (Op::RCCX, Some(b), Some(c)) => expand_rccx(gate.qubit, b, c, &mut expanded),
                _ => expanded.push(gate),
            }
        }

        circuit.set_gates(expanded);
        Ok(())
    }
}

/// Toffoli over controls `a`, `b` and target `c`: the 15-gate T/H/CX network.
fn expand_ccx(a: u32, b: u32, c: u32, out: &mut Vec<Gate>) {
    out.push(Gate::h(c));
    out.push(Gate::cx(b, c));
    out.push(Gate::tdg(c));
    out.push(Gate::cx(a, c));
    out.push(Gate::t(c));
    out.push(Gate::cx(b, c));
    out.push(Gate::tdg(c));
    out.push(Gate::cx(a, c));
    out.push(Gate::t(b));
    out.push(Gate::t(c));
    out.push(Gate::h(c));
    out.push(Gate::cx(a, b));
    out.push(Gate::t(a));
    out.push(Gate::tdg(b));
    out.push(Gate::cx(a, b));
}

/// Fredkin: CX-conjugated Toffoli.
fn expand_cswap(a: u32, b: u32, c: u32, out: &mut Vec<Gate>) {
    out.push(Gate::cx(c, b));
    expand_ccx(a, b, c, out);
    out.push(Gate::cx(c, b));
}

/// Relative-phase Toffoli: U/CX network on the target, phases ±π/4.
fn expand_rccx(a: u32, b: u32, c: u32, out: &mut Vec<Gate>) {
    out.push(Gate::u(PI / 2.0, 0.0, PI, c));
    out.push(Gate::u(0.0, 0.0, PI / 4.0, c));
    out.push(Gate::cx(b, c));
    out.push(Gate::u(0.0, 0.0, -PI / 4.0, c));
    out.push(Gate::cx(a, c));
    out.push(Gate::u(0.0, 0.0, PI / 4.0, c));
    out.push(Gate::cx(b, c));
    out.push(Gate::u(0.0, 0.0, -PI / 4.0, c));
    out.push(Gate::u(PI / 2.0, 0.0, PI, c));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_pass(circuit: &mut Circuit) {
        let chip = Chip::full(circuit.num_qubits());
        ExpandThreeQubit.run(circuit, &chip).unwrap();
    }

    fn signature(circuit: &Circuit) -> Vec<(Op, u32, Option<u32>)> {
        circuit
            .gates()
            .iter()
            .map(|g| (g.op, g.qubit, g.ctrl))
            .collect()
    }

    #[test]
    fn test_ccx_expansion() {
        let mut circuit = Circuit::new(3);
        circuit.ccx(0, 1, 2).unwrap();
        run_pass(&mut circuit);

        let expected = vec![
            (Op::H, 2, None),
            (Op::CX, 2, Some(1)),
            (Op::Tdg, 2, None),
            (Op::CX, 2, Some(0)),
            (Op::T, 2, None),
            (Op::CX, 2, Some(1)),
            (Op::Tdg, 2, None),
            (Op::CX, 2, Some(0)),
            (Op::T, 1, None),
            (Op::T, 2, None),
            (Op::H, 2, None),
            (Op::CX, 1, Some(0)),
            (Op::T, 0, None),
            (Op::Tdg, 1, None),
            (Op::CX, 1, Some(0)),
        ];
        assert_eq!(signature(&circuit), expected);
    }

    #[test]
    fn test_cswap_expansion() {
        let mut circuit = Circuit::new(3);
        circuit.push(Gate::cswap(0, 1, 2)).unwrap();
        run_pass(&mut circuit);

        // CX(c,b) · [15-gate CCX] · CX(c,b)
        assert_eq!(circuit.num_gates(), 17);
        let gates = circuit.gates();
        assert_eq!((gates[0].op, gates[0].ctrl, gates[0].qubit), (Op::CX, Some(2), 1));
        assert_eq!((gates[16].op, gates[16].ctrl, gates[16].qubit), (Op::CX, Some(2), 1));
        assert_eq!(gates[1].op, Op::H);
    }

    #[test]
    fn test_rccx_expansion() {
        let mut circuit = Circuit::new(3);
        circuit.push(Gate::rccx(0, 1, 2)).unwrap();
        run_pass(&mut circuit);

        assert_eq!(circuit.num_gates(), 9);
        let gates = circuit.gates();
        assert_eq!(gates[0], Gate::u(PI / 2.0, 0.0, PI, 2));
        assert_eq!(gates[1], Gate::u(0.0, 0.0, PI / 4.0, 2));
        assert_eq!((gates[2].op, gates[2].ctrl), (Op::CX, Some(1)));
        assert_eq!((gates[4].op, gates[4].ctrl), (Op::CX, Some(0)));
        assert_eq!(gates[8], Gate::u(PI / 2.0, 0.0, PI, 2));
    }

    #[test]
    fn test_no_arity_three_after_pass() {
        let mut circuit = Circuit::new(4);
        circuit.h(0).unwrap();
        circuit.ccx(0, 1, 2).unwrap();
        circuit.push(Gate::cswap(1, 2, 3)).unwrap();
        circuit.push(Gate::rccx(0, 2, 3)).unwrap();
        circuit.cx(0, 3).unwrap();
        run_pass(&mut circuit);

        assert!(circuit.gates().iter().all(|g| g.arity() <= 2));
    }

    #[test]
    fn test_idempotent() {
        let mut circuit = Circuit::new(3);
        circuit.ccx(0, 1, 2).unwrap();
        circuit.cx(0, 1).unwrap();
        run_pass(&mut circuit);
        let once = circuit.gates().to_vec();
        run_pass(&mut circuit);
        assert_eq!(circuit.gates(), &once[..]);
    }
}
