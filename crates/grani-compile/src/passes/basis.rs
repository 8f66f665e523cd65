//! Basis gate decomposition.
//!
//! Two linear rewrites: first every gate is lowered to the universal
//! working set {RZ, SX, X, CX}, then a target-specific pass maps that set
//! onto the device's native gates. Both are plain matches over the
//! operation tag; each arm appends its finite expansion.

use std::f64::consts::PI;

use tracing::warn;

use grani_ir::{Chip, Circuit, Gate, Op};

use crate::error::CompileResult;
use crate::pass::Pass;

/// Hardware families with distinct native gate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Superconducting, CX-native: {RZ, SX, X, CX}.
    Ibmq,
    /// Trapped-ion, Mølmer-Sørensen entangler: {RZ, RX, RY, RXX}.
    Ionq,
    /// Trapped-ion, ZZ entangler: {RZ, U, ZZ}.
    Quantinuum,
    /// Superconducting, CZ-native with RX/RZ singles.
    Rigetti,
    /// Superconducting, CZ-native with Hadamard wrappers.
    Quafu,
}

impl Target {
    /// All targets, in mode order.
    pub const ALL: [Target; 5] = [
        Target::Ibmq,
        Target::Ionq,
        Target::Quantinuum,
        Target::Rigetti,
        Target::Quafu,
    ];

    /// Lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Target::Ibmq => "ibmq",
            Target::Ionq => "ionq",
            Target::Quantinuum => "quantinuum",
            Target::Rigetti => "rigetti",
            Target::Quafu => "quafu",
        }
    }

    /// Parse a target name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Target::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rewrites every gate into the target's native basis.
pub struct BasisDecomposition {
    target: Target,
}

impl BasisDecomposition {
    /// Create a decomposition pass for the given target.
    pub fn new(target: Target) -> Self {
        Self { target }
    }
}

impl Pass for BasisDecomposition {
    fn name(&self) -> &'static str {
        "BasisDecomposition"
    }

    fn run(&self, circuit: &mut Circuit, _chip: &Chip) -> CompileResult<()> {
        let gates = circuit.take_gates();

        let mut universal = Vec::with_capacity(gates.len() * 2);
        for gate in &gates {
            lower_universal(gate, &mut universal);
        }

        let lowered = match self.target {
            Target::Ibmq => universal,
            target => {
                let mut native = Vec::with_capacity(universal.len() * 2);
                for gate in &universal {
                    lower_native(target, gate, &mut native);
                }
                native
            }
        };

        circuit.set_gates(lowered);
        Ok(())
    }
}

/// The five-gate Hadamard expansion over {X, SX, RZ}.
fn push_h(out: &mut Vec<Gate>, q: u32) {
    out.push(Gate::x(q));
    out.push(Gate::sx(q));
    out.push(Gate::rz(-PI / 2.0, q));
    out.push(Gate::sx(q));
    out.push(Gate::x(q));
}

/// Lower one gate to the universal working set {RZ, SX, X, CX}.
///
/// Gates already in the set (plus ID, MA and RESET) pass through; gates
/// with no rewrite rule pass through with a warning so a permissive
/// emitter can still serialize them.
#[allow(clippy::too_many_lines)]
fn lower_universal(gate: &Gate, out: &mut Vec<Gate>) {
    let q = gate.qubit;
    let theta = gate.theta;

    match (gate.op, gate.ctrl) {
        (Op::H, _) => push_h(out, q),
        (Op::T, _) => out.push(Gate::rz(PI / 4.0, q)),
        (Op::Tdg, _) => out.push(Gate::rz(-PI / 4.0, q)),
        (Op::S, _) => out.push(Gate::rz(PI / 2.0, q)),
        (Op::Sdg, _) => out.push(Gate::rz(-PI / 2.0, q)),
        (Op::Z, _) => out.push(Gate::rz(PI, q)),
        (Op::Y, _) => {
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI, q));
            out.push(Gate::sx(q));
            out.push(Gate::sx(q));
            out.push(Gate::sx(q));
        }
        (Op::Rx, _) => {
            push_h(out, q);
            out.push(Gate::rz(theta, q));
            push_h(out, q);
        }
        (Op::Ry, _) => {
            out.push(Gate::sx(q));
            out.push(Gate::rz(theta, q));
            out.push(Gate::sx(q));
            out.push(Gate::sx(q));
            out.push(Gate::sx(q));
        }
        (Op::Ri, _) => {
            out.push(Gate::rz(2.0 * theta, q));
            out.push(Gate::rz(PI, q));
        }
        (Op::P, _) => out.push(Gate::rz(theta, q)),
        (Op::U, _) => {
            if gate.lam != 0.0 {
                out.push(Gate::rz(gate.lam, q));
            }
            out.push(Gate::sx(q));
            out.push(Gate::rz(theta + PI, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(3.0 * PI + gate.phi, q));
        }

        (Op::CZ, Some(c)) => {
            push_h(out, q);
            out.push(Gate::cx(c, q));
            push_h(out, q);
        }
        (Op::CY, Some(c)) => {
            out.push(Gate::rz(-PI / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 2.0, q));
        }
        (Op::CH, Some(c)) => {
            out.push(Gate::rz(-PI, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(3.0 * PI / 4.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 4.0, q));
            out.push(Gate::sx(q));
        }
        (Op::CS, Some(c)) => {
            out.push(Gate::rz(PI / 4.0, c));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-PI / 4.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 4.0, q));
        }
        (Op::CSdg, Some(c)) => {
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::rz(PI / 4.0, c));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-PI / 4.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 4.0, q));
        }
        (Op::CT, Some(c)) => {
            out.push(Gate::rz(PI / 8.0, c));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-PI / 8.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 8.0, q));
        }
        (Op::CTdg, Some(c)) => {
            out.push(Gate::rz(-PI / 8.0, c));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 8.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-PI / 8.0, q));
        }
        (Op::CRx, Some(c)) => {
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::rz(theta / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-theta / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI / 2.0, q));
        }
        (Op::CRy, Some(c)) => {
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI + theta / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(3.0 * PI, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI - theta / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(3.0 * PI, q));
            out.push(Gate::cx(c, q));
        }
        (Op::CRz, Some(c)) => {
            out.push(Gate::rz(theta / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-theta / 2.0, q));
            out.push(Gate::cx(c, q));
        }
        (Op::CSX, Some(c)) => {
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::rz(PI / 4.0, c));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-PI / 4.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(3.0 * PI / 4.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI / 2.0, q));
        }
        (Op::CP, Some(c)) => {
            out.push(Gate::rz(theta / 2.0, c));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-theta / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(theta / 2.0, q));
        }
        (Op::CU, Some(c)) => {
            let (phi, lam) = (gate.phi, gate.lam);
            out.push(Gate::rz(gate.gamma, c));
            out.push(Gate::rz(lam / 2.0 + phi / 2.0, c));
            out.push(Gate::rz(lam / 2.0 - phi / 2.0, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-lam / 2.0 - phi / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI - theta / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(3.0 * PI, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(PI + theta / 2.0, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(3.0 * PI + phi, q));
        }
        (Op::RXX, Some(c)) => {
            for t in [q, c] {
                out.push(Gate::rz(PI / 2.0, t));
                out.push(Gate::sx(t));
                out.push(Gate::rz(PI / 2.0, t));
            }
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(theta, q));
            out.push(Gate::cx(c, q));
            for t in [q, c] {
                out.push(Gate::rz(PI / 2.0, t));
                out.push(Gate::sx(t));
                out.push(Gate::rz(PI / 2.0, t));
            }
        }
        (Op::RYY, Some(c)) => {
            out.push(Gate::sx(q));
            out.push(Gate::sx(c));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(theta, q));
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(-PI, q));
            out.push(Gate::sx(q));
            out.push(Gate::rz(-PI, q));
            out.push(Gate::rz(-PI, c));
            out.push(Gate::sx(c));
            out.push(Gate::rz(-PI, c));
        }
        (Op::RZZ, Some(c)) => {
            out.push(Gate::cx(c, q));
            out.push(Gate::rz(theta, q));
            out.push(Gate::cx(c, q));
        }
        (Op::Swap, Some(c)) => {
            out.push(Gate::cx(c, q));
            out.push(Gate::cx(q, c));
            out.push(Gate::cx(c, q));
        }

        (Op::CX, Some(_)) | (Op::Rz | Op::SX | Op::X | Op::I | Op::MA | Op::Reset, _) => {
            out.push(gate.clone());
        }

        _ => {
            warn!(op = gate.name(), "no universal decomposition, passing through");
            out.push(gate.clone());
        }
    }
}

/// Lower a gate of the universal working set onto a target's native basis.
///
/// ID, MA and RESET pass through everywhere; anything else without a rule
/// for the target passes through with a warning.
fn lower_native(target: Target, gate: &Gate, out: &mut Vec<Gate>) {
    let q = gate.qubit;

    match (target, gate.op, gate.ctrl) {
        (_, Op::Rz | Op::I | Op::MA | Op::Reset, _) => out.push(gate.clone()),

        (Target::Ionq | Target::Rigetti | Target::Quafu, Op::SX, _) => {
            out.push(Gate::rx(PI / 2.0, q));
        }
        (Target::Ionq | Target::Rigetti | Target::Quafu, Op::X, _) => {
            out.push(Gate::rx(PI, q));
        }
        (Target::Ionq, Op::CX, Some(c)) => {
            out.push(Gate::ry(PI / 2.0, q));
            out.push(Gate::rxx(PI / 2.0, c, q));
            out.push(Gate::rx(-PI / 2.0, c));
            out.push(Gate::rx(-PI / 2.0, q));
            out.push(Gate::ry(-PI / 2.0, q));
        }

        (Target::Quantinuum, Op::SX, _) => out.push(Gate::u(PI / 2.0, 0.0, 0.0, q)),
        (Target::Quantinuum, Op::X, _) => out.push(Gate::u(PI, 0.0, 0.0, q)),
        (Target::Quantinuum, Op::CX, Some(c)) => {
            out.push(Gate::u(-PI / 2.0, PI / 2.0, 0.0, q));
            out.push(Gate::zz(PI / 2.0, c, q));
            out.push(Gate::rz(-PI / 2.0, c));
            out.push(Gate::u(PI / 2.0, PI, 0.0, q));
            out.push(Gate::rz(-PI / 2.0, c));
        }

        (Target::Rigetti, Op::CX, Some(c)) => {
            out.push(Gate::rz(-PI / 2.0, q));
            out.push(Gate::rx(-PI / 2.0, q));
            out.push(Gate::rz(-PI / 2.0, q));
            out.push(Gate::cz(c, q));
            out.push(Gate::rz(-PI / 2.0, q));
            out.push(Gate::rx(-PI / 2.0, q));
            out.push(Gate::rz(-PI / 2.0, q));
        }

        (Target::Quafu, Op::CX, Some(c)) => {
            out.push(Gate::h(q));
            out.push(Gate::cz(c, q));
            out.push(Gate::h(q));
        }

        _ => {
            warn!(
                op = gate.name(),
                basis = target.name(),
                "no native decomposition, passing through"
            );
            out.push(gate.clone());
        }
    }
}
