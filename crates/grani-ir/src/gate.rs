//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Operations with known semantics.
///
/// The set is closed: every gate the frontend accepts and every gate a
/// transpilation pass can produce is one of these tags. All dispatch in the
/// passes is a `match` on this enum; the human-readable spelling lives only
/// in [`Op::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    // Single-qubit Pauli gates
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,

    // Single-qubit rotation gates
    /// Global-phase rotation, `diag(1, e^{iθ})` scaled: U(0, 0, θ) with a Z twist.
    Ri,
    /// Rotation around X axis.
    Rx,
    /// Rotation around Y axis.
    Ry,
    /// Rotation around Z axis.
    Rz,
    /// Phase gate.
    P,
    /// Universal single-qubit gate U(θ, φ, λ).
    U,

    // Controlled two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// Controlled-S gate.
    CS,
    /// Controlled-S-dagger gate.
    CSdg,
    /// Controlled-T gate.
    CT,
    /// Controlled-T-dagger gate.
    CTdg,
    /// Controlled global-phase rotation.
    CRi,
    /// Controlled rotation around X.
    CRx,
    /// Controlled rotation around Y.
    CRy,
    /// Controlled rotation around Z.
    CRz,
    /// Controlled sqrt(X) gate.
    CSX,
    /// Controlled phase gate.
    CP,
    /// Controlled U gate, with a `gamma` phase on the control.
    CU,

    // Two-qubit interaction gates
    /// XX rotation gate.
    RXX,
    /// YY rotation gate.
    RYY,
    /// ZZ rotation gate.
    RZZ,
    /// Native ZZ interaction (trapped-ion targets).
    ZZ,
    /// SWAP gate.
    Swap,

    // Non-unitary and bookkeeping operations
    /// Identity gate.
    I,
    /// Single-qubit measurement.
    M,
    /// Measure-all marker.
    MA,
    /// Reset a qubit to |0⟩.
    Reset,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
    /// Relative-phase Toffoli.
    RCCX,
}

impl Op {
    /// Get the lowercase name of this operation.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Op::X => "x",
            Op::Y => "y",
            Op::Z => "z",
            Op::H => "h",
            Op::S => "s",
            Op::Sdg => "sdg",
            Op::T => "t",
            Op::Tdg => "tdg",
            Op::SX => "sx",
            Op::Ri => "ri",
            Op::Rx => "rx",
            Op::Ry => "ry",
            Op::Rz => "rz",
            Op::P => "p",
            Op::U => "u",
            Op::CX => "cx",
            Op::CY => "cy",
            Op::CZ => "cz",
            Op::CH => "ch",
            Op::CS => "cs",
            Op::CSdg => "csdg",
            Op::CT => "ct",
            Op::CTdg => "ctdg",
            Op::CRi => "cri",
            Op::CRx => "crx",
            Op::CRy => "cry",
            Op::CRz => "crz",
            Op::CSX => "csx",
            Op::CP => "cp",
            Op::CU => "cu",
            Op::RXX => "rxx",
            Op::RYY => "ryy",
            Op::RZZ => "rzz",
            Op::ZZ => "zz",
            Op::Swap => "swap",
            Op::I => "id",
            Op::M => "m",
            Op::MA => "ma",
            Op::Reset => "reset",
            Op::CCX => "ccx",
            Op::CSwap => "cswap",
            Op::RCCX => "rccx",
        }
    }

    /// Get the number of qubits this operation acts on.
    #[inline]
    pub fn num_qubits(self) -> u32 {
        match self {
            Op::X
            | Op::Y
            | Op::Z
            | Op::H
            | Op::S
            | Op::Sdg
            | Op::T
            | Op::Tdg
            | Op::SX
            | Op::Ri
            | Op::Rx
            | Op::Ry
            | Op::Rz
            | Op::P
            | Op::U
            | Op::I
            | Op::M
            | Op::MA
            | Op::Reset => 1,

            Op::CX
            | Op::CY
            | Op::CZ
            | Op::CH
            | Op::CS
            | Op::CSdg
            | Op::CT
            | Op::CTdg
            | Op::CRi
            | Op::CRx
            | Op::CRy
            | Op::CRz
            | Op::CSX
            | Op::CP
            | Op::CU
            | Op::RXX
            | Op::RYY
            | Op::RZZ
            | Op::ZZ
            | Op::Swap => 2,

            Op::CCX | Op::CSwap | Op::RCCX => 3,
        }
    }

    /// Get the number of angle parameters this operation carries.
    ///
    /// The emitter prints exactly this many, in `(θ[, φ[, λ[, γ]]])` order.
    #[inline]
    pub fn num_params(self) -> u32 {
        match self {
            Op::Ri
            | Op::Rx
            | Op::Ry
            | Op::Rz
            | Op::P
            | Op::CRi
            | Op::CRx
            | Op::CRy
            | Op::CRz
            | Op::CP
            | Op::RXX
            | Op::RYY
            | Op::RZZ
            | Op::ZZ => 1,
            Op::U => 3,
            Op::CU => 4,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One operation of a circuit.
///
/// A flat record: the operation tag, up to three qubit operands and up to
/// four angles. Two-qubit gates carry their second operand in `ctrl`,
/// three-qubit gates their third in `extra`; both are `None` below that
/// arity. Angles are interpreted modulo 4π and never normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The operation tag.
    pub op: Op,
    /// Primary (target) qubit index.
    pub qubit: u32,
    /// Control qubit index for arity ≥ 2.
    pub ctrl: Option<u32>,
    /// Third qubit index for arity 3.
    pub extra: Option<u32>,
    /// First angle parameter (0 when unused).
    pub theta: f64,
    /// Second angle parameter (0 when unused).
    pub phi: f64,
    /// Third angle parameter (0 when unused).
    pub lam: f64,
    /// Control-phase parameter of CU (0 when unused).
    pub gamma: f64,
    /// Measurement repetition count (only meaningful for MA).
    pub repetition: u32,
}

impl Gate {
    fn one_q(op: Op, qubit: u32) -> Self {
        Self {
            op,
            qubit,
            ctrl: None,
            extra: None,
            theta: 0.0,
            phi: 0.0,
            lam: 0.0,
            gamma: 0.0,
            repetition: 0,
        }
    }

    fn one_q_rot(op: Op, theta: f64, qubit: u32) -> Self {
        Self {
            theta,
            ..Self::one_q(op, qubit)
        }
    }

    fn two_q(op: Op, ctrl: u32, qubit: u32) -> Self {
        debug_assert_ne!(ctrl, qubit, "{op}: control equals target");
        Self {
            ctrl: Some(ctrl),
            ..Self::one_q(op, qubit)
        }
    }

    fn two_q_rot(op: Op, theta: f64, ctrl: u32, qubit: u32) -> Self {
        Self {
            theta,
            ..Self::two_q(op, ctrl, qubit)
        }
    }

    fn three_q(op: Op, a: u32, b: u32, c: u32) -> Self {
        debug_assert!(c != a && c != b, "{op}: repeated qubit operand");
        Self {
            extra: Some(c),
            ..Self::two_q(op, b, a)
        }
    }

    /// Pauli-X on `qubit`.
    pub fn x(qubit: u32) -> Self {
        Self::one_q(Op::X, qubit)
    }

    /// Pauli-Y on `qubit`.
    pub fn y(qubit: u32) -> Self {
        Self::one_q(Op::Y, qubit)
    }

    /// Pauli-Z on `qubit`.
    pub fn z(qubit: u32) -> Self {
        Self::one_q(Op::Z, qubit)
    }

    /// Hadamard on `qubit`.
    pub fn h(qubit: u32) -> Self {
        Self::one_q(Op::H, qubit)
    }

    /// S on `qubit`.
    pub fn s(qubit: u32) -> Self {
        Self::one_q(Op::S, qubit)
    }

    /// S-dagger on `qubit`.
    pub fn sdg(qubit: u32) -> Self {
        Self::one_q(Op::Sdg, qubit)
    }

    /// T on `qubit`.
    pub fn t(qubit: u32) -> Self {
        Self::one_q(Op::T, qubit)
    }

    /// T-dagger on `qubit`.
    pub fn tdg(qubit: u32) -> Self {
        Self::one_q(Op::Tdg, qubit)
    }

    /// sqrt(X) on `qubit`.
    pub fn sx(qubit: u32) -> Self {
        Self::one_q(Op::SX, qubit)
    }

    /// Identity on `qubit`.
    pub fn id(qubit: u32) -> Self {
        Self::one_q(Op::I, qubit)
    }

    /// Global-phase rotation RI(θ) on `qubit`.
    pub fn ri(theta: f64, qubit: u32) -> Self {
        Self::one_q_rot(Op::Ri, theta, qubit)
    }

    /// RX(θ) on `qubit`.
    pub fn rx(theta: f64, qubit: u32) -> Self {
        Self::one_q_rot(Op::Rx, theta, qubit)
    }

    /// RY(θ) on `qubit`.
    pub fn ry(theta: f64, qubit: u32) -> Self {
        Self::one_q_rot(Op::Ry, theta, qubit)
    }

    /// RZ(θ) on `qubit`.
    pub fn rz(theta: f64, qubit: u32) -> Self {
        Self::one_q_rot(Op::Rz, theta, qubit)
    }

    /// Phase gate P(θ) on `qubit`.
    pub fn p(theta: f64, qubit: u32) -> Self {
        Self::one_q_rot(Op::P, theta, qubit)
    }

    /// Universal single-qubit gate U(θ, φ, λ) on `qubit`.
    pub fn u(theta: f64, phi: f64, lam: f64, qubit: u32) -> Self {
        Self {
            phi,
            lam,
            ..Self::one_q_rot(Op::U, theta, qubit)
        }
    }

    /// U1(λ) = U(0, 0, λ).
    pub fn u1(lam: f64, qubit: u32) -> Self {
        Self::u(0.0, 0.0, lam, qubit)
    }

    /// U2(φ, λ) = U(π/2, φ, λ).
    pub fn u2(phi: f64, lam: f64, qubit: u32) -> Self {
        Self::u(PI / 2.0, phi, lam, qubit)
    }

    /// U3(θ, φ, λ) = U(θ, φ, λ).
    pub fn u3(theta: f64, phi: f64, lam: f64, qubit: u32) -> Self {
        Self::u(theta, phi, lam, qubit)
    }

    /// Single-qubit measurement of `qubit`.
    pub fn m(qubit: u32) -> Self {
        Self::one_q(Op::M, qubit)
    }

    /// Measure-all marker with a repetition count.
    pub fn ma(repetition: u32) -> Self {
        Self {
            repetition,
            ..Self::one_q(Op::MA, 0)
        }
    }

    /// Reset `qubit` to |0⟩.
    pub fn reset(qubit: u32) -> Self {
        Self::one_q(Op::Reset, qubit)
    }

    /// CX with control `ctrl` and target `qubit`.
    pub fn cx(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CX, ctrl, qubit)
    }

    /// CY with control `ctrl` and target `qubit`.
    pub fn cy(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CY, ctrl, qubit)
    }

    /// CZ with control `ctrl` and target `qubit`.
    pub fn cz(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CZ, ctrl, qubit)
    }

    /// CH with control `ctrl` and target `qubit`.
    pub fn ch(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CH, ctrl, qubit)
    }

    /// CS with control `ctrl` and target `qubit`.
    pub fn cs(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CS, ctrl, qubit)
    }

    /// CSDG with control `ctrl` and target `qubit`.
    pub fn csdg(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CSdg, ctrl, qubit)
    }

    /// CT with control `ctrl` and target `qubit`.
    pub fn ct(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CT, ctrl, qubit)
    }

    /// CTDG with control `ctrl` and target `qubit`.
    pub fn ctdg(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CTdg, ctrl, qubit)
    }

    /// Controlled RI(θ).
    pub fn cri(theta: f64, ctrl: u32, qubit: u32) -> Self {
        Self::two_q_rot(Op::CRi, theta, ctrl, qubit)
    }

    /// Controlled RX(θ).
    pub fn crx(theta: f64, ctrl: u32, qubit: u32) -> Self {
        Self::two_q_rot(Op::CRx, theta, ctrl, qubit)
    }

    /// Controlled RY(θ).
    pub fn cry(theta: f64, ctrl: u32, qubit: u32) -> Self {
        Self::two_q_rot(Op::CRy, theta, ctrl, qubit)
    }

    /// Controlled RZ(θ).
    pub fn crz(theta: f64, ctrl: u32, qubit: u32) -> Self {
        Self::two_q_rot(Op::CRz, theta, ctrl, qubit)
    }

    /// Controlled sqrt(X).
    pub fn csx(ctrl: u32, qubit: u32) -> Self {
        Self::two_q(Op::CSX, ctrl, qubit)
    }

    /// Controlled phase CP(θ).
    pub fn cp(theta: f64, ctrl: u32, qubit: u32) -> Self {
        Self::two_q_rot(Op::CP, theta, ctrl, qubit)
    }

    /// Controlled U(θ, φ, λ) with control phase γ.
    pub fn cu(theta: f64, phi: f64, lam: f64, gamma: f64, ctrl: u32, qubit: u32) -> Self {
        Self {
            phi,
            lam,
            gamma,
            ..Self::two_q_rot(Op::CU, theta, ctrl, qubit)
        }
    }

    /// RXX(θ) on the pair (`a`, `b`).
    pub fn rxx(theta: f64, a: u32, b: u32) -> Self {
        Self::two_q_rot(Op::RXX, theta, a, b)
    }

    /// RYY(θ) on the pair (`a`, `b`).
    pub fn ryy(theta: f64, a: u32, b: u32) -> Self {
        Self::two_q_rot(Op::RYY, theta, a, b)
    }

    /// RZZ(θ) on the pair (`a`, `b`).
    pub fn rzz(theta: f64, a: u32, b: u32) -> Self {
        Self::two_q_rot(Op::RZZ, theta, a, b)
    }

    /// Native ZZ(θ) interaction on the pair (`a`, `b`).
    pub fn zz(theta: f64, a: u32, b: u32) -> Self {
        Self::two_q_rot(Op::ZZ, theta, a, b)
    }

    /// SWAP of `a` and `b`.
    pub fn swap(a: u32, b: u32) -> Self {
        Self::two_q(Op::Swap, a, b)
    }

    /// Toffoli with controls `a`, `b` and target `c`.
    pub fn ccx(a: u32, b: u32, c: u32) -> Self {
        Self::three_q(Op::CCX, a, b, c)
    }

    /// Fredkin: control `a`, swapped pair `b`, `c`.
    pub fn cswap(a: u32, b: u32, c: u32) -> Self {
        Self::three_q(Op::CSwap, a, b, c)
    }

    /// Relative-phase Toffoli with controls `a`, `b` and target `c`.
    pub fn rccx(a: u32, b: u32, c: u32) -> Self {
        Self::three_q(Op::RCCX, a, b, c)
    }

    /// Number of qubit operands (1, 2 or 3).
    #[inline]
    pub fn arity(&self) -> u32 {
        1 + u32::from(self.ctrl.is_some()) + u32::from(self.extra.is_some())
    }

    /// Get the lowercase name of the operation.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    /// The angle parameters this gate carries, in emission order.
    pub fn params(&self) -> Vec<f64> {
        match self.op.num_params() {
            0 => vec![],
            1 => vec![self.theta],
            3 => vec![self.theta, self.phi, self.lam],
            _ => vec![self.theta, self.phi, self.lam, self.gamma],
        }
    }
}
