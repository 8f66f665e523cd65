//! Grani Transpilation Passes
//!
//! Lowers a logical circuit onto target hardware in three mandatory stages
//! plus one optional one:
//!
//! ```text
//! Input Circuit
//!       │
//!       ├── ExpandThreeQubit     CCX / CSWAP / RCCX → 1- and 2-qubit gates
//!       ├── UsageRemap           (optional) pack quiet qubits at low indices
//!       ├── SabreRouting         layout + SWAP insertion on the coupling graph
//!       └── BasisDecomposition   rewrite into the target's native gate set
//!       │
//!       ▼
//! Output Circuit (hardware-compatible, physical qubit indices)
//! ```
//!
//! [`Transpiler`] wires the stages together; each stage is also exposed as
//! a standalone [`Pass`] for callers that need finer control.
//!
//! # Example
//!
//! ```rust
//! use grani_compile::{Target, Transpiler};
//! use grani_ir::{Chip, Circuit};
//!
//! let mut circuit = Circuit::new(3);
//! circuit.h(0).unwrap();
//! circuit.cx(0, 2).unwrap();
//!
//! let chip = Chip::linear(5);
//! Transpiler::new(Target::Quafu)
//!     .with_seed(11)
//!     .transpile(&mut circuit, &chip)
//!     .unwrap();
//!
//! // every two-qubit gate now acts on a coupled pair
//! for gate in circuit.gates() {
//!     if let Some(ctrl) = gate.ctrl {
//!         assert!(chip.is_adjacent(ctrl as usize, gate.qubit as usize));
//!     }
//! }
//! ```

pub mod error;
pub mod pass;
pub mod passes;
pub mod transpiler;

pub use error::{CompileError, CompileResult};
pub use pass::Pass;
pub use passes::{BasisDecomposition, ExpandThreeQubit, SabreRouting, Target, UsageRemap};
pub use transpiler::Transpiler;
