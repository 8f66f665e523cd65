//! Grani Circuit Intermediate Representation
//!
//! Core data structures shared by every stage of the Grani transpiler:
//! the gate and circuit model the frontend produces, and the device model
//! the routing and translation passes consume.
//!
//! # Core Components
//!
//! - **Operations and gates**: [`Op`] is the closed set of operation tags;
//!   [`Gate`] is a flat record of one operation with its qubit operands and
//!   angles.
//! - **Circuit**: [`Circuit`] owns the gate sequence (insertion order is
//!   execution order), the name-keyed classical registers, and the
//!   logical→physical `initial_mapping` the router fills in.
//! - **Device**: [`Chip`] is the coupling graph of the target hardware with
//!   a precomputed all-pairs distance matrix.
//!
//! # Example: Building a Bell pair
//!
//! ```rust
//! use grani_ir::Circuit;
//!
//! let mut circuit = Circuit::new(2);
//! circuit.h(0).unwrap();
//! circuit.cx(0, 1).unwrap();
//!
//! assert_eq!(circuit.num_gates(), 2);
//! ```
//!
//! # Example: Loading a device
//!
//! ```rust
//! use grani_ir::Chip;
//!
//! let chip = Chip::from_device_json(
//!     r#"{"num_qubits": 3, "cx_coupling": ["0_1", "1_2"]}"#,
//!     None,
//! ).unwrap();
//!
//! assert_eq!(chip.distance(0, 2), 2);
//! ```

pub mod chip;
pub mod circuit;
pub mod creg;
pub mod error;
pub mod gate;

pub use chip::{Chip, UNREACHABLE};
pub use circuit::Circuit;
pub use creg::Creg;
pub use error::{IrError, IrResult};
pub use gate::{Gate, Op};
