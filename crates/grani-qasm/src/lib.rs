//! Grani OpenQASM 2 Frontend and Emitter
//!
//! Turns OpenQASM 2 source into a [`grani_ir::Circuit`] and back.
//!
//! The frontend handles the full OpenQASM 2 surface the transpiler cares
//! about: register declarations, the default gate set, user gate
//! definitions (inlined at call sites), whole-register broadcast,
//! `measure`/`reset`/`barrier`, parse-time-evaluated `if` conditions, and
//! parameter expressions over `pi`, `sin` and `cos`.
//!
//! # Example
//!
//! ```rust
//! let circuit = grani_qasm::parse(r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let qasm = grani_qasm::emit(&circuit);
//! assert!(qasm.contains("cx q[0],q[1];"));
//! ```

pub mod ast;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod parser;

pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_ast};
