//! QASM 2 emitter for serializing circuits.

use std::fmt::Write as _;

use grani_ir::{Circuit, Op};

/// Emit a circuit as OpenQASM 2 source code.
///
/// Gate lines come out lowercase, one per gate, measure-all markers
/// skipped. Measurement statements are regenerated from the classical
/// registers: each bound bit measures `q[initial_mapping[i]]`, where `i`
/// runs across all registers in name order, so a routed circuit measures
/// the physical qubit its logical qubit was placed on. An unrouted
/// circuit falls back to the recorded qubit itself.
pub fn emit(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new();
    emitter.emit_circuit(circuit);
    emitter.output
}

struct Emitter {
    output: String,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");

        // Routed gates address physical qubits, which can sit past the
        // logical count on a larger device; size the register to cover
        // every index actually referenced.
        let mut size = circuit.num_qubits();
        for gate in circuit.gates() {
            for q in [Some(gate.qubit), gate.ctrl, gate.extra].into_iter().flatten() {
                size = size.max(q as usize + 1);
            }
        }
        for &p in circuit.initial_mapping() {
            size = size.max(p as usize + 1);
        }
        if size > 0 {
            self.writeln(&format!("qreg q[{size}];"));
        }

        for (name, creg) in circuit.cregs() {
            self.writeln(&format!(
                "creg {}[{}];",
                name.to_ascii_lowercase(),
                creg.width
            ));
        }

        for gate in circuit.gates() {
            if gate.op == Op::MA {
                continue;
            }
            self.emit_gate(gate);
        }

        let mapping = circuit.initial_mapping();
        let mut creg_index = 0usize;
        for (name, creg) in circuit.cregs() {
            for (bit, bound) in creg.qubits.iter().enumerate() {
                let Some(qubit) = bound else { continue };
                let physical = mapping.get(creg_index).copied().unwrap_or(*qubit);
                self.writeln(&format!(
                    "measure q[{physical}] -> {}[{bit}];",
                    name.to_ascii_lowercase()
                ));
                creg_index += 1;
            }
        }
    }

    fn emit_gate(&mut self, gate: &grani_ir::Gate) {
        let mut line = String::from(gate.name());

        let params = gate.params();
        if !params.is_empty() {
            line.push('(');
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    line.push(',');
                }
                let _ = write!(line, "{p}");
            }
            line.push(')');
        }

        line.push(' ');
        match (gate.ctrl, gate.extra) {
            (Some(ctrl), Some(extra)) => {
                let _ = write!(line, "q[{}],q[{ctrl}],q[{extra}]", gate.qubit);
            }
            (Some(ctrl), None) => {
                let _ = write!(line, "q[{ctrl}],q[{}]", gate.qubit);
            }
            _ => {
                let _ = write!(line, "q[{}]", gate.qubit);
            }
        }
        line.push(';');
        self.writeln(&line);
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grani_ir::Gate;
    use std::f64::consts::PI;

    #[test]
    fn test_emit_bell() {
        let mut circuit = Circuit::new(2);
        circuit.h(0).unwrap();
        circuit.cx(0, 1).unwrap();
        circuit.add_creg("c", 2);
        circuit.bind_measure("c", 0, 0);
        circuit.bind_measure("c", 1, 1);

        let qasm = emit(&circuit);
        assert!(qasm.contains("OPENQASM 2.0;"));
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.contains("creg c[2];"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0],q[1];"));
        assert!(qasm.contains("measure q[0] -> c[0];"));
        assert!(qasm.contains("measure q[1] -> c[1];"));
    }

    #[test]
    fn test_emit_params() {
        let mut circuit = Circuit::new(1);
        circuit.rz(0.5, 0).unwrap();
        circuit.push(Gate::u(0.1, 0.2, 0.3, 0)).unwrap();

        let qasm = emit(&circuit);
        assert!(qasm.contains("rz(0.5) q[0];"));
        assert!(qasm.contains("u(0.1,0.2,0.3) q[0];"));
    }

    #[test]
    fn test_measure_follows_mapping() {
        let mut circuit = Circuit::new(2);
        circuit.add_creg("c", 2);
        circuit.bind_measure("c", 0, 0);
        circuit.bind_measure("c", 1, 1);
        circuit.set_initial_mapping(vec![2, 0]);

        let qasm = emit(&circuit);
        assert!(qasm.contains("qreg q[3];"));
        assert!(qasm.contains("measure q[2] -> c[0];"));
        assert!(qasm.contains("measure q[0] -> c[1];"));
    }

    #[test]
    fn test_ma_is_skipped() {
        let mut circuit = Circuit::new(1);
        circuit.push(Gate::ma(1024)).unwrap();
        let qasm = emit(&circuit);
        assert!(!qasm.contains("ma"));
    }
}
