//! Lowering from the AST to the circuit IR.
//!
//! Registers are laid out at a running global offset in declaration order.
//! User gate definitions are inlined at every call site with parameter and
//! qubit substitution. Measure statements record creg bindings only; no
//! gate enters the sequence for them.

use std::f64::consts::PI;

use rustc_hash::FxHashMap;

use grani_ir::{Circuit, Gate};

use crate::ast::{BinOp, BitRef, Expr, GateCall, GateDef, Program, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};

/// The measurement path packs outcomes into a 64-bit word, one bit per
/// qubit plus a sign bit.
const MAX_QUBITS: usize = 63;

/// Inlining depth bound; honest programs nest a handful of levels.
const MAX_EXPANSION_DEPTH: usize = 64;

struct RegInfo {
    offset: usize,
    width: usize,
}

/// One resolved quantum operand: a fixed qubit or a broadcast register.
enum Operand {
    Single(u32),
    Spread { offset: usize, width: usize },
}

pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut qregs: FxHashMap<String, RegInfo> = FxHashMap::default();
    let mut cregs: FxHashMap<String, usize> = FxHashMap::default();
    let mut gate_defs: FxHashMap<String, &GateDef> = FxHashMap::default();
    let mut offset = 0usize;

    for statement in &program.statements {
        match statement {
            Statement::QregDecl { name, width } => {
                if qregs.contains_key(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                qregs.insert(
                    name.clone(),
                    RegInfo {
                        offset,
                        width: *width,
                    },
                );
                offset += width;
            }
            Statement::CregDecl { name, width } => {
                if cregs.contains_key(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                cregs.insert(name.clone(), *width);
            }
            Statement::GateDef(def) => {
                if gate_defs.contains_key(&def.name) {
                    return Err(ParseError::DuplicateDeclaration(def.name.clone()));
                }
                gate_defs.insert(def.name.clone(), def);
            }
            _ => {}
        }
    }

    if offset > MAX_QUBITS {
        return Err(ParseError::TooManyQubits {
            count: offset,
            max: MAX_QUBITS,
        });
    }

    let mut circuit = Circuit::new(offset);
    for (name, &width) in &cregs {
        circuit.add_creg(name.clone(), width);
    }

    let lowerer = Lowerer {
        qregs,
        cregs,
        gate_defs,
    };
    for statement in &program.statements {
        lowerer.lower_statement(statement, &mut circuit)?;
    }

    Ok(circuit)
}

struct Lowerer<'a> {
    qregs: FxHashMap<String, RegInfo>,
    cregs: FxHashMap<String, usize>,
    gate_defs: FxHashMap<String, &'a GateDef>,
}

impl Lowerer<'_> {
    fn lower_statement(&self, statement: &Statement, circuit: &mut Circuit) -> ParseResult<()> {
        match statement {
            Statement::QregDecl { .. }
            | Statement::CregDecl { .. }
            | Statement::GateDef(_)
            | Statement::Barrier(_) => Ok(()),

            Statement::GateCall(call) => {
                let mut gates = Vec::new();
                self.expand_call(call, &FxHashMap::default(), &FxHashMap::default(), 0, &mut gates)?;
                for gate in gates {
                    circuit.push(gate)?;
                }
                Ok(())
            }

            Statement::Measure { qubit, target } => self.lower_measure(qubit, target, circuit),

            Statement::Reset(qubit) => {
                for q in self.resolve_spread(qubit)? {
                    circuit.push(Gate::reset(q))?;
                }
                Ok(())
            }

            Statement::If { creg, value, body } => {
                let register = circuit
                    .creg(creg)
                    .ok_or_else(|| ParseError::UndefinedIdentifier(creg.clone()))?;
                if register.value == *value {
                    for inner in body {
                        self.lower_statement(inner, circuit)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn lower_measure(
        &self,
        qubit: &QubitRef,
        target: &BitRef,
        circuit: &mut Circuit,
    ) -> ParseResult<()> {
        match (qubit, target) {
            (QubitRef::Indexed { register, index }, BitRef::Indexed { register: creg, index: bit }) => {
                let q = self.resolve_indexed(register, *index)?;
                let width = self.creg_width(creg)?;
                if *bit >= width {
                    return Err(ParseError::IndexOutOfBounds {
                        register: creg.clone(),
                        index: *bit,
                        size: width,
                    });
                }
                circuit.bind_measure(creg, *bit, q);
                Ok(())
            }
            (QubitRef::Whole { register }, BitRef::Whole { register: creg }) => {
                let info = self.qreg(register)?;
                let width = self.creg_width(creg)?;
                if info.width != width {
                    return Err(ParseError::BroadcastMismatch(format!(
                        "measure {register} -> {creg} over widths {} and {width}",
                        info.width
                    )));
                }
                for i in 0..info.width {
                    #[allow(clippy::cast_possible_truncation)]
                    circuit.bind_measure(creg, i, (info.offset + i) as u32);
                }
                Ok(())
            }
            _ => Err(ParseError::BroadcastMismatch(
                "measure must pair a qubit with a bit or a register with a register".into(),
            )),
        }
    }

    fn qreg(&self, name: &str) -> ParseResult<&RegInfo> {
        self.qregs
            .get(name)
            .ok_or_else(|| ParseError::UndefinedIdentifier(name.to_string()))
    }

    fn creg_width(&self, name: &str) -> ParseResult<usize> {
        self.cregs
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UndefinedIdentifier(name.to_string()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn resolve_indexed(&self, register: &str, index: usize) -> ParseResult<u32> {
        let info = self.qreg(register)?;
        if index >= info.width {
            return Err(ParseError::IndexOutOfBounds {
                register: register.to_string(),
                index,
                size: info.width,
            });
        }
        Ok((info.offset + index) as u32)
    }

    /// Resolve a quantum operand at statement level into concrete qubits.
    #[allow(clippy::cast_possible_truncation)]
    fn resolve_spread(&self, qubit: &QubitRef) -> ParseResult<Vec<u32>> {
        match qubit {
            QubitRef::Indexed { register, index } => Ok(vec![self.resolve_indexed(register, *index)?]),
            QubitRef::Whole { register } => {
                let info = self.qreg(register)?;
                Ok((0..info.width).map(|i| (info.offset + i) as u32).collect())
            }
        }
    }

    /// Expand one gate application into concrete gates, inlining user
    /// definitions and broadcasting whole-register operands.
    fn expand_call(
        &self,
        call: &GateCall,
        param_env: &FxHashMap<String, f64>,
        qubit_env: &FxHashMap<String, u32>,
        depth: usize,
        out: &mut Vec<Gate>,
    ) -> ParseResult<()> {
        if depth > MAX_EXPANSION_DEPTH {
            return Err(ParseError::Generic(format!(
                "gate '{}' expands too deep (recursive definition?)",
                call.name
            )));
        }

        let params = call
            .params
            .iter()
            .map(|e| eval_expr(e, param_env))
            .collect::<ParseResult<Vec<f64>>>()?;

        // Resolve operands; a whole register spreads the call over its width.
        let mut operands = Vec::with_capacity(call.args.len());
        let mut spread_width: Option<usize> = None;
        for arg in &call.args {
            let operand = match arg {
                QubitRef::Whole { register } if qubit_env.contains_key(register) => {
                    Operand::Single(qubit_env[register])
                }
                QubitRef::Whole { register } => {
                    let info = self.qreg(register)?;
                    match spread_width {
                        Some(w) if w != info.width => {
                            return Err(ParseError::BroadcastMismatch(format!(
                                "register widths {w} and {} in '{}'",
                                info.width, call.name
                            )));
                        }
                        _ => spread_width = Some(info.width),
                    }
                    Operand::Spread {
                        offset: info.offset,
                        width: info.width,
                    }
                }
                QubitRef::Indexed { register, index } => {
                    Operand::Single(self.resolve_indexed(register, *index)?)
                }
            };
            operands.push(operand);
        }

        for i in 0..spread_width.unwrap_or(1) {
            #[allow(clippy::cast_possible_truncation)]
            let qubits: Vec<u32> = operands
                .iter()
                .map(|operand| match operand {
                    Operand::Single(q) => *q,
                    Operand::Spread { offset, .. } => (offset + i) as u32,
                })
                .collect();
            self.apply_gate(call, &params, &qubits, depth, out)?;
        }

        Ok(())
    }

    /// Apply a gate by name to concrete qubits.
    fn apply_gate(
        &self,
        call: &GateCall,
        params: &[f64],
        qubits: &[u32],
        depth: usize,
        out: &mut Vec<Gate>,
    ) -> ParseResult<()> {
        if let Some(def) = self.gate_defs.get(&call.name) {
            if params.len() != def.params.len() {
                return Err(ParseError::WrongParameterCount {
                    gate: call.name.clone(),
                    expected: def.params.len(),
                    got: params.len(),
                });
            }
            if qubits.len() != def.qubits.len() {
                return Err(ParseError::WrongQubitCount {
                    gate: call.name.clone(),
                    expected: def.qubits.len(),
                    got: qubits.len(),
                });
            }

            let param_env: FxHashMap<String, f64> = def
                .params
                .iter()
                .cloned()
                .zip(params.iter().copied())
                .collect();
            let qubit_env: FxHashMap<String, u32> = def
                .qubits
                .iter()
                .cloned()
                .zip(qubits.iter().copied())
                .collect();

            for inner in &def.body {
                self.expand_call(inner, &param_env, &qubit_env, depth + 1, out)?;
            }
            return Ok(());
        }

        out.push(builtin_gate(&call.name, params, qubits)?);
        Ok(())
    }
}

/// Build a gate of the default set.
#[allow(clippy::too_many_lines)]
fn builtin_gate(name: &str, params: &[f64], qubits: &[u32]) -> ParseResult<Gate> {
    let arity_check = |expected_params: usize, expected_qubits: usize| -> ParseResult<()> {
        if params.len() != expected_params {
            return Err(ParseError::WrongParameterCount {
                gate: name.to_string(),
                expected: expected_params,
                got: params.len(),
            });
        }
        if qubits.len() != expected_qubits {
            return Err(ParseError::WrongQubitCount {
                gate: name.to_string(),
                expected: expected_qubits,
                got: qubits.len(),
            });
        }
        for (i, a) in qubits.iter().enumerate() {
            if qubits[..i].contains(a) {
                return Err(ParseError::Generic(format!(
                    "duplicate qubit operand q[{a}] in '{name}'"
                )));
            }
        }
        Ok(())
    };

    let lower = name.to_ascii_lowercase();
    let gate = match lower.as_str() {
        "u" | "u3" => {
            arity_check(3, 1)?;
            Gate::u(params[0], params[1], params[2], qubits[0])
        }
        "u2" => {
            arity_check(2, 1)?;
            Gate::u2(params[0], params[1], qubits[0])
        }
        "u1" => {
            arity_check(1, 1)?;
            Gate::u1(params[0], qubits[0])
        }
        "p" => {
            arity_check(1, 1)?;
            Gate::p(params[0], qubits[0])
        }
        "ri" => {
            arity_check(1, 1)?;
            Gate::ri(params[0], qubits[0])
        }
        "rx" => {
            arity_check(1, 1)?;
            Gate::rx(params[0], qubits[0])
        }
        "ry" => {
            arity_check(1, 1)?;
            Gate::ry(params[0], qubits[0])
        }
        "rz" => {
            arity_check(1, 1)?;
            Gate::rz(params[0], qubits[0])
        }
        "x" => {
            arity_check(0, 1)?;
            Gate::x(qubits[0])
        }
        "y" => {
            arity_check(0, 1)?;
            Gate::y(qubits[0])
        }
        "z" => {
            arity_check(0, 1)?;
            Gate::z(qubits[0])
        }
        "h" => {
            arity_check(0, 1)?;
            Gate::h(qubits[0])
        }
        "s" => {
            arity_check(0, 1)?;
            Gate::s(qubits[0])
        }
        "sdg" => {
            arity_check(0, 1)?;
            Gate::sdg(qubits[0])
        }
        "t" => {
            arity_check(0, 1)?;
            Gate::t(qubits[0])
        }
        "tdg" => {
            arity_check(0, 1)?;
            Gate::tdg(qubits[0])
        }
        "sx" => {
            arity_check(0, 1)?;
            Gate::sx(qubits[0])
        }
        "id" => {
            arity_check(0, 1)?;
            Gate::id(qubits[0])
        }
        "cx" => {
            arity_check(0, 2)?;
            Gate::cx(qubits[0], qubits[1])
        }
        "cy" => {
            arity_check(0, 2)?;
            Gate::cy(qubits[0], qubits[1])
        }
        "cz" => {
            arity_check(0, 2)?;
            Gate::cz(qubits[0], qubits[1])
        }
        "ch" => {
            arity_check(0, 2)?;
            Gate::ch(qubits[0], qubits[1])
        }
        "cs" => {
            arity_check(0, 2)?;
            Gate::cs(qubits[0], qubits[1])
        }
        "csdg" => {
            arity_check(0, 2)?;
            Gate::csdg(qubits[0], qubits[1])
        }
        "ct" => {
            arity_check(0, 2)?;
            Gate::ct(qubits[0], qubits[1])
        }
        "ctdg" => {
            arity_check(0, 2)?;
            Gate::ctdg(qubits[0], qubits[1])
        }
        "csx" => {
            arity_check(0, 2)?;
            Gate::csx(qubits[0], qubits[1])
        }
        "swap" => {
            arity_check(0, 2)?;
            Gate::swap(qubits[0], qubits[1])
        }
        "cri" => {
            arity_check(1, 2)?;
            Gate::cri(params[0], qubits[0], qubits[1])
        }
        "crx" => {
            arity_check(1, 2)?;
            Gate::crx(params[0], qubits[0], qubits[1])
        }
        "cry" => {
            arity_check(1, 2)?;
            Gate::cry(params[0], qubits[0], qubits[1])
        }
        "crz" => {
            arity_check(1, 2)?;
            Gate::crz(params[0], qubits[0], qubits[1])
        }
        "cp" | "cu1" => {
            arity_check(1, 2)?;
            Gate::cp(params[0], qubits[0], qubits[1])
        }
        "cu3" => {
            arity_check(3, 2)?;
            Gate::cu(params[0], params[1], params[2], 0.0, qubits[0], qubits[1])
        }
        "cu" => {
            arity_check(4, 2)?;
            Gate::cu(params[0], params[1], params[2], params[3], qubits[0], qubits[1])
        }
        "rxx" => {
            arity_check(1, 2)?;
            Gate::rxx(params[0], qubits[0], qubits[1])
        }
        "ryy" => {
            arity_check(1, 2)?;
            Gate::ryy(params[0], qubits[0], qubits[1])
        }
        "rzz" => {
            arity_check(1, 2)?;
            Gate::rzz(params[0], qubits[0], qubits[1])
        }
        "zz" => {
            arity_check(1, 2)?;
            Gate::zz(params[0], qubits[0], qubits[1])
        }
        "ccx" => {
            arity_check(0, 3)?;
            Gate::ccx(qubits[0], qubits[1], qubits[2])
        }
        "cswap" => {
            arity_check(0, 3)?;
            Gate::cswap(qubits[0], qubits[1], qubits[2])
        }
        "rccx" => {
            arity_check(0, 3)?;
            Gate::rccx(qubits[0], qubits[1], qubits[2])
        }
        _ => return Err(ParseError::UnknownGate(name.to_string())),
    };
    Ok(gate)
}

/// Evaluate a parameter expression to a float.
fn eval_expr(expr: &Expr, env: &FxHashMap<String, f64>) -> ParseResult<f64> {
    match expr {
        #[allow(clippy::cast_precision_loss)]
        Expr::Int(v) => Ok(*v as f64),
        Expr::Float(v) => Ok(*v),
        Expr::Pi => Ok(PI),
        Expr::Ident(name) => env
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone())),
        Expr::Neg(inner) => Ok(-eval_expr(inner, env)?),
        Expr::BinOp { op, left, right } => {
            let l = eval_expr(left, env)?;
            let r = eval_expr(right, env)?;
            Ok(match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Pow => l.powf(r),
            })
        }
        Expr::FnCall { name, arg } => {
            let value = eval_expr(arg, env)?;
            match name.as_str() {
                "sin" => Ok(value.sin()),
                "cos" => Ok(value.cos()),
                _ => Err(ParseError::Generic(format!("unknown function '{name}'"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::error::ParseError;
    use grani_ir::Op;

    #[test]
    fn test_user_gate_inlined() {
        let source = r"
            OPENQASM 2.0;
            qreg q[2];
            gate bellpair a, b {
                h a;
                cx a, b;
            }
            bellpair q[0], q[1];
        ";

        let circuit = parse(source).unwrap();
        let ops: Vec<Op> = circuit.gates().iter().map(|g| g.op).collect();
        assert_eq!(ops, vec![Op::H, Op::CX]);
        assert_eq!(circuit.gates()[1].ctrl, Some(0));
    }

    #[test]
    fn test_user_gate_with_params() {
        let source = r"
            OPENQASM 2.0;
            qreg q[1];
            gate halfturn(t) a {
                rz(t/2) a;
            }
            halfturn(pi) q[0];
        ";

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.gates()[0].op, Op::Rz);
        assert!((circuit.gates()[0].theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_nested_user_gates() {
        let source = r"
            OPENQASM 2.0;
            qreg q[3];
            gate pair a, b { cx a, b; }
            gate chain a, b, c { pair a, b; pair b, c; }
            chain q[0], q[1], q[2];
        ";

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_gates(), 2);
        assert_eq!(circuit.gates()[1].ctrl, Some(1));
        assert_eq!(circuit.gates()[1].qubit, 2);
    }

    #[test]
    fn test_broadcast() {
        let source = r"
            OPENQASM 2.0;
            qreg q[3];
            h q;
        ";

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_gates(), 3);
        assert!(circuit.gates().iter().all(|g| g.op == Op::H));
    }

    #[test]
    fn test_if_runs_on_matching_value() {
        let source = r"
            OPENQASM 2.0;
            qreg q[1];
            creg c[1];
            if (c == 0) x q[0];
            if (c == 1) h q[0];
        ";

        // cregs read as zero, so only the first branch lands
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_gates(), 1);
        assert_eq!(circuit.gates()[0].op, Op::X);
    }

    #[test]
    fn test_qubit_cap() {
        let source = "OPENQASM 2.0; qreg a[40]; qreg b[30];";
        assert!(matches!(
            parse(source),
            Err(ParseError::TooManyQubits { count: 70, .. })
        ));
    }

    #[test]
    fn test_unknown_gate() {
        let source = "OPENQASM 2.0; qreg q[1]; warp q[0];";
        assert!(matches!(parse(source), Err(ParseError::UnknownGate(_))));
    }

    #[test]
    fn test_duplicate_operand_rejected() {
        let source = "OPENQASM 2.0; qreg q[2]; cx q[0], q[0];";
        assert!(parse(source).is_err());
    }

    #[test]
    fn test_three_qubit_gates() {
        let source = r"
            OPENQASM 2.0;
            qreg q[3];
            ccx q[0], q[1], q[2];
            cswap q[0], q[1], q[2];
        ";

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.gates()[0].op, Op::CCX);
        assert_eq!(circuit.gates()[0].extra, Some(2));
        assert_eq!(circuit.gates()[1].op, Op::CSwap);
    }
}
