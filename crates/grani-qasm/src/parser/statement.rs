//! Statement parsing for OpenQASM 2.

use super::Parser;
use crate::ast::{BitRef, GateCall, GateDef, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse one statement. Returns `None` for directives that carry no
    /// semantics (`include`, `opaque`).
    pub(super) fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => {
                self.advance();
                self.expect(Token::StringLiteral(String::new()))?;
                self.expect(Token::Semicolon)?;
                Ok(None)
            }
            Token::Opaque => {
                // accepted for compatibility, skipped to the semicolon
                self.advance();
                while let Some(t) = self.advance() {
                    if t == Token::Semicolon {
                        break;
                    }
                }
                Ok(None)
            }
            Token::Qreg => {
                self.advance();
                let (name, width) = self.parse_reg_decl()?;
                Ok(Some(Statement::QregDecl { name, width }))
            }
            Token::Creg => {
                self.advance();
                let (name, width) = self.parse_reg_decl()?;
                Ok(Some(Statement::CregDecl { name, width }))
            }
            Token::Gate => {
                self.advance();
                Ok(Some(self.parse_gate_def()?))
            }
            Token::Measure => {
                self.advance();
                let qubit = self.parse_qubit_ref()?;
                self.expect(Token::Arrow)?;
                let target = self.parse_bit_ref()?;
                self.expect(Token::Semicolon)?;
                Ok(Some(Statement::Measure { qubit, target }))
            }
            Token::Reset => {
                self.advance();
                let qubit = self.parse_qubit_ref()?;
                self.expect(Token::Semicolon)?;
                Ok(Some(Statement::Reset(qubit)))
            }
            Token::Barrier => {
                self.advance();
                let mut qubits = Vec::new();
                if !self.check(&Token::Semicolon) {
                    qubits.push(self.parse_qubit_ref()?);
                    while self.consume(&Token::Comma) {
                        qubits.push(self.parse_qubit_ref()?);
                    }
                }
                self.expect(Token::Semicolon)?;
                Ok(Some(Statement::Barrier(qubits)))
            }
            Token::If => {
                self.advance();
                self.expect(Token::LParen)?;
                let creg = self.parse_identifier()?;
                self.expect(Token::EqEq)?;
                let value = self.parse_int_literal()?;
                self.expect(Token::RParen)?;
                let body = self
                    .parse_statement()?
                    .ok_or_else(|| ParseError::Generic("empty body in if statement".into()))?;
                Ok(Some(Statement::If {
                    creg,
                    value,
                    body: vec![body],
                }))
            }
            Token::Identifier(name) => {
                self.advance();
                Ok(Some(Statement::GateCall(self.parse_gate_call(name)?)))
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "statement".into(),
                found: other.to_string(),
            }),
        }
    }

    /// Parse `name[width];` after the register keyword.
    fn parse_reg_decl(&mut self) -> ParseResult<(String, usize)> {
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let width = self.parse_int_literal()? as usize;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, width))
    }

    /// Parse a user gate definition after the `gate` keyword.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        let name = self.parse_identifier()?;

        let mut params = Vec::new();
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                params.push(self.parse_identifier()?);
                while self.consume(&Token::Comma) {
                    params.push(self.parse_identifier()?);
                }
            }
            self.expect(Token::RParen)?;
        }

        let mut qubits = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            qubits.push(self.parse_identifier()?);
        }

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            let token = self
                .advance()
                .ok_or_else(|| ParseError::UnexpectedEof("gate body".into()))?;
            match token {
                // barriers inside definitions carry no semantics here
                Token::Barrier => {
                    while let Some(t) = self.advance() {
                        if t == Token::Semicolon {
                            break;
                        }
                    }
                }
                Token::Identifier(gate_name) => body.push(self.parse_gate_call(gate_name)?),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "gate application".into(),
                        found: other.to_string(),
                    });
                }
            }
        }
        self.expect(Token::RBrace)?;

        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    /// Parse the rest of a gate application, the name already consumed.
    fn parse_gate_call(&mut self, name: String) -> ParseResult<GateCall> {
        let mut params = Vec::new();
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                params.push(self.parse_expression()?);
                while self.consume(&Token::Comma) {
                    params.push(self.parse_expression()?);
                }
            }
            self.expect(Token::RParen)?;
        }

        let mut args = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_qubit_ref()?);
        }
        self.expect(Token::Semicolon)?;

        Ok(GateCall { name, params, args })
    }

    /// Parse a quantum operand: `name` or `name[index]`.
    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let register = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_int_literal()? as usize;
            self.expect(Token::RBracket)?;
            Ok(QubitRef::Indexed { register, index })
        } else {
            Ok(QubitRef::Whole { register })
        }
    }

    /// Parse a classical operand: `name` or `name[index]`.
    fn parse_bit_ref(&mut self) -> ParseResult<BitRef> {
        let register = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_int_literal()? as usize;
            self.expect(Token::RBracket)?;
            Ok(BitRef::Indexed { register, index })
        } else {
            Ok(BitRef::Whole { register })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_ast;
    use crate::ast::Statement;

    #[test]
    fn test_gate_def_ast() {
        let source = r"
            OPENQASM 2.0;
            gate majority a, b, c {
                cx c, b;
                cx c, a;
                ccx a, b, c;
            }
        ";

        let program = parse_ast(source).unwrap();
        assert_eq!(program.statements.len(), 1);
        let Statement::GateDef(def) = &program.statements[0] else {
            panic!("expected gate definition");
        };
        assert_eq!(def.name, "majority");
        assert_eq!(def.qubits, vec!["a", "b", "c"]);
        assert_eq!(def.body.len(), 3);
    }

    #[test]
    fn test_if_owns_its_body() {
        let source = r"
            OPENQASM 2.0;
            qreg q[1];
            creg c[1];
            if (c == 0) x q[0];
        ";

        let program = parse_ast(source).unwrap();
        let Statement::If { creg, value, body } = program.statements.last().unwrap() else {
            panic!("expected if statement");
        };
        assert_eq!(creg, "c");
        assert_eq!(*value, 0);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_include_is_skipped() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[1];
        "#;

        let program = parse_ast(source).unwrap();
        assert_eq!(program.statements.len(), 1);
    }
}
