//! Recursive-descent parser: tokens in, `Decl` list out.
//!
//! Not the focus of this crate, but needed as real supporting
//! infrastructure so the checker has a program to type-check. Reports the
//! first syntax error found and stops; it makes no attempt at recovery.

use super::{CallDecl, Decl, Expr, ExprKind, Stmt, StmtBlock, Variable, VariableDecl};
use crate::intern::{Interner, Sym};
use crate::lexing::Token;
use crate::lexing::lexer::LexToken;
use crate::stream::Position;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum ParseFailure {
    UnexpectedToken { pos: Position, expected: String, found: Option<Token> },
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseFailure::UnexpectedToken { pos, expected, found } => {
                let found_desc = found.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "end of input".to_string());
                write!(f, "{}: expected {} but found {}", pos, expected, found_desc)
            }
        }
    }
}

type Result<T> = std::result::Result<T, ParseFailure>;

pub fn parse(tokens: Vec<LexToken<Token>>, interner: &mut Interner) -> Result<Vec<Decl>> {
    Parser { tokens, index: 0, interner }.parse_program()
}

struct Parser<'a> {
    tokens: Vec<LexToken<Token>>,
    index: usize,
    interner: &'a mut Interner,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|LexToken(tok, ..)| tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset).map(|LexToken(tok, ..)| tok)
    }

    fn pos(&self) -> Position {
        self.tokens
            .get(self.index)
            .map(|LexToken(_, _, pos)| *pos)
            .or_else(|| self.tokens.last().map(|LexToken(_, _, pos)| *pos))
            .unwrap_or_else(Position::new)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.index).map(|LexToken(tok, ..)| tok.clone());
        if tok.is_some() {
            self.index += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token, description: &str) -> Result<()> {
        match self.peek() {
            Some(tok) if tok == expected => {
                self.advance();
                Ok(())
            }
            found => Err(ParseFailure::UnexpectedToken { pos: self.pos(), expected: description.to_string(), found: found.cloned() }),
        }
    }

    fn expect_identifier(&mut self, description: &str) -> Result<(Sym, Position)> {
        let pos = self.pos();
        match self.peek().cloned() {
            Some(Token::Identifier(name)) => {
                self.advance();
                Ok((self.interner.intern(&name), pos))
            }
            found => Err(ParseFailure::UnexpectedToken { pos, expected: description.to_string(), found }),
        }
    }

    /// True when the next two tokens look like `Type Name`, the start of
    /// both a global `VariableDecl` and a local one.
    fn at_type_and_name(&self) -> bool {
        matches!(self.peek(), Some(Token::Identifier(_))) && matches!(self.peek_at(1), Some(Token::Identifier(_)))
    }

    fn parse_program(&mut self) -> Result<Vec<Decl>> {
        let mut decls = Vec::new();
        while self.peek().is_some() {
            decls.push(self.parse_top_level_decl()?);
        }
        Ok(decls)
    }

    fn parse_top_level_decl(&mut self) -> Result<Decl> {
        let (ty, pos) = self.expect_identifier("a type name")?;
        let (name, _) = self.expect_identifier("a declaration name")?;

        if matches!(self.peek(), Some(Token::LParen)) {
            self.parse_call_decl_rest(ty, name, pos).map(Decl::CallDecl)
        }
        else {
            self.expect(&Token::Semicolon, "';'")?;
            Ok(Decl::VariableDecl(VariableDecl { name, ty, pos }))
        }
    }

    fn parse_call_decl_rest(&mut self, ret: Sym, name: Sym, pos: Position) -> Result<CallDecl> {
        self.expect(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                let (param_ty, param_pos) = self.expect_identifier("a parameter type")?;
                let (param_name, _) = self.expect_identifier("a parameter name")?;
                params.push(Variable { name: param_name, ty: param_ty, pos: param_pos });

                if matches!(self.peek(), Some(Token::Comma)) {
                    self.advance();
                }
                else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;

        let body = self.parse_block()?;

        Ok(CallDecl { name, ret, params, body, pos })
    }

    fn parse_block(&mut self) -> Result<StmtBlock> {
        self.expect(&Token::LBrace, "'{'")?;

        let mut locals = Vec::new();
        while self.at_type_and_name() {
            let (ty, pos) = self.expect_identifier("a type name")?;
            let (name, _) = self.expect_identifier("a local variable name")?;
            self.expect(&Token::Semicolon, "';'")?;
            locals.push(VariableDecl { name, ty, pos });
        }

        let mut stmts = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace)) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&Token::RBrace, "'}'")?;

        Ok(StmtBlock { locals, stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let pos = self.pos();
        match self.peek() {
            Some(Token::LBrace) => Ok(Stmt::Block(self.parse_block()?)),

            Some(Token::If) => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                let then_block = self.parse_block()?;
                let else_block = if matches!(self.peek(), Some(Token::Else)) {
                    self.advance();
                    self.parse_block()?
                }
                else {
                    StmtBlock::empty()
                };
                Ok(Stmt::If { cond, then_block, else_block, pos })
            }

            Some(Token::While) => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                let body = self.parse_block()?;
                Ok(Stmt::While { cond, body, pos })
            }

            Some(Token::For) => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let init = self.parse_optional_expr(&Token::Semicolon)?;
                self.expect(&Token::Semicolon, "';'")?;
                let cond = self.parse_optional_expr(&Token::Semicolon)?;
                self.expect(&Token::Semicolon, "';'")?;
                let step = self.parse_optional_expr(&Token::RParen)?;
                self.expect(&Token::RParen, "')'")?;
                let body = self.parse_block()?;
                Ok(Stmt::For { init, cond, step, body, pos })
            }

            Some(Token::Return) => {
                self.advance();
                let value = self.parse_optional_expr(&Token::Semicolon)?;
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Return { value, pos })
            }

            Some(Token::Break) => {
                self.advance();
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Break { pos })
            }

            Some(Token::Continue) => {
                self.advance();
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Continue { pos })
            }

            _ => {
                let expr = self.parse_expr()?;
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::ExprStmt { expr, pos })
            }
        }
    }

    /// Parses an expression unless `terminator` comes next, in which case
    /// an empty slot (`NoExpr`) is produced. Used for the omittable parts
    /// of a bare `return;` and a `for (;;)` header.
    fn parse_optional_expr(&mut self, terminator: &Token) -> Result<Expr> {
        let pos = self.pos();
        if self.peek() == Some(terminator) { Ok(Expr::no_expr(pos)) } else { self.parse_expr() }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Expr> {
        let pos = self.pos();
        let lhs = self.parse_or()?;

        if matches!(self.peek(), Some(Token::Eq)) {
            if let ExprKind::Object(sym) = lhs.kind {
                self.advance();
                let value = self.parse_assign()?;
                return Ok(Expr::new(ExprKind::Assign { lvalue: sym, value: Box::new(value) }, pos));
            }
            return Err(ParseFailure::UnexpectedToken { pos, expected: "an assignable name to the left of '='".to_string(), found: self.peek().cloned() });
        }

        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some(Token::OrOr)) {
            let pos = self.pos();
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::new(ExprKind::Or(Box::new(lhs), Box::new(rhs)), pos);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_xor()?;
        while matches!(self.peek(), Some(Token::AndAnd)) {
            let pos = self.pos();
            self.advance();
            let rhs = self.parse_xor()?;
            lhs = Expr::new(ExprKind::And(Box::new(lhs), Box::new(rhs)), pos);
        }
        Ok(lhs)
    }

    fn parse_xor(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bitor()?;
        while matches!(self.peek(), Some(Token::Caret)) {
            let pos = self.pos();
            self.advance();
            let rhs = self.parse_bitor()?;
            lhs = Expr::new(ExprKind::Xor(Box::new(lhs), Box::new(rhs)), pos);
        }
        Ok(lhs)
    }

    fn parse_bitor(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bitand()?;
        while matches!(self.peek(), Some(Token::Pipe)) {
            let pos = self.pos();
            self.advance();
            let rhs = self.parse_bitand()?;
            lhs = Expr::new(ExprKind::Bitor(Box::new(lhs), Box::new(rhs)), pos);
        }
        Ok(lhs)
    }

    fn parse_bitand(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_equality()?;
        while matches!(self.peek(), Some(Token::Amp)) {
            let pos = self.pos();
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::new(ExprKind::Bitand(Box::new(lhs), Box::new(rhs)), pos);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let pos = self.pos();
            match self.peek() {
                Some(Token::EqEq) => {
                    self.advance();
                    let rhs = self.parse_relational()?;
                    lhs = Expr::new(ExprKind::Eq(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Ne) => {
                    self.advance();
                    let rhs = self.parse_relational()?;
                    lhs = Expr::new(ExprKind::Ne(Box::new(lhs), Box::new(rhs)), pos);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let pos = self.pos();
            match self.peek() {
                Some(Token::Lt) => {
                    self.advance();
                    let rhs = self.parse_additive()?;
                    lhs = Expr::new(ExprKind::Lt(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Le) => {
                    self.advance();
                    let rhs = self.parse_additive()?;
                    lhs = Expr::new(ExprKind::Le(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Gt) => {
                    self.advance();
                    let rhs = self.parse_additive()?;
                    lhs = Expr::new(ExprKind::Gt(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Ge) => {
                    self.advance();
                    let rhs = self.parse_additive()?;
                    lhs = Expr::new(ExprKind::Ge(Box::new(lhs), Box::new(rhs)), pos);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let pos = self.pos();
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.parse_multiplicative()?;
                    lhs = Expr::new(ExprKind::Add(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.parse_multiplicative()?;
                    lhs = Expr::new(ExprKind::Sub(Box::new(lhs), Box::new(rhs)), pos);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let pos = self.pos();
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::new(ExprKind::Mul(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::new(ExprKind::Div(Box::new(lhs), Box::new(rhs)), pos);
                }
                Some(Token::Percent) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::new(ExprKind::Mod(Box::new(lhs), Box::new(rhs)), pos);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let pos = self.pos();
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Neg(Box::new(operand)), pos))
            }
            Some(Token::Bang) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Not(Box::new(operand)), pos))
            }
            Some(Token::Tilde) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Bitnot(Box::new(operand)), pos))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let pos = self.pos();
        match self.peek().cloned() {
            Some(Token::IntLiteral(value)) => {
                self.advance();
                Ok(Expr::new(ExprKind::IntLiteral(value), pos))
            }
            Some(Token::FloatLiteral(value)) => {
                self.advance();
                Ok(Expr::new(ExprKind::FloatLiteral(value), pos))
            }
            Some(Token::StringLiteral(value)) => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLiteral(value), pos))
            }
            Some(Token::BoolLiteral(value)) => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLiteral(value), pos))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Identifier(name)) => {
                self.advance();
                let sym = self.interner.intern(&name);

                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    let mut actuals = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        loop {
                            actuals.push(self.parse_expr()?);
                            if matches!(self.peek(), Some(Token::Comma)) {
                                self.advance();
                            }
                            else {
                                break;
                            }
                        }
                    }
                    self.expect(&Token::RParen, "')'")?;
                    Ok(Expr::new(ExprKind::Call { name: sym, actuals }, pos))
                }
                else {
                    Ok(Expr::new(ExprKind::Object(sym), pos))
                }
            }
            found => Err(ParseFailure::UnexpectedToken { pos, expected: "an expression".to_string(), found }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::lex;

    fn parse_source(source: &str) -> (Vec<Decl>, Interner) {
        let mut interner = Interner::new();
        let tokens = lex(source).expect("lex should succeed");
        let decls = parse(tokens, &mut interner).expect("parse should succeed");
        (decls, interner)
    }

    #[test]
    fn parses_a_global_variable_decl() {
        let (decls, _) = parse_source("Int g;");
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0], Decl::VariableDecl(_)));
    }

    #[test]
    fn parses_a_call_decl_with_params_and_body() {
        let (decls, _) = parse_source("Int add(Int a, Int b) { return a + b; }");
        assert_eq!(decls.len(), 1);
        match &decls[0] {
            Decl::CallDecl(call) => {
                assert_eq!(call.params.len(), 2);
                assert_eq!(call.body.stmts.len(), 1);
            }
            _ => panic!("expected a CallDecl"),
        }
    }

    #[test]
    fn distinguishes_locals_from_statements_in_a_block() {
        let (decls, _) = parse_source("Void main() { Int x; x = 1; return; }");
        match &decls[0] {
            Decl::CallDecl(call) => {
                assert_eq!(call.body.locals.len(), 1);
                assert_eq!(call.body.stmts.len(), 2);
            }
            _ => panic!("expected a CallDecl"),
        }
    }

    #[test]
    fn assignment_is_right_associative_and_only_valid_on_identifiers() {
        let (decls, _) = parse_source("Void main() { x = 1 + 2; return; }");
        match &decls[0] {
            Decl::CallDecl(call) => match &call.body.stmts[0] {
                Stmt::ExprStmt { expr, .. } => {
                    assert!(matches!(expr.kind, ExprKind::Assign { .. }));
                }
                _ => panic!("expected an ExprStmt"),
            },
            _ => panic!("expected a CallDecl"),
        }
    }

    #[test]
    fn for_loop_allows_empty_clauses() {
        let (decls, _) = parse_source("Void main() { for (;;) { break; } return; }");
        match &decls[0] {
            Decl::CallDecl(call) => match &call.body.stmts[0] {
                Stmt::For { init, cond, step, .. } => {
                    assert!(matches!(init.kind, ExprKind::NoExpr));
                    assert!(matches!(cond.kind, ExprKind::NoExpr));
                    assert!(matches!(step.kind, ExprKind::NoExpr));
                }
                _ => panic!("expected a For statement"),
            },
            _ => panic!("expected a CallDecl"),
        }
    }
}
