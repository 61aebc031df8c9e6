use tracing::debug;

use crate::{CompileResult, Token, TokenQueue};

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Expr {
    IntLit(u64),   // Integer
    Ident(String), // Variable reference
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Stmt {
    Exit { expr: Expr },              // "exit" "(" expr ")" ";"
    Let { name: String, expr: Expr }, // "let" ident "=" expr ";"
}

#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

type ParseResult<T> = CompileResult<T>;

pub struct Parser {
    token_queue: TokenQueue,
}

impl Parser {
    pub fn new(token_queue: TokenQueue) -> Self {
        Self { token_queue }
    }

    // program = stmt*
    pub fn program(mut self) -> ParseResult<Program> {
        let mut stmts = Vec::new();
        while !self.token_queue.is_empty() {
            stmts.push(self.stmt()?);
        }
        debug!(statements = stmts.len(), "parsed program");
        Ok(Program { stmts })
    }

    // stmt = "exit" "(" expr ")" ";"
    //      | "let" ident "=" expr ";"
    fn stmt(&mut self) -> ParseResult<Stmt> {
        match self.token_queue.peek() {
            Some(Token::Exit) => {
                self.token_queue.pop();
                self.token_queue
                    .expect(&Token::OpenParen, "expected '(' after 'exit'")?;
                let expr = self.expr("invalid expression inside exit(...)")?;
                self.token_queue
                    .expect(&Token::CloseParen, "expected ')' after expression")?;
                self.token_queue
                    .expect(&Token::Semi, "expected ';' after exit(...)")?;
                Ok(Stmt::Exit { expr })
            }
            Some(Token::Let) => {
                self.token_queue.pop();
                let name = self
                    .token_queue
                    .expect_ident("expected identifier after 'let'")?;
                self.token_queue
                    .expect(&Token::Equals, "expected '=' after identifier")?;
                let expr = self.expr("invalid expression in variable initializer")?;
                self.token_queue
                    .expect(&Token::Semi, "expected ';' after variable declaration")?;
                Ok(Stmt::Let { name, expr })
            }
            other => Err(TokenQueue::syntax_error("expected statement", other)),
        }
    }

    // expr = num | ident
    fn expr(&mut self, message: &str) -> ParseResult<Expr> {
        match self.token_queue.pop() {
            Some(Token::IntLit { val, .. }) => Ok(Expr::IntLit(val)),
            Some(Token::Ident { name }) => Ok(Expr::Ident(name)),
            other => Err(TokenQueue::syntax_error(message, other.as_ref())),
        }
    }
}

pub fn parse(token_queue: TokenQueue) -> ParseResult<Program> {
    Parser::new(token_queue).program()
}
