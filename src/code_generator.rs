use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{CompileError, CompileResult, Expr, Program, Stmt};

const SYS_EXIT: u64 = 60;
const SLOT_SIZE: usize = 8;

type VarTable = HashMap<String, usize>; // variable name to stack slot index

/// Stack-machine emitter for NASM x86-64.
///
/// Expression values and variables share one runtime stack: every expression
/// pushes exactly one 8-byte slot, and a `let` leaves its slot in place for
/// the rest of the program. `stack_size` mirrors the number of live slots so
/// a variable can be addressed relative to `rsp` at each use.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    output: String,
    stack_size: usize,
    vars: VarTable,
}

impl CodeGenerator {
    pub fn new() -> CodeGenerator {
        Self::default()
    }

    pub fn generate(mut self, program: &Program) -> CompileResult<String> {
        self.output.push_str("global _start\n_start:\n");
        for stmt in &program.stmts {
            self.generate_stmt(stmt)?;
        }
        self.emit(&format!("mov rax, {}", SYS_EXIT));
        self.emit("mov rdi, 0");
        self.emit("syscall");
        debug!(
            statements = program.stmts.len(),
            variables = self.vars.len(),
            stack_size = self.stack_size,
            "generated assembly"
        );
        Ok(self.output)
    }

    fn generate_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Exit { expr } => {
                self.generate_expr(expr)?;
                self.emit(&format!("mov rax, {}", SYS_EXIT));
                self.pop("rdi")?;
                self.emit("syscall");
            }
            Stmt::Let { name, expr } => {
                self.generate_expr(expr)?;
                if self.vars.contains_key(name) {
                    return Err(CompileError::DuplicateIdentifier { name: name.clone() });
                }
                let slot = self.stack_size - 1;
                trace!(%name, slot, "bound variable");
                self.vars.insert(name.clone(), slot);
            }
        }
        Ok(())
    }

    fn generate_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::IntLit(val) => {
                self.emit(&format!("mov rax, {}", val));
                self.push("rax");
            }
            Expr::Ident(name) => {
                let Some(&slot) = self.vars.get(name) else {
                    return Err(CompileError::UndeclaredIdentifier { name: name.clone() });
                };
                let offset = self.offset_from_top(name, slot)?;
                self.push(&format!("QWORD [rsp + {}]", offset * SLOT_SIZE));
            }
        }
        Ok(())
    }

    fn offset_from_top(&self, name: &str, slot: usize) -> CompileResult<usize> {
        match self.stack_size.checked_sub(1) {
            Some(top) if slot <= top => Ok(top - slot),
            _ => Err(CompileError::SlotAboveStackTop {
                name: name.to_string(),
                slot,
                height: self.stack_size,
            }),
        }
    }

    fn push(&mut self, operand: &str) {
        self.emit(&format!("push {}", operand));
        self.stack_size += 1;
    }

    fn pop(&mut self, reg: &str) -> CompileResult<()> {
        if self.stack_size == 0 {
            return Err(CompileError::StackUnderflow);
        }
        self.emit(&format!("pop {}", reg));
        self.stack_size -= 1;
        Ok(())
    }

    fn emit(&mut self, line: &str) {
        self.output.push_str("    ");
        self.output.push_str(line);
        self.output.push('\n');
    }
}

pub fn generate(program: &Program) -> CompileResult<String> {
    CodeGenerator::new().generate(program)
}
