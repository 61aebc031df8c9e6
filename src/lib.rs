mod code_generator;
mod errors;
mod parser;
mod tokenizer;
pub mod toolchain;

pub use code_generator::{generate, CodeGenerator};
pub use errors::{CompileError, CompileResult, ErrorKind};
pub use parser::{parse, Expr, Parser, Program, Stmt};
pub use tokenizer::{Token, TokenQueue};

/// Compile source text into NASM x86-64 assembly for Linux.
pub fn compile(source: &str) -> CompileResult<String> {
    let tokens = TokenQueue::tokenize(source)?;
    let program = parse(tokens)?;
    generate(&program)
}
