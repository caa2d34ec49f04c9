//! Reader for the Gradle Kotlin DSL subset used by module build files
//!
//! Understands assignments, `val` bindings, invocations with optional
//! arguments and trailing blocks, infix plugin modifiers, dotted reference
//! chains and literals. Anything else is a syntax error.

pub mod ast;
pub mod lexer;
mod parser;

pub use ast::{Argument, Expr, Invocation, Script, Segment, Statement};

use droidconf_core::error::Result;

/// Parse Kotlin DSL source into a statement tree
pub fn parse(source: &str) -> Result<Script> {
    let tokens = lexer::lex(source)?;
    parser::Parser::new(tokens).script()
}
