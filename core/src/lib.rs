//! Interpreter for the Monkey language.
//!
//! # Inspiration
//! + [Writing an Interpreter in Go](https://interpreterbook.com)
//! + [Crafting Interpreters](https://craftinginterpreters.com)
pub mod ast;
pub mod builtin;
pub mod environment;
pub mod eval;
pub mod lex;
pub mod object;
pub mod parse;
pub mod position;
pub mod token;

pub use environment::{Env, Environment};
pub use eval::{Captured, Context, Stdout};
pub use object::{Object, ObjectType};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source could not be parsed.
    /// Contains every diagnostic, in source order.
    #[error("{0}")]
    Parse(parse::error::Errors),
}

/// Parse and evaluate `src` in `env`.
/// Runtime errors are returned as an [`Object::Error`] value.
pub fn run(src: impl AsRef<str>, env: &Env, ctx: &mut dyn Context) -> Result<Object, Error> {
    let program = parse::parse(src).map_err(Error::Parse)?;
    Ok(eval::eval(&program, env, ctx))
}
