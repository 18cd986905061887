//! Bundled programs
//!
//! Each module is the compiled form of a small Scheme program, written out
//! the way the code generator emits it: one skeleton per closure site, code
//! bodies that reach builtins through the global table, fresh cells for
//! captured bindings, and `tail_call` for calls in tail position. The
//! Scheme source is quoted at the top of each module.

use crate::call::{call0, call1};
use crate::prelude::Builtin;
use crate::program::Program;
use kiln_core::{Context, Result, Value};

pub mod arity_error;
pub mod church;
pub mod counter;
pub mod fibo;
pub mod pairs;
pub mod parity;
pub mod sum;

/// Every bundled program, in listing order
pub static PROGRAMS: &[&Program] = &[
    &pairs::PROGRAM,
    &fibo::PROGRAM,
    &sum::PROGRAM,
    &parity::PROGRAM,
    &church::PROGRAM,
    &counter::PROGRAM,
    &arity_error::PROGRAM,
];

pub fn find(name: &str) -> Option<&'static Program> {
    PROGRAMS.iter().copied().find(|p| p.name == name)
}

/// `(display value) (newline)`
pub(crate) fn display_line(ctx: &mut Context, value: Value) -> Result<()> {
    let display = ctx.global(Builtin::Display.id())?;
    let newline = ctx.global(Builtin::Newline.id())?;
    call1(ctx, &display, value)?;
    call0(ctx, &newline)?;
    Ok(())
}
