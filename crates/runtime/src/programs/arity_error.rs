//! ```scheme
//! (define (first a b) a)
//! (display 'before) (newline)
//! (display (first 1)) (newline)
//! ```
//!
//! Calls a two-argument closure with one argument. The runtime stops at the
//! call: `first`'s body never runs and nothing after it is printed.

use super::display_line;
use crate::call::call1;
use crate::prelude::program_global;
use crate::program::Program;
use kiln_core::{
    CodeEntry, Context, GlobalId, Instance, Result, Skeleton, Value, make_fixnum, make_symbol,
};

pub const FIRST: GlobalId = program_global(0);

pub static PROGRAM: Program = Program {
    name: "arity-error",
    description: "calls a 2-argument closure with 1 argument (exits 1)",
    globals: &["first"],
    bootstrap,
};

fn first(_ctx: &mut Context, _closure: &Instance, a: Value, _b: Value) -> Result<Value> {
    Ok(a)
}

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let first = ctx.instantiate(closure.nested(0)?, closure.captures(), &[])?;
    ctx.set_global(FIRST, first)?;

    display_line(ctx, closure.constant(0)?)?;
    let first = ctx.global(FIRST)?;
    let result = call1(ctx, &first, closure.constant(1)?)?;
    display_line(ctx, result)?;
    Ok(Value::Unspecified)
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let first = Skeleton::builder("first", CodeEntry::Binary(first)).build();
    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .constants([make_symbol("before"), make_fixnum(1)])
        .nested(first)
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
