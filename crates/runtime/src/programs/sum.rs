//! ```scheme
//! (define (sum n)
//!   (define (sum1 n acc)
//!     (if (< n 1)
//!         acc
//!         (sum1 (- n 1) (+ acc n))))
//!   (sum1 n 0))
//! (display (sum 30)) (newline)
//! ```
//!
//! `sum1` is bound inside `sum`'s frame and captures itself through a fresh
//! cell. Every recursive step is a tail call, so `(sum n)` runs in constant
//! native stack for any `n`.
//!
//! The escaped cell holds the very instance that captures it. Reference
//! counting never reclaims that cycle.

use super::display_line;
use crate::call::{call1, call2, tail_call};
use crate::prelude::{Builtin, program_global};
use crate::program::Program;
use kiln_core::{
    Capture, CodeEntry, Context, Frame, GlobalId, Instance, Result, Skeleton, Value, make_fixnum,
};

pub const SUM: GlobalId = program_global(0);

pub static PROGRAM: Program = Program {
    name: "sum",
    description: "tail-recursive sum of 1..30 through a nested helper",
    globals: &["sum"],
    bootstrap,
};

fn sum1(ctx: &mut Context, closure: &Instance, n: Value, acc: Value) -> Result<Value> {
    let one = closure.constant(0)?;
    let lt = ctx.global(Builtin::Lt.id())?;
    if call2(ctx, &lt, n.clone(), one.clone())?.to_boolean() {
        return Ok(acc);
    }

    let sub = ctx.global(Builtin::Sub.id())?;
    let add = ctx.global(Builtin::Add.id())?;
    let n1 = call2(ctx, &sub, n.clone(), one)?;
    let acc1 = call2(ctx, &add, acc, n)?;
    let sum1 = closure.capture(0)?.get()?;
    tail_call(ctx, &sum1, &[n1, acc1])
}

fn sum(ctx: &mut Context, closure: &Instance, n: Value) -> Result<Value> {
    // slot 0: n, slot 1: sum1
    let mut frame = Frame::from_args([n], 2);
    frame.fresh_cell(1)?;
    let sum1 = ctx.instantiate(closure.nested(0)?, closure.captures(), frame.fresh_cells())?;
    frame.set(1, sum1)?;

    let sum1 = frame.get(1)?;
    let n = frame.get(0)?;
    frame.escape()?;
    tail_call(ctx, &sum1, &[n, closure.constant(0)?])
}

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let sum = ctx.instantiate(closure.nested(0)?, closure.captures(), &[])?;
    ctx.set_global(SUM, sum)?;

    let sum = ctx.global(SUM)?;
    let result = call1(ctx, &sum, closure.constant(0)?)?;
    display_line(ctx, result)?;
    Ok(Value::Unspecified)
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let sum1 = Skeleton::builder("sum1", CodeEntry::Binary(sum1))
        .constant(make_fixnum(1))
        .capture(Capture::Fresh(0))
        .build();
    let sum = Skeleton::builder("sum", CodeEntry::Unary(sum))
        .constant(make_fixnum(0))
        .nested(sum1)
        .build();
    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .constant(make_fixnum(30))
        .nested(sum)
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
