//! ```scheme
//! (define (even? n) (if (= n 0) #t (odd? (- n 1))))
//! (define (odd? n) (if (= n 0) #f (even? (- n 1))))
//! (display (even? 100001)) (newline)
//! ```
//!
//! Mutual recursion through globals, every step a tail call between two
//! different closures.

use super::display_line;
use crate::call::{call1, call2, tail_call};
use crate::prelude::{Builtin, program_global};
use crate::program::Program;
use kiln_core::{
    CodeEntry, Context, GlobalId, Instance, Result, Skeleton, Value, make_boolean, make_fixnum,
};

pub const EVEN: GlobalId = program_global(0);
pub const ODD: GlobalId = program_global(1);

pub static PROGRAM: Program = Program {
    name: "parity",
    description: "mutually tail-recursive even?/odd? on 100001",
    globals: &["even?", "odd?"],
    bootstrap,
};

/// Shared body of `even?` and `odd?`: constants are `[0, base, 1]` and
/// `other` is the global to bounce to.
fn step(ctx: &mut Context, closure: &Instance, n: Value, other: GlobalId) -> Result<Value> {
    let num_eq = ctx.global(Builtin::NumEq.id())?;
    if call2(ctx, &num_eq, n.clone(), closure.constant(0)?)?.to_boolean() {
        return closure.constant(1);
    }
    let sub = ctx.global(Builtin::Sub.id())?;
    let n1 = call2(ctx, &sub, n, closure.constant(2)?)?;
    let next = ctx.global(other)?;
    tail_call(ctx, &next, &[n1])
}

fn is_even(ctx: &mut Context, closure: &Instance, n: Value) -> Result<Value> {
    step(ctx, closure, n, ODD)
}

fn is_odd(ctx: &mut Context, closure: &Instance, n: Value) -> Result<Value> {
    step(ctx, closure, n, EVEN)
}

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let even = ctx.instantiate(closure.nested(0)?, closure.captures(), &[])?;
    ctx.set_global(EVEN, even)?;
    let odd = ctx.instantiate(closure.nested(1)?, closure.captures(), &[])?;
    ctx.set_global(ODD, odd)?;

    let even = ctx.global(EVEN)?;
    let result = call1(ctx, &even, closure.constant(0)?)?;
    display_line(ctx, result)?;
    Ok(Value::Unspecified)
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let even = Skeleton::builder("even?", CodeEntry::Unary(is_even))
        .constants([make_fixnum(0), make_boolean(true), make_fixnum(1)])
        .build();
    let odd = Skeleton::builder("odd?", CodeEntry::Unary(is_odd))
        .constants([make_fixnum(0), make_boolean(false), make_fixnum(1)])
        .build();
    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .constant(make_fixnum(100_001))
        .nested(even)
        .nested(odd)
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
