//! ```scheme
//! (define (fibo n)
//!   (if (< n 2)
//!       n
//!       (+ (fibo (- n 1)) (fibo (- n 2)))))
//! (display (fibo 25)) (newline)
//! ```
//!
//! The two recursive calls are not in tail position, so this exercises
//! native recursion rather than the trampoline.

use super::display_line;
use crate::call::{call1, call2, tail_call};
use crate::prelude::{Builtin, program_global};
use crate::program::Program;
use kiln_core::{CodeEntry, Context, GlobalId, Instance, Result, Skeleton, Value, make_fixnum};

pub const FIBO: GlobalId = program_global(0);

pub static PROGRAM: Program = Program {
    name: "fibo",
    description: "doubly recursive fibonacci of 25",
    globals: &["fibo"],
    bootstrap,
};

fn fibo(ctx: &mut Context, closure: &Instance, n: Value) -> Result<Value> {
    let two = closure.constant(0)?;
    let one = closure.constant(1)?;
    let lt = ctx.global(Builtin::Lt.id())?;
    if call2(ctx, &lt, n.clone(), two.clone())?.to_boolean() {
        return Ok(n);
    }

    let sub = ctx.global(Builtin::Sub.id())?;
    let fibo = ctx.global(FIBO)?;
    let n1 = call2(ctx, &sub, n.clone(), one)?;
    let a = call1(ctx, &fibo, n1)?;
    let n2 = call2(ctx, &sub, n, two)?;
    let b = call1(ctx, &fibo, n2)?;

    let add = ctx.global(Builtin::Add.id())?;
    tail_call(ctx, &add, &[a, b])
}

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let fibo = ctx.instantiate(closure.nested(0)?, closure.captures(), &[])?;
    ctx.set_global(FIBO, fibo)?;

    let fibo = ctx.global(FIBO)?;
    let result = call1(ctx, &fibo, closure.constant(0)?)?;
    display_line(ctx, result)?;
    Ok(Value::Unspecified)
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let fibo = Skeleton::builder("fibo", CodeEntry::Unary(fibo))
        .constants([make_fixnum(2), make_fixnum(1)])
        .build();
    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .constant(make_fixnum(25))
        .nested(fibo)
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
