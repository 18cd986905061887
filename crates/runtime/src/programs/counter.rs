//! ```scheme
//! (define (make-counter)
//!   (define n 0)
//!   (define inc (lambda () (set! n (+ n 1)) n))
//!   (define get (lambda () n))
//!   (set! n 10)
//!   (cons inc get))
//! (define c (make-counter))
//! (display ((car c))) (newline)
//! (display ((car c))) (newline)
//! (display ((cdr c))) (newline)
//! (define c2 (make-counter))
//! (display ((car c2))) (newline)
//! ```
//!
//! `inc` and `get` share one cell. The `(set! n 10)` after both closures
//! exist goes through the frame while the cell is still stack-resident, and
//! both closures see it after escape.

use super::display_line;
use crate::call::{call0, call1, call2, tail_call};
use crate::prelude::{Builtin, program_global};
use crate::program::Program;
use kiln_core::{
    Capture, CodeEntry, Context, Frame, GlobalId, Instance, Result, Skeleton, Value, make_fixnum,
};

pub const MAKE_COUNTER: GlobalId = program_global(0);
pub const C: GlobalId = program_global(1);
pub const C2: GlobalId = program_global(2);

pub static PROGRAM: Program = Program {
    name: "counter",
    description: "two closures sharing one mutable captured variable",
    globals: &["make-counter", "c", "c2"],
    bootstrap,
};

fn inc(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let n = closure.capture(0)?;
    let add = ctx.global(Builtin::Add.id())?;
    let next = call2(ctx, &add, n.get()?, closure.constant(0)?)?;
    n.set(next.clone())?;
    Ok(next)
}

fn get(_ctx: &mut Context, closure: &Instance) -> Result<Value> {
    closure.capture(0)?.get()
}

fn make_counter(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    // slot 0: n
    let mut frame = Frame::new(1);
    frame.set(0, closure.constant(0)?)?;
    frame.fresh_cell(0)?;
    let inc = ctx.instantiate(closure.nested(0)?, closure.captures(), frame.fresh_cells())?;
    let get = ctx.instantiate(closure.nested(1)?, closure.captures(), frame.fresh_cells())?;
    frame.set(0, closure.constant(1)?)?;

    frame.escape()?;
    let cons = ctx.global(Builtin::Cons.id())?;
    tail_call(ctx, &cons, &[inc, get])
}

/// `((car c))` or `((cdr c))` for the counter in global `id`
fn poke(ctx: &mut Context, id: GlobalId, selector: Builtin) -> Result<Value> {
    let select = ctx.global(selector.id())?;
    let counter = ctx.global(id)?;
    let f = call1(ctx, &select, counter)?;
    call0(ctx, &f)
}

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let make_counter = ctx.instantiate(closure.nested(0)?, closure.captures(), &[])?;
    ctx.set_global(MAKE_COUNTER, make_counter)?;

    let make_counter = ctx.global(MAKE_COUNTER)?;
    let c = call0(ctx, &make_counter)?;
    ctx.set_global(C, c)?;
    for selector in [Builtin::Car, Builtin::Car, Builtin::Cdr] {
        let v = poke(ctx, C, selector)?;
        display_line(ctx, v)?;
    }

    let c2 = call0(ctx, &make_counter)?;
    ctx.set_global(C2, c2)?;
    let v = poke(ctx, C2, Builtin::Car)?;
    display_line(ctx, v)?;
    Ok(Value::Unspecified)
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let inc = Skeleton::builder("inc", CodeEntry::Nullary(inc))
        .constant(make_fixnum(1))
        .capture(Capture::Fresh(0))
        .build();
    let get = Skeleton::builder("get", CodeEntry::Nullary(get))
        .capture(Capture::Fresh(0))
        .build();
    let make_counter = Skeleton::builder("make-counter", CodeEntry::Nullary(make_counter))
        .constants([make_fixnum(0), make_fixnum(10)])
        .nested(inc)
        .nested(get)
        .build();
    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .nested(make_counter)
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
