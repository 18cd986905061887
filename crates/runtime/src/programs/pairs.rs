//! ```scheme
//! (define lst (cons 1 (cons 2 '())))
//! (display lst) (newline)
//! (display (car (cdr lst))) (newline)
//! ```

use super::display_line;
use crate::call::{call1, call2, tail_call};
use crate::prelude::{Builtin, program_global};
use crate::program::Program;
use kiln_core::{
    CodeEntry, Context, GlobalId, Instance, Result, Skeleton, Value, make_fixnum, make_nil,
};

const LST: GlobalId = program_global(0);

pub static PROGRAM: Program = Program {
    name: "pairs",
    description: "build (1 2) with cons and walk it with car/cdr",
    globals: &["lst"],
    bootstrap,
};

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    let cons = ctx.global(Builtin::Cons.id())?;
    let tail = call2(ctx, &cons, closure.constant(1)?, make_nil())?;
    let lst = call2(ctx, &cons, closure.constant(0)?, tail)?;
    ctx.set_global(LST, lst)?;

    let lst = ctx.global(LST)?;
    display_line(ctx, lst)?;

    let car = ctx.global(Builtin::Car.id())?;
    let cdr = ctx.global(Builtin::Cdr.id())?;
    let display = ctx.global(Builtin::Display.id())?;
    let newline = ctx.global(Builtin::Newline.id())?;
    let lst = ctx.global(LST)?;
    let rest = call1(ctx, &cdr, lst)?;
    let second = call1(ctx, &car, rest)?;
    call1(ctx, &display, second)?;
    tail_call(ctx, &newline, &[])
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .constants([make_fixnum(1), make_fixnum(2)])
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
