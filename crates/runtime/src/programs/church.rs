//! ```scheme
//! (define (kons a b) (lambda (f) (f a b)))
//! (define (kar p) (p (lambda (a b) a)))
//! (define (kdr p) (p (lambda (a b) b)))
//! (define p (kons 1 (kons 2 '())))
//! (display (kar (kdr p))) (newline)
//! (display (kar p)) (newline)
//! ```
//!
//! Pairs encoded as closures. `kons` binds `a` and `b` in its own frame,
//! hands both cells to the inner lambda, and escapes them before returning.

use super::display_line;
use crate::call::{call1, call2, tail_call};
use crate::prelude::program_global;
use crate::program::Program;
use kiln_core::{
    Capture, CodeEntry, Context, Frame, GlobalId, Instance, Result, Skeleton, Value, make_fixnum,
    make_nil,
};

pub const KONS: GlobalId = program_global(0);
pub const KAR: GlobalId = program_global(1);
pub const KDR: GlobalId = program_global(2);
pub const P: GlobalId = program_global(3);

pub static PROGRAM: Program = Program {
    name: "church",
    description: "pairs built from closures over fresh captured cells",
    globals: &["kons", "kar", "kdr", "p"],
    bootstrap,
};

/// `(lambda (f) (f a b))`
fn dispatch(ctx: &mut Context, closure: &Instance, f: Value) -> Result<Value> {
    let a = closure.capture(0)?.get()?;
    let b = closure.capture(1)?.get()?;
    tail_call(ctx, &f, &[a, b])
}

fn kons(ctx: &mut Context, closure: &Instance, a: Value, b: Value) -> Result<Value> {
    let mut frame = Frame::from_args([a, b], 2);
    frame.fresh_cell(0)?;
    frame.fresh_cell(1)?;
    let pair = ctx.instantiate(closure.nested(0)?, closure.captures(), frame.fresh_cells())?;
    frame.escape()?;
    Ok(pair)
}

fn first(_ctx: &mut Context, _closure: &Instance, a: Value, _b: Value) -> Result<Value> {
    Ok(a)
}

fn second(_ctx: &mut Context, _closure: &Instance, _a: Value, b: Value) -> Result<Value> {
    Ok(b)
}

/// Body of `kar` and `kdr`: apply `p` to the selector in nested slot 0
fn select(ctx: &mut Context, closure: &Instance, p: Value) -> Result<Value> {
    let selector = ctx.instantiate(closure.nested(0)?, closure.captures(), &[])?;
    tail_call(ctx, &p, &[selector])
}

fn toplevel(ctx: &mut Context, closure: &Instance) -> Result<Value> {
    for (i, id) in [KONS, KAR, KDR].into_iter().enumerate() {
        let f = ctx.instantiate(closure.nested(i)?, closure.captures(), &[])?;
        ctx.set_global(id, f)?;
    }

    let kons = ctx.global(KONS)?;
    let inner = call2(ctx, &kons, closure.constant(1)?, make_nil())?;
    let p = call2(ctx, &kons, closure.constant(0)?, inner)?;
    ctx.set_global(P, p)?;

    let kar = ctx.global(KAR)?;
    let kdr = ctx.global(KDR)?;
    let p = ctx.global(P)?;
    let rest = call1(ctx, &kdr, p)?;
    let second = call1(ctx, &kar, rest)?;
    display_line(ctx, second)?;

    let p = ctx.global(P)?;
    let first = call1(ctx, &kar, p)?;
    display_line(ctx, first)?;
    Ok(Value::Unspecified)
}

fn bootstrap(ctx: &mut Context) -> Result<Value> {
    let dispatch = Skeleton::builder("kons-dispatch", CodeEntry::Unary(dispatch))
        .captures([Capture::Fresh(0), Capture::Fresh(1)])
        .build();
    let kons = Skeleton::builder("kons", CodeEntry::Binary(kons))
        .nested(dispatch)
        .build();
    let first = Skeleton::builder("kar-select", CodeEntry::Binary(first)).build();
    let kar = Skeleton::builder("kar", CodeEntry::Unary(select))
        .nested(first)
        .build();
    let second = Skeleton::builder("kdr-select", CodeEntry::Binary(second)).build();
    let kdr = Skeleton::builder("kdr", CodeEntry::Unary(select))
        .nested(second)
        .build();

    let toplevel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel))
        .constants([make_fixnum(1), make_fixnum(2)])
        .nested(kons)
        .nested(kar)
        .nested(kdr)
        .build();
    ctx.instantiate(&toplevel, &[], &[])
}
