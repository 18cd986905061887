//! Call protocol and trampoline driver
//!
//! Every call site goes through [`call`]. It checks the callee's declared
//! arity, enters the code body natively, and then drains any tail call the
//! body left on the trampoline before returning to its own caller:
//!
//! ```text
//! call(f, args)
//!   ├─ invoke f          (arity check, native entry)
//!   └─ while pending:    (driver loop)
//!        take target/args
//!        invoke target
//! ```
//!
//! A body in tail position calls [`tail_call`] instead, which only records
//! the callee and returns a sentinel. Each bounce happens at the driver's
//! depth, so a chain of tail calls of any length uses constant native stack.

use kiln_core::{
    CodeEntry, Context, Instance, MAX_SPECIALIZED_ARITY, PendingCall, Result, RuntimeError, Value,
};
use std::rc::Rc;

/// Value returned by a body that scheduled a tail call. The driver loop
/// discards it.
pub const TAIL_CALL_SENTINEL: Value = Value::Unspecified;

fn callee(f: &Value) -> Result<Rc<Instance>> {
    match f {
        Value::Closure(instance) => Ok(instance.clone()),
        other => Err(RuntimeError::NotCallable {
            value: other.to_string(),
        }),
    }
}

/// Enter `target`'s code body natively.
///
/// Arity is checked before the body runs; on mismatch the body is never
/// entered.
fn invoke(ctx: &mut Context, target: &Rc<Instance>, args: &[Value]) -> Result<Value> {
    let expected = target.skeleton().nb_args();
    if args.len() > MAX_SPECIALIZED_ARITY {
        return Err(RuntimeError::UnsupportedArity {
            name: target.name().to_string(),
            arity: args.len(),
        });
    }
    if args.len() != expected {
        return Err(RuntimeError::ArityMismatch {
            name: target.name().to_string(),
            expected,
            actual: args.len(),
        });
    }

    ctx.stats_mut().enter();
    let instance: &Instance = target;
    let result = match (target.skeleton().entry(), args) {
        (CodeEntry::Nullary(code), []) => code(ctx, instance),
        (CodeEntry::Unary(code), [a]) => code(ctx, instance, a.clone()),
        (CodeEntry::Binary(code), [a, b]) => code(ctx, instance, a.clone(), b.clone()),
        (CodeEntry::Ternary(code), [a, b, c]) => {
            code(ctx, instance, a.clone(), b.clone(), c.clone())
        }
        (CodeEntry::Quaternary(code), [a, b, c, d]) => {
            code(ctx, instance, a.clone(), b.clone(), c.clone(), d.clone())
        }
        // Unreachable after the length check above
        _ => Err(RuntimeError::ArityMismatch {
            name: target.name().to_string(),
            expected,
            actual: args.len(),
        }),
    };
    ctx.stats_mut().leave();
    result
}

/// Run pending tail calls until a body returns without scheduling another
fn drive(ctx: &mut Context, mut result: Value) -> Result<Value> {
    let mut bounces = 0u64;
    while let Some(PendingCall { target, args }) = ctx.trampoline_mut().take() {
        bounces += 1;
        let next = invoke(ctx, &target, &args);
        ctx.trampoline_mut().recycle(args);
        result = next?;
    }
    if bounces > 0 {
        ctx.stats_mut().drained(bounces);
        tracing::debug!(bounces, "trampoline drained");
    }
    Ok(result)
}

/// Call `f` with `args` and return its result.
///
/// Any tail calls made along the way are completed before this returns.
pub fn call(ctx: &mut Context, f: &Value, args: &[Value]) -> Result<Value> {
    if let Some(pending) = ctx.trampoline().pending_name() {
        // A driver here would run the pending call on behalf of the wrong
        // call site
        return Err(RuntimeError::TrampolineBusy {
            name: pending.to_string(),
        });
    }
    let target = callee(f)?;
    let result = invoke(ctx, &target, args)?;
    drive(ctx, result)
}

pub fn call0(ctx: &mut Context, f: &Value) -> Result<Value> {
    call(ctx, f, &[])
}

pub fn call1(ctx: &mut Context, f: &Value, a: Value) -> Result<Value> {
    call(ctx, f, &[a])
}

pub fn call2(ctx: &mut Context, f: &Value, a: Value, b: Value) -> Result<Value> {
    call(ctx, f, &[a, b])
}

pub fn call3(ctx: &mut Context, f: &Value, a: Value, b: Value, c: Value) -> Result<Value> {
    call(ctx, f, &[a, b, c])
}

pub fn call4(
    ctx: &mut Context,
    f: &Value,
    a: Value,
    b: Value,
    c: Value,
    d: Value,
) -> Result<Value> {
    call(ctx, f, &[a, b, c, d])
}

/// Schedule a call to `f` in tail position.
///
/// The caller must return the result of this function straight away. The
/// returned value is [`TAIL_CALL_SENTINEL`]; the enclosing driver loop makes
/// the actual call and supplies the real result. Arity is checked when the
/// driver enters the callee.
pub fn tail_call(ctx: &mut Context, f: &Value, args: &[Value]) -> Result<Value> {
    let target = callee(f)?;
    ctx.trampoline_mut().schedule(target, args.iter().cloned())?;
    ctx.stats_mut().tail_calls += 1;
    Ok(TAIL_CALL_SENTINEL)
}
