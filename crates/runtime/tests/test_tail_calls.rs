//! Tail calls run in bounded native stack

use kiln_runtime::kiln_core::{
    CodeEntry, Context, Instance, Result, Skeleton, Value, build_instance, make_fixnum,
};
use kiln_runtime::programs::{parity, sum};
use kiln_runtime::{call1, prelude, tail_call};

const SMALL_STACK: usize = 256 * 1024;

/// Run `f` on a thread whose stack is far too small for a million native
/// frames.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(SMALL_STACK)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_sum_one_million_on_small_stack() {
    let (result, peak_depth, longest_chain) = on_small_stack(|| {
        let mut ctx = Context::buffered();
        sum::PROGRAM.run(&mut ctx).unwrap();
        let f = ctx.global(sum::SUM).unwrap();
        let r = call1(&mut ctx, &f, make_fixnum(1_000_000)).unwrap();
        (
            r.as_fixnum(),
            ctx.stats().peak_depth,
            ctx.stats().longest_chain,
        )
    });
    assert_eq!(result, Some(500_000_500_000));
    // toplevel → sum → sum1 → builtin, regardless of n
    assert!(peak_depth <= 4, "peak depth {}", peak_depth);
    assert!(longest_chain > 1_000_000);
}

#[test]
fn test_peak_depth_independent_of_n() {
    let peak = |n: i64| {
        let mut ctx = Context::buffered();
        sum::PROGRAM.run(&mut ctx).unwrap();
        let f = ctx.global(sum::SUM).unwrap();
        call1(&mut ctx, &f, make_fixnum(n)).unwrap();
        ctx.stats().peak_depth
    };
    assert_eq!(peak(10), peak(10_000));
}

#[test]
fn test_mutual_recursion_on_small_stack() {
    let answer = on_small_stack(|| {
        let mut ctx = Context::buffered();
        parity::PROGRAM.run(&mut ctx).unwrap();
        let even = ctx.global(parity::EVEN).unwrap();
        let r = call1(&mut ctx, &even, make_fixnum(1_000_000)).unwrap();
        r.to_boolean()
    });
    assert!(answer);
}

// (define (countdown n) (if (= n 0) 'done (countdown (- n 1))))
// written against a bare instance, without any program scaffolding
fn countdown(ctx: &mut Context, closure: &Instance, n: Value) -> Result<Value> {
    let n = n.as_fixnum().unwrap_or(0);
    if n == 0 {
        return Ok(make_fixnum(-1));
    }
    let me = ctx.global(prelude::program_global(0))?;
    debug_assert!(me.as_closure().is_some_and(|c| std::ptr::eq(&**c, closure)));
    tail_call(ctx, &me, &[make_fixnum(n - 1)])
}

#[test]
fn test_self_tail_call_reuses_driver() {
    let skel = Skeleton::builder("countdown", CodeEntry::Unary(countdown)).build();
    let f = Value::Closure(build_instance(&skel, &[], &[]).unwrap());
    let mut ctx = Context::buffered();
    ctx.globals_mut()
        .define(prelude::program_global(0), "countdown", f.clone());

    let r = call1(&mut ctx, &f, make_fixnum(50_000)).unwrap();
    assert_eq!(r, make_fixnum(-1));
    let stats = ctx.stats();
    assert_eq!(stats.tail_calls, 50_000);
    assert_eq!(stats.bounces, 50_000);
    assert_eq!(stats.longest_chain, 50_000);
    assert_eq!(stats.peak_depth, 1);
    assert_eq!(stats.native_calls, 50_001);
    assert!(ctx.trampoline().is_done());
}
