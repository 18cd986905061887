//! Builtin procedures
//!
//! Builtins are ordinary closures: a skeleton with no captures whose code
//! entry is a Rust function. Call sites cannot tell them apart from compiled
//! closures. They occupy the first global slots, in the order of
//! [`Builtin::ALL`].

use kiln_core::{
    CodeEntry, Context, GlobalId, Instance, Result, RuntimeError, Skeleton, Value, make_boolean,
    make_fixnum, make_pair,
};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Display,
    Newline,
    Add,
    Sub,
    Lt,
    NumEq,
    Cons,
    Car,
    Cdr,
    IsNull,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Display,
        Builtin::Newline,
        Builtin::Add,
        Builtin::Sub,
        Builtin::Lt,
        Builtin::NumEq,
        Builtin::Cons,
        Builtin::Car,
        Builtin::Cdr,
        Builtin::IsNull,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Global slot holding this builtin
    pub const fn id(self) -> GlobalId {
        GlobalId::new(self as usize)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Display => "display",
            Builtin::Newline => "newline",
            Builtin::Add => "+",
            Builtin::Sub => "-",
            Builtin::Lt => "<",
            Builtin::NumEq => "=",
            Builtin::Cons => "cons",
            Builtin::Car => "car",
            Builtin::Cdr => "cdr",
            Builtin::IsNull => "null?",
        }
    }

    fn entry(self) -> CodeEntry {
        match self {
            Builtin::Display => CodeEntry::Unary(display_entry),
            Builtin::Newline => CodeEntry::Nullary(newline_entry),
            Builtin::Add => CodeEntry::Binary(add_entry),
            Builtin::Sub => CodeEntry::Binary(sub_entry),
            Builtin::Lt => CodeEntry::Binary(lt_entry),
            Builtin::NumEq => CodeEntry::Binary(num_eq_entry),
            Builtin::Cons => CodeEntry::Binary(cons_entry),
            Builtin::Car => CodeEntry::Unary(car_entry),
            Builtin::Cdr => CodeEntry::Unary(cdr_entry),
            Builtin::IsNull => CodeEntry::Unary(is_null_entry),
        }
    }
}

/// Global slot of the `k`th program global, after the prelude
pub const fn program_global(k: usize) -> GlobalId {
    GlobalId::new(Builtin::COUNT + k)
}

/// Define every builtin in `ctx`'s global table
pub fn install(ctx: &mut Context) -> Result<()> {
    for builtin in Builtin::ALL {
        let skeleton = Skeleton::builder(builtin.name(), builtin.entry()).build();
        let closure = ctx.instantiate(&skeleton, &[], &[])?;
        ctx.globals_mut().define(builtin.id(), builtin.name(), closure);
    }
    tracing::debug!(count = Builtin::COUNT, "prelude installed");
    Ok(())
}

// =============================================================================
// Primitive operations
// =============================================================================

fn describe(value: &Value) -> String {
    format!("{} {}", value.tag().name(), value)
}

fn fixnum(builtin: &'static str, value: &Value) -> Result<i64> {
    value.as_fixnum().ok_or_else(|| RuntimeError::TypeMismatch {
        builtin,
        expected: "fixnum",
        got: describe(value),
    })
}

pub fn display(ctx: &mut Context, value: &Value) -> Result<()> {
    write!(ctx.out(), "{}", value)?;
    Ok(())
}

pub fn newline(ctx: &mut Context) -> Result<()> {
    writeln!(ctx.out())?;
    Ok(())
}

pub fn add(a: &Value, b: &Value) -> Result<Value> {
    Ok(make_fixnum(fixnum("+", a)?.wrapping_add(fixnum("+", b)?)))
}

pub fn sub(a: &Value, b: &Value) -> Result<Value> {
    Ok(make_fixnum(fixnum("-", a)?.wrapping_sub(fixnum("-", b)?)))
}

pub fn lt(a: &Value, b: &Value) -> Result<Value> {
    Ok(make_boolean(fixnum("<", a)? < fixnum("<", b)?))
}

pub fn num_eq(a: &Value, b: &Value) -> Result<Value> {
    Ok(make_boolean(fixnum("=", a)? == fixnum("=", b)?))
}

pub fn car(value: &Value) -> Result<Value> {
    match value.as_pair() {
        Some(pair) => Ok(pair.car().clone()),
        None => Err(RuntimeError::TypeMismatch {
            builtin: "car",
            expected: "pair",
            got: describe(value),
        }),
    }
}

pub fn cdr(value: &Value) -> Result<Value> {
    match value.as_pair() {
        Some(pair) => Ok(pair.cdr().clone()),
        None => Err(RuntimeError::TypeMismatch {
            builtin: "cdr",
            expected: "pair",
            got: describe(value),
        }),
    }
}

pub fn is_null(value: &Value) -> Value {
    make_boolean(value.is_nil())
}

// =============================================================================
// Code entries
// =============================================================================

fn display_entry(ctx: &mut Context, _closure: &Instance, value: Value) -> Result<Value> {
    display(ctx, &value)?;
    Ok(Value::Unspecified)
}

fn newline_entry(ctx: &mut Context, _closure: &Instance) -> Result<Value> {
    newline(ctx)?;
    Ok(Value::Unspecified)
}

fn add_entry(_ctx: &mut Context, _closure: &Instance, a: Value, b: Value) -> Result<Value> {
    add(&a, &b)
}

fn sub_entry(_ctx: &mut Context, _closure: &Instance, a: Value, b: Value) -> Result<Value> {
    sub(&a, &b)
}

fn lt_entry(_ctx: &mut Context, _closure: &Instance, a: Value, b: Value) -> Result<Value> {
    lt(&a, &b)
}

fn num_eq_entry(_ctx: &mut Context, _closure: &Instance, a: Value, b: Value) -> Result<Value> {
    num_eq(&a, &b)
}

fn cons_entry(_ctx: &mut Context, _closure: &Instance, a: Value, b: Value) -> Result<Value> {
    Ok(make_pair(a, b))
}

fn car_entry(_ctx: &mut Context, _closure: &Instance, value: Value) -> Result<Value> {
    car(&value)
}

fn cdr_entry(_ctx: &mut Context, _closure: &Instance, value: Value) -> Result<Value> {
    cdr(&value)
}

fn is_null_entry(_ctx: &mut Context, _closure: &Instance, value: Value) -> Result<Value> {
    Ok(is_null(&value))
}
