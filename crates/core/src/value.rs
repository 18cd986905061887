//! Value representation
//!
//! Every runtime value is either an *immediate* (fixnum, boolean, nil,
//! unspecified) that carries no identity, or a *heap* object (symbol, pair,
//! closure) that is shared by reference.
//!
//! ## Tag Space
//!
//! The tag numbering follows the packed one-word encoding the code generator
//! targets:
//!
//! ```text
//! Immediate word:  [ payload (60 bits) | tag (4 bits) ]
//!   1 = Fixnum       payload is the signed integer
//!   2 = Unspecified  payload is zero
//!   3 = Nil          payload is zero
//!   4 = Boolean      payload is 0 or 1
//!
//! Heap pointer:    [ address            | 0000 ]
//!   first word of the heap block is the discriminant:
//!   16 = Symbol, 17 = Pair, 18 = Closure
//! ```
//!
//! Immediate tags live in `1..=15` and heap discriminants start at 16, so the
//! two spaces never overlap and classification is total: test the low tag
//! bits first, and only a zero tag needs the heap discriminant.
//!
//! In Rust the word is a proper enum; the packing survives as
//! [`encode_immediate`] / [`decode_immediate`] and in the 60-bit fixnum range.

use crate::closure::Instance;
use std::rc::Rc;

// =============================================================================
// Tags
// =============================================================================

/// Number of low bits holding the immediate tag
pub const TAG_WIDTH: u32 = 4;

/// Mask selecting the immediate tag bits
pub const TAG_MASK: u64 = (1 << TAG_WIDTH) - 1;

/// Largest fixnum representable in the packed word
pub const FIXNUM_MAX: i64 = (1i64 << (63 - TAG_WIDTH)) - 1;

/// Smallest fixnum representable in the packed word
pub const FIXNUM_MIN: i64 = -(1i64 << (63 - TAG_WIDTH));

/// Type discriminant of a value
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Fixnum = 1,
    Unspecified = 2,
    Nil = 3,
    Boolean = 4,
    Symbol = 16,
    Pair = 17,
    Closure = 18,
}

impl TypeTag {
    /// True for tags encoded directly in the word (no heap block)
    #[inline]
    pub fn is_immediate(self) -> bool {
        (self as u64) <= TAG_MASK
    }

    /// Human-readable kind name, used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Fixnum => "fixnum",
            TypeTag::Unspecified => "unspecified",
            TypeTag::Nil => "nil",
            TypeTag::Boolean => "boolean",
            TypeTag::Symbol => "symbol",
            TypeTag::Pair => "pair",
            TypeTag::Closure => "closure",
        }
    }
}

// =============================================================================
// Heap objects
// =============================================================================

/// A symbol. Symbols are not interned; two symbols with the same name are
/// distinct objects.
#[derive(Debug)]
pub struct Symbol {
    name: Box<str>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An immutable cons cell
#[derive(Debug)]
pub struct Pair {
    car: Value,
    cdr: Value,
}

impl Pair {
    pub fn car(&self) -> &Value {
        &self.car
    }

    pub fn cdr(&self) -> &Value {
        &self.cdr
    }
}

// Unlink the cdr spine iteratively; the default recursive drop would use one
// native frame per list element.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut rest = std::mem::replace(&mut self.cdr, Value::Nil);
        while let Value::Pair(rc) = rest {
            match Rc::try_unwrap(rc) {
                Ok(mut pair) => rest = std::mem::replace(&mut pair.cdr, Value::Nil),
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// Value
// =============================================================================

/// A runtime value.
///
/// Cloning is cheap: immediates are copied, heap objects bump a reference
/// count. Equality is identity (`eq?`): immediates compare by value, heap
/// objects compare by address.
#[derive(Clone)]
pub enum Value {
    Fixnum(i64),
    Boolean(bool),
    Nil,
    Unspecified,
    Symbol(Rc<Symbol>),
    Pair(Rc<Pair>),
    Closure(Rc<Instance>),
}

impl Value {
    /// Classify this value. Pure, never allocates, never fails.
    #[inline]
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Fixnum(_) => TypeTag::Fixnum,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Nil => TypeTag::Nil,
            Value::Unspecified => TypeTag::Unspecified,
            Value::Symbol(_) => TypeTag::Symbol,
            Value::Pair(_) => TypeTag::Pair,
            Value::Closure(_) => TypeTag::Closure,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Value::Unspecified)
    }

    /// Scheme truthiness: everything except `#f` is true
    #[inline]
    pub fn to_boolean(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    #[inline]
    pub fn as_fixnum(&self) -> Option<i64> {
        match self {
            Value::Fixnum(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&Rc<Pair>> {
        match self {
            Value::Pair(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Rc<Instance>> {
        match self {
            Value::Closure(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Fixnum(a), Value::Fixnum(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Unspecified, Value::Unspecified) => true,
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Fixnum(n) => write!(f, "{}", n),
            Value::Boolean(true) => write!(f, "#t"),
            Value::Boolean(false) => write!(f, "#f"),
            Value::Nil => write!(f, "()"),
            Value::Unspecified => write!(f, "#<unspecified>"),
            Value::Symbol(s) => write!(f, "{}", s.name()),
            Value::Closure(c) => write!(f, "#<procedure {}>", c.name()),
            Value::Pair(p) => {
                write!(f, "({}", p.car())?;
                // Walk the spine iteratively so long lists don't recurse
                let mut rest = p.cdr();
                while let Value::Pair(next) = rest {
                    write!(f, " {}", next.car())?;
                    rest = next.cdr();
                }
                if !rest.is_nil() {
                    write!(f, " . {}", rest)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Fixnum(n) => write!(f, "Fixnum({})", n),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Nil => write!(f, "Nil"),
            Value::Unspecified => write!(f, "Unspecified"),
            Value::Symbol(s) => write!(f, "Symbol({:?})", s.name()),
            Value::Pair(_) => write!(f, "Pair({})", self),
            Value::Closure(c) => write!(f, "Closure({:?})", c.name()),
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Build a fixnum, truncating to the 60-bit packed range.
///
/// Matches shifting the payload left by [`TAG_WIDTH`] and back: values
/// outside `FIXNUM_MIN..=FIXNUM_MAX` wrap.
#[inline]
pub fn make_fixnum(n: i64) -> Value {
    Value::Fixnum(n.wrapping_shl(TAG_WIDTH) >> TAG_WIDTH)
}

#[inline]
pub fn make_boolean(b: bool) -> Value {
    Value::Boolean(b)
}

#[inline]
pub fn make_nil() -> Value {
    Value::Nil
}

#[inline]
pub fn make_unspecified() -> Value {
    Value::Unspecified
}

pub fn make_symbol(name: impl Into<Box<str>>) -> Value {
    Value::Symbol(Rc::new(Symbol { name: name.into() }))
}

pub fn make_pair(car: Value, cdr: Value) -> Value {
    Value::Pair(Rc::new(Pair { car, cdr }))
}

pub fn make_closure(instance: Rc<Instance>) -> Value {
    Value::Closure(instance)
}

/// Build a proper list from the given items
pub fn make_list(items: impl IntoIterator<Item = Value, IntoIter: DoubleEndedIterator>) -> Value {
    items
        .into_iter()
        .rev()
        .fold(Value::Nil, |tail, item| make_pair(item, tail))
}

/// Classify a value (same as [`Value::tag`])
#[inline]
pub fn tag_of(value: &Value) -> TypeTag {
    value.tag()
}

/// Extract the integer payload of a fixnum
#[inline]
pub fn unwrap_fixnum(value: &Value) -> Option<i64> {
    value.as_fixnum()
}

// =============================================================================
// Packed immediate words
// =============================================================================

/// Pack an immediate into its one-word form. Heap values have no packed form.
pub fn encode_immediate(value: &Value) -> Option<u64> {
    let (payload, tag) = match value {
        Value::Fixnum(n) => (*n as u64, TypeTag::Fixnum),
        Value::Boolean(b) => (u64::from(*b), TypeTag::Boolean),
        Value::Nil => (0, TypeTag::Nil),
        Value::Unspecified => (0, TypeTag::Unspecified),
        _ => return None,
    };
    Some((payload << TAG_WIDTH) | tag as u64)
}

/// Classify a packed word by its low tag bits.
///
/// Returns `None` for a zero tag (a heap pointer, whose discriminant lives in
/// the pointed-to block) and for tag values no immediate uses.
pub fn immediate_tag(word: u64) -> Option<TypeTag> {
    match word & TAG_MASK {
        1 => Some(TypeTag::Fixnum),
        2 => Some(TypeTag::Unspecified),
        3 => Some(TypeTag::Nil),
        4 => Some(TypeTag::Boolean),
        _ => None,
    }
}

/// Unpack a one-word immediate. Fixnums are recovered with an arithmetic
/// shift so the sign is preserved.
pub fn decode_immediate(word: u64) -> Option<Value> {
    let payload = word >> TAG_WIDTH;
    match immediate_tag(word)? {
        TypeTag::Fixnum => Some(Value::Fixnum((word as i64) >> TAG_WIDTH)),
        TypeTag::Boolean => Some(Value::Boolean(payload != 0)),
        TypeTag::Nil if payload == 0 => Some(Value::Nil),
        TypeTag::Unspecified if payload == 0 => Some(Value::Unspecified),
        _ => None,
    }
}
