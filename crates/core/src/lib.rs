//! Kiln Core: runtime primitives for compiled Scheme closures
//!
//! This crate holds the data structures that compiled code manipulates
//! directly. The call protocol that drives them lives in `kiln-runtime`.
//!
//! Key design principles:
//! - Value: a tagged value whose tag is a pure function of the value itself
//! - Skeleton / Instance: one immutable template per closure site, many
//!   instances each owning only its captured cells
//! - Cell: a captured variable, borrowed from its frame while the frame is
//!   live and escaped to its own storage when the frame goes away
//! - Trampoline: one pending tail call per context, drained by call sites
//!
//! # Modules
//!
//! - `value`: Value enum, type tags, constructors, immediate word packing
//! - `cell`: captured variable cells and escape
//! - `frame`: value slots of one call and the cells borrowed from them
//! - `closure`: Skeleton, Instance, capture recipes, code entry points
//! - `trampoline`: pending tail call record
//! - `globals`: global variable table
//! - `context`: state threaded through every call
//! - `stats`: call counters for the at-exit report
//! - `output`: sink for program output
//! - `error`: runtime error taxonomy

pub mod cell;
pub mod closure;
pub mod context;
pub mod error;
pub mod frame;
pub mod globals;
pub mod output;
pub mod stats;
pub mod trampoline;
pub mod value;

pub use cell::{Cell, escape_all};
pub use closure::{
    Capture, CodeEntry, Instance, MAX_SPECIALIZED_ARITY, Skeleton, SkeletonBuilder,
    build_instance,
};
pub use context::Context;
pub use error::{CaptureSource, Result, RuntimeError};
pub use frame::Frame;
pub use globals::{GlobalId, Globals};
pub use output::Output;
pub use stats::CallStats;
pub use trampoline::{PendingCall, Trampoline};
pub use value::{
    FIXNUM_MAX, FIXNUM_MIN, Pair, Symbol, TAG_WIDTH, TypeTag, Value, decode_immediate,
    encode_immediate, immediate_tag, make_boolean, make_closure, make_fixnum, make_list,
    make_nil, make_pair, make_symbol, make_unspecified, tag_of, unwrap_fixnum,
};
