//! Kiln Runtime: executing compiled Scheme programs
//!
//! Builds on `kiln-core` with everything that runs code:
//!
//! - `call`: arity-checked call protocol and the trampoline driver loop
//! - `prelude`: builtin procedures as ordinary closures
//! - `program`: the compiled-program contract (prelude, bootstrap, toplevel)
//! - `programs`: bundled compiled programs
//! - `entry`: process entry, exit codes and the at-exit report
//! - `config`, `logging`, `report`: ambient runtime services

pub mod call;
pub mod config;
pub mod entry;
pub mod logging;
pub mod prelude;
pub mod program;
pub mod programs;
pub mod report;

pub use call::{TAIL_CALL_SENTINEL, call, call0, call1, call2, call3, call4, tail_call};
pub use config::{ConfigError, ReportMode, RuntimeConfig};
pub use entry::{Outcome, execute, main_entry};
pub use prelude::{Builtin, program_global};
pub use program::Program;

pub use kiln_core;
