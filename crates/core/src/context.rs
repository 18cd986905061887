//! Per-call-chain runtime state
//!
//! Everything a compiled closure body may touch besides its own instance and
//! frame: the pending tail call record, the global table, the output sink and
//! call statistics. One `Context` is threaded by `&mut` through every call,
//! so there is no process-wide mutable state.

use crate::cell::Cell;
use crate::closure::{Instance, Skeleton, build_instance};
use crate::error::Result;
use crate::globals::{GlobalId, Globals};
use crate::output::Output;
use crate::stats::CallStats;
use crate::trampoline::Trampoline;
use crate::value::Value;
use std::rc::Rc;

#[derive(Debug)]
pub struct Context {
    trampoline: Trampoline,
    globals: Globals,
    out: Output,
    stats: CallStats,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Context writing program output to stdout
    pub fn new() -> Self {
        Self::with_output(Output::Stdout)
    }

    /// Context capturing program output in memory
    pub fn buffered() -> Self {
        Self::with_output(Output::buffer())
    }

    pub fn with_output(out: Output) -> Self {
        Context {
            trampoline: Trampoline::new(),
            globals: Globals::new(),
            out,
            stats: CallStats::default(),
        }
    }

    pub fn out(&mut self) -> &mut Output {
        &mut self.out
    }

    /// Drain captured output (empty when writing to stdout)
    pub fn take_output(&self) -> String {
        self.out.take_string()
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut Globals {
        &mut self.globals
    }

    pub fn global(&self, id: GlobalId) -> Result<Value> {
        self.globals.get(id)
    }

    pub fn set_global(&mut self, id: GlobalId, value: Value) -> Result<()> {
        self.globals.set(id, value)
    }

    pub fn trampoline(&self) -> &Trampoline {
        &self.trampoline
    }

    pub fn trampoline_mut(&mut self) -> &mut Trampoline {
        &mut self.trampoline
    }

    pub fn stats(&self) -> &CallStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut CallStats {
        &mut self.stats
    }

    /// Build an instance of `skeleton` and count it
    pub fn instantiate(
        &mut self,
        skeleton: &Rc<Skeleton>,
        parent: &[Rc<Cell>],
        fresh: &[Rc<Cell>],
    ) -> Result<Value> {
        let instance: Rc<Instance> = build_instance(skeleton, parent, fresh)?;
        self.stats.instances_built += 1;
        Ok(Value::Closure(instance))
    }
}
