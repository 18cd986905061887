//! Pending tail call record
//!
//! A closure body that wants to tail-call does not invoke the callee. It
//! stores the callee and its arguments here and returns a sentinel. The
//! driver loop at the nearest call site then performs the call, so a chain
//! of tail calls never grows the native stack.
//!
//! At most one call is pending at a time. The driver loop drains the record
//! before its own caller resumes, so nested call sites can share one record.

use crate::closure::Instance;
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use std::rc::Rc;

/// A scheduled tail call
#[derive(Debug)]
pub struct PendingCall {
    pub target: Rc<Instance>,
    pub args: Vec<Value>,
}

/// The shared pending-call record plus a reusable argument buffer
#[derive(Debug, Default)]
pub struct Trampoline {
    pending: Option<PendingCall>,
    spare: Vec<Value>,
}

impl Trampoline {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no tail call is waiting to be driven
    pub fn is_done(&self) -> bool {
        self.pending.is_none()
    }

    /// Record a tail call to `target`.
    ///
    /// Fails if a call is already pending: overwriting it would silently drop
    /// a call the enclosing driver loop still has to make.
    pub fn schedule(
        &mut self,
        target: Rc<Instance>,
        args: impl IntoIterator<Item = Value>,
    ) -> Result<()> {
        if let Some(pending) = &self.pending {
            return Err(RuntimeError::TrampolineBusy {
                name: pending.target.name().to_string(),
            });
        }
        let mut buf = std::mem::take(&mut self.spare);
        buf.clear();
        buf.extend(args);
        tracing::trace!(callee = target.name(), args = buf.len(), "tail call scheduled");
        self.pending = Some(PendingCall { target, args: buf });
        Ok(())
    }

    /// Remove the pending call, leaving the record done
    pub fn take(&mut self) -> Option<PendingCall> {
        self.pending.take()
    }

    /// Hand an argument buffer back for the next `schedule`
    pub fn recycle(&mut self, mut args: Vec<Value>) {
        args.clear();
        if args.capacity() > self.spare.capacity() {
            self.spare = args;
        }
    }

    /// Name of the pending target, if any
    pub fn pending_name(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.target.name())
    }
}
