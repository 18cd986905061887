//! Call frames
//!
//! A [`Frame`] holds the local slots of one closure invocation that binds
//! variables captured by nested closures. It is the owner of those variables'
//! stack-resident phase:
//!
//! 1. `fresh_cell(i)` creates a cell aliasing slot `i` and records it.
//! 2. Nested instances are built from `fresh_cells()` (see
//!    [`build_instance`](crate::closure::build_instance)).
//! 3. Before the invocation hands control back, every recorded cell is
//!    escaped. Dropping the frame does this, so normal returns, tail-call
//!    handoffs and `?` propagation all honour the discipline.
//!
//! Invocations that capture nothing never need a frame; their arguments stay
//! ordinary Rust locals.

use crate::cell::{Cell, escape_all};
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Slot storage shared (weakly) with stack-resident cells
pub(crate) type Slots = RefCell<Vec<Value>>;

pub struct Frame {
    slots: Rc<Slots>,
    fresh: Vec<Rc<Cell>>,
}

impl Frame {
    /// Create a frame of `size` slots, all unspecified
    pub fn new(size: usize) -> Self {
        Frame {
            slots: Rc::new(RefCell::new(vec![Value::Unspecified; size])),
            fresh: Vec::new(),
        }
    }

    /// Create a frame whose first slots hold the call's arguments.
    ///
    /// The frame is padded with unspecified slots up to `size`.
    pub fn from_args(args: impl IntoIterator<Item = Value>, size: usize) -> Self {
        let mut slots: Vec<Value> = args.into_iter().collect();
        if slots.len() < size {
            slots.resize(size, Value::Unspecified);
        }
        Frame {
            slots: Rc::new(RefCell::new(slots)),
            fresh: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<Value> {
        let slots = self.slots.borrow();
        slots
            .get(index)
            .cloned()
            .ok_or(RuntimeError::SlotOutOfRange {
                index,
                len: slots.len(),
            })
    }

    pub fn set(&self, index: usize, value: Value) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        let len = slots.len();
        let target = slots
            .get_mut(index)
            .ok_or(RuntimeError::SlotOutOfRange { index, len })?;
        *target = value;
        Ok(())
    }

    /// Create a stack-resident cell for slot `index`.
    ///
    /// Cells are numbered in creation order; that number is what a
    /// `Capture::Fresh` recipe entry refers to.
    pub fn fresh_cell(&mut self, index: usize) -> Result<Rc<Cell>> {
        let len = self.len();
        if index >= len {
            return Err(RuntimeError::SlotOutOfRange { index, len });
        }
        let cell = Cell::borrowed(&self.slots, index);
        self.fresh.push(cell.clone());
        Ok(cell)
    }

    /// Cells created by this frame, in creation order
    pub fn fresh_cells(&self) -> &[Rc<Cell>] {
        &self.fresh
    }

    /// Escape every cell this frame created. Safe to call more than once.
    pub fn escape(&mut self) -> Result<usize> {
        escape_all(&self.fresh)
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        // Slots are still alive here, so this only fails on a slot index
        // that fresh_cell already rejected.
        if let Err(e) = self.escape() {
            tracing::error!(error = %e, "failed to escape cells on frame exit");
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("slots", &self.slots.borrow())
            .field("fresh", &self.fresh.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::make_fixnum;

    #[test]
    fn test_from_args_pads_with_unspecified() {
        let frame = Frame::from_args([make_fixnum(1)], 3);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.get(0).unwrap(), make_fixnum(1));
        assert!(frame.get(2).unwrap().is_unspecified());
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut frame = Frame::new(1);
        assert!(matches!(
            frame.get(1),
            Err(RuntimeError::SlotOutOfRange { index: 1, len: 1 })
        ));
        assert!(frame.set(5, make_fixnum(0)).is_err());
        assert!(frame.fresh_cell(1).is_err());
        assert!(frame.fresh_cells().is_empty());
    }

    #[test]
    fn test_fresh_cells_in_creation_order() {
        let mut frame = Frame::from_args([make_fixnum(1), make_fixnum(2)], 2);
        let second = frame.fresh_cell(1).unwrap();
        let first = frame.fresh_cell(0).unwrap();
        assert!(Rc::ptr_eq(&frame.fresh_cells()[0], &second));
        assert!(Rc::ptr_eq(&frame.fresh_cells()[1], &first));
    }

    #[test]
    fn test_explicit_escape_then_drop() {
        let cell;
        {
            let mut frame = Frame::from_args([make_fixnum(3)], 1);
            cell = frame.fresh_cell(0).unwrap();
            assert_eq!(frame.escape().unwrap(), 1);
            assert_eq!(frame.escape().unwrap(), 0);
        }
        assert_eq!(cell.get().unwrap(), make_fixnum(3));
    }
}
