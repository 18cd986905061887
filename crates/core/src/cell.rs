//! Cells: mutable captured variables
//!
//! A variable that a nested closure captures by reference lives in a [`Cell`].
//! A cell starts *stack-resident*: it aliases one slot of the [`Frame`] of the
//! call that introduced the variable, so writes made through the frame and
//! writes made through the cell are the same write. Before that frame is torn
//! down the cell is *escaped*: the current slot value is copied into the
//! cell's own storage and the cell stops referring to the frame. From then on
//! it lives as long as any closure holding it.
//!
//! ```text
//!  stack-resident                         escaped
//! ┌──────────────┐     ┌──────────┐      ┌──────────────┐
//! │ Cell         │────▶│ Frame    │      │ Cell         │
//! │ Borrowed(i)  │weak │ slot i   │ ───▶ │ Escaped(v)   │
//! └──────────────┘     └──────────┘      └──────────────┘
//! ```
//!
//! The frame handle is a `Weak` reference, never a raw address: touching a
//! stack-resident cell after its frame is gone is reported as
//! [`RuntimeError::DanglingCell`] instead of reading freed memory. Frames
//! escape their cells when dropped, so well-formed code never sees that error.
//!
//! [`Frame`]: crate::frame::Frame

use crate::error::{Result, RuntimeError};
use crate::frame::Slots;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

enum Slot {
    /// Aliases slot `index` of a live frame
    Borrowed { frame: Weak<Slots>, index: usize },
    /// Owns its value; independent of any frame
    Escaped(Value),
}

/// An identity-bearing indirection for one captured variable.
///
/// Always handled as `Rc<Cell>`: the creating frame and every instance that
/// captures the variable share the same cell.
pub struct Cell {
    slot: RefCell<Slot>,
}

fn read_slot(frame: &Weak<Slots>, index: usize) -> Result<Value> {
    let slots = frame
        .upgrade()
        .ok_or(RuntimeError::DanglingCell { index })?;
    let slots = slots.borrow();
    slots
        .get(index)
        .cloned()
        .ok_or(RuntimeError::SlotOutOfRange {
            index,
            len: slots.len(),
        })
}

impl Cell {
    /// Create a stack-resident cell aliasing `slots[index]`
    pub(crate) fn borrowed(frame: &Rc<Slots>, index: usize) -> Rc<Cell> {
        Rc::new(Cell {
            slot: RefCell::new(Slot::Borrowed {
                frame: Rc::downgrade(frame),
                index,
            }),
        })
    }

    /// Create a cell that is heap-resident from the start
    pub fn escaped(value: Value) -> Rc<Cell> {
        Rc::new(Cell {
            slot: RefCell::new(Slot::Escaped(value)),
        })
    }

    pub fn is_escaped(&self) -> bool {
        matches!(&*self.slot.borrow(), Slot::Escaped(_))
    }

    /// Read the current value
    pub fn get(&self) -> Result<Value> {
        match &*self.slot.borrow() {
            Slot::Escaped(v) => Ok(v.clone()),
            Slot::Borrowed { frame, index } => read_slot(frame, *index),
        }
    }

    /// Write a new value (Scheme `set!` on a captured variable)
    pub fn set(&self, value: Value) -> Result<()> {
        let mut slot = self.slot.borrow_mut();
        match &mut *slot {
            Slot::Escaped(v) => {
                *v = value;
                Ok(())
            }
            Slot::Borrowed { frame, index } => {
                let index = *index;
                let slots = frame
                    .upgrade()
                    .ok_or(RuntimeError::DanglingCell { index })?;
                let mut slots = slots.borrow_mut();
                let len = slots.len();
                let target = slots
                    .get_mut(index)
                    .ok_or(RuntimeError::SlotOutOfRange { index, len })?;
                *target = value;
                Ok(())
            }
        }
    }

    /// Promote to heap-resident.
    ///
    /// Copies the aliased slot's current value into the cell. Returns `true`
    /// if the cell changed state and `false` if it had already escaped.
    pub fn escape(&self) -> Result<bool> {
        let mut slot = self.slot.borrow_mut();
        let value = match &*slot {
            Slot::Escaped(_) => return Ok(false),
            Slot::Borrowed { frame, index } => read_slot(frame, *index)?,
        };
        *slot = Slot::Escaped(value);
        Ok(true)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.slot.borrow() {
            Slot::Escaped(v) => write!(f, "Cell(escaped {:?})", v),
            Slot::Borrowed { index, .. } => write!(f, "Cell(frame slot {})", index),
        }
    }
}

/// Escape every cell in `cells`. Returns how many changed state.
pub fn escape_all(cells: &[Rc<Cell>]) -> Result<usize> {
    let mut escaped = 0;
    for cell in cells {
        if cell.escape()? {
            escaped += 1;
        }
    }
    if escaped > 0 {
        tracing::trace!(escaped, "escaped cells to heap");
    }
    Ok(escaped)
}
