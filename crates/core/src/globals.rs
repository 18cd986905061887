//! Global variable table
//!
//! Globals are addressed by dense indices assigned at compile time. The
//! builtin prelude occupies the first slots; program globals follow. A slot
//! holds `Unspecified` until the program's bootstrap defines it.

use crate::error::{Result, RuntimeError};
use crate::value::Value;

/// Index of a global slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(usize);

impl GlobalId {
    pub const fn new(index: usize) -> Self {
        GlobalId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Globals {
    slots: Vec<Value>,
    names: Vec<Option<Box<str>>>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bind `id` to `value`, growing the table as needed
    pub fn define(&mut self, id: GlobalId, name: &str, value: Value) {
        let index = id.index();
        if index >= self.slots.len() {
            self.slots.resize(index + 1, Value::Unspecified);
            self.names.resize(index + 1, None);
        }
        self.slots[index] = value;
        self.names[index] = Some(name.into());
    }

    pub fn get(&self, id: GlobalId) -> Result<Value> {
        self.slots
            .get(id.index())
            .cloned()
            .ok_or(RuntimeError::GlobalOutOfRange {
                index: id.index(),
                len: self.slots.len(),
            })
    }

    /// Assign an already-defined global
    pub fn set(&mut self, id: GlobalId, value: Value) -> Result<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(RuntimeError::GlobalOutOfRange {
                index: id.index(),
                len,
            })?;
        *slot = value;
        Ok(())
    }

    /// Find a defined global by name
    pub fn lookup(&self, name: &str) -> Option<GlobalId> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(GlobalId::new)
    }

    pub fn name(&self, id: GlobalId) -> Option<&str> {
        self.names.get(id.index()).and_then(|n| n.as_deref())
    }
}
