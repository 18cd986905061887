//! Output sink for `display` and `newline`
//!
//! Programs write to stdout in normal runs. Tests and embedders use a shared
//! in-memory buffer so output can be inspected after the program returns.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    Buffer(Rc<RefCell<Vec<u8>>>),
}

impl Output {
    pub fn buffer() -> Self {
        Output::Buffer(Rc::new(RefCell::new(Vec::new())))
    }

    /// Drain buffered output as text. Empty for stdout.
    pub fn take_string(&self) -> String {
        match self {
            Output::Stdout => String::new(),
            Output::Buffer(buf) => {
                let bytes = std::mem::take(&mut *buf.borrow_mut());
                String::from_utf8_lossy(&bytes).into_owned()
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout => io::stdout().lock().write(data),
            Output::Buffer(buf) => buf.borrow_mut().write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().lock().flush(),
            Output::Buffer(_) => Ok(()),
        }
    }
}
