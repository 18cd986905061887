//! Compiled program contract
//!
//! A compiled program is a bootstrap function plus the names of the globals
//! it defines. Running it follows a fixed order:
//!
//! 1. install the builtin prelude
//! 2. bootstrap: build the skeleton table and the toplevel instance
//! 3. call the toplevel instance with zero arguments

use crate::call::call0;
use crate::prelude::{self, program_global};
use kiln_core::{Context, GlobalId, Result, Value};

/// A program emitted by the compiler
#[derive(Debug)]
pub struct Program {
    pub name: &'static str,
    pub description: &'static str,
    /// Program globals, defined in order after the prelude
    pub globals: &'static [&'static str],
    /// Builds every skeleton and returns the toplevel instance
    pub bootstrap: fn(&mut Context) -> Result<Value>,
}

impl Program {
    /// Global slot of the named program global
    pub fn global(&self, name: &str) -> Option<GlobalId> {
        self.globals
            .iter()
            .position(|g| *g == name)
            .map(program_global)
    }

    /// Install the prelude and bootstrap, returning the toplevel instance
    pub fn load(&self, ctx: &mut Context) -> Result<Value> {
        prelude::install(ctx)?;
        for (k, name) in self.globals.iter().enumerate() {
            ctx.globals_mut()
                .define(program_global(k), name, Value::Unspecified);
        }
        let toplevel = (self.bootstrap)(ctx)?;
        tracing::debug!(
            program = self.name,
            globals = ctx.globals().len(),
            "bootstrap complete"
        );
        Ok(toplevel)
    }

    /// Load the program and call its toplevel
    pub fn run(&self, ctx: &mut Context) -> Result<Value> {
        let toplevel = self.load(ctx)?;
        tracing::info!(program = self.name, "program started");
        let result = call0(ctx, &toplevel)?;
        tracing::info!(program = self.name, "program finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Builtin;
    use kiln_core::{CodeEntry, Instance, Skeleton, make_fixnum};

    const ANSWER: GlobalId = program_global(0);

    fn toplevel(ctx: &mut Context, _closure: &Instance) -> Result<Value> {
        ctx.global(ANSWER)
    }

    fn bootstrap(ctx: &mut Context) -> Result<Value> {
        ctx.set_global(ANSWER, make_fixnum(42))?;
        let skel = Skeleton::builder("toplevel", CodeEntry::Nullary(toplevel)).build();
        ctx.instantiate(&skel, &[], &[])
    }

    const TINY: Program = Program {
        name: "tiny",
        description: "returns a global",
        globals: &["answer"],
        bootstrap,
    };

    #[test]
    fn test_run_order() {
        let mut ctx = Context::buffered();
        assert_eq!(TINY.run(&mut ctx).unwrap(), make_fixnum(42));
        assert_eq!(ctx.globals().len(), Builtin::COUNT + 1);
        assert_eq!(TINY.global("answer"), Some(ANSWER));
        assert_eq!(ctx.globals().lookup("answer"), Some(ANSWER));
        assert_eq!(TINY.global("missing"), None);
    }
}
