//! Process entry
//!
//! Runs one program to completion and turns the outcome into an exit code:
//! 0 on normal completion, 1 with an `error:` diagnostic on stderr for any
//! runtime error. No partial result is printed after an error.

use crate::config::RuntimeConfig;
use crate::program::Program;
use crate::report::{self, ReportData};
use kiln_core::{CallStats, Context, Result, RuntimeError};
use std::io::{ErrorKind, Write};
use std::time::{Duration, Instant};

/// Result of running a program, with the statistics gathered on the way
#[derive(Debug)]
pub struct Outcome {
    pub result: Result<()>,
    pub stats: CallStats,
    pub elapsed: Duration,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(()) => 0,
            Err(e) => e.exit_code(),
        }
    }
}

fn run_to_completion(program: &Program) -> Outcome {
    let start = Instant::now();
    let mut ctx = Context::new();
    let result = program.run(&mut ctx).map(|_| ());
    let flushed = ctx.out().flush().map_err(RuntimeError::from);
    Outcome {
        result: result.and(flushed),
        stats: *ctx.stats(),
        elapsed: start.elapsed(),
    }
}

/// Run `program` with output on stdout.
///
/// With `stack_size_kib` set, the program runs on a dedicated thread with
/// that much native stack.
pub fn execute(program: &'static Program, config: &RuntimeConfig) -> Outcome {
    let bytes = match config.stack_size_bytes() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return run_to_completion(program),
        Err(e) => return not_started(std::io::Error::new(ErrorKind::InvalidInput, e.to_string())),
    };

    tracing::debug!(stack_size_bytes = bytes, "running on dedicated thread");
    let spawned = std::thread::Builder::new()
        .name(format!("kiln-{}", program.name))
        .stack_size(bytes)
        .spawn(move || run_to_completion(program));
    let joined = match spawned {
        Ok(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("program thread panicked")),
        Err(e) => Err(e),
    };
    joined.unwrap_or_else(not_started)
}

fn not_started(e: std::io::Error) -> Outcome {
    Outcome {
        result: Err(RuntimeError::Io(e)),
        stats: CallStats::default(),
        elapsed: Duration::ZERO,
    }
}

/// Run `program`, print the diagnostic and report, and return the exit code
pub fn main_entry(program: &'static Program, config: &RuntimeConfig) -> i32 {
    let outcome = execute(program, config);
    let code = outcome.exit_code();
    if let Err(e) = &outcome.result {
        tracing::error!(program = program.name, error = %e, "program failed");
        eprintln!("error: {}", e);
    }
    let data = ReportData::new(program.name, code, outcome.elapsed, &outcome.stats);
    report::emit(config.report, &data);
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs;

    #[test]
    fn test_arity_error_exits_one() {
        let program = programs::find("arity-error").unwrap();
        let outcome = execute(program, &RuntimeConfig::default());
        assert!(matches!(
            outcome.result,
            Err(RuntimeError::ArityMismatch { .. })
        ));
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_dedicated_thread() {
        let program = programs::find("sum").unwrap();
        let config = RuntimeConfig {
            stack_size_kib: Some(256),
            ..RuntimeConfig::default()
        };
        let outcome = execute(program, &config);
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.stats.tail_calls >= 30);
    }

    #[test]
    fn test_oversized_stack_fails_without_running() {
        let program = programs::find("sum").unwrap();
        let config = RuntimeConfig {
            stack_size_kib: Some(usize::MAX),
            ..RuntimeConfig::default()
        };
        let outcome = execute(program, &config);
        assert_eq!(outcome.exit_code(), 1);
        assert!(matches!(outcome.result, Err(RuntimeError::Io(_))));
        assert_eq!(outcome.stats.native_calls, 0);
    }
}
