#![warn(missing_docs)]

//! Isolated tasks of execution

use std::io;
use std::io::Write;
use std::panic;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::heap::Arena;

/// Uninhabited return type for functions that never return
pub enum Never {}

/// Destination for printed values
pub enum Output {
    /// Standard output of the process
    Stdout(io::Stdout),
    /// In-memory buffer
    Buffer(Vec<u8>),
}

/// Isolated task of execution
///
/// All compiled Corvid code runs inside a task. It owns the fixed size heap [`Arena`] and the
/// output stream values are printed to. A task is inherently single threaded.
pub struct Task {
    arena: Arena,
    output: Output,
}

impl Task {
    /// Creates a new task printing to standard output
    pub fn new(config: &Config) -> Result<Task> {
        Self::with_output(config, Output::Stdout(io::stdout()))
    }

    /// Creates a new task printing to the passed output
    ///
    /// Fails if the heap arena can't be allocated.
    pub fn with_output(config: &Config, output: Output) -> Result<Task> {
        Ok(Task {
            arena: Arena::with_capacity(config.heap_words)?,
            output,
        })
    }

    /// Returns this task's heap arena
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns a mutable reference to this task's heap arena
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns the arena and output stream at the same time
    ///
    /// Printing reads the arena while writing the output.
    pub fn arena_and_output(&mut self) -> (&Arena, &mut Output) {
        (&self.arena, &mut self.output)
    }

    /// Consumes the task returning its output stream
    pub fn into_output(self) -> Output {
        self.output
    }

    /// Marks the current task as stuck
    ///
    /// This unwinds to the task's launcher which reports `error` and terminates the process.
    /// Compiled code has no way to observe or recover from this.
    pub fn stuck(&mut self, error: Error) -> Never {
        // `resume_unwind` skips the panic hook; a stuck task isn't a bug in the runtime
        panic::resume_unwind(Box::new(error));
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(stdout) => stdout.write(buf),
            Output::Buffer(buffer) => buffer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(stdout) => stdout.flush(),
            Output::Buffer(_) => Ok(()),
        }
    }
}
