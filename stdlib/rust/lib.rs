#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! Functions linked in to compiled Corvid programs
//!
//! Every exported function takes the running [`Task`] as its first argument. Contract violations
//! never return to compiled code; they mark the task as stuck and unwind to
//! [`launch_task`](crate::launch::launch_task).

pub mod channel;
pub mod guard;
pub mod launch;
pub mod write;

use std::io;

use corvid_runtime::error::{Error, Result};
use corvid_runtime::layout;
use corvid_runtime::task::Task;

/// Version of the tag layout this library was built with
#[export_name = "CORVID_RUNTIME_LAYOUT_VERSION"]
pub static LAYOUT_VERSION: u32 = layout::LAYOUT_VERSION;

/// Complete tag layout this library was built with
#[export_name = "CORVID_RUNTIME_TAG_LAYOUT"]
pub static TAG_LAYOUT: layout::TagLayout = layout::TAG_LAYOUT;

/// Returns the successful value or marks the task as stuck
pub(crate) fn or_stuck<T>(task: &mut Task, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => match task.stuck(err) {},
    }
}

/// Converts a failure writing task output in to a runtime error
pub(crate) fn output_error(err: io::Error) -> Error {
    Error::Write {
        errno: err.raw_os_error().unwrap_or(libc::EIO),
    }
}
