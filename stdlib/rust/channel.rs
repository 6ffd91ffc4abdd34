use corvid_runtime::channel;
use corvid_runtime::tagged::{Direction, Word};
use corvid_runtime::task::Task;

use crate::or_stuck;

#[export_name = "corvid_stdlib_open_input"]
pub extern "C-unwind" fn open_input(task: &mut Task, path: Word) -> Word {
    let result = channel::open(task.arena(), path, Direction::Input);
    or_stuck(task, result)
}

#[export_name = "corvid_stdlib_open_output"]
pub extern "C-unwind" fn open_output(task: &mut Task, path: Word) -> Word {
    let result = channel::open(task.arena(), path, Direction::Output);
    or_stuck(task, result)
}

#[export_name = "corvid_stdlib_close"]
pub extern "C-unwind" fn close(task: &mut Task, handle: Word) -> Word {
    let result = channel::close(handle);
    or_stuck(task, result)
}

/// Fills `buffer` from an input channel and returns it
#[export_name = "corvid_stdlib_read"]
pub extern "C-unwind" fn read(task: &mut Task, handle: Word, buffer: Word) -> Word {
    let result = channel::read(task.arena_mut(), handle, buffer);
    or_stuck(task, result)
}

/// Writes a string to an output channel and returns the number of bytes written
#[export_name = "corvid_stdlib_write"]
pub extern "C-unwind" fn write(task: &mut Task, handle: Word, string: Word) -> Word {
    let result = channel::write(task.arena(), handle, string);
    let written = or_stuck(task, result);

    // Strings are bounded by the arena so their length is always a valid fixnum
    Word::fixnum(written as i64).unwrap_or(Word::NIL)
}
