use std::io::Write;

use corvid_runtime::error::Result;
use corvid_runtime::tagged::Word;
use corvid_runtime::task::Task;
use corvid_runtime_syntax::writer::write_word;

use crate::{or_stuck, output_error};

/// Writes a word to the task's output
pub fn print_word(task: &mut Task, word: Word) -> Result<()> {
    let (arena, output) = task.arena_and_output();
    write_word(output, arena, word).map_err(output_error)
}

/// Prints a word and returns it unchanged
#[export_name = "corvid_stdlib_print"]
pub extern "C-unwind" fn print(task: &mut Task, word: Word) -> Word {
    let result = print_word(task, word);
    or_stuck(task, result);

    word
}

/// Prints a word followed by a newline and returns it unchanged
#[export_name = "corvid_stdlib_println"]
pub extern "C-unwind" fn println(task: &mut Task, word: Word) -> Word {
    let result = print_word(task, word).and_then(|()| {
        let (_, output) = task.arena_and_output();
        output.write_all(b"\n").map_err(output_error)
    });
    or_stuck(task, result);

    word
}
