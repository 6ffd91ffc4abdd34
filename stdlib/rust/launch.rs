//! Entry point bridge between compiled programs and the runtime

use std::io::Write;
use std::{panic, process};

use corvid_runtime::config::Config;
use corvid_runtime::error::{Error, Result};
use corvid_runtime::tagged::Word;
use corvid_runtime::task::Task;

use crate::output_error;
use crate::write::print_word;

/// Entry point of a compiled program
///
/// This receives the running task and the base address of its heap arena. Generated code
/// allocates heap objects by bumping its own pointer from that base.
pub type TaskEntry = extern "C-unwind" fn(&mut Task, *mut u64) -> Word;

/// Runs a compiled program's entry point inside `task` and prints the result
///
/// A stuck computation is returned as its error after flushing any output already written.
pub fn run_task(task: &mut Task, entry: TaskEntry) -> Result<Word> {
    let heap = task.arena_mut().as_mut_ptr();

    let result = match panic::catch_unwind(panic::AssertUnwindSafe(|| entry(task, heap))) {
        Ok(word) => print_word(task, word).map(|()| word),
        Err(payload) => match payload.downcast::<Error>() {
            Ok(err) => Err(*err),
            Err(other) => panic::resume_unwind(other),
        },
    };

    let (_, output) = task.arena_and_output();
    let flushed = output.flush().map_err(output_error);

    result.and_then(|word| flushed.map(|()| word))
}

/// Reports a stuck task on its output stream
///
/// This writes `Stuck[<message>]` after anything the program already printed and flushes it.
pub fn report_stuck(task: &mut Task, error: &Error) -> Result<()> {
    let (_, output) = task.arena_and_output();

    write!(output, "Stuck[{}]", error)
        .and_then(|()| output.flush())
        .map_err(output_error)
}

fn exit_with_launch_error(error: &Error) -> ! {
    eprintln!("{}", error);
    process::exit(1);
}

/// Launches a compiled program
///
/// This is called from the `main` function of every compiled program. If the program gets stuck
/// this reports it on standard output and exits the process with a non-zero status.
#[export_name = "corvid_runtime_launch_task"]
pub extern "C" fn launch_task(entry: TaskEntry) {
    let config = Config::from_env().unwrap_or_else(|err| exit_with_launch_error(&err));
    let mut task = Task::new(&config).unwrap_or_else(|err| exit_with_launch_error(&err));

    match panic::catch_unwind(panic::AssertUnwindSafe(|| run_task(&mut task, entry))) {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => {
            if let Err(report_err) = report_stuck(&mut task, &err) {
                eprintln!("Stuck[{}]: {}", err, report_err);
            }

            process::exit(1);
        }
        Err(_) => {
            // The panic hook has already reported this
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use corvid_runtime::layout::PAIR_TAG;
    use corvid_runtime::tagged::Kind;
    use corvid_runtime::task::Output;

    fn buffered_task() -> Task {
        Task::with_output(&Config { heap_words: 16 }, Output::Buffer(vec![])).unwrap()
    }

    fn output_string(task: Task) -> String {
        match task.into_output() {
            Output::Buffer(buffer) => String::from_utf8(buffer).unwrap(),
            Output::Stdout(_) => panic!("expected buffered output"),
        }
    }

    extern "C-unwind" fn returns_pair(_task: &mut Task, heap: *mut u64) -> Word {
        // Lay out the pair the way generated code does
        unsafe {
            *heap = Word::fixnum(1).unwrap().to_raw();
            *heap.add(1) = Word::fixnum(2).unwrap().to_raw();
        }

        Word::from_raw(heap as u64 + PAIR_TAG)
    }

    #[test]
    fn prints_result() {
        let mut task = buffered_task();

        let result = run_task(&mut task, returns_pair).unwrap();
        let cell = task.arena().pair(result).unwrap();
        assert_eq!(Word::fixnum(1), Some(cell.car));
        assert_eq!("(pair 1 2)", output_string(task));
    }

    extern "C-unwind" fn gets_stuck(task: &mut Task, _heap: *mut u64) -> Word {
        crate::write::print(task, Word::fixnum(7).unwrap());
        crate::guard::ensure_pair(task, Word::NIL);

        unreachable!("returned from stuck guard");
    }

    #[test]
    fn stuck_task() {
        let mut task = buffered_task();

        assert_eq!(
            Err(Error::TypeMismatch {
                expected: Kind::Pair,
                found: Kind::Nil
            }),
            run_task(&mut task, gets_stuck)
        );

        // Output written before getting stuck is kept
        assert_eq!("7", output_string(task));
    }

    #[test]
    fn stuck_report_follows_output() {
        let mut task = buffered_task();

        let err = run_task(&mut task, gets_stuck).unwrap_err();
        report_stuck(&mut task, &err).unwrap();

        assert_eq!("7Stuck[expected pair]", output_string(task));
    }
}
