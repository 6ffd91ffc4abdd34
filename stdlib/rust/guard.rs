use corvid_runtime::guard;
use corvid_runtime::tagged::Word;
use corvid_runtime::task::Task;

use crate::or_stuck;

macro_rules! define_kind_guards {
    ($( $export_name:literal => $name:ident ),*) => {
        $(
            /// Returns the word unchanged if it has the expected kind
            #[export_name = $export_name]
            pub extern "C-unwind" fn $name(task: &mut Task, word: Word) -> Word {
                let result = guard::$name(word).map(|_| word);
                or_stuck(task, result)
            }
        )*
    };
}

define_kind_guards!(
    "corvid_stdlib_ensure_fixnum" => ensure_fixnum,
    "corvid_stdlib_ensure_bool" => ensure_bool,
    "corvid_stdlib_ensure_nil" => ensure_nil,
    "corvid_stdlib_ensure_pair" => ensure_pair,
    "corvid_stdlib_ensure_vector" => ensure_vector,
    "corvid_stdlib_ensure_string" => ensure_string,
    "corvid_stdlib_ensure_in_channel" => ensure_in_channel,
    "corvid_stdlib_ensure_out_channel" => ensure_out_channel
);

/// Returns `index` unchanged if it's a valid index in to `vector`
#[export_name = "corvid_stdlib_ensure_vector_index"]
pub extern "C-unwind" fn ensure_vector_index(task: &mut Task, vector: Word, index: Word) -> Word {
    let result = guard::ensure_vector_index(task.arena(), vector, index).map(|_| index);
    or_stuck(task, result)
}

#[export_name = "corvid_stdlib_vector_ref"]
pub extern "C-unwind" fn vector_ref(task: &mut Task, vector: Word, index: Word) -> Word {
    let result = guard::vector_ref(task.arena(), vector, index);
    or_stuck(task, result)
}

#[export_name = "corvid_stdlib_vector_length"]
pub extern "C-unwind" fn vector_length(task: &mut Task, vector: Word) -> Word {
    let result = task
        .arena()
        .vector(vector)
        .map(|elements| Word::fixnum(elements.len() as i64).unwrap_or(Word::NIL));

    or_stuck(task, result)
}
