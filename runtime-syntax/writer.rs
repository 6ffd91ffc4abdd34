use std::io::{Result, Write};

use corvid_runtime::heap::Arena;
use corvid_runtime::tagged::{Direction, Word};
use corvid_runtime::value::Value;

macro_rules! process_escaped_bytes {
    ($w:ident, $source:ident, $( $pattern:pat => $escape:expr ),*) => {
        // Write sequential unescaped bytes in chunks
        // This is especially important if $w isn't buffered
        let mut last_escape_end = 0;
        for (index, byte) in $source.iter().copied().enumerate() {
            match byte {
                $(
                    $pattern => {
                        $w.write_all(&$source[last_escape_end..index])?;
                        last_escape_end = index + 1;
                        ($escape)?;
                    }
                ),* ,
                _ => {}
            };
        }

        $w.write_all(&$source[last_escape_end..])?;
    }
}

/// Writes string contents escaping only quotes and newlines
///
/// Every other byte is written literally, including backslashes and invalid UTF-8.
fn write_escaped_str(w: &mut dyn Write, source: &[u8]) -> Result<()> {
    process_escaped_bytes!(w, source,
        b'"' => w.write_all(b"\\\""),
        b'\n' => w.write_all(b"\\n")
    );

    Ok(())
}

fn write_word_seq(
    w: &mut dyn Write,
    arena: &Arena,
    elems: impl Iterator<Item = Word>,
) -> Result<()> {
    let mut has_prev = false;
    for elem in elems {
        if has_prev {
            write!(w, " ")?;
        } else {
            has_prev = true;
        }

        write_word(w, arena, elem)?;
    }

    Ok(())
}

fn write_bad_value(w: &mut dyn Write, word: Word) -> Result<()> {
    write!(w, "BAD VALUE: {}", word.to_raw())
}

/// Writes a representation of the passed word to the writer
///
/// This never fails on malformed values. Words matching no tag class, or heap words whose layout
/// lies outside of the arena, are written as a `BAD VALUE` marker.
pub fn write_word(w: &mut dyn Write, arena: &Arena, word: Word) -> Result<()> {
    let value = match Value::from_word(word) {
        Some(value) => value,
        None => return write_bad_value(w, word),
    };

    match value {
        Value::Fixnum(n) => write!(w, "{}", n),
        Value::Bool(true) => write!(w, "true"),
        Value::Bool(false) => write!(w, "false"),
        Value::Nil => write!(w, "()"),
        Value::Pair(_) => match arena.pair(word) {
            Ok(cell) => {
                write!(w, "(pair ")?;
                write_word(w, arena, cell.car)?;
                write!(w, " ")?;
                write_word(w, arena, cell.cdr)?;
                write!(w, ")")
            }
            Err(_) => write_bad_value(w, word),
        },
        Value::Vector(_) => match arena.vector(word) {
            Ok(vector) => {
                write!(w, "[")?;
                write_word_seq(w, arena, vector.iter())?;
                write!(w, "]")
            }
            Err(_) => write_bad_value(w, word),
        },
        Value::Str(_) => match arena.str_bytes(word) {
            Ok(bytes) => {
                write!(w, "\"")?;
                write_escaped_str(w, bytes)?;
                write!(w, "\"")
            }
            Err(_) => write_bad_value(w, word),
        },
        Value::Channel(Direction::Input, _) => write!(w, "<in-channel>"),
        Value::Channel(Direction::Output, _) => write!(w, "<out-channel>"),
    }
}
