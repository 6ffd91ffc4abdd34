//! Runtime type and bounds guards
//!
//! Generated code calls these before every primitive operation. A failed guard means the
//! computation is stuck; the error is only ever reported, never handled.

use crate::error::{Error, Result};
use crate::heap::Arena;
use crate::tagged::{Kind, Word};

/// Ensures `word` is classified as `expected`
pub fn ensure_kind(word: Word, expected: Kind) -> Result<Word> {
    let found = word.classify();

    if found == expected {
        Ok(word)
    } else {
        Err(Error::TypeMismatch { expected, found })
    }
}

/// Ensures `word` is a fixnum and returns its value
pub fn ensure_fixnum(word: Word) -> Result<i64> {
    ensure_kind(word, Kind::Fixnum)?;

    word.fixnum_value().ok_or(Error::TypeMismatch {
        expected: Kind::Fixnum,
        found: word.classify(),
    })
}

pub fn ensure_bool(word: Word) -> Result<bool> {
    ensure_kind(word, Kind::Bool)?;

    word.bool_value().ok_or(Error::TypeMismatch {
        expected: Kind::Bool,
        found: word.classify(),
    })
}

pub fn ensure_nil(word: Word) -> Result<Word> {
    ensure_kind(word, Kind::Nil)
}

pub fn ensure_pair(word: Word) -> Result<Word> {
    ensure_kind(word, Kind::Pair)
}

pub fn ensure_vector(word: Word) -> Result<Word> {
    ensure_kind(word, Kind::Vector)
}

pub fn ensure_string(word: Word) -> Result<Word> {
    ensure_kind(word, Kind::Str)
}

pub fn ensure_in_channel(word: Word) -> Result<Word> {
    ensure_kind(word, Kind::InChannel)
}

pub fn ensure_out_channel(word: Word) -> Result<Word> {
    ensure_kind(word, Kind::OutChannel)
}

/// Ensures `index` is a valid index in to `vector`
///
/// The vector's element count is authoritative; the valid range is `0..len`. Returns the decoded
/// index.
pub fn ensure_vector_index(arena: &Arena, vector: Word, index: Word) -> Result<usize> {
    ensure_vector(vector)?;
    let len = arena.vector(vector)?.len();

    let index_value = index.fixnum_value().ok_or(Error::IndexNotFixnum {
        found: index.classify(),
    })?;

    if index_value < 0 || index_value as u64 >= len as u64 {
        return Err(Error::IndexOutOfBounds {
            index: index_value,
            len: len as u64,
        });
    }

    Ok(index_value as usize)
}

/// Returns the element of `vector` at `index` after guarding both
pub fn vector_ref(arena: &Arena, vector: Word, index: Word) -> Result<Word> {
    let index = ensure_vector_index(arena, vector, index)?;
    let elements = arena.vector(vector)?;

    elements.get(index).ok_or(Error::IndexOutOfBounds {
        index: index as i64,
        len: elements.len() as u64,
    })
}
