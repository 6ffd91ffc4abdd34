//! Safe view of tagged words
//!
//! [`Word`] is what generated code passes around; [`Value`] is the decoded form Rust code matches
//! on. Conversion is always explicit in both directions.

use libc::c_int;

use crate::tagged::{Direction, Kind, Word};

/// Decoded tagged word
///
/// Heap variants hold the untagged address of their object inside the arena.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Value {
    Fixnum(i64),
    Bool(bool),
    Nil,
    Pair(usize),
    Str(usize),
    Vector(usize),
    Channel(Direction, c_int),
}

impl Value {
    /// Decodes a word
    ///
    /// Returns `None` for words matching no tag class.
    pub fn from_word(word: Word) -> Option<Value> {
        let value = match word.classify() {
            Kind::Fixnum => Value::Fixnum(word.fixnum_value()?),
            Kind::Bool => Value::Bool(word.bool_value()?),
            Kind::Nil => Value::Nil,
            Kind::Pair => Value::Pair(word.untagged_address()?),
            Kind::Str => Value::Str(word.untagged_address()?),
            Kind::Vector => Value::Vector(word.untagged_address()?),
            Kind::InChannel | Kind::OutChannel => {
                let (direction, fd) = word.channel_fd()?;
                Value::Channel(direction, fd)
            }
            Kind::Invalid => return None,
        };

        Some(value)
    }

    /// Encodes this value as a word
    ///
    /// Returns `None` if the payload can't be represented: fixnums out of range, unaligned heap
    /// addresses or negative file descriptors.
    pub fn to_word(self) -> Option<Word> {
        match self {
            Value::Fixnum(n) => Word::fixnum(n),
            Value::Bool(b) => Some(Word::bool(b)),
            Value::Nil => Some(Word::NIL),
            Value::Pair(address) => Word::heap(Kind::Pair, address),
            Value::Str(address) => Word::heap(Kind::Str, address),
            Value::Vector(address) => Word::heap(Kind::Vector, address),
            Value::Channel(direction, fd) => Word::channel(direction, fd),
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            Value::Fixnum(_) => Kind::Fixnum,
            Value::Bool(_) => Kind::Bool,
            Value::Nil => Kind::Nil,
            Value::Pair(_) => Kind::Pair,
            Value::Str(_) => Kind::Str,
            Value::Vector(_) => Kind::Vector,
            Value::Channel(direction, _) => direction.kind(),
        }
    }
}
