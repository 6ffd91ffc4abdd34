//! Tagged words
//!
//! A [`Word`] is the raw representation of every Corvid value as it crosses the ABI boundary. The
//! low bits of the word select its [`Kind`]; see [`layout`](crate::layout) for the exact masks.

use std::fmt;

use libc::c_int;

use crate::layout::*;

/// Raw 64bit tagged word exchanged with generated code
#[repr(transparent)]
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct Word(u64);

/// Classification of a tagged word
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Kind {
    Fixnum,
    Bool,
    Nil,
    Pair,
    Str,
    Vector,
    InChannel,
    OutChannel,
    /// Word matching none of the tag classes
    Invalid,
}

/// Direction of a channel handle
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Direction {
    Input,
    Output,
}

impl Kind {
    /// Returns the human readable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Kind::Fixnum => "number",
            Kind::Bool => "boolean",
            Kind::Nil => "nil",
            Kind::Pair => "pair",
            Kind::Str => "string",
            Kind::Vector => "vector",
            Kind::InChannel => "input channel",
            Kind::OutChannel => "output channel",
            Kind::Invalid => "invalid value",
        }
    }

    /// Returns the tag added to the address of a heap object of this kind
    pub fn heap_tag(self) -> Option<u64> {
        match self {
            Kind::Pair => Some(PAIR_TAG),
            Kind::Vector => Some(VECTOR_TAG),
            Kind::Str => Some(STRING_TAG),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Direction {
    fn tag(self) -> u64 {
        match self {
            Direction::Input => IN_CHANNEL_TAG,
            Direction::Output => OUT_CHANNEL_TAG,
        }
    }

    /// Returns the channel kind with this direction
    pub fn kind(self) -> Kind {
        match self {
            Direction::Input => Kind::InChannel,
            Direction::Output => Kind::OutChannel,
        }
    }
}

impl Word {
    pub const NIL: Word = Word(NIL_WORD);
    pub const FALSE: Word = Word(BOOL_TAG);
    pub const TRUE: Word = Word(BOOL_TAG | (1 << BOOL_SHIFT));

    pub const fn from_raw(raw: u64) -> Word {
        Word(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Classifies this word
    ///
    /// Masks are tested from the narrowest claim to the broadest: fixnum, boolean, nil, heap
    /// category and finally channel direction. Booleans and nil also match the channel heap
    /// category so reordering these tests would misclassify them.
    pub fn classify(self) -> Kind {
        let raw = self.0;

        if raw & FIXNUM_MASK == FIXNUM_TAG {
            Kind::Fixnum
        } else if raw & BOOL_MASK == BOOL_TAG {
            Kind::Bool
        } else if raw == NIL_WORD {
            Kind::Nil
        } else {
            match raw & HEAP_MASK {
                PAIR_TAG => Kind::Pair,
                VECTOR_TAG => Kind::Vector,
                STRING_TAG => Kind::Str,
                CHANNEL_TAG => match raw & CHANNEL_MASK {
                    IN_CHANNEL_TAG => Kind::InChannel,
                    OUT_CHANNEL_TAG => Kind::OutChannel,
                    _ => Kind::Invalid,
                },
                _ => Kind::Invalid,
            }
        }
    }

    /// Encodes an integer as a fixnum
    ///
    /// Returns `None` if the integer is outside of `FIXNUM_MIN..=FIXNUM_MAX`.
    pub fn fixnum(value: i64) -> Option<Word> {
        if (FIXNUM_MIN..=FIXNUM_MAX).contains(&value) {
            Some(Word(((value << FIXNUM_SHIFT) as u64) | FIXNUM_TAG))
        } else {
            None
        }
    }

    pub fn fixnum_value(self) -> Option<i64> {
        if self.classify() == Kind::Fixnum {
            Some((self.0 as i64) >> FIXNUM_SHIFT)
        } else {
            None
        }
    }

    pub fn bool(value: bool) -> Word {
        if value {
            Word::TRUE
        } else {
            Word::FALSE
        }
    }

    pub fn bool_value(self) -> Option<bool> {
        if self.classify() == Kind::Bool {
            Some((self.0 >> BOOL_SHIFT) & 1 == 1)
        } else {
            None
        }
    }

    /// Encodes a file descriptor as a channel handle
    ///
    /// Returns `None` for negative descriptors.
    pub fn channel(direction: Direction, fd: c_int) -> Option<Word> {
        if fd < 0 {
            None
        } else {
            Some(Word(((fd as u64) << CHANNEL_SHIFT) | direction.tag()))
        }
    }

    /// Returns the direction and file descriptor of a channel handle
    pub fn channel_fd(self) -> Option<(Direction, c_int)> {
        let direction = match self.classify() {
            Kind::InChannel => Direction::Input,
            Kind::OutChannel => Direction::Output,
            _ => return None,
        };

        Some((direction, (self.0 >> CHANNEL_SHIFT) as c_int))
    }

    /// Tags the address of a heap object
    ///
    /// Returns `None` if `kind` isn't a heap kind or the address isn't aligned to `HEAP_ALIGN`.
    pub fn heap(kind: Kind, address: usize) -> Option<Word> {
        let tag = kind.heap_tag()?;

        if address % HEAP_ALIGN != 0 {
            return None;
        }

        Some(Word(address as u64 + tag))
    }

    /// Returns the untagged address of a heap object
    pub fn untagged_address(self) -> Option<usize> {
        let tag = self.classify().heap_tag()?;
        Some((self.0 - tag) as usize)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#x})", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixnums() {
        for &n in &[0, 1, -1, 42, -42, FIXNUM_MIN, FIXNUM_MAX] {
            let word = Word::fixnum(n).unwrap();
            assert_eq!(Kind::Fixnum, word.classify());
            assert_eq!(Some(n), word.fixnum_value());
        }

        assert_eq!(0b1100, Word::fixnum(3).unwrap().to_raw());
        assert_eq!(None, Word::fixnum(FIXNUM_MAX + 1));
        assert_eq!(None, Word::fixnum(FIXNUM_MIN - 1));
    }

    #[test]
    fn bools() {
        assert_eq!(Kind::Bool, Word::TRUE.classify());
        assert_eq!(Kind::Bool, Word::FALSE.classify());
        assert_eq!(Some(true), Word::bool(true).bool_value());
        assert_eq!(Some(false), Word::bool(false).bool_value());
        assert_eq!(None, Word::NIL.bool_value());
    }

    #[test]
    fn nil() {
        assert_eq!(Kind::Nil, Word::NIL.classify());
        assert_eq!(None, Word::NIL.fixnum_value());
    }

    #[test]
    fn heap_words() {
        let pair = Word::heap(Kind::Pair, 0x1000).unwrap();
        assert_eq!(Kind::Pair, pair.classify());
        assert_eq!(Some(0x1000), pair.untagged_address());

        let vector = Word::heap(Kind::Vector, 0x1008).unwrap();
        assert_eq!(Kind::Vector, vector.classify());
        assert_eq!(Some(0x1008), vector.untagged_address());

        let string = Word::heap(Kind::Str, 0x1010).unwrap();
        assert_eq!(Kind::Str, string.classify());
        assert_eq!(Some(0x1010), string.untagged_address());

        assert_eq!(None, Word::heap(Kind::Pair, 0x1001));
        assert_eq!(None, Word::heap(Kind::Fixnum, 0x1000));
        assert_eq!(None, Word::TRUE.untagged_address());
    }

    #[test]
    fn channels() {
        let input = Word::channel(Direction::Input, 3).unwrap();
        assert_eq!(Kind::InChannel, input.classify());
        assert_eq!(Some((Direction::Input, 3)), input.channel_fd());

        // fd 1 would produce a boolean tag with a narrower channel tag
        let output = Word::channel(Direction::Output, 1).unwrap();
        assert_eq!(Kind::OutChannel, output.classify());
        assert_eq!(Some((Direction::Output, 1)), output.channel_fd());

        assert_eq!(None, Word::channel(Direction::Input, -1));
        assert_eq!(None, Word::NIL.channel_fd());
    }

    #[test]
    fn booleans_take_precedence_over_heap_category() {
        for &word in &[Word::TRUE, Word::FALSE] {
            assert_eq!(CHANNEL_TAG, word.to_raw() & HEAP_MASK);
            assert_eq!(Kind::Bool, word.classify());
        }

        assert_eq!(CHANNEL_TAG, Word::NIL.to_raw() & HEAP_MASK);
        assert_eq!(Kind::Nil, Word::NIL.classify());
    }

    #[test]
    fn invalid_words() {
        assert_eq!(Kind::Invalid, Word::from_raw(0b001).classify());
        assert_eq!(Kind::Invalid, Word::from_raw(0b110).classify());
        // Channel category without a known direction
        assert_eq!(Kind::Invalid, Word::from_raw(0b0100_0111).classify());
    }

    #[test]
    fn fmt_debug() {
        assert_eq!("Word(0xff)", format!("{:?}", Word::NIL));
    }
}
