use std::mem;

use crate::error::{Error, Result};
use crate::heap::Arena;
use crate::layout::HEAP_ALIGN;
use crate::tagged::{Kind, Word};

/// Bump allocator laying out heap objects the way generated code does
///
/// Compiled programs allocate from the arena themselves. This exists for hosts embedding the
/// runtime and for tests that need real heap objects.
pub struct HeapBuilder<'a> {
    arena: &'a mut Arena,
    next_offset: usize,
}

impl<'a> HeapBuilder<'a> {
    /// Starts allocating from the beginning of the arena
    pub fn new(arena: &'a mut Arena) -> HeapBuilder<'a> {
        HeapBuilder {
            arena,
            next_offset: 0,
        }
    }

    /// Returns the number of bytes still available
    pub fn available(&self) -> usize {
        self.arena.len_bytes() - self.next_offset
    }

    /// Reserves `len` bytes and returns their offset in the arena
    fn alloc(&mut self, len: usize) -> Result<usize> {
        let padded_len = (len + HEAP_ALIGN - 1) / HEAP_ALIGN * HEAP_ALIGN;
        if padded_len > self.available() {
            return Err(Error::HeapExhausted {
                requested: padded_len,
                available: self.available(),
            });
        }

        let offset = self.next_offset;
        self.next_offset += padded_len;
        Ok(offset)
    }

    fn write_words(&mut self, offset: usize, words: impl Iterator<Item = u64>) {
        let bytes = self.arena.as_bytes_mut();

        for (index, raw) in words.enumerate() {
            let start = offset + index * mem::size_of::<u64>();
            bytes[start..start + mem::size_of::<u64>()].copy_from_slice(&raw.to_ne_bytes());
        }
    }

    fn tagged(&self, kind: Kind, offset: usize) -> Word {
        // Offsets are always aligned and the arena base is word aligned
        Word::from_raw((self.arena.base_address() + offset) as u64 + kind.heap_tag().unwrap_or(0))
    }

    pub fn pair(&mut self, car: Word, cdr: Word) -> Result<Word> {
        let offset = self.alloc(2 * mem::size_of::<u64>())?;
        self.write_words(offset, [car.to_raw(), cdr.to_raw()].iter().copied());

        Ok(self.tagged(Kind::Pair, offset))
    }

    pub fn vector(&mut self, elements: &[Word]) -> Result<Word> {
        let offset = self.alloc((elements.len() + 1) * mem::size_of::<u64>())?;

        let len = std::iter::once(elements.len() as u64);
        self.write_words(offset, len.chain(elements.iter().map(|word| word.to_raw())));

        Ok(self.tagged(Kind::Vector, offset))
    }

    /// Allocates a string followed by its terminator
    ///
    /// The bytes may not contain the terminator themselves.
    pub fn string(&mut self, bytes: &[u8]) -> Result<Word> {
        if let Some(offset) = bytes.iter().position(|byte| *byte == 0) {
            return Err(Error::NulInString { offset });
        }

        let offset = self.alloc(bytes.len() + 1)?;

        let arena_bytes = self.arena.as_bytes_mut();
        arena_bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
        arena_bytes[offset + bytes.len()] = 0;

        Ok(self.tagged(Kind::Str, offset))
    }

    /// Builds a proper list from the passed elements
    pub fn list(&mut self, elements: &[Word]) -> Result<Word> {
        elements
            .iter()
            .rev()
            .try_fold(Word::NIL, |tail, head| self.pair(*head, tail))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alignment() {
        let mut arena = Arena::with_capacity(16).unwrap();
        let mut builder = HeapBuilder::new(&mut arena);

        let string = builder.string(b"abc").unwrap();
        let pair = builder.pair(Word::NIL, Word::NIL).unwrap();

        assert_eq!(Kind::Str, string.classify());
        assert_eq!(Kind::Pair, pair.classify());
        assert_eq!(
            string.untagged_address().unwrap() + HEAP_ALIGN,
            pair.untagged_address().unwrap()
        );
    }

    #[test]
    fn exhaustion() {
        let mut arena = Arena::with_capacity(3).unwrap();
        let mut builder = HeapBuilder::new(&mut arena);

        builder.pair(Word::NIL, Word::NIL).unwrap();
        assert_eq!(
            Err(Error::HeapExhausted {
                requested: 16,
                available: 8
            }),
            builder.pair(Word::NIL, Word::NIL)
        );
    }

    #[test]
    fn embedded_terminator() {
        let mut arena = Arena::with_capacity(4).unwrap();
        let mut builder = HeapBuilder::new(&mut arena);

        assert_eq!(
            Err(Error::NulInString { offset: 2 }),
            builder.string(b"ab\0cd")
        );
    }

    #[test]
    fn lists() {
        let mut arena = Arena::with_capacity(16).unwrap();
        let mut builder = HeapBuilder::new(&mut arena);

        let one = Word::fixnum(1).unwrap();
        let two = Word::fixnum(2).unwrap();
        let list = builder.list(&[one, two]).unwrap();

        let head = arena.pair(list).unwrap();
        assert_eq!(one, head.car);

        let tail = arena.pair(head.cdr).unwrap();
        assert_eq!(two, tail.car);
        assert_eq!(Word::NIL, tail.cdr);
    }
}
