//! Heap arena and object layout
//!
//! Generated code lays out three kinds of heap object in the arena:
//!
//! * Pairs are two consecutive words: the car followed by the cdr
//! * Vectors are a raw element count followed by that many element words
//! * Strings are a run of bytes terminated by a zero byte
//!
//! Every object starts on a [`HEAP_ALIGN`] boundary so its tag can be added to the address. This
//! module never allocates objects on behalf of compiled code; it only reads what is already there.

mod builder;

use std::convert::TryFrom;
use std::ptr::NonNull;
use std::{mem, ptr, slice};

use crate::error::{Error, Result};
use crate::layout::HEAP_ALIGN;
use crate::tagged::{Kind, Word};

pub use crate::heap::builder::HeapBuilder;

const WORD_SIZE: usize = mem::size_of::<u64>();

/// Largest arena in words whose size in bytes fits in an `isize`
pub const MAX_WORDS: usize = isize::MAX as usize / WORD_SIZE;

/// Fixed size region backing every heap object
///
/// This has a raw pointer representation as generated code writes to it directly through the base
/// address passed to its entry point.
pub struct Arena {
    base: NonNull<u64>,
    len_words: usize,
}

/// Contents of a pair cell
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PairCell {
    pub car: Word,
    pub cdr: Word,
}

/// Bounds checked view of a vector in the arena
pub struct VectorRef<'a> {
    arena: &'a Arena,
    elements_address: usize,
    len: usize,
}

impl Arena {
    /// Allocates a zeroed arena holding `len_words` words
    ///
    /// Fails instead of aborting if the arena is larger than [`MAX_WORDS`] or the allocation is
    /// refused.
    pub fn with_capacity(len_words: usize) -> Result<Arena> {
        let failed = Error::ArenaAllocation { words: len_words };
        if len_words > MAX_WORDS {
            return Err(failed);
        }

        let mut cells: Vec<u64> = Vec::new();
        cells.try_reserve_exact(len_words).map_err(|_| failed)?;
        cells.resize(len_words, 0);

        let base = Box::into_raw(cells.into_boxed_slice()) as *mut u64;

        Ok(Arena {
            // `Box::into_raw` never returns null, even for empty slices
            base: NonNull::new(base).unwrap_or_else(NonNull::dangling),
            len_words,
        })
    }

    /// Returns the base address handed to generated code
    pub fn as_mut_ptr(&mut self) -> *mut u64 {
        self.base.as_ptr()
    }

    pub fn base_address(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Returns the size of the arena in bytes
    pub fn len_bytes(&self) -> usize {
        self.len_words * WORD_SIZE
    }

    /// Returns the untagged address of a heap word of the expected kind
    pub fn untag(&self, word: Word, expected: Kind) -> Result<usize> {
        let found = word.classify();
        if found != expected {
            return Err(Error::TypeMismatch { expected, found });
        }

        word.untagged_address().ok_or(Error::TypeMismatch { expected, found })
    }

    /// Returns the byte offset of `len` bytes at `address` if they lie entirely inside the arena
    fn offset_of(&self, address: usize, len: usize) -> Result<usize> {
        let bad_reference = Error::BadHeapReference {
            address: address as u64,
        };

        let offset = address
            .checked_sub(self.base_address())
            .ok_or_else(|| bad_reference.clone())?;

        match offset.checked_add(len) {
            Some(end) if end <= self.len_bytes() => Ok(offset),
            _ => Err(bad_reference),
        }
    }

    /// Reads the word at an aligned address
    pub fn read_word(&self, address: usize) -> Result<Word> {
        if address % HEAP_ALIGN != 0 {
            return Err(Error::BadHeapReference {
                address: address as u64,
            });
        }

        let offset = self.offset_of(address, WORD_SIZE)?;
        let raw = unsafe { ptr::read(self.base.as_ptr().add(offset / WORD_SIZE)) };
        Ok(Word::from_raw(raw))
    }

    pub fn pair(&self, word: Word) -> Result<PairCell> {
        let address = self.untag(word, Kind::Pair)?;

        Ok(PairCell {
            car: self.read_word(address)?,
            cdr: self.read_word(address + WORD_SIZE)?,
        })
    }

    pub fn vector(&self, word: Word) -> Result<VectorRef<'_>> {
        let address = self.untag(word, Kind::Vector)?;
        let raw_len = self.read_word(address)?.to_raw();

        let bad_reference = Error::BadHeapReference {
            address: address as u64,
        };
        let len = usize::try_from(raw_len).map_err(|_| bad_reference.clone())?;
        let elements_bytes = len.checked_mul(WORD_SIZE).ok_or(bad_reference)?;

        // The whole element run must be inside the arena
        let elements_address = address + WORD_SIZE;
        self.offset_of(elements_address, elements_bytes)?;

        Ok(VectorRef {
            arena: self,
            elements_address,
            len,
        })
    }

    /// Returns the bytes of a string, excluding its terminator
    pub fn str_bytes(&self, word: Word) -> Result<&[u8]> {
        let address = self.untag(word, Kind::Str)?;
        let (offset, len) = self.str_extent(address)?;

        Ok(&self.as_bytes()[offset..offset + len])
    }

    /// Returns the mutable bytes of a string, excluding its terminator
    ///
    /// Callers must not write zero bytes in to the returned slice.
    pub fn str_bytes_mut(&mut self, word: Word) -> Result<&mut [u8]> {
        let address = self.untag(word, Kind::Str)?;
        let (offset, len) = self.str_extent(address)?;

        Ok(&mut self.as_bytes_mut()[offset..offset + len])
    }

    /// Returns the offset and length of the string at `address`
    fn str_extent(&self, address: usize) -> Result<(usize, usize)> {
        let offset = self.offset_of(address, 0)?;

        let len = self.as_bytes()[offset..]
            .iter()
            .position(|byte| *byte == 0)
            .ok_or(Error::BadHeapReference {
                address: address as u64,
            })?;

        Ok((offset, len))
    }

    fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.base.as_ptr() as *const u8, self.len_bytes()) }
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.base.as_ptr() as *mut u8, self.len_bytes()) }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        unsafe {
            let cells = ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.len_words);
            drop(Box::from_raw(cells));
        }
    }
}

impl<'a> VectorRef<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<Word> {
        if index >= self.len {
            return None;
        }

        self.arena
            .read_word(self.elements_address + index * WORD_SIZE)
            .ok()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Word> + 'a {
        let arena = self.arena;
        let elements_address = self.elements_address;

        // Bounds were checked when the vector was resolved
        (0..self.len).map(move |index| {
            let offset = elements_address - arena.base_address() + index * WORD_SIZE;
            Word::from_raw(unsafe { ptr::read(arena.base.as_ptr().add(offset / WORD_SIZE)) })
        })
    }
}
