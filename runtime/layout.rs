//! Bit layout of tagged words
//!
//! These constants are the binary contract between the Corvid compiler and this runtime. Generated
//! code tags, untags and tests words using exactly these masks; any change here must bump
//! [`LAYOUT_VERSION`] and be released together with the compiler.

/// Version of the tag layout described by this module
pub const LAYOUT_VERSION: u32 = 1;

pub const FIXNUM_MASK: u64 = 0b11;
pub const FIXNUM_TAG: u64 = 0b00;
pub const FIXNUM_SHIFT: u32 = 2;

/// Smallest integer representable as a fixnum
pub const FIXNUM_MIN: i64 = i64::MIN >> FIXNUM_SHIFT;
/// Largest integer representable as a fixnum
pub const FIXNUM_MAX: i64 = i64::MAX >> FIXNUM_SHIFT;

pub const BOOL_MASK: u64 = 0b111_1111;
pub const BOOL_TAG: u64 = 0b001_1111;
pub const BOOL_SHIFT: u32 = 7;

pub const NIL_WORD: u64 = 0b1111_1111;

/// Mask selecting the heap category of a word
///
/// Booleans and nil also satisfy this mask with the channel category. They must be ruled out
/// before heap categories are tested.
pub const HEAP_MASK: u64 = 0b111;

pub const PAIR_TAG: u64 = 0b010;
pub const VECTOR_TAG: u64 = 0b101;
pub const STRING_TAG: u64 = 0b011;
pub const CHANNEL_TAG: u64 = 0b111;

/// Mask refining the channel category in to a direction
pub const CHANNEL_MASK: u64 = 0b1111_1111;
pub const IN_CHANNEL_TAG: u64 = 0b0000_0111;
pub const OUT_CHANNEL_TAG: u64 = 0b1000_0111;
pub const CHANNEL_SHIFT: u32 = 8;

/// Alignment in bytes of every heap object's untagged address
pub const HEAP_ALIGN: usize = 8;

/// All layout constants in a form that can be exported to generated code
///
/// A code generator can compare this against its own copy at link or load time.
#[repr(C)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TagLayout {
    pub version: u32,
    pub fixnum_shift: u32,
    pub bool_shift: u32,
    pub channel_shift: u32,
    pub fixnum_mask: u64,
    pub fixnum_tag: u64,
    pub bool_mask: u64,
    pub bool_tag: u64,
    pub nil_word: u64,
    pub heap_mask: u64,
    pub pair_tag: u64,
    pub vector_tag: u64,
    pub string_tag: u64,
    pub channel_tag: u64,
    pub channel_mask: u64,
    pub in_channel_tag: u64,
    pub out_channel_tag: u64,
}

pub const TAG_LAYOUT: TagLayout = TagLayout {
    version: LAYOUT_VERSION,
    fixnum_shift: FIXNUM_SHIFT,
    bool_shift: BOOL_SHIFT,
    channel_shift: CHANNEL_SHIFT,
    fixnum_mask: FIXNUM_MASK,
    fixnum_tag: FIXNUM_TAG,
    bool_mask: BOOL_MASK,
    bool_tag: BOOL_TAG,
    nil_word: NIL_WORD,
    heap_mask: HEAP_MASK,
    pair_tag: PAIR_TAG,
    vector_tag: VECTOR_TAG,
    string_tag: STRING_TAG,
    channel_tag: CHANNEL_TAG,
    channel_mask: CHANNEL_MASK,
    in_channel_tag: IN_CHANNEL_TAG,
    out_channel_tag: OUT_CHANNEL_TAG,
};
