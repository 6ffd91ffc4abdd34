#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! Runtime support for compiled Corvid programs
//!
//! Compiled code represents every value as a single tagged 64bit [`Word`](tagged::Word). Heap
//! objects live in a fixed size [`Arena`](heap::Arena) that generated code allocates from
//! directly; this crate only interprets what it finds there.

pub mod channel;
pub mod config;
pub mod error;
pub mod guard;
pub mod heap;
pub mod layout;
pub mod tagged;
pub mod task;
pub mod value;
