//! This crate contains functionality for rendering tagged values as text at runtime

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod writer;
