//! Runtime configuration
//!
//! The only tunable is the size of the heap arena. It's read once from the environment before the
//! arena is allocated.

use std::env;
use std::ffi::OsString;

use crate::error::{Error, Result};
use crate::heap::MAX_WORDS;

/// Environment variable overriding the arena size in words
pub const HEAP_WORDS_VAR: &str = "CORVID_HEAP_WORDS";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Config {
    /// Size of the heap arena in 64bit words
    pub heap_words: usize,
}

impl Config {
    /// 4KiB arena
    pub const DEFAULT_HEAP_WORDS: usize = 512;

    /// Builds a configuration from the process environment
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|name| env::var_os(name))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Config> {
        let heap_words = match lookup(HEAP_WORDS_VAR) {
            Some(value) => parse_heap_words(value)?,
            None => Self::DEFAULT_HEAP_WORDS,
        };

        Ok(Config { heap_words })
    }
}

fn parse_heap_words(value: OsString) -> Result<usize> {
    let invalid = |value: &OsString| Error::InvalidConfig {
        name: HEAP_WORDS_VAR,
        value: value.to_string_lossy().into_owned(),
    };

    match value.to_str().map(|s| s.trim().parse::<usize>()) {
        Some(Ok(heap_words)) if heap_words > 0 && heap_words <= MAX_WORDS => Ok(heap_words),
        _ => Err(invalid(&value)),
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            heap_words: Self::DEFAULT_HEAP_WORDS,
        }
    }
}
