use std::error;
use std::fmt;
use std::fmt::Display;
use std::io;
use std::result;

use crate::tagged::Kind;

/// Runtime contract violation
///
/// None of these are recoverable from compiled code. Once an error reaches the ABI boundary the
/// task is stuck and the process exits.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    TypeMismatch { expected: Kind, found: Kind },
    NotChannel { found: Kind },
    IndexNotFixnum { found: Kind },
    IndexOutOfBounds { index: i64, len: u64 },
    /// Heap word whose layout lies outside of the arena
    BadHeapReference { address: u64 },
    HeapExhausted { requested: usize, available: usize },
    /// Arena of the configured size couldn't be allocated
    ArenaAllocation { words: usize },
    Open { path: String, errno: i32 },
    Read { errno: i32 },
    Write { errno: i32 },
    Close { errno: i32 },
    ShortRead { expected: usize, actual: usize },
    ShortWrite { expected: usize, actual: usize },
    /// String data containing the terminator byte
    NulInString { offset: usize },
    InvalidConfig { name: &'static str, value: String },
}

impl Error {
    /// Returns the `errno` of the last failed system call
    pub(crate) fn last_errno() -> i32 {
        io::Error::last_os_error().raw_os_error().unwrap_or(0)
    }

    /// Returns a string describing the error
    pub fn message(&self) -> String {
        match self {
            Error::TypeMismatch { expected, .. } => format!("expected {}", expected),
            Error::NotChannel { .. } => "expected channel".to_owned(),
            Error::IndexNotFixnum { .. } => "vector index must be a number".to_owned(),
            Error::IndexOutOfBounds { .. } => "vector index out of bounds".to_owned(),
            Error::BadHeapReference { address } => {
                format!("heap reference {:#x} is outside of the arena", address)
            }
            Error::HeapExhausted {
                requested,
                available,
            } => format!(
                "heap exhausted: {} bytes requested with {} available",
                requested, available
            ),
            Error::ArenaAllocation { words } => {
                format!("unable to allocate a heap of {} words", words)
            }
            Error::Open { path, errno } => {
                format!("unable to open `{}`: {}", path, os_error(*errno))
            }
            Error::Read { errno } => format!("unable to read channel: {}", os_error(*errno)),
            Error::Write { errno } => format!("unable to write channel: {}", os_error(*errno)),
            Error::Close { errno } => format!("unable to close channel: {}", os_error(*errno)),
            Error::ShortRead { expected, actual } => format!(
                "unexpected end of file: expected {} bytes, read {}",
                expected, actual
            ),
            Error::ShortWrite { expected, actual } => format!(
                "channel stopped accepting data: expected to write {} bytes, wrote {}",
                expected, actual
            ),
            Error::NulInString { offset } => {
                format!("string data contains a zero byte at offset {}", offset)
            }
            Error::InvalidConfig { name, value } => {
                format!("invalid value `{}` for {}", value, name)
            }
        }
    }
}

fn os_error(errno: i32) -> io::Error {
    io::Error::from_raw_os_error(errno)
}

impl error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        let type_err = Error::TypeMismatch {
            expected: Kind::Pair,
            found: Kind::Fixnum,
        };
        assert_eq!("expected pair", type_err.to_string());

        let bounds_err = Error::IndexOutOfBounds { index: 3, len: 3 };
        assert_eq!("vector index out of bounds", bounds_err.to_string());
        assert!(format!("{:?}", bounds_err).contains("index: 3"));

        let index_err = Error::IndexNotFixnum { found: Kind::Nil };
        assert_eq!("vector index must be a number", index_err.to_string());
    }

    #[test]
    fn os_errors() {
        let open_err = Error::Open {
            path: "missing.txt".to_owned(),
            errno: libc::ENOENT,
        };

        let message = open_err.to_string();
        assert!(message.starts_with("unable to open `missing.txt`: "));
        assert!(message.contains("No such file or directory"));
    }
}
