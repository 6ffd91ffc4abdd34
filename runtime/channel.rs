//! Channels over OS file descriptors
//!
//! A channel handle is a tagged word carrying a raw file descriptor and its direction. All I/O is
//! blocking and unbuffered. Closing a channel doesn't change the handle; using it afterwards is
//! undefined.

use std::ffi::CString;

use libc::{c_int, c_void};

use crate::error::{Error, Result};
use crate::heap::Arena;
use crate::tagged::{Direction, Word};

/// Permission bits for files created by output channels
pub const OUTPUT_MODE: libc::mode_t = 0o644;

fn open_flags(direction: Direction) -> c_int {
    match direction {
        Direction::Input => libc::O_RDONLY | libc::O_CLOEXEC,
        Direction::Output => libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC | libc::O_CLOEXEC,
    }
}

fn channel_fd(handle: Word, direction: Direction) -> Result<c_int> {
    match handle.channel_fd() {
        Some((found_direction, fd)) if found_direction == direction => Ok(fd),
        _ => Err(Error::TypeMismatch {
            expected: direction.kind(),
            found: handle.classify(),
        }),
    }
}

/// Opens the file named by the string `path` and returns a channel handle
///
/// Relative paths are resolved against the working directory.
pub fn open(arena: &Arena, path: Word, direction: Direction) -> Result<Word> {
    let path_bytes = arena.str_bytes(path)?;
    let path_lossy = || String::from_utf8_lossy(path_bytes).into_owned();

    let c_path = CString::new(path_bytes).map_err(|err| Error::NulInString {
        offset: err.nul_position(),
    })?;

    let fd = unsafe {
        libc::open(
            c_path.as_ptr(),
            open_flags(direction),
            libc::c_uint::from(OUTPUT_MODE),
        )
    };

    if fd < 0 {
        return Err(Error::Open {
            path: path_lossy(),
            errno: Error::last_errno(),
        });
    }

    Word::channel(direction, fd).ok_or_else(|| Error::Open {
        path: path_lossy(),
        errno: libc::EBADF,
    })
}

/// Releases the descriptor behind a channel of either direction
pub fn close(handle: Word) -> Result<Word> {
    let (_, fd) = handle.channel_fd().ok_or(Error::NotChannel {
        found: handle.classify(),
    })?;

    if unsafe { libc::close(fd) } < 0 {
        return Err(Error::Close {
            errno: Error::last_errno(),
        });
    }

    Ok(Word::NIL)
}

/// Writes every byte of `string` to an output channel
///
/// Returns the number of bytes written.
pub fn write(arena: &Arena, handle: Word, string: Word) -> Result<usize> {
    let fd = channel_fd(handle, Direction::Output)?;
    let bytes = arena.str_bytes(string)?;
    write_all(fd, bytes)?;

    Ok(bytes.len())
}

/// Fills the string `buffer` with bytes read from an input channel
///
/// Exactly as many bytes as the buffer currently holds are read. The buffer is returned.
pub fn read(arena: &mut Arena, handle: Word, buffer: Word) -> Result<Word> {
    let fd = channel_fd(handle, Direction::Input)?;

    let bytes = arena.str_bytes_mut(buffer)?;
    read_exact(fd, bytes)?;

    Ok(buffer)
}

fn write_all(fd: c_int, bytes: &[u8]) -> Result<()> {
    let mut written = 0;

    while written < bytes.len() {
        let remaining = &bytes[written..];
        let result =
            unsafe { libc::write(fd, remaining.as_ptr() as *const c_void, remaining.len()) };

        if result < 0 {
            let errno = Error::last_errno();
            if errno == libc::EINTR {
                continue;
            }

            return Err(Error::Write { errno });
        } else if result == 0 {
            return Err(Error::ShortWrite {
                expected: bytes.len(),
                actual: written,
            });
        }

        written += result as usize;
    }

    Ok(())
}

fn read_exact(fd: c_int, buffer: &mut [u8]) -> Result<()> {
    let mut filled = 0;

    while filled < buffer.len() {
        let remaining = &mut buffer[filled..];
        let result =
            unsafe { libc::read(fd, remaining.as_mut_ptr() as *mut c_void, remaining.len()) };

        if result < 0 {
            let errno = Error::last_errno();
            if errno == libc::EINTR {
                continue;
            }

            return Err(Error::Read { errno });
        } else if result == 0 {
            return Err(Error::ShortRead {
                expected: buffer.len(),
                actual: filled,
            });
        }

        filled += result as usize;
    }

    // Zero bytes would silently truncate the string
    if let Some(offset) = buffer.iter().position(|byte| *byte == 0) {
        return Err(Error::NulInString { offset });
    }

    Ok(())
}
