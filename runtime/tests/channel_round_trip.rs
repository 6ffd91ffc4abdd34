use std::fs;
use std::path::Path;

use corvid_runtime::channel;
use corvid_runtime::error::Error;
use corvid_runtime::heap::{Arena, HeapBuilder};
use corvid_runtime::tagged::{Direction, Kind, Word};

fn path_word(builder: &mut HeapBuilder<'_>, path: &Path) -> Word {
    builder.string(path.to_str().unwrap().as_bytes()).unwrap()
}

#[test]
fn write_then_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("round-trip.txt");
    let payload: &[u8] = b"line one\n\"quoted\" \xce\xbb tail";

    let mut arena = Arena::with_capacity(128).unwrap();
    let mut builder = HeapBuilder::new(&mut arena);
    let path = path_word(&mut builder, &file_path);
    let data = builder.string(payload).unwrap();
    // Same length as the payload; `read` fills exactly this many bytes
    let buffer = builder.string(&vec![b'.'; payload.len()]).unwrap();

    let output = channel::open(&arena, path, Direction::Output).unwrap();
    assert_eq!(Kind::OutChannel, output.classify());
    assert_eq!(Ok(payload.len()), channel::write(&arena, output, data));
    assert_eq!(Ok(Word::NIL), channel::close(output));

    let input = channel::open(&arena, path, Direction::Input).unwrap();
    assert_eq!(Kind::InChannel, input.classify());
    assert_eq!(Ok(buffer), channel::read(&mut arena, input, buffer));
    assert_eq!(Ok(Word::NIL), channel::close(input));

    assert_eq!(payload, arena.str_bytes(buffer).unwrap());
    assert_eq!(payload.to_vec(), fs::read(&file_path).unwrap());
}

#[test]
fn reads_are_incremental() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("numbers.txt");
    fs::write(&file_path, b"0123456789").unwrap();

    let mut arena = Arena::with_capacity(64).unwrap();
    let mut builder = HeapBuilder::new(&mut arena);
    let path = path_word(&mut builder, &file_path);
    let first = builder.string(b"----").unwrap();
    let second = builder.string(b"------").unwrap();

    let input = channel::open(&arena, path, Direction::Input).unwrap();
    channel::read(&mut arena, input, first).unwrap();
    channel::read(&mut arena, input, second).unwrap();
    channel::close(input).unwrap();

    assert_eq!(b"0123", arena.str_bytes(first).unwrap());
    assert_eq!(b"456789", arena.str_bytes(second).unwrap());
}

#[test]
fn short_read() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("short.txt");
    fs::write(&file_path, b"abc").unwrap();

    let mut arena = Arena::with_capacity(64).unwrap();
    let mut builder = HeapBuilder::new(&mut arena);
    let path = path_word(&mut builder, &file_path);
    let buffer = builder.string(b"12345").unwrap();

    let input = channel::open(&arena, path, Direction::Input).unwrap();
    assert_eq!(
        Err(Error::ShortRead {
            expected: 5,
            actual: 3
        }),
        channel::read(&mut arena, input, buffer)
    );
    channel::close(input).unwrap();
}

#[test]
fn zero_byte_in_read() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("binary.bin");
    fs::write(&file_path, b"ab\0d").unwrap();

    let mut arena = Arena::with_capacity(64).unwrap();
    let mut builder = HeapBuilder::new(&mut arena);
    let path = path_word(&mut builder, &file_path);
    let buffer = builder.string(b"xxxx").unwrap();

    let input = channel::open(&arena, path, Direction::Input).unwrap();
    assert_eq!(
        Err(Error::NulInString { offset: 2 }),
        channel::read(&mut arena, input, buffer)
    );
    channel::close(input).unwrap();
}

#[test]
fn read_requires_input_channel() {
    let mut arena = Arena::with_capacity(8).unwrap();
    let mut builder = HeapBuilder::new(&mut arena);
    let buffer = builder.string(b"x").unwrap();

    let output = Word::channel(Direction::Output, 1).unwrap();
    assert_eq!(
        Err(Error::TypeMismatch {
            expected: Kind::InChannel,
            found: Kind::OutChannel
        }),
        channel::read(&mut arena, output, buffer)
    );
}

#[test]
fn relative_paths_use_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("relative.txt"), b"here").unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let mut arena = Arena::with_capacity(16).unwrap();
    let mut builder = HeapBuilder::new(&mut arena);
    let path = builder.string(b"relative.txt").unwrap();
    let buffer = builder.string(b"....").unwrap();

    let opened = channel::open(&arena, path, Direction::Input);
    std::env::set_current_dir(previous).unwrap();

    let input = opened.unwrap();
    channel::read(&mut arena, input, buffer).unwrap();
    channel::close(input).unwrap();

    assert_eq!(b"here", arena.str_bytes(buffer).unwrap());
}
