//! Reading and writing Hadoop's SequenceFile container format.

#[cfg(test)]
#[macro_use] extern crate quickcheck;

use std::convert::TryFrom;
use std::io;

const MAGIC: &[u8] = b"SEQ";
const VERSION: u8 = 6;
const SYNC_SIZE: usize = 16;
const SYNC_ESCAPE: i32 = -1;
const MAX_METADATA_PAIRS: usize = 1024;

pub use self::compression::Codec;
pub use self::error::{Error, SeqFileError};
pub use self::fixture::{generate, generate_all, FIXTURE_CODEC, FIXTURE_RECORDS};
pub use self::fixture::{BLOCK_COMPRESSED_FILE_NAME, RECORD_COMPRESSED_FILE_NAME};
pub use self::header::Header;
pub use self::reader::{Reader, ReaderIter};
pub use self::writable::{bytes_writable, BYTES_WRITABLE_CLASS_NAME};
pub use self::writer::{Writer, WriterOptions};

mod block;
mod block_builder;
mod compression;
mod error;
mod fixture;
mod header;
mod reader;
mod writable;
mod writer;
pub mod vint;

/// How the values of a SequenceFile are compressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionType {
    None,
    /// Each value is compressed on its own.
    Record,
    /// Keys and values are buffered and compressed together by blocks.
    Block,
}

impl CompressionType {
    pub fn is_compressed(self) -> bool {
        self != CompressionType::None
    }
}

fn unexpected_eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected end of sequence file")
}

/// Splits `len` bytes off the front of `bytes`.
fn take<'a>(bytes: &mut &'a [u8], len: usize) -> Result<&'a [u8], Error> {
    let b: &'a [u8] = *bytes;
    if b.len() < len {
        return Err(Error::from(unexpected_eof()));
    }
    let (head, tail) = b.split_at(len);
    *bytes = tail;
    Ok(head)
}

fn take_i32(bytes: &mut &[u8]) -> Result<i32, Error> {
    let b = take(bytes, 4)?;
    Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn take_vlong(bytes: &mut &[u8]) -> Result<i64, Error> {
    let b: &[u8] = *bytes;
    match vint::vlong_decode(b) {
        Some((value, len)) => {
            *bytes = &b[len..];
            Ok(value)
        },
        None => Err(Error::from(unexpected_eof())),
    }
}

/// Reads a vlong that must be a valid non-negative length.
fn take_length(bytes: &mut &[u8]) -> Result<usize, Error> {
    let value = take_vlong(bytes)?;
    usize::try_from(value).map_err(|_| Error::from(SeqFileError::InvalidVLong))
}
