use std::ops::Range;

use crate::compression::{decompress, Codec};
use crate::error::{Error, SeqFileError};
use crate::vint::vlong_decode;
use crate::{take, take_length};

/// A decompressed block of a block-compressed SequenceFile.
pub struct Block {
    keys: Vec<u8>,
    key_lengths: Vec<usize>,
    values: Vec<u8>,
    value_lengths: Vec<usize>,
    index: usize,
    key_offset: usize,
    value_offset: usize,
    current: Option<(Range<usize>, Range<usize>)>,
}

impl Block {
    /// Reads the block at the front of `bytes`, right after its sync marker.
    pub fn read(bytes: &mut &[u8], codec: Codec) -> Result<Block, Error> {
        let count = take_length(bytes)?;

        let key_lengths = read_section(bytes, codec)?;
        let keys = read_section(bytes, codec)?;
        let value_lengths = read_section(bytes, codec)?;
        let values = read_section(bytes, codec)?;

        let key_lengths = read_lengths(&key_lengths, count, keys.len())?;
        let value_lengths = read_lengths(&value_lengths, count, values.len())?;

        Ok(Block {
            keys,
            key_lengths,
            values,
            value_lengths,
            index: 0,
            key_offset: 0,
            value_offset: 0,
            current: None,
        })
    }

    pub fn next(&mut self) -> bool {
        if self.index >= self.key_lengths.len() {
            self.current = None;
            return false;
        }

        let key_end = self.key_offset + self.key_lengths[self.index];
        let value_end = self.value_offset + self.value_lengths[self.index];
        self.current = Some((self.key_offset..key_end, self.value_offset..value_end));

        self.key_offset = key_end;
        self.value_offset = value_end;
        self.index += 1;
        true
    }

    pub fn get(&self) -> Option<(&[u8], &[u8])> {
        let (key, value) = self.current.clone()?;
        Some((&self.keys[key], &self.values[value]))
    }
}

fn read_section(bytes: &mut &[u8], codec: Codec) -> Result<Vec<u8>, Error> {
    let len = take_length(bytes)?;
    let compressed = take(bytes, len)?;
    Ok(decompress(codec, compressed)?)
}

/// Decodes exactly `count` lengths that must sum up to `total`.
fn read_lengths(mut data: &[u8], count: usize, total: usize) -> Result<Vec<usize>, Error> {
    let mut lengths = Vec::with_capacity(count.min(data.len()));
    let mut sum = 0usize;

    for _ in 0..count {
        let (length, n) = vlong_decode(data).ok_or(SeqFileError::InvalidBlockLengths)?;
        if length < 0 {
            return Err(Error::from(SeqFileError::InvalidBlockLengths));
        }
        sum = sum.saturating_add(length as usize);
        lengths.push(length as usize);
        data = &data[n..];
    }

    if !data.is_empty() || sum != total {
        return Err(Error::from(SeqFileError::InvalidBlockLengths));
    }

    Ok(lengths)
}
