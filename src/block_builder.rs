use std::io;

use crate::compression::{compress, Codec};
use crate::vint::write_vlong;

/// Buffers serialized keys and values until they are compressed together
/// into a single block.
#[derive(Clone, Default)]
pub struct BlockBuilder {
    key_lengths: Vec<u8>,
    keys: Vec<u8>,
    value_lengths: Vec<u8>,
    values: Vec<u8>,
    count: usize,
}

impl BlockBuilder {
    pub fn new() -> Self {
        BlockBuilder::default()
    }

    pub fn reset(&mut self) {
        self.key_lengths.clear();
        self.keys.clear();
        self.value_lengths.clear();
        self.values.clear();
        self.count = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// The number of raw key and value bytes buffered so far.
    pub fn current_size(&self) -> usize {
        self.keys.len() + self.values.len()
    }

    pub fn add(&mut self, key: &[u8], val: &[u8]) -> io::Result<()> {
        write_vlong(&mut self.key_lengths, key.len() as i64)?;
        self.keys.extend_from_slice(key);
        write_vlong(&mut self.value_lengths, val.len() as i64)?;
        self.values.extend_from_slice(val);
        self.count += 1;
        Ok(())
    }

    /// Encodes the record count followed by the four compressed sections:
    /// key lengths, keys, value lengths and values.
    pub fn finish(&self, codec: Codec, level: Option<u32>, out: &mut Vec<u8>) -> io::Result<()> {
        write_vlong(out, self.count as i64)?;
        for section in &[&self.key_lengths, &self.keys, &self.value_lengths, &self.values] {
            let compressed = compress(codec, level, section)?;
            write_vlong(out, compressed.len() as i64)?;
            out.extend_from_slice(&compressed);
        }
        Ok(())
    }
}
