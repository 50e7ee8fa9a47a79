use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::cmp;
use std::io::{self, Write};

use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, trace};

use crate::block_builder::BlockBuilder;
use crate::compression::{compress, unsupported, Codec};
use crate::header::Header;
use crate::writable::put_bytes_writable;
use crate::{CompressionType, SYNC_ESCAPE, SYNC_SIZE};

const MIN_BLOCK_SIZE: usize = 1024;
pub const DEFAULT_BLOCK_SIZE: usize = 1_000_000;
pub const DEFAULT_SYNC_INTERVAL: u64 = 100 * SYNC_SIZE as u64;
pub const DEFAULT_COMPRESSION_TYPE: CompressionType = CompressionType::None;
pub const DEFAULT_CODEC: Codec = Codec::Default;

#[derive(Clone)]
pub struct WriterOptions {
    compression_type: CompressionType,
    codec: Codec,
    compression_level: Option<u32>,
    block_size: usize,
    sync_interval: u64,
    sync_marker: Option<[u8; SYNC_SIZE]>,
    metadata: BTreeMap<String, String>,
}

impl WriterOptions {
    pub fn new() -> Self {
        WriterOptions::default()
    }

    pub fn set_compression_type(&mut self, compression_type: CompressionType) {
        self.compression_type = compression_type;
    }

    /// The codec is ignored when the compression type is `None`.
    pub fn set_codec(&mut self, codec: Codec) {
        self.codec = codec;
    }

    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = Some(level);
    }

    /// The number of raw key and value bytes buffered before a block is compressed.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = cmp::max(block_size, MIN_BLOCK_SIZE);
    }

    pub fn set_sync_interval(&mut self, interval: u64) {
        self.sync_interval = interval;
    }

    /// Uses a fixed sync marker instead of a random one, the output becomes reproducible.
    pub fn set_sync_marker(&mut self, marker: [u8; SYNC_SIZE]) {
        self.sync_marker = Some(marker);
    }

    pub fn insert_metadata<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.metadata.insert(key.into(), value.into());
    }
}

impl Default for WriterOptions {
    fn default() -> WriterOptions {
        WriterOptions {
            compression_type: DEFAULT_COMPRESSION_TYPE,
            codec: DEFAULT_CODEC,
            compression_level: None,
            block_size: DEFAULT_BLOCK_SIZE,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            sync_marker: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Keeps track of the number of bytes written so far.
struct OffsetWriter<W> {
    inner: W,
    offset: u64,
}

impl<W: io::Write> io::Write for OffsetWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.offset += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Appends records to a SequenceFile, keys and values are written as `BytesWritable`s.
///
/// The header is written on creation, the file is complete only once
/// [`Writer::finish`] or [`Writer::into_inner`] returned successfully.
pub struct Writer<W> {
    writer: OffsetWriter<W>,
    header: Header,
    opt: WriterOptions,
    block: BlockBuilder,
    buffer: Vec<u8>,
    last_sync_offset: u64,
    count_entries: u64,
    count_blocks: u64,
}

impl<W: io::Write> Writer<W> {
    pub fn new(writer: W, options: Option<WriterOptions>) -> io::Result<Self> {
        let opt = options.unwrap_or_default();

        if opt.compression_type.is_compressed() && !opt.codec.is_available() {
            return Err(unsupported(opt.codec));
        }

        let sync_marker = opt.sync_marker.unwrap_or_else(rand::random);
        let header = Header::new(opt.compression_type, opt.codec, opt.metadata.clone(), sync_marker);

        let mut buffer = Vec::with_capacity(256);
        header.write_to_bytes(&mut buffer)?;

        let mut writer = OffsetWriter { inner: writer, offset: 0 };
        writer.write_all(&buffer)?;

        debug!("writing a {:?} compressed sequence file with codec {:?}", header.compression_type, header.codec);

        Ok(Writer {
            writer,
            header,
            opt,
            block: BlockBuilder::new(),
            buffer,
            last_sync_offset: 0,
            count_entries: 0,
            count_blocks: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn add<K, V>(&mut self, key: K, val: V) -> io::Result<()>
    where K: AsRef<[u8]>,
          V: AsRef<[u8]>,
    {
        let key = key.as_ref();
        let val = val.as_ref();

        self.buffer.clear();
        put_bytes_writable(key, &mut self.buffer)?;
        let key_len = self.buffer.len();

        match self.header.codec {
            Some(codec) if self.header.compression_type == CompressionType::Block => {
                put_bytes_writable(val, &mut self.buffer)?;
                let (key, val) = self.buffer.split_at(key_len);
                self.block.add(key, val)?;
                self.count_entries += 1;

                if self.block.current_size() >= self.opt.block_size {
                    self.flush_block(codec)?;
                }
                return Ok(());
            },
            Some(codec) => {
                let mut serialized = Vec::with_capacity(4 + val.len());
                put_bytes_writable(val, &mut serialized)?;
                let compressed = compress(codec, self.opt.compression_level, &serialized)?;
                self.buffer.extend_from_slice(&compressed);
            },
            None => put_bytes_writable(val, &mut self.buffer)?,
        }

        let record_len = i32::try_from(self.buffer.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "record is too large"))?;

        if self.writer.offset >= self.last_sync_offset + self.opt.sync_interval {
            self.write_sync()?;
        }

        self.writer.write_i32::<BigEndian>(record_len)?;
        self.writer.write_i32::<BigEndian>(key_len as i32)?;
        self.writer.write_all(&self.buffer)?;
        self.count_entries += 1;

        Ok(())
    }

    pub fn finish(self) -> io::Result<()> {
        self.into_inner().map(drop)
    }

    /// Writes any buffered block, flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        if let (CompressionType::Block, Some(codec)) = (self.header.compression_type, self.header.codec) {
            self.flush_block(codec)?;
        }
        self.writer.flush()?;

        debug!("wrote {} entries in {} blocks, {} bytes", self.count_entries, self.count_blocks, self.writer.offset);

        Ok(self.writer.inner)
    }

    fn flush_block(&mut self, codec: Codec) -> io::Result<()> {
        if self.block.is_empty() { return Ok(()) }

        // every block starts with a sync
        self.write_sync()?;

        self.buffer.clear();
        self.block.finish(codec, self.opt.compression_level, &mut self.buffer)?;
        self.writer.write_all(&self.buffer)?;

        trace!("flushed a block of {} entries, {} bytes", self.block.len(), self.buffer.len());

        self.block.reset();
        self.count_blocks += 1;

        Ok(())
    }

    fn write_sync(&mut self) -> io::Result<()> {
        if self.last_sync_offset == self.writer.offset { return Ok(()) }

        self.writer.write_i32::<BigEndian>(SYNC_ESCAPE)?;
        self.writer.write_all(&self.header.sync_marker)?;
        self.last_sync_offset = self.writer.offset;

        trace!("wrote a sync marker, offset {}", self.last_sync_offset);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::ALL_CODECS;
    use crate::writable::BYTES_WRITABLE_CLASS_NAME;

    const MARKER: [u8; SYNC_SIZE] = [0x5A; SYNC_SIZE];

    fn options(compression_type: CompressionType) -> WriterOptions {
        let mut opt = WriterOptions::new();
        opt.set_compression_type(compression_type);
        opt.set_sync_marker(MARKER);
        opt
    }

    fn header_len(bytes: &[u8]) -> usize {
        Header::read_from_bytes(bytes).unwrap().1
    }

    #[test]
    fn uncompressed_records() {
        let mut writer = Writer::new(Vec::new(), Some(options(CompressionType::None))).unwrap();
        writer.add("foo", "bar").unwrap();
        writer.add("foo1", "bar1").unwrap();
        let bytes = writer.into_inner().unwrap();

        let body = &bytes[header_len(&bytes)..];
        let mut expected = Vec::new();
        // record length, key length, key writable, value writable
        expected.extend(&[0, 0, 0, 14, 0, 0, 0, 7, 0, 0, 0, 3]);
        expected.extend(b"foo");
        expected.extend(&[0, 0, 0, 3]);
        expected.extend(b"bar");
        expected.extend(&[0, 0, 0, 16, 0, 0, 0, 8, 0, 0, 0, 4]);
        expected.extend(b"foo1");
        expected.extend(&[0, 0, 0, 4]);
        expected.extend(b"bar1");
        assert_eq!(body, expected.as_slice());
    }

    #[test]
    fn header_is_written_on_creation() {
        let writer = Writer::new(Vec::new(), Some(options(CompressionType::None))).unwrap();
        assert_eq!(writer.header().key_class_name, BYTES_WRITABLE_CLASS_NAME);
        assert_eq!(writer.header().sync_marker, MARKER);
        let bytes = writer.into_inner().unwrap();
        assert_eq!(header_len(&bytes), bytes.len());
    }

    #[test]
    fn random_sync_markers() {
        let first = Writer::new(Vec::new(), None).unwrap();
        let second = Writer::new(Vec::new(), None).unwrap();
        assert_ne!(first.header().sync_marker, second.header().sync_marker);
    }

    #[test]
    fn syncs_every_interval() {
        let mut opt = options(CompressionType::None);
        opt.set_sync_interval(100);
        let mut writer = Writer::new(Vec::new(), Some(opt)).unwrap();
        for i in 0..20 {
            writer.add(format!("key-{:02}", i), [0u8; 32]).unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let mut sync = SYNC_ESCAPE.to_be_bytes().to_vec();
        sync.extend(&MARKER);
        let syncs = bytes.windows(sync.len()).filter(|w| *w == sync.as_slice()).count();
        // records are 54 bytes long, so a sync every two records
        assert!(syncs >= 8, "only {} syncs", syncs);
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn block_is_written_on_finish() {
        let mut opt = options(CompressionType::Block);
        opt.set_codec(Codec::Snappy);
        let mut writer = Writer::new(Vec::new(), Some(opt)).unwrap();
        writer.add("Alice", "Practice").unwrap();
        writer.add("Bob", "Hope").unwrap();
        let header_only = writer.writer.offset;
        let bytes = writer.into_inner().unwrap();

        assert!(bytes.len() as u64 > header_only);
        let body = &bytes[header_len(&bytes)..];
        assert_eq!(&body[..4], &SYNC_ESCAPE.to_be_bytes());
        assert_eq!(&body[4..4 + SYNC_SIZE], &MARKER);
        // the record count follows the sync
        assert_eq!(body[4 + SYNC_SIZE], 2);
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn small_blocks() {
        let mut opt = options(CompressionType::Block);
        opt.set_codec(Codec::Snappy);
        opt.set_block_size(0);
        let mut writer = Writer::new(Vec::new(), Some(opt)).unwrap();
        for i in 0..10 {
            writer.add(format!("{:04}", i), vec![i as u8; 500]).unwrap();
        }
        assert_eq!(writer.count_blocks, 5);
        writer.finish().unwrap();
    }

    #[test]
    fn codec_availability_is_checked_on_creation() {
        for &codec in &ALL_CODECS {
            for &compression_type in &[CompressionType::Record, CompressionType::Block] {
                let mut opt = options(compression_type);
                opt.set_codec(codec);
                let result = Writer::new(Vec::new(), Some(opt));
                assert_eq!(result.is_ok(), codec.is_available(), "{:?} {:?}", compression_type, codec);
            }

            // uncompressed files never use the codec
            let mut opt = options(CompressionType::None);
            opt.set_codec(codec);
            assert!(Writer::new(Vec::new(), Some(opt)).is_ok());
        }
    }

    #[cfg(not(feature = "lz4"))]
    #[test]
    fn unavailable_codec() {
        let mut opt = options(CompressionType::Record);
        opt.set_codec(Codec::Lz4);
        let err = Writer::new(Vec::new(), Some(opt)).err().unwrap();
        assert_eq!(err.to_string(), "unsupported Lz4 compression");
    }
}
