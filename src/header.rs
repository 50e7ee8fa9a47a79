use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use crate::compression::Codec;
use crate::error::{Error, SeqFileError};
use crate::vint::write_vlong;
use crate::writable::BYTES_WRITABLE_CLASS_NAME;
use crate::{take, take_i32, take_vlong};
use crate::{CompressionType, MAGIC, MAX_METADATA_PAIRS, SYNC_SIZE, VERSION};

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: u8,
    pub key_class_name: String,
    pub value_class_name: String,
    pub compression_type: CompressionType,
    /// Always `Some` unless the compression type is `None`.
    pub codec: Option<Codec>,
    pub metadata: BTreeMap<String, String>,
    pub sync_marker: [u8; SYNC_SIZE],
}

impl Header {
    pub(crate) fn new(
        compression_type: CompressionType,
        codec: Codec,
        metadata: BTreeMap<String, String>,
        sync_marker: [u8; SYNC_SIZE],
    ) -> Header
    {
        let codec = match compression_type {
            CompressionType::None => None,
            CompressionType::Record | CompressionType::Block => Some(codec),
        };

        Header {
            version: VERSION,
            key_class_name: BYTES_WRITABLE_CLASS_NAME.to_string(),
            value_class_name: BYTES_WRITABLE_CLASS_NAME.to_string(),
            compression_type,
            codec,
            metadata,
            sync_marker,
        }
    }

    /// Parses the header at the start of `bytes` and returns it
    /// along with the number of bytes it spans.
    pub(crate) fn read_from_bytes(bytes: &[u8]) -> Result<(Header, usize), Error> {
        let mut b = bytes;

        let magic = take(&mut b, MAGIC.len() + 1)?;
        if &magic[..MAGIC.len()] != MAGIC {
            return Err(Error::from(SeqFileError::InvalidMagic));
        }
        let version = magic[MAGIC.len()];
        if version != VERSION {
            return Err(Error::from(SeqFileError::UnsupportedVersion(version)));
        }

        let key_class_name = read_text(&mut b)?;
        let value_class_name = read_text(&mut b)?;

        let compressed = take(&mut b, 1)?[0] != 0;
        let block_compressed = take(&mut b, 1)?[0] != 0;
        let compression_type = if block_compressed {
            CompressionType::Block
        } else if compressed {
            CompressionType::Record
        } else {
            CompressionType::None
        };

        let codec = match compression_type {
            CompressionType::None => None,
            _ => {
                let name = read_text(&mut b)?;
                match Codec::from_class_name(&name) {
                    Some(codec) => Some(codec),
                    None => return Err(Error::from(SeqFileError::UnsupportedCodec(name))),
                }
            }
        };

        let count = take_i32(&mut b)?;
        if count < 0 || count as usize > MAX_METADATA_PAIRS {
            return Err(Error::from(SeqFileError::InvalidMetadataCount(count)));
        }

        let mut metadata = BTreeMap::new();
        for _ in 0..count {
            let key = read_text(&mut b)?;
            let value = read_text(&mut b)?;
            metadata.insert(key, value);
        }

        let mut sync_marker = [0; SYNC_SIZE];
        sync_marker.copy_from_slice(take(&mut b, SYNC_SIZE)?);

        let header = Header {
            version,
            key_class_name,
            value_class_name,
            compression_type,
            codec,
            metadata,
            sync_marker,
        };

        Ok((header, bytes.len() - b.len()))
    }

    pub(crate) fn write_to_bytes(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.extend_from_slice(MAGIC);
        out.push(self.version);

        write_text(out, &self.key_class_name)?;
        write_text(out, &self.value_class_name)?;

        out.push(self.compression_type.is_compressed() as u8);
        out.push((self.compression_type == CompressionType::Block) as u8);

        if let Some(codec) = self.codec {
            write_text(out, codec.class_name())?;
        }

        // BTreeMap gives us the sorted order Hadoop writes the pairs in
        out.write_i32::<BigEndian>(self.metadata.len() as i32)?;
        for (key, value) in &self.metadata {
            write_text(out, key)?;
            write_text(out, value)?;
        }

        out.extend_from_slice(&self.sync_marker);

        Ok(())
    }
}

fn read_text(bytes: &mut &[u8]) -> Result<String, Error> {
    let len = usize::try_from(take_vlong(bytes)?).map_err(|_| SeqFileError::InvalidText)?;
    let text = take(bytes, len)?;
    String::from_utf8(text.to_vec()).map_err(|_| Error::from(SeqFileError::InvalidText))
}

fn write_text(out: &mut Vec<u8>, text: &str) -> io::Result<()> {
    write_vlong(out, text.len() as i64)?;
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: [u8; SYNC_SIZE] = [0xA5; SYNC_SIZE];

    fn text(s: &str) -> Vec<u8> {
        let mut out = vec![s.len() as u8];
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn uncompressed_layout() {
        let header = Header::new(CompressionType::None, Codec::Snappy, BTreeMap::new(), MARKER);
        assert_eq!(header.codec, None);

        let mut bytes = Vec::new();
        header.write_to_bytes(&mut bytes).unwrap();

        let mut expected = b"SEQ\x06".to_vec();
        expected.extend(text(BYTES_WRITABLE_CLASS_NAME));
        expected.extend(text(BYTES_WRITABLE_CLASS_NAME));
        expected.extend(&[0, 0]);
        expected.extend(&[0, 0, 0, 0]);
        expected.extend(&MARKER);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn block_compressed_layout() {
        let mut metadata = BTreeMap::new();
        metadata.insert("zeta".to_string(), "1".to_string());
        metadata.insert("alpha".to_string(), "2".to_string());
        let header = Header::new(CompressionType::Block, Codec::Snappy, metadata, MARKER);

        let mut bytes = Vec::new();
        header.write_to_bytes(&mut bytes).unwrap();

        let mut expected = b"SEQ\x06".to_vec();
        expected.extend(text(BYTES_WRITABLE_CLASS_NAME));
        expected.extend(text(BYTES_WRITABLE_CLASS_NAME));
        expected.extend(&[1, 1]);
        expected.extend(text("org.apache.hadoop.io.compress.SnappyCodec"));
        expected.extend(&[0, 0, 0, 2]);
        expected.extend(text("alpha"));
        expected.extend(text("2"));
        expected.extend(text("zeta"));
        expected.extend(text("1"));
        expected.extend(&MARKER);
        assert_eq!(bytes, expected);

        let (read, len) = Header::read_from_bytes(&bytes).unwrap();
        assert_eq!(len, bytes.len());
        assert_eq!(read, header);
    }

    #[test]
    fn record_compressed_flags() {
        let header = Header::new(CompressionType::Record, Codec::Gzip, BTreeMap::new(), MARKER);
        let mut bytes = Vec::new();
        header.write_to_bytes(&mut bytes).unwrap();

        let flags = 4 + 2 * (1 + BYTES_WRITABLE_CLASS_NAME.len());
        assert_eq!(&bytes[flags..flags + 2], &[1, 0]);

        let (read, _) = Header::read_from_bytes(&bytes).unwrap();
        assert_eq!(read.compression_type, CompressionType::Record);
        assert_eq!(read.codec, Some(Codec::Gzip));
    }

    fn header_bytes() -> Vec<u8> {
        let header = Header::new(CompressionType::Record, Codec::Snappy, BTreeMap::new(), MARKER);
        let mut bytes = Vec::new();
        header.write_to_bytes(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn invalid_magic() {
        let mut bytes = header_bytes();
        bytes[0] = b'Q';
        match Header::read_from_bytes(&bytes) {
            Err(Error::SeqFile(SeqFileError::InvalidMagic)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = header_bytes();
        bytes[3] = 5;
        match Header::read_from_bytes(&bytes) {
            Err(Error::SeqFile(SeqFileError::UnsupportedVersion(5))) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unsupported_codec() {
        let bytes = header_bytes();
        let needle = b"SnappyCodec";
        let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
        let mut bytes = bytes;
        bytes[at..at + 6].copy_from_slice(b"Zipped");
        match Header::read_from_bytes(&bytes) {
            Err(Error::SeqFile(SeqFileError::UnsupportedCodec(name))) => {
                assert_eq!(name, "org.apache.hadoop.io.compress.ZippedCodec");
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated() {
        let bytes = header_bytes();
        match Header::read_from_bytes(&bytes[..bytes.len() - 1]) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_metadata_count() {
        let mut bytes = header_bytes();
        let count_at = bytes.len() - SYNC_SIZE - 4;
        bytes[count_at..count_at + 4].copy_from_slice(&2000i32.to_be_bytes());
        match Header::read_from_bytes(&bytes) {
            Err(Error::SeqFile(SeqFileError::InvalidMetadataCount(2000))) => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
