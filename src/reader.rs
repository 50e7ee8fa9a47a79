use log::debug;

use crate::block::Block;
use crate::compression::decompress;
use crate::error::{Error, SeqFileError};
use crate::header::Header;
use crate::{take, take_i32};
use crate::{CompressionType, SYNC_ESCAPE, SYNC_SIZE};

/// Reads a SequenceFile stored in memory or memory-mapped.
#[derive(Clone)]
pub struct Reader<A> {
    header: Header,
    data: A,
    body_offset: usize,
}

impl<A: AsRef<[u8]>> Reader<A> {
    pub fn new(data: A) -> Result<Reader<A>, Error> {
        let (header, body_offset) = Header::read_from_bytes(data.as_ref())?;

        debug!("reading a {:?} compressed sequence file with codec {:?}, {} metadata entries",
            header.compression_type, header.codec, header.metadata.len());

        Ok(Reader { header, data, body_offset })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn iter(&self) -> ReaderIter<A> {
        ReaderIter {
            reader: self,
            body: &self.data.as_ref()[self.body_offset..],
            block: None,
            key: Vec::new(),
            val: Vec::new(),
        }
    }

    pub fn into_inner(self) -> A {
        self.data
    }
}

/// Iterates over the serialized keys and values of a [`Reader`],
/// use [`bytes_writable`](crate::bytes_writable) to unwrap them.
pub struct ReaderIter<'r, A> {
    reader: &'r Reader<A>,
    body: &'r [u8],
    block: Option<Block>,
    key: Vec<u8>,
    val: Vec<u8>,
}

impl<'r, A: AsRef<[u8]>> ReaderIter<'r, A> {
    pub fn next(&mut self) -> Result<Option<(&[u8], &[u8])>, Error> {
        match (self.reader.header.compression_type, self.reader.header.codec) {
            (CompressionType::Block, Some(_)) => self.next_in_block(),
            _ => self.next_record(),
        }
    }

    fn next_record(&mut self) -> Result<Option<(&[u8], &[u8])>, Error> {
        loop {
            if self.body.is_empty() {
                return Ok(None);
            }

            let record_len = take_i32(&mut self.body)?;
            if record_len == SYNC_ESCAPE {
                self.check_sync()?;
                continue;
            }

            let key_len = take_i32(&mut self.body)?;
            if record_len < 0 || key_len < 0 || key_len > record_len {
                return Err(Error::from(SeqFileError::InvalidRecordLength));
            }

            let key = take(&mut self.body, key_len as usize)?;
            let val = take(&mut self.body, (record_len - key_len) as usize)?;

            self.key.clear();
            self.key.extend_from_slice(key);

            match self.reader.header.codec {
                Some(codec) => self.val = decompress(codec, val)?,
                None => {
                    self.val.clear();
                    self.val.extend_from_slice(val);
                },
            }

            return Ok(Some((&self.key[..], &self.val[..])));
        }
    }

    fn next_in_block(&mut self) -> Result<Option<(&[u8], &[u8])>, Error> {
        loop {
            if let Some(block) = self.block.as_mut() {
                if block.next() {
                    break;
                }
            }

            if self.body.is_empty() {
                self.block = None;
                return Ok(None);
            }

            // blocks always start with a sync
            if take_i32(&mut self.body)? != SYNC_ESCAPE {
                return Err(Error::from(SeqFileError::InvalidSyncMarker));
            }
            self.check_sync()?;

            if let Some(codec) = self.reader.header.codec {
                self.block = Some(Block::read(&mut self.body, codec)?);
            }
        }

        Ok(self.block.as_ref().and_then(Block::get))
    }

    fn check_sync(&mut self) -> Result<(), Error> {
        let marker = take(&mut self.body, SYNC_SIZE)?;
        if marker != &self.reader.header.sync_marker[..] {
            return Err(Error::from(SeqFileError::InvalidSyncMarker));
        }
        Ok(())
    }
}
