use std::convert::TryFrom;
use std::io;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

pub const BYTES_WRITABLE_CLASS_NAME: &str = "org.apache.hadoop.io.BytesWritable";

/// Serializes `bytes` the way a `BytesWritable` does: a big-endian `i32`
/// length followed by the bytes themselves.
pub fn put_bytes_writable(bytes: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
    let len = i32::try_from(bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "BytesWritable is too large"))?;
    out.reserve(4 + bytes.len());
    out.write_i32::<BigEndian>(len)?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Unwraps a serialized `BytesWritable`, returns `None` if the
/// length prefix doesn't match the data.
pub fn bytes_writable(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 4 {
        return None;
    }
    let (len, bytes) = data.split_at(4);
    if BigEndian::read_i32(len) as i64 != bytes.len() as i64 {
        return None;
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize() {
        let mut out = Vec::new();
        put_bytes_writable(b"", &mut out).unwrap();
        assert_eq!(out, [0x00, 0x00, 0x00, 0x00]);

        out.clear();
        put_bytes_writable(b"foobar", &mut out).unwrap();
        assert_eq!(out, [0x00, 0x00, 0x00, 0x06, 0x66, 0x6F, 0x6F, 0x62, 0x61, 0x72]);
    }

    #[test]
    fn unwrap() {
        assert_eq!(bytes_writable(&[0x00, 0x00, 0x00, 0x00]), Some(&b""[..]));
        assert_eq!(bytes_writable(&[0x00, 0x00, 0x00, 0x03, b'B', b'o', b'b']), Some(&b"Bob"[..]));
        assert_eq!(bytes_writable(&[0x00, 0x00, 0x00, 0x04, b'B', b'o', b'b']), None);
        assert_eq!(bytes_writable(&[0x00, 0x00]), None);
    }
}
