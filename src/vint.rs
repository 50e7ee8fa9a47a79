//! Hadoop's variable-length integer encoding (`WritableUtils.writeVLong`).
//!
//! Small values in `-112..=127` fit in a single byte, everything else is a
//! marker byte giving the sign and the number of bytes that follow, then the
//! magnitude in big-endian order. Negative values store their one's complement.

use std::io;

pub const MAX_VLONG_SIZE: usize = 9;

/// Returns the number of bytes `value` takes once encoded.
pub fn vlong_size(value: i64) -> usize {
    if value >= -112 && value <= 127 {
        return 1;
    }
    let magnitude = if value < 0 { !value } else { value };
    let data_bits = 64 - magnitude.leading_zeros() as usize;
    1 + (data_bits + 7) / 8
}

pub fn vlong_encode(bytes: &mut [u8; MAX_VLONG_SIZE], value: i64) -> &[u8] {
    if value >= -112 && value <= 127 {
        bytes[0] = value as u8;
        return &bytes[..1];
    }

    let (magnitude, base) = if value < 0 { (!value, -120) } else { (value, -112) };
    let len = vlong_size(value) - 1;
    bytes[0] = (base - len as i32) as u8;
    for i in 0..len {
        let shift = (len - 1 - i) * 8;
        bytes[1 + i] = (magnitude >> shift) as u8;
    }

    &bytes[..1 + len]
}

pub fn write_vlong<W: io::Write>(writer: &mut W, value: i64) -> io::Result<usize> {
    let mut enc = [0; MAX_VLONG_SIZE];
    let enc = vlong_encode(&mut enc, value);
    writer.write_all(enc)?;
    Ok(enc.len())
}

/// Returns the total size of the VLong starting with the `first` byte.
pub fn vlong_decode_size(first: u8) -> usize {
    let first = first as i8 as i32;
    if first >= -112 {
        1
    } else if first < -120 {
        (-119 - first) as usize
    } else {
        (-111 - first) as usize
    }
}

fn is_negative_vlong(first: u8) -> bool {
    let first = first as i8;
    first < -120 || (first >= -112 && first < 0)
}

/// Decodes the VLong at the start of `data`, returning it along with the
/// number of bytes consumed, or `None` if `data` is too short.
pub fn vlong_decode(data: &[u8]) -> Option<(i64, usize)> {
    let first = *data.first()?;
    let size = vlong_decode_size(first);
    if size == 1 {
        return Some((first as i8 as i64, 1));
    }

    let bytes = data.get(1..size)?;
    let value = bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64) as i64;
    let value = if is_negative_vlong(first) { !value } else { value };

    Some((value, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Generated with org.apache.hadoop.io.WritableUtils.writeVLong.
    const VLONGS: &[(&[u8], i64)] = &[
        (&[0x00], 0),
        (&[0x01], 1),
        (&[0xff], -1),
        (&[0x64], 100),
        (&[0x9c], -100),
        (&[0x8f, 0xc8], 200),
        (&[0x87, 0xc7], -200),
        (&[0x8e, 0x1f, 0xff], 8191),
        (&[0x86, 0x1f, 0xfe], -8191),
        (&[0x8c, 0x7f, 0xff, 0xff, 0xff], 2147483647),
        (&[0x84, 0x7f, 0xff, 0xff, 0xfe], -2147483647),
        (&[0x8c, 0x6d, 0x7f, 0x77, 0x58], 1837070168),
        (&[0x84, 0x6d, 0x7f, 0x77, 0x57], -1837070168),
        (&[0x8c, 0xff, 0xff, 0xff, 0xfe], 4294967294),
        (&[0x84, 0xff, 0xff, 0xff, 0xfd], -4294967294),
        (&[0x88, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 576460752303423488),
        (&[0x80, 0x07, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff], -576460752303423488),
    ];

    #[test]
    fn hadoop_vectors() {
        for &(bytes, number) in VLONGS {
            let mut enc = [0; MAX_VLONG_SIZE];
            assert_eq!(vlong_encode(&mut enc, number), bytes, "encoding {}", number);
            assert_eq!(vlong_decode(bytes), Some((number, bytes.len())), "decoding {}", number);
            assert_eq!(vlong_size(number), bytes.len());
        }
    }

    #[test]
    fn truncated() {
        assert_eq!(vlong_decode(&[]), None);
        assert_eq!(vlong_decode(&[0x8c, 0x7f, 0xff]), None);
    }

    #[test]
    fn extremes() {
        for &number in &[i64::MIN, i64::MAX] {
            let mut buf = Vec::new();
            let written = write_vlong(&mut buf, number).unwrap();
            assert_eq!(written, MAX_VLONG_SIZE);
            assert_eq!(vlong_decode(&buf), Some((number, MAX_VLONG_SIZE)));
        }
    }

    quickcheck! {
        fn qc_encode_decode(number: i64) -> bool {
            let mut enc = [0; MAX_VLONG_SIZE];
            let enc = vlong_encode(&mut enc, number);
            enc.len() == vlong_size(number)
                && vlong_decode_size(enc[0]) == enc.len()
                && vlong_decode(enc) == Some((number, enc.len()))
        }
    }
}
