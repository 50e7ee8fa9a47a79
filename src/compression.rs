use std::io;

const DEFAULT_CLASS_NAME: &str = "org.apache.hadoop.io.compress.DefaultCodec";
const GZIP_CLASS_NAME: &str = "org.apache.hadoop.io.compress.GzipCodec";
const SNAPPY_CLASS_NAME: &str = "org.apache.hadoop.io.compress.SnappyCodec";
const ZSTD_CLASS_NAME: &str = "org.apache.hadoop.io.compress.ZStandardCodec";
const BZIP2_CLASS_NAME: &str = "org.apache.hadoop.io.compress.BZip2Codec";
const LZ4_CLASS_NAME: &str = "org.apache.hadoop.io.compress.Lz4Codec";

// Hadoop's BlockCompressorStream reserves room for the compression overhead
// in its 256 KiB buffer, the remaining space is the largest chunk it feeds
// to the compressor at once.
#[cfg(any(feature = "snappy", feature = "lz4"))]
const BLOCK_BUFFER_SIZE: usize = 256 * 1024;
#[cfg(feature = "snappy")]
const SNAPPY_MAX_INPUT_SIZE: usize = BLOCK_BUFFER_SIZE - (BLOCK_BUFFER_SIZE / 6 + 32);
#[cfg(feature = "lz4")]
const LZ4_MAX_INPUT_SIZE: usize = BLOCK_BUFFER_SIZE - (BLOCK_BUFFER_SIZE / 255 + 16);

#[cfg(test)]
pub(crate) const ALL_CODECS: [Codec; 6] =
    [Codec::Default, Codec::Gzip, Codec::Snappy, Codec::Zstd, Codec::BZip2, Codec::Lz4];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Codec {
    /// Zlib streams, Hadoop's `DefaultCodec`.
    Default,
    Gzip,
    /// Raw snappy wrapped in Hadoop's block framing.
    Snappy,
    Zstd,
    BZip2,
    /// Raw lz4 blocks wrapped in Hadoop's block framing.
    Lz4,
}

impl Codec {
    pub fn class_name(self) -> &'static str {
        match self {
            Codec::Default => DEFAULT_CLASS_NAME,
            Codec::Gzip => GZIP_CLASS_NAME,
            Codec::Snappy => SNAPPY_CLASS_NAME,
            Codec::Zstd => ZSTD_CLASS_NAME,
            Codec::BZip2 => BZIP2_CLASS_NAME,
            Codec::Lz4 => LZ4_CLASS_NAME,
        }
    }

    pub fn from_class_name(name: &str) -> Option<Codec> {
        match name {
            DEFAULT_CLASS_NAME => Some(Codec::Default),
            GZIP_CLASS_NAME => Some(Codec::Gzip),
            SNAPPY_CLASS_NAME => Some(Codec::Snappy),
            ZSTD_CLASS_NAME => Some(Codec::Zstd),
            BZIP2_CLASS_NAME => Some(Codec::BZip2),
            LZ4_CLASS_NAME => Some(Codec::Lz4),
            _ => None,
        }
    }

    /// Whether this codec was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Codec::Default | Codec::Gzip => cfg!(feature = "zlib"),
            Codec::Snappy => cfg!(feature = "snappy"),
            Codec::Zstd => cfg!(feature = "zstd"),
            Codec::BZip2 => cfg!(feature = "bzip2"),
            Codec::Lz4 => cfg!(feature = "lz4"),
        }
    }
}

pub fn compress(codec: Codec, level: Option<u32>, data: &[u8]) -> io::Result<Vec<u8>> {
    match codec {
        Codec::Default => zlib_compress(level, data),
        Codec::Gzip => gzip_compress(level, data),
        Codec::Snappy => snappy_compress(data),
        Codec::Zstd => zstd_compress(level, data),
        Codec::BZip2 => bzip2_compress(level, data),
        Codec::Lz4 => lz4_compress(data),
    }
}

pub fn decompress(codec: Codec, data: &[u8]) -> io::Result<Vec<u8>> {
    match codec {
        Codec::Default => zlib_decompress(data),
        Codec::Gzip => gzip_decompress(data),
        Codec::Snappy => snappy_decompress(data),
        Codec::Zstd => zstd_decompress(data),
        Codec::BZip2 => bzip2_decompress(data),
        Codec::Lz4 => lz4_decompress(data),
    }
}

pub(crate) fn unsupported(codec: Codec) -> io::Error {
    let error = format!("unsupported {:?} compression", codec);
    io::Error::new(io::ErrorKind::Other, error)
}

#[cfg(feature = "zlib")]
fn flate_level(level: Option<u32>) -> flate2::Compression {
    level.map_or_else(flate2::Compression::default, |l| flate2::Compression::new(l.min(9)))
}

#[cfg(feature = "zlib")]
fn zlib_compress(level: Option<u32>, data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Write;
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate_level(level));
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(feature = "zlib")]
fn zlib_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[cfg(feature = "zlib")]
fn gzip_compress(level: Option<u32>, data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Write;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate_level(level));
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(feature = "zlib")]
fn gzip_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::MultiGzDecoder::new(data);
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[cfg(not(feature = "zlib"))]
fn zlib_compress(_level: Option<u32>, _data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Default))
}

#[cfg(not(feature = "zlib"))]
fn zlib_decompress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Default))
}

#[cfg(not(feature = "zlib"))]
fn gzip_compress(_level: Option<u32>, _data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Gzip))
}

#[cfg(not(feature = "zlib"))]
fn gzip_decompress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Gzip))
}

#[cfg(feature = "bzip2")]
fn bzip2_compress(level: Option<u32>, data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Write;
    let level = level.map_or_else(bzip2::Compression::default, |l| bzip2::Compression::new(l.max(1).min(9)));
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(feature = "bzip2")]
fn bzip2_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Read;
    let mut decoder = bzip2::read::MultiBzDecoder::new(data);
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[cfg(not(feature = "bzip2"))]
fn bzip2_compress(_level: Option<u32>, _data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::BZip2))
}

#[cfg(not(feature = "bzip2"))]
fn bzip2_decompress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::BZip2))
}

// Every frame is the uncompressed length followed by as many
// length-prefixed chunks as needed to produce it.
#[cfg(any(feature = "snappy", feature = "lz4"))]
fn block_compress<F>(data: &[u8], max_input_size: usize, mut compress_chunk: F) -> io::Result<Vec<u8>>
where F: FnMut(&[u8]) -> io::Result<Vec<u8>>,
{
    use byteorder::{BigEndian, WriteBytesExt};

    let mut buffer = Vec::with_capacity(data.len() / 2 + 8);

    if data.is_empty() {
        buffer.write_u32::<BigEndian>(0)?;
        return Ok(buffer);
    }

    for chunk in data.chunks(max_input_size) {
        let compressed = compress_chunk(chunk)?;
        buffer.write_u32::<BigEndian>(chunk.len() as u32)?;
        buffer.write_u32::<BigEndian>(compressed.len() as u32)?;
        buffer.extend_from_slice(&compressed);
    }

    Ok(buffer)
}

/// `decompress_chunk` receives a chunk and the number of bytes
/// still missing to complete the current frame.
#[cfg(any(feature = "snappy", feature = "lz4"))]
fn block_decompress<F>(mut data: &[u8], mut decompress_chunk: F) -> io::Result<Vec<u8>>
where F: FnMut(&[u8], usize) -> io::Result<Vec<u8>>,
{
    use byteorder::{BigEndian, ReadBytesExt};

    let mut buffer = Vec::new();

    while !data.is_empty() {
        let expected = buffer.len() + data.read_u32::<BigEndian>()? as usize;

        while buffer.len() < expected {
            let compressed_len = data.read_u32::<BigEndian>()? as usize;
            if data.len() < compressed_len {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated compressed chunk"));
            }
            let (chunk, tail) = data.split_at(compressed_len);
            let chunk = decompress_chunk(chunk, expected - buffer.len())?;
            buffer.extend_from_slice(&chunk);
            data = tail;
        }

        if buffer.len() != expected {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "compressed frame length mismatch"));
        }
    }

    Ok(buffer)
}

#[cfg(feature = "snappy")]
fn snappy_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = snap::raw::Encoder::new();
    block_compress(data, SNAPPY_MAX_INPUT_SIZE, |chunk| {
        encoder.compress_vec(chunk).map_err(io::Error::from)
    })
}

#[cfg(feature = "snappy")]
fn snappy_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = snap::raw::Decoder::new();
    block_decompress(data, |chunk, _missing| {
        decoder.decompress_vec(chunk).map_err(io::Error::from)
    })
}

#[cfg(not(feature = "snappy"))]
fn snappy_compress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Snappy))
}

#[cfg(not(feature = "snappy"))]
fn snappy_decompress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Snappy))
}

#[cfg(feature = "lz4")]
fn lz4_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    block_compress(data, LZ4_MAX_INPUT_SIZE, |chunk| Ok(lz4_flex::block::compress(chunk)))
}

#[cfg(feature = "lz4")]
fn lz4_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    block_decompress(data, |chunk, missing| {
        lz4_flex::block::decompress(chunk, missing)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

#[cfg(not(feature = "lz4"))]
fn lz4_compress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Lz4))
}

#[cfg(not(feature = "lz4"))]
fn lz4_decompress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Lz4))
}
#[cfg(feature = "zstd")]
fn zstd_compress(level: Option<u32>, data: &[u8]) -> io::Result<Vec<u8>> {
    // zstd treats level 0 as its own default
    let level = level.map_or(0, |l| l.min(22) as i32);
    let mut buffer = Vec::new();
    zstd::stream::copy_encode(data, &mut buffer, level)?;
    Ok(buffer)
}

#[cfg(feature = "zstd")]
fn zstd_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    zstd::stream::copy_decode(data, &mut buffer)?;
    Ok(buffer)
}

#[cfg(not(feature = "zstd"))]
fn zstd_compress(_level: Option<u32>, _data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Zstd))
}

#[cfg(not(feature = "zstd"))]
fn zstd_decompress(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported(Codec::Zstd))
}
