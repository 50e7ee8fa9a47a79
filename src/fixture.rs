//! Generates the sample SequenceFiles used to check readers against.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::compression::Codec;
use crate::writer::{Writer, WriterOptions};
use crate::CompressionType;

pub const FIXTURE_RECORDS: [(&str, &str); 2] = [("Alice", "Practice"), ("Bob", "Hope")];
pub const FIXTURE_CODEC: Codec = Codec::BZip2;
pub const RECORD_COMPRESSED_FILE_NAME: &str = "record_compressed.sequencefile";
pub const BLOCK_COMPRESSED_FILE_NAME: &str = "block_compressed.sequencefile";

/// Writes the fixture records at `path`, compressed with the fixture codec.
///
/// An existing file is overwritten. If anything fails once the file has been
/// created, the incomplete file is removed before the error is returned.
pub fn generate<P: AsRef<Path>>(path: P, compression_type: CompressionType) -> io::Result<()> {
    let path = path.as_ref();

    create_or_remove(path, |file| {
        let writer = write_fixture(BufWriter::new(file), compression_type, FIXTURE_CODEC)?;
        writer.get_ref().sync_all()
    })?;

    info!("generated {:?} compressed {}", compression_type, path.display());
    Ok(())
}

/// Writes both the record and block compressed fixtures into `dir`,
/// returns their paths in that order.
pub fn generate_all<P: AsRef<Path>>(dir: P) -> io::Result<(PathBuf, PathBuf)> {
    let record = dir.as_ref().join(RECORD_COMPRESSED_FILE_NAME);
    let block = dir.as_ref().join(BLOCK_COMPRESSED_FILE_NAME);

    generate(&record, CompressionType::Record)?;
    generate(&block, CompressionType::Block)?;

    Ok((record, block))
}

/// Creates `path` and hands it to `write`. When `write` fails the file is
/// removed, unless something other than a regular file was already there.
fn create_or_remove<F>(path: &Path, write: F) -> io::Result<()>
where F: FnOnce(File) -> io::Result<()>,
{
    let removable = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata.file_type().is_file(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => return Err(e),
    };

    let file = File::create(path)?;

    match write(file) {
        Ok(()) => Ok(()),
        Err(e) => {
            if !removable {
                warn!("{} was not a regular file, leaving it in place", path.display());
            } else if let Err(remove) = fs::remove_file(path) {
                warn!("could not remove the incomplete {}: {}", path.display(), remove);
            }
            Err(e)
        },
    }
}

fn write_fixture<W: Write>(writer: W, compression_type: CompressionType, codec: Codec) -> io::Result<W> {
    let mut options = WriterOptions::new();
    options.set_compression_type(compression_type);
    options.set_codec(codec);

    let mut writer = Writer::new(writer, Some(options))?;
    for (key, val) in &FIXTURE_RECORDS {
        writer.add(key, val)?;
    }

    writer.into_inner()
}
