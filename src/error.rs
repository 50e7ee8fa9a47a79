use std::{fmt, io, error};

#[derive(Debug)]
pub enum Error {
    SeqFile(SeqFileError),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SeqFile(seqfile) => write!(f, "{}", seqfile),
            Error::Io(io) => write!(f, "{}", io),
        }
    }
}

impl error::Error for Error { }

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<SeqFileError> for Error {
    fn from(err: SeqFileError) -> Error {
        Error::SeqFile(err)
    }
}

#[derive(Debug)]
pub enum SeqFileError {
    InvalidMagic,
    UnsupportedVersion(u8),
    UnsupportedCodec(String),
    InvalidText,
    InvalidMetadataCount(i32),
    InvalidVLong,
    InvalidRecordLength,
    InvalidSyncMarker,
    InvalidBlockLengths,
}

impl fmt::Display for SeqFileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeqFileError::InvalidMagic => f.write_str("invalid magic number"),
            SeqFileError::UnsupportedVersion(v) => write!(f, "unsupported version {}", v),
            SeqFileError::UnsupportedCodec(name) => write!(f, "unsupported compression codec {}", name),
            SeqFileError::InvalidText => f.write_str("invalid text"),
            SeqFileError::InvalidMetadataCount(count) => write!(f, "invalid metadata pair count {}", count),
            SeqFileError::InvalidVLong => f.write_str("invalid vlong"),
            SeqFileError::InvalidRecordLength => f.write_str("invalid record length"),
            SeqFileError::InvalidSyncMarker => f.write_str("invalid sync marker"),
            SeqFileError::InvalidBlockLengths => f.write_str("invalid lengths for block"),
        }
    }
}

impl error::Error for SeqFileError { }
