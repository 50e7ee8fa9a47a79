//! Prints the header and the records of a SequenceFile.

use std::env;
use std::fs::File;
use std::io;

use memmap::Mmap;
use oxidized_seqfile::{bytes_writable, Reader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = match env::args().nth(1) {
        Some(path) => path,
        None => return Err(Box::new(io::Error::new(io::ErrorKind::InvalidInput, "usage: seqfile-dump <path>"))),
    };

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let reader = Reader::new(&mmap[..])?;
    println!("{:#?}", reader.header());

    let mut iter = reader.iter();
    while let Some((key, val)) = iter.next()? {
        let key = bytes_writable(key).unwrap_or(key);
        let val = bytes_writable(val).unwrap_or(val);
        println!(r#""{}" "{}""#, String::from_utf8_lossy(key), String::from_utf8_lossy(val));
    }

    Ok(())
}
