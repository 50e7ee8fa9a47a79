//! Writes the record and block compressed fixture files.
//!
//! Usage: `seqfile-gen [output-dir]`, the current directory by default.

use std::env;
use std::io;

use log::info;
use oxidized_seqfile::generate_all;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let dir = env::args().nth(1).unwrap_or_else(|| String::from("."));
    let (record, block) = generate_all(&dir)?;

    info!("wrote {} and {}", record.display(), block.display());

    Ok(())
}
