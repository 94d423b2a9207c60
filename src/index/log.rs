use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Append-only diagnostic log the build writes alongside its artifacts.
pub struct BuildLog {
    out: File,
}

impl BuildLog {
    pub fn open(path: &Path) -> io::Result<Self> {
        let out = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { out })
    }

    pub fn write_line(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }
}
