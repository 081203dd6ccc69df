use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::record::{ResourceRecord, CSV_COLUMNS};

/// Pretty JSON array, non-ASCII kept as-is. Overwrites `path`.
pub fn write_json(records: &[ResourceRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write JSON to {}", path.display()))
}

/// Header row plus one row per record, CRLF-terminated. Overwrites `path`.
pub fn write_csv(records: &[ResourceRecord], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV {}", path.display()))?;

    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
    Ok(())
}

/// Append-only JSON-lines log: one compact object per line, buffered until
/// `flush` (or drop).
pub struct JsonlSink<W: Write> {
    writer: BufWriter<W>,
    written: usize,
}

impl JsonlSink<File> {
    /// Open `path` for appending, creating it if missing.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {} for appending", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    pub fn append<T: Serialize>(&mut self, item: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, item)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| panic!("flush failed: {}", e.error()))
    }
}

// ── Tests ──
