//! Durable storage for provenance entries.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{ProvenanceEntry, ProvenanceError, ProvenanceResult};

/// Destination that every sealed entry is written to before it joins the log.
pub trait EntrySink: Send {
    /// Persist one entry. An error keeps the entry out of the log.
    fn write(&mut self, entry: &ProvenanceEntry) -> ProvenanceResult<()>;
}

/// Appends one JSON object per line to a file.
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> ProvenanceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry stored at `path`. A missing file yields no entries.
    pub fn load(path: impl AsRef<Path>) -> ProvenanceResult<Vec<ProvenanceEntry>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| ProvenanceError::Corrupt {
                line: idx + 1,
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl EntrySink for JsonlSink {
    fn write(&mut self, entry: &ProvenanceEntry) -> ProvenanceResult<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
