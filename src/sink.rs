//! Where parsed transactions go. Persistence and deduplication live behind this
//! trait, outside the importer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::models::CanonicalTransaction;

pub trait TransactionSink {
    /// Returns how many of `transactions` the sink stored.
    fn accept(&mut self, transactions: &[CanonicalTransaction]) -> anyhow::Result<usize>;
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub transactions: Vec<CanonicalTransaction>,
}

impl TransactionSink for MemorySink {
    fn accept(&mut self, transactions: &[CanonicalTransaction]) -> anyhow::Result<usize> {
        self.transactions.extend_from_slice(transactions);
        Ok(transactions.len())
    }
}

/// Appends one JSON object per line.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TransactionSink for JsonLinesSink {
    fn accept(&mut self, transactions: &[CanonicalTransaction]) -> anyhow::Result<usize> {
        for txn in transactions {
            serde_json::to_writer(&mut self.writer, txn)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer
            .flush()
            .with_context(|| format!("writing {}", self.path.display()))?;
        log::debug!("wrote {} transactions to {}", transactions.len(), self.path.display());
        Ok(transactions.len())
    }
}
