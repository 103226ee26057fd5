//! The append-only quote log.
//!
//! Every accepted quote is written to the log exactly once, as one line of JSON. The log is the authoritative record of
//! acceptance: there is no API for reading, changing or removing entries.
use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::*;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::Mutex,
};

use crate::{errors::QuoteLogError, quote_types::QuoteRecord};

/// The `QuoteLog` trait defines the behaviour for durably recording accepted quotes.
///
/// Implementations must write records in the order `append` is called and must never interleave two records, even when
/// `append` is called concurrently. When an append fails, the error says whether the record is known to be absent
/// ([`QuoteLogError::Io`]) or might have been written ([`QuoteLogError::Indeterminate`]).
#[allow(async_fn_in_trait)]
pub trait QuoteLog {
    async fn append(&self, record: &QuoteRecord) -> Result<(), QuoteLogError>;
}

/// A newline-delimited JSON log in a single file.
///
/// The file is opened once and shared by every clone of the log. Appends are serialized through a mutex, and each one
/// is flushed and synced before the lock is released.
///
/// The log remembers where its last complete record ends. A failed append is cut back to that point straight away, and
/// if even that fails, the next append cuts it back before writing. A half-written line is therefore never glued to the
/// record that follows it.
#[derive(Debug, Clone)]
pub struct JsonLinesLog {
    path: PathBuf,
    file: Arc<Mutex<LogFile>>,
}

#[derive(Debug)]
struct LogFile {
    file: File,
    /// The length of the file up to the end of the last complete record
    clean_len: u64,
}

impl JsonLinesLog {
    /// Open (or create) the log file at `path`, creating parent directories as needed.
    ///
    /// If the previous process died half-way through a write, the file will not end in a newline. In that case a
    /// newline is added so that the torn line does not swallow the next record.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, QuoteLogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new().create(true).read(true).append(true).open(&path).await?;
        let mut len = file.metadata().await?.len();
        if len > 0 {
            file.seek(SeekFrom::Start(len - 1)).await?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                warn!("🗒️ {} does not end with a newline. The last record was probably torn.", path.display());
                file.write_all(b"\n").await?;
                file.flush().await?;
                len += 1;
            }
        }
        info!("🗒️ Quote log opened at {}", path.display());
        Ok(Self { path, file: Arc::new(Mutex::new(LogFile { file, clean_len: len })) })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl LogFile {
    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line).await?;
        self.file.flush().await?;
        self.file.sync_data().await
    }

    /// Cut the file back to the end of the last complete record, if anything was left behind by a failed append.
    async fn truncate_to_clean(&mut self) -> std::io::Result<()> {
        let len = self.file.metadata().await?.len();
        if len != self.clean_len {
            warn!("🗒️ Removing {} bytes left behind by a failed append", len.saturating_sub(self.clean_len));
            self.file.set_len(self.clean_len).await?;
        }
        Ok(())
    }
}

impl QuoteLog for JsonLinesLog {
    async fn append(&self, record: &QuoteRecord) -> Result<(), QuoteLogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut log = self.file.lock().await;
        log.truncate_to_clean().await?;
        if let Err(e) = log.write_line(&line).await {
            error!("🗒️ Could not append quote {} to the log. {e}", record.id);
            return match log.truncate_to_clean().await {
                Ok(()) => Err(QuoteLogError::Io(e)),
                Err(rollback) => {
                    error!("🗒️ Could not roll back the failed append of quote {}. {rollback}", record.id);
                    Err(QuoteLogError::Indeterminate(e))
                },
            };
        }
        log.clean_len += line.len() as u64;
        trace!("🗒️ Quote {} appended to the log", record.id);
        Ok(())
    }
}
