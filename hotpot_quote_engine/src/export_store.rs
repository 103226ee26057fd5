//! The export directory.
//!
//! Each accepted quote gets at most one file, `<quote id>.xlsx`. Since quote ids are unique, writers never contend for
//! a file and the directory needs no locking. Files are written under a temporary name and renamed into place, so a
//! concurrent download never sees a half-written document.
//!
//! Lookups take the identifier straight from the request path, so it is reduced to `[0-9A-Za-z_-]` before it gets
//! anywhere near the filesystem.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::*;
use tokio::fs;

use crate::{
    errors::ExportError,
    spreadsheet::{RenderedExport, EXPORT_EXTENSION},
};

#[derive(Debug, Clone)]
pub struct ExportStore {
    dir: PathBuf,
}

/// A previously written export, found by [`ExportStore::locate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedExport {
    /// The sanitized identifier the export was found under
    pub id: String,
    /// `<id>.xlsx`
    pub filename: String,
    pub path: PathBuf,
    pub len: u64,
}

/// Strip everything except ASCII letters, digits, `_` and `-`.
pub fn sanitize_export_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect()
}

impl ExportStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    /// Write an export into the directory, creating the directory if necessary. Returns the path of the new file.
    pub async fn save(&self, export: &RenderedExport) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&export.filename);
        let partial = self.dir.join(format!(".{}.partial", export.filename));
        if let Err(e) = write_then_rename(&partial, &path, &export.bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
        debug!("📁️ Wrote {} ({} bytes)", path.display(), export.bytes.len());
        Ok(path)
    }

    /// Remove an export that was written for a quote that was ultimately not accepted.
    pub async fn discard(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => debug!("📁️ Discarded {}", path.display()),
            Err(e) => warn!("📁️ Could not discard {}. {e}", path.display()),
        }
    }

    /// Find the export for a raw (untrusted) identifier. Returns `None` if the sanitized identifier is empty, or if
    /// there is no regular file for it.
    pub async fn locate(&self, raw_id: &str) -> Result<Option<LocatedExport>, ExportError> {
        let id = sanitize_export_id(raw_id);
        if id.is_empty() {
            debug!("📁️ Nothing left of export id {raw_id:?} after sanitizing");
            return Ok(None);
        }
        let filename = format!("{id}.{EXPORT_EXTENSION}");
        let path = self.dir.join(&filename);
        let meta = match fs::symlink_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("📁️ No export at {}", path.display());
                return Ok(None);
            },
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            warn!("📁️ {} exists but is not a regular file. Ignoring it.", path.display());
            return Ok(None);
        }
        Ok(Some(LocatedExport { id, filename, path, len: meta.len() }))
    }
}

async fn write_then_rename(partial: &Path, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    fs::write(partial, bytes).await?;
    fs::rename(partial, path).await?;
    Ok(())
}
