//! Validation of uploaded utility bills.
//!
//! A bill is rejected before any network call when it is not a PDF or is
//! larger than the configured limit.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_BILL_BYTES: u64 = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum BillError {
    #[error("'{}' is not a PDF file; upload the bill as PDF", .path.display())]
    WrongFormat { path: PathBuf },

    #[error("bill is {size} bytes; the limit is {limit} bytes")]
    Oversized { size: u64, limit: u64 },

    #[error("cannot read '{}': {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A bill that passed validation, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl BillDocument {
    /// Reads and validates the bill at `path`.
    ///
    /// The extension and size are checked before the file is read; the PDF
    /// signature is checked on the contents.
    pub async fn load(
        path: &Path,
        limit: u64,
    ) -> Result<Self, BillError> {
        let wrong_format = || BillError::WrongFormat {
            path: path.to_path_buf(),
        };
        let unreadable = |source: io::Error| BillError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(wrong_format());
        }

        let size = fs::metadata(path).await.map_err(unreadable)?.len();
        if size > limit {
            return Err(BillError::Oversized { size, limit });
        }

        let bytes = fs::read(path).await.map_err(unreadable)?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(wrong_format());
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "factura.pdf".to_string());
        debug!(file = %file_name, size, "bill accepted");

        Ok(Self { file_name, bytes })
    }
}
