//! Error types for the pdf2tex library.
//!
//! Two types reflect two scopes of failure:
//!
//! * [`Pdf2TexError`] — a single operation failed: the credential is missing,
//!   a PDF could not be read, the LLM call for one page failed, or the output
//!   file could not be written.
//!
//! * [`BatchError`] — the batch driver stopped. It wraps the
//!   [`Pdf2TexError`] that caused the stop together with the path being
//!   processed and the [`BatchReport`] of everything that finished before it.
//!
//! Only [`Pdf2TexError::FileNotFound`] is tolerated by the driver (the
//! candidate is skipped). Every other error stops the whole batch.

use crate::output::BatchReport;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2tex library.
#[derive(Debug, Error)]
pub enum Pdf2TexError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The environment variable holding the service credential is unset or empty.
    #[error("Missing API credential: '{var}' is not set.\nExport it before running, e.g. export {var}=...")]
    MissingCredential { var: String },

    /// The configured provider could not be constructed.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not open the document.
    #[error("PDF '{path}' could not be parsed: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium opened the document but failed on a specific page.
    #[error("Text extraction failed for page {page} of '{path}': {detail}")]
    TextExtractionFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium system-wide, place it in the working directory, or\n\
set PDFIUM_LIB_PATH to the library file or the directory containing it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The LLM call for a page failed (transport, authentication, or an
    /// unexpected response).
    #[error("LLM call failed on page {page}: {message}")]
    ServiceFailed { page: usize, message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output LaTeX file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2TexError {
    /// Whether the batch driver should skip the candidate rather than stop.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Pdf2TexError::FileNotFound { .. })
    }
}

/// The batch stopped while processing `path`.
#[derive(Debug, Error)]
#[error("Conversion of '{path}' failed: {source}")]
pub struct BatchError {
    /// The candidate that was being converted.
    pub path: PathBuf,
    /// Files converted or skipped before the failure.
    pub report: BatchReport,
    #[source]
    pub source: Pdf2TexError,
}
