//! Batch driver: convert a list of PDFs to LaTeX, one after another.
//!
//! ## Failure policy
//!
//! A candidate path that does not exist is skipped and the batch continues.
//! Any other failure (unreadable PDF, LLM error, write error) stops the batch
//! at that file; the returned [`BatchError`] carries the partial
//! [`BatchReport`] so callers can see what finished.
//!
//! ## Ordering
//!
//! Pages are sent one at a time, in page order, and files are handled in the
//! order given. Nothing is fanned out, so provider-side errors (rate limits
//! included) surface in a predictable order.

use crate::config::ConversionConfig;
use crate::error::{BatchError, Pdf2TexError};
use crate::output::{BatchReport, FileConversion, FileOutcome, PageText};
use crate::pipeline::assemble::{assemble_document, output_path_for};
use crate::pipeline::extract::{PageSource, PdfiumTextSource};
use crate::pipeline::llm::{LlmTransformer, PageTransformer};
use crate::progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Split the single whitespace-separated argument into candidate paths.
pub fn parse_candidates(arg: &str) -> Vec<PathBuf> {
    arg.split_whitespace().map(PathBuf::from).collect()
}

/// Owns the configuration, the page source, and the one LLM client of a run.
pub struct Driver<S = PdfiumTextSource, T = LlmTransformer> {
    config: ConversionConfig,
    source: S,
    transformer: T,
    progress: ProgressCallback,
}

impl Driver {
    /// Build the production driver: pdfium text extraction and the LLM
    /// provider named in `config`.
    ///
    /// Fails with [`Pdf2TexError::MissingCredential`] before anything else
    /// happens when the credential is absent.
    pub fn from_config(config: ConversionConfig) -> Result<Self, Pdf2TexError> {
        let transformer = LlmTransformer::from_config(&config)?;
        Self::with_parts(config, PdfiumTextSource::from_env(), transformer)
    }
}

impl<S: PageSource, T: PageTransformer> Driver<S, T> {
    /// Assemble a driver from explicit parts.
    ///
    /// The credential check still applies, so a driver never exists without
    /// one.
    pub fn with_parts(
        config: ConversionConfig,
        source: S,
        transformer: T,
    ) -> Result<Self, Pdf2TexError> {
        config.require_credential()?;
        let progress = config
            .progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback) as Arc<dyn ConversionProgressCallback>);

        Ok(Self {
            config,
            source,
            transformer,
            progress,
        })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert every candidate in order.
    ///
    /// Missing paths are recorded as [`FileOutcome::Skipped`]. The first other
    /// error stops the batch; later candidates are not attempted.
    pub async fn run(&self, candidates: &[PathBuf]) -> Result<BatchReport, BatchError> {
        let total_start = Instant::now();
        let mut report = BatchReport::default();
        info!("Starting batch: {} candidate(s)", candidates.len());

        for path in candidates {
            if !path.exists() {
                warn!("Skipping '{}': file not found", path.display());
                self.progress.on_file_skipped(path);
                report.files.push(FileOutcome::Skipped {
                    input: path.clone(),
                });
                continue;
            }

            match self.convert_file(path).await {
                Ok(conversion) => {
                    let chars = conversion.fragments.iter().map(|f| f.chars().count()).sum();
                    report.files.push(FileOutcome::Converted {
                        input: path.clone(),
                        output: conversion.output,
                        pages: conversion.fragments.len(),
                        chars,
                    });
                }
                Err(source) => {
                    error!("Conversion of '{}' failed: {}", path.display(), source);
                    self.progress.on_file_failed(path, source.to_string());
                    return Err(BatchError {
                        path: path.clone(),
                        report,
                        source,
                    });
                }
            }
        }

        info!(
            "Batch complete: {} converted, {} skipped, {}ms",
            report.converted(),
            report.skipped(),
            total_start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Load, transform, assemble, and write one PDF.
    ///
    /// The output is written only after every page has been transformed, so
    /// a failure leaves no output file behind.
    pub async fn convert_file(&self, path: &Path) -> Result<FileConversion, Pdf2TexError> {
        let start = Instant::now();
        info!("Converting: {}", path.display());

        let pages = self.source.load(path).await?;
        self.progress.on_file_start(path, pages.len());

        let fragments = self.transform_pages(path, &pages).await?;
        let document = assemble_document(&fragments);

        let output = output_path_for(path);
        write_atomic(&output, &document)?;

        info!(
            "Wrote {} ({} pages, {}ms)",
            output.display(),
            fragments.len(),
            start.elapsed().as_millis()
        );
        self.progress.on_file_complete(path, &output, fragments.len());

        Ok(FileConversion { output, fragments })
    }

    /// Transform pages strictly in order, one awaited call at a time.
    async fn transform_pages(
        &self,
        path: &Path,
        pages: &[PageText],
    ) -> Result<Vec<String>, Pdf2TexError> {
        let total = pages.len();
        let mut fragments = Vec::with_capacity(total);

        for page in pages {
            self.progress.on_page_start(path, page.page_num, total);
            let fragment = self.transformer.transform(page).await?;
            debug!("Page {}/{} → {} bytes", page.page_num, total, fragment.len());
            self.progress
                .on_page_complete(path, page.page_num, total, fragment.len());
            fragments.push(fragment);
        }

        Ok(fragments)
    }
}

/// Report page counts and per-page text length without calling the LLM.
///
/// Needs no credential.
pub async fn inspect<S: PageSource>(
    source: &S,
    path: &Path,
) -> Result<Vec<PageText>, Pdf2TexError> {
    source.load(path).await
}

/// Write `contents` to a temp file beside `path`, then rename over it.
fn write_atomic(path: &Path, contents: &str) -> Result<(), Pdf2TexError> {
    let write_err = |source: std::io::Error| Pdf2TexError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
