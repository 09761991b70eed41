//! Progress-callback trait for per-file and per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the driver works through a batch. The library itself only emits
//! `tracing` events; anything user-facing (progress bars, coloured status
//! lines) lives in the callback.
//!
//! # Example
//!
//! ```rust
//! use pdf2tex::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for PageCounter {
//!     fn on_page_complete(&self, _path: &Path, _page_num: usize, _total: usize, _len: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .credential("test-key")
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the driver as it processes each file and page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed strictly in order, one at a
/// time, so events for one file never interleave with another's.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called after a PDF has been loaded, before its first page is sent.
    fn on_file_start(&self, path: &Path, total_pages: usize) {
        let _ = (path, total_pages);
    }

    /// Called just before the LLM request for a page.
    fn on_page_start(&self, path: &Path, page_num: usize, total_pages: usize) {
        let _ = (path, page_num, total_pages);
    }

    /// Called when a page has been converted.
    ///
    /// `latex_len` is the byte length of the returned fragment.
    fn on_page_complete(&self, path: &Path, page_num: usize, total_pages: usize, latex_len: usize) {
        let _ = (path, page_num, total_pages, latex_len);
    }

    /// Called once the output file has been written.
    fn on_file_complete(&self, path: &Path, output: &Path, pages: usize) {
        let _ = (path, output, pages);
    }

    /// Called when a candidate path does not exist.
    fn on_file_skipped(&self, path: &Path) {
        let _ = path;
    }

    /// Called when a file's pipeline fails; the batch stops afterwards.
    fn on_file_failed(&self, path: &Path, error: String) {
        let _ = (path, error);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
