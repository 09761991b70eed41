//! # pdf2tex
//!
//! Convert PDF documents to LaTeX by sending the text of each page to a large
//! language model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   text layer of each page via pdfium
//!  ├─ 2. Prompt    fixed LaTeX instruction + first 3000 chars of the page
//!  ├─ 3. LLM       one awaited call per page, strictly in page order
//!  ├─ 4. Assemble  preamble + fragments joined by \newpage + \end{document}
//!  └─ 5. Output    sibling `.tex` file, written atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2tex::{ConversionConfig, Driver};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY
//!     let config = ConversionConfig::builder().credential_from_env().build()?;
//!     let driver = Driver::from_config(config)?;
//!     let report = driver.run(&[PathBuf::from("paper.pdf")]).await?;
//!     eprintln!("{} file(s) converted", report.converted());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2tex` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    credential_var_for, ConversionConfig, ConversionConfigBuilder, DEFAULT_MODEL, DEFAULT_PROVIDER,
};
pub use convert::{inspect, parse_candidates, Driver};
pub use error::{BatchError, Pdf2TexError};
pub use output::{BatchReport, FileConversion, FileOutcome, PageText};
pub use pipeline::assemble::{assemble_document, output_path_for, PAGE_SEPARATOR, POSTAMBLE, PREAMBLE};
pub use pipeline::extract::{PageSource, PdfiumTextSource};
pub use pipeline::llm::{LlmTransformer, PageTransformer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::MAX_PAGE_CHARS;
