//! Data types flowing through and out of the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Text extracted from one physical page of a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Raw text as returned by the extractor.
    pub text: String,
}

impl PageText {
    pub fn new(page_num: usize, text: impl Into<String>) -> Self {
        Self {
            page_num,
            text: text.into(),
        }
    }
}

/// Result of converting a single PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConversion {
    /// Where the LaTeX document was written.
    pub output: PathBuf,
    /// One fragment per source page, in page order.
    pub fragments: Vec<String>,
}

/// What happened to one candidate path in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The PDF was converted and written to `output`.
    Converted {
        input: PathBuf,
        output: PathBuf,
        pages: usize,
        chars: usize,
    },
    /// The path did not exist.
    Skipped { input: PathBuf },
}

impl FileOutcome {
    pub fn input(&self) -> &PathBuf {
        match self {
            FileOutcome::Converted { input, .. } | FileOutcome::Skipped { input } => input,
        }
    }
}

/// Summary of a batch run, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Converted { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Skipped { .. }))
            .count()
    }

    /// Total pages sent through the LLM across all converted files.
    pub fn total_pages(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f {
                FileOutcome::Converted { pages, .. } => *pages,
                FileOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}
