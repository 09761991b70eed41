//! Page text extraction via pdfium.
//!
//! The pdfium C++ library is not async-safe, so all pdfium calls run inside
//! `tokio::task::spawn_blocking`. Before pdfium is touched the file is opened
//! and its `%PDF` magic checked, so a missing or foreign file yields a precise
//! error instead of a generic pdfium failure.

use crate::error::Pdf2TexError;
use crate::output::PageText;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable pointing at a pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_VAR: &str = "PDFIUM_LIB_PATH";

/// Produces the ordered page texts of a document.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Load `path` and return one [`PageText`] per physical page, in order.
    async fn load(&self, path: &Path) -> Result<Vec<PageText>, Pdf2TexError>;
}

/// [`PageSource`] backed by pdfium's text layer.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextSource {
    lib_path: Option<PathBuf>,
}

impl PdfiumTextSource {
    /// Bind to the library at `lib_path` (file or directory) before falling
    /// back to the working directory and the system search path.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }

    /// Use [`PDFIUM_LIB_PATH_VAR`] when set.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(PDFIUM_LIB_PATH_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }
}

#[async_trait]
impl PageSource for PdfiumTextSource {
    async fn load(&self, path: &Path) -> Result<Vec<PageText>, Pdf2TexError> {
        check_pdf_file(path)?;

        let path = path.to_path_buf();
        let lib_path = self.lib_path.clone();

        tokio::task::spawn_blocking(move || extract_pages_blocking(&path, lib_path.as_deref()))
            .await
            .map_err(|e| Pdf2TexError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

/// Validate that `path` exists, is readable, and starts with `%PDF`.
pub fn check_pdf_file(path: &Path) -> Result<(), Pdf2TexError> {
    if !path.exists() {
        return Err(Pdf2TexError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => {}
                Ok(()) => {
                    return Err(Pdf2TexError::NotAPdf {
                        path: path.to_path_buf(),
                        magic,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    return Err(Pdf2TexError::PermissionDenied {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(Pdf2TexError::CorruptPdf {
                        path: path.to_path_buf(),
                        detail: "file is shorter than a PDF header".into(),
                    });
                }
                Err(e) => {
                    return Err(Pdf2TexError::CorruptPdf {
                        path: path.to_path_buf(),
                        detail: format!("cannot read header: {e}"),
                    });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2TexError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2TexError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated PDF header: {}", path.display());
    Ok(())
}

/// Bind to pdfium: explicit path, then working directory, then system.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, Pdf2TexError> {
    let explicit = lib_path.map(|p| {
        if p.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&*p.to_string_lossy())
        } else {
            p.to_path_buf()
        }
    });

    let bindings = match explicit {
        Some(lib) => Pdfium::bind_to_library(&lib),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2TexError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn extract_pages_blocking(
    pdf_path: &Path,
    lib_path: Option<&Path>,
) -> Result<Vec<PageText>, Pdf2TexError> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Pdf2TexError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let mut results = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let text = page
            .text()
            .map_err(|e| Pdf2TexError::TextExtractionFailed {
                path: pdf_path.to_path_buf(),
                page: page_num,
                detail: format!("{:?}", e),
            })?
            .all();

        debug!("Extracted page {} → {} chars", page_num, text.chars().count());
        results.push(PageText::new(page_num, text));
    }

    info!("PDF loaded: {} ({} pages)", pdf_path.display(), results.len());
    Ok(results)
}
