//! Document assembly: wrap page fragments into one compilable LaTeX file.

use std::path::{Path, PathBuf};

/// Extension given to every output document.
pub const OUTPUT_EXTENSION: &str = "tex";

/// Document class, packages, and the opening of the document body.
pub const PREAMBLE: &str = "\\documentclass[11pt,a4paper]{article}\n\
\\usepackage[utf8]{inputenc}\n\
\\usepackage[T1]{fontenc}\n\
\\usepackage{amsmath,amssymb,amsfonts,amsthm}\n\
\\usepackage{geometry,graphicx,tabularx,booktabs,float,listings}\n\
\\usepackage{hyperref}\n\
\\geometry{margin=1in}\n\
\n\
\\begin{document}\n\
\n";

/// Inserted between consecutive page fragments.
pub const PAGE_SEPARATOR: &str = "\n\n\\newpage\n\n";

/// Closes the document body.
pub const POSTAMBLE: &str = "\n\n\\end{document}\n";

/// Join `fragments` in order between [`PREAMBLE`] and [`POSTAMBLE`].
pub fn assemble_document(fragments: &[String]) -> String {
    let body = fragments.join(PAGE_SEPARATOR);
    let mut doc = String::with_capacity(PREAMBLE.len() + body.len() + POSTAMBLE.len());
    doc.push_str(PREAMBLE);
    doc.push_str(&body);
    doc.push_str(POSTAMBLE);
    doc
}

/// Sibling path of `input` with the extension replaced by `.tex`.
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}
