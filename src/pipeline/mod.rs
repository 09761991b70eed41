//! Pipeline stages for PDF-to-LaTeX conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the two I/O-bound stages can be replaced by stubs.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ llm ──▶ postprocess ──▶ assemble
//! (pdfium)    (one call per page)     (preamble + \newpage + postamble)
//! ```
//!
//! 1. [`extract`]     — read the text layer of every page; pdfium runs in
//!    `spawn_blocking` because it is not async-safe
//! 2. [`llm`]         — embed the page text in the fixed instruction and call
//!    the provider; the only stage with network I/O
//! 3. [`postprocess`] — trim the fragment, optionally strip a code fence
//! 4. [`assemble`]    — wrap the fragments into one compilable document

pub mod assemble;
pub mod extract;
pub mod llm;
pub mod postprocess;
