//! Post-processing of LLM-generated LaTeX fragments.
//!
//! By default a fragment is only trimmed of surrounding whitespace; it is not
//! checked for well-formed LaTeX. [`clean_fragment`] additionally undoes the
//! most common model quirk, wrapping the answer in a Markdown code fence,
//! and is enabled with `ConversionConfig::strip_fences`.
//!
//! Rules of [`clean_fragment`] (applied in order):
//! 1. Normalise line endings (CRLF → LF)
//! 2. Strip an outer ```` ```latex ```` / ```` ```tex ```` / ```` ``` ```` fence
//! 3. Trim surrounding whitespace

use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:latex|tex)?[ \t]*\n(.*?)\n?```$").unwrap());

/// Trim leading and trailing whitespace and return the rest unchanged.
pub fn trim_fragment(raw: &str) -> String {
    raw.trim().to_string()
}

/// Apply all cleanup rules to a raw fragment.
pub fn clean_fragment(raw: &str) -> String {
    let s = normalise_line_endings(raw);
    let s = strip_outer_fence(s.trim());
    s.trim().to_string()
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}
