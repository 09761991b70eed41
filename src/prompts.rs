//! The instruction sent to the LLM for every page.
//!
//! The template is fixed: every page of every document is converted with the
//! same wording, so two runs over the same input differ only by what the
//! model returns. Keeping it here lets tests inspect the exact request text
//! without a live provider.

/// Maximum number of characters of page text embedded in one instruction.
///
/// Counted in Unicode scalar values. Anything past the limit is dropped.
pub const MAX_PAGE_CHARS: usize = 3000;

/// Instruction preceding the page text.
pub const PAGE_INSTRUCTION: &str = r#"Convert the following text extracted from one page of a PDF document into LaTeX.

Follow these rules precisely:

1. STRUCTURE
   - Use \section{}, \subsection{} and \subsubsection{} for headings
   - Use itemize for unordered lists and enumerate for ordered lists

2. TABLES
   - Reproduce tabular data with tabular, or tabularx for wide tables
   - Use booktabs rules (\toprule, \midrule, \bottomrule)

3. MATHEMATICS
   - Use $...$ for inline math and equation or align for display math

4. FIGURES
   - Where the text refers to a figure, insert a figure environment with a
     placeholder \fbox{Figure} and the caption if one is given

5. EMPHASIS
   - Use \textbf{} for bold and \textit{} for italic text

6. ESCAPING
   - Escape LaTeX special characters (& % $ # _ { } ~ ^ \) in ordinary text

7. OUTPUT FORMAT
   - Output ONLY the LaTeX body content for this page
   - Do NOT include \documentclass, \usepackage, \begin{document} or \end{document}
   - Do NOT add commentary or explanations

Page text:
"#;

/// Return at most the first `max` characters of `text`, unmodified.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the full instruction for one page.
pub fn page_instruction(page_text: &str) -> String {
    let body = truncate_chars(page_text, MAX_PAGE_CHARS);
    format!("{PAGE_INSTRUCTION}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_embedded_whole() {
        let instr = page_instruction("Hello, world.");
        assert!(instr.starts_with(PAGE_INSTRUCTION));
        assert!(instr.ends_with("Hello, world."));
    }

    #[test]
    fn long_text_is_cut_at_limit() {
        let text = format!("{}{}", "a".repeat(MAX_PAGE_CHARS), "OVERFLOW");
        let instr = page_instruction(&text);
        let embedded = &instr[PAGE_INSTRUCTION.len()..];
        assert_eq!(embedded, "a".repeat(MAX_PAGE_CHARS));
        assert!(!instr.contains("OVERFLOW"));
    }

    #[test]
    fn text_exactly_at_limit_is_kept() {
        let text = "b".repeat(MAX_PAGE_CHARS);
        assert_eq!(truncate_chars(&text, MAX_PAGE_CHARS), text);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // 'é' is two bytes in UTF-8
        let text = "é".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(cut, "éééé");
    }

    #[test]
    fn template_asks_for_latex_only() {
        assert!(PAGE_INSTRUCTION.contains("LaTeX"));
        assert!(PAGE_INSTRUCTION.contains("Do NOT add commentary"));
        assert!(PAGE_INSTRUCTION.contains("tabular"));
    }
}
