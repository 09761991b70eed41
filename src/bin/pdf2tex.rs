//! CLI binary for pdf2tex.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, runs the batch, and maps the outcome to an exit code.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2tex::{
    inspect, parse_candidates, ConversionConfig, ConversionProgressCallback, Driver, FileOutcome,
    PdfiumTextSource, ProgressCallback, DEFAULT_MODEL, DEFAULT_PROVIDER,
};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on the bottom line plus one status line per page and per file.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_file_start(&self, path: &Path, total_pages: usize) {
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{} ({total_pages} pages)", path.display()))
        ));
    }

    fn on_page_start(&self, _path: &Path, page_num: usize, total_pages: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}/{total_pages}"));
    }

    fn on_page_complete(&self, _path: &Path, page_num: usize, total_pages: usize, latex_len: usize) {
        let elapsed_ms = self
            .page_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{latex_len:>5} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_file_complete(&self, _path: &Path, output: &Path, _pages: usize) {
        self.bar.println(format!(
            "{} Wrote {}",
            green("✔"),
            bold(&output.display().to_string())
        ));
    }

    fn on_file_skipped(&self, path: &Path) {
        self.bar.println(format!(
            "{} Skipping {}: file not found",
            yellow("⚠"),
            path.display()
        ));
    }

    fn on_file_failed(&self, path: &Path, error: String) {
        self.bar.println(format!(
            "{} {} failed: {}",
            red("✘"),
            path.display(),
            red(&error)
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two PDFs (writes a.tex and docs/b.tex)
  pdf2tex "a.pdf docs/b.pdf"

  # Same, reading the list from the environment (CI)
  PDF2TEX_FILES="a.pdf docs/b.pdf" pdf2tex

  # Use OpenAI instead of the default Gemini model
  pdf2tex --provider openai --model gpt-4.1-mini "paper.pdf"

  # Page counts only, no API key needed
  pdf2tex --inspect-only "paper.pdf"

EXIT STATUS:
  0  nothing to do, or every existing file converted (missing paths are skipped)
  1  missing API key, or a file failed; the remaining files are not attempted

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      API key for the default gemini provider
  OPENAI_API_KEY      API key for --provider openai
  ANTHROPIC_API_KEY   API key for --provider anthropic
  OPENROUTER_API_KEY  API key for --provider openrouter
  PDFIUM_LIB_PATH     pdfium library file, or the directory containing it
  RUST_LOG            Override the log filter (e.g. pdf2tex=debug)
"#;

/// Convert PDF files to LaTeX, one LLM call per page.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2tex",
    version,
    about = "Convert PDF files to LaTeX, one LLM call per page",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Whitespace-separated list of PDF paths. Empty means nothing to do.
    #[arg(env = "PDF2TEX_FILES")]
    files: Option<String>,

    /// LLM provider: gemini, openai, anthropic, openrouter.
    #[arg(long, env = "PDF2TEX_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// Model ID used for every page of every file.
    #[arg(long, env = "PDF2TEX_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Max LLM output tokens per page.
    #[arg(long, env = "PDF2TEX_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2TEX_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Retries per page on LLM failure (0 = stop on first failure).
    #[arg(long, env = "PDF2TEX_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Remove a ```latex fence the model may wrap around its answer.
    #[arg(long, env = "PDF2TEX_STRIP_FENCES")]
    strip_fences: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "PDF2TEX_JSON")]
    json: bool,

    /// Print page counts only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress spinner and status lines.
    #[arg(long, env = "PDF2TEX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TEX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TEX_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The status lines replace INFO logs while the spinner is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli, show_progress).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, show_progress: bool) -> Result<ExitCode> {
    let candidates = parse_candidates(cli.files.as_deref().unwrap_or(""));
    if candidates.is_empty() {
        if !cli.quiet {
            eprintln!("No input files given; nothing to do.");
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let source = PdfiumTextSource::from_env();
        for path in &candidates {
            let pages = inspect(&source, path)
                .await
                .with_context(|| format!("Failed to inspect {}", path.display()))?;
            println!("{}: {} pages", path.display(), pages.len());
            for page in &pages {
                println!("  page {:>3}: {:>6} chars", page.page_num, page.text.chars().count());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build config and driver ──────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);

    let mut builder = ConversionConfig::builder()
        .provider_name(&cli.provider)
        .model(&cli.model)
        .credential_from_env()
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .strip_fences(cli.strip_fences);
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    let driver = match Driver::from_config(config) {
        Ok(d) => d,
        Err(e) => {
            if let Some(ref cb) = progress {
                cb.finish();
            }
            eprintln!("{} {}", red("error:"), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if !cli.quiet && !cli.json {
        let config = driver.config();
        eprintln!(
            "{}",
            dim(&format!("Using {} / {}", config.provider_name, config.model))
        );
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let result = driver.run(&candidates).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }

    match result {
        Ok(report) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise report")?
                );
            } else if !cli.quiet {
                if !show_progress {
                    for outcome in &report.files {
                        match outcome {
                            FileOutcome::Converted { output, pages, .. } => {
                                eprintln!("Converted {} ({} pages)", output.display(), pages)
                            }
                            FileOutcome::Skipped { .. } => {
                                eprintln!("Skipped {}: file not found", outcome.input().display())
                            }
                        }
                    }
                }
                eprintln!(
                    "{}  {} converted, {} skipped, {} pages",
                    green("✔"),
                    report.converted(),
                    report.skipped(),
                    report.total_pages()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&e.report)
                        .context("Failed to serialise report")?
                );
            }
            eprintln!("{} {}", red("error:"), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
