//! CLI binary for manuscript-review.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ReviewConfig`, runs the upload + generate-response workflow against a
//! local file or URL, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use manuscript_review::pipeline::input::resolve_input;
use manuscript_review::{
    generate_response, load_templates, upload, ReviewConfig, SectionKind, UploadCache,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Review a local PDF (text output to stdout)
  mreview paper.pdf

  # Review a Word manuscript (converted via unoconv) and keep the PDF
  mreview thesis.docx --save-pdf thesis.pdf

  # Structured JSON response
  mreview paper.pdf --json > review.json

  # Review straight from a URL
  mreview https://arxiv.org/pdf/1706.03762 -o review.md

  # Use a specific model and custom templates
  mreview --model gpt-4o --provider openai --templates ./templates paper.pdf

REVIEW SECTIONS:
  Novelty       what is new relative to prior work
  Significance  importance and potential impact
  Soundness     methodology, rigour, reproducibility
  Section       section-by-section critique
  Overall       summary and recommendation

  Sections whose LLM call fails are reported as the literal text
  "Failed to generate <Section> review." — the review never fails as a
  whole because the backend was partially unavailable.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  MREVIEW_LLM_PROVIDER    Override provider (openai, anthropic, gemini, ollama)
  MREVIEW_MODEL           Override model ID

SETUP:
  1. Set API key:               export OPENAI_API_KEY=sk-...
  2. For Word input, install a converter honouring
     `convert -f pdf -o <out> <in>` (default: unoconv)
  3. Review:                    mreview paper.pdf
"#;

/// Generate a structured multi-section review of a manuscript using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "mreview",
    version,
    about = "Generate structured multi-section manuscript reviews using LLMs",
    long_about = "Generate a structured review (Novelty, Significance, Soundness, \
section-by-section, Overall) of a PDF or Word manuscript — local file or URL — by \
fanning the document out to independent LLM completion calls. Supports OpenAI, \
Anthropic, Google Gemini, and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/DOCX file path or HTTP/HTTPS URL.
    input: String,

    /// Write the review to this file instead of stdout.
    #[arg(short, long, env = "MREVIEW_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4o, claude-sonnet-4-20250514).
    #[arg(long, env = "MREVIEW_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "MREVIEW_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set."
    )]
    provider: Option<String>,

    /// Directory holding the five template files (Novelty.txt, …,
    /// overall_review.txt). Built-in templates are used if not set.
    #[arg(long, env = "MREVIEW_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Maximum characters of manuscript text submitted per LLM call.
    #[arg(long, env = "MREVIEW_CONTENT_CAP", default_value_t = 8000)]
    content_cap: usize,

    /// Number of concurrent LLM calls (the five sections are independent).
    #[arg(short, long, env = "MREVIEW_CONCURRENCY", default_value_t = 5)]
    concurrency: usize,

    /// Max LLM output tokens per section.
    #[arg(long, env = "MREVIEW_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "MREVIEW_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Per-section LLM call timeout in seconds.
    #[arg(long, env = "MREVIEW_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Strip an outer markdown fence and collapse blank-line runs in model
    /// output. Off by default: sections are returned trimmed only.
    #[arg(long, env = "MREVIEW_CLEAN_OUTPUT")]
    clean_output: bool,

    /// External Word-to-PDF converter executable.
    #[arg(long, env = "MREVIEW_CONVERTER", default_value = "unoconv")]
    converter: String,

    /// Converter subprocess timeout in seconds.
    #[arg(long, env = "MREVIEW_CONVERTER_TIMEOUT", default_value_t = 120)]
    converter_timeout: u64,

    /// HTTP download timeout in seconds (URL inputs).
    #[arg(long, env = "MREVIEW_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Also write the (possibly converted) PDF artifact to this path.
    #[arg(long, env = "MREVIEW_SAVE_PDF")]
    save_pdf: Option<PathBuf>,

    /// Output the structured JSON response instead of text.
    #[arg(long, env = "MREVIEW_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MREVIEW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the review itself.
    #[arg(short, long, env = "MREVIEW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    // ── Build config and templates ───────────────────────────────────────
    let config = build_config(&cli)?;
    let templates = load_templates(&config).context("Failed to load templates")?;

    // ── Resolve input ────────────────────────────────────────────────────
    let document = resolve_input(&cli.input, cli.download_timeout)
        .await
        .context("Failed to resolve input document")?;

    // ── Phase 1: upload (normalise to PDF, cache the artifact) ───────────
    let cache = UploadCache::new();
    let uploaded = upload(document.clone(), &cache, &config)
        .await
        .context("Upload failed")?;

    if let Some(ref pdf_path) = cli.save_pdf {
        tokio::fs::write(pdf_path, &uploaded.pdf)
            .await
            .with_context(|| format!("Failed to write PDF to {}", pdf_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} PDF artifact written to {}",
                green("✔"),
                bold(&pdf_path.display().to_string())
            );
        }
    }

    // ── Phase 2: generate the review (cache hit from phase 1) ────────────
    let output = generate_response(document, &cache, &templates, &config)
        .await
        .context("Review generation failed")?;
    let response = output.to_response();

    // ── Print ────────────────────────────────────────────────────────────
    let rendered = if cli.json {
        serde_json::to_string_pretty(&response).context("Failed to serialise response")?
    } else {
        render_text(&response)
    };

    if let Some(ref path) = cli.output {
        tokio::fs::write(path, rendered.as_bytes())
            .await
            .with_context(|| format!("Failed to write review to {}", path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} Review written to {}",
                green("✔"),
                bold(&path.display().to_string())
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        let stats = &output.stats;
        let ok = stats.total_sections - stats.failed_sections;
        eprintln!(
            "{}  {}/{} sections  {}ms total",
            if stats.failed_sections == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            ok,
            stats.total_sections,
            stats.total_duration_ms,
        );
        if stats.failed_sections > 0 {
            eprintln!("   {} sections failed", red(&stats.failed_sections.to_string()));
        }
        if stats.truncated {
            eprintln!(
                "   {} manuscript truncated to {} chars before submission",
                cyan("⚠"),
                stats.content_chars
            );
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ReviewConfig`.
fn build_config(cli: &Cli) -> Result<ReviewConfig> {
    let mut builder = ReviewConfig::builder()
        .content_cap(cli.content_cap)
        .concurrency(cli.concurrency)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .clean_output(cli.clean_output)
        .converter_program(cli.converter.clone())
        .converter_timeout_secs(cli.converter_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref dir) = cli.templates {
        builder = builder.template_dir(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Render the response as readable text, one heading per section.
fn render_text(response: &manuscript_review::ReviewResponse) -> String {
    let mut out = String::new();
    for kind in SectionKind::CRITERIA {
        out.push_str(&format!("## {}\n\n", kind.name()));
        out.push_str(&response.reviews[kind.name()]);
        out.push_str("\n\n");
    }
    out.push_str("## Section-by-section\n\n");
    out.push_str(&response.section);
    out.push_str("\n\n## Overall\n\n");
    out.push_str(&response.overall);
    out.push('\n');
    out
}
