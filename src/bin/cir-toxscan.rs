//! CLI binary for cir-toxscan.
//!
//! A thin shim over the library crate that maps CLI flags to `ScanConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cir_toxscan::pipeline::highlight::{KEYWORD_CLOSE, KEYWORD_OPEN, NUMBER_CLOSE, NUMBER_OPEN};
use cir_toxscan::{
    scan_file, write_report, IngredientReport, PageError, ProgressCallback, ReportClient,
    ScanConfig, ScanOutput, ScanProgressCallback, ToxScanError, ValueKind, DEFAULT_BASE_URL,
    NO_MATCHES_MESSAGE,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &str, msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_prefix(prefix.to_string());
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a page counter while extracting, with page
/// warnings printed above it as they happen.
///
/// The bar stays hidden until extraction starts, so lookup and download
/// failures never leave a spinner behind.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::hidden(),
        })
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_page_extracted(&self, _page_num: usize, _chars: usize) {
        self.bar.inc(1);
    }

    fn on_page_warning(&self, warning: &PageError) {
        self.bar.println(format!("  {} {}", yellow("⚠"), warning));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, text_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} text extracted from {}/{} pages",
            green("✔"),
            bold(&text_pages.to_string()),
            total_pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # List ingredients whose name contains "stearate"
  cir-toxscan list --filter stearate

  # Print the report URL for an ingredient
  cir-toxscan link "Glycerin"

  # Scan an ingredient's report, highlighted in the terminal
  cir-toxscan scan --ingredient "Glycerin"

  # Scan a local or remote PDF into an HTML page
  cir-toxscan scan --file report.pdf --format html -o glycerin.html
  cir-toxscan scan --url https://cir-reports.cir-safety.org/view-attachment/?id=... --format json

ENVIRONMENT VARIABLES:
  CIR_TOXSCAN_BASE_URL   Report site root
  CIR_TOXSCAN_TIMEOUT    Per-request timeout in seconds (default: none)
  CIR_TOXSCAN_PAGES      Catalog pages to load (default: 1,2)
  RUST_LOG               Log filter, overrides -v / -q
"#;

#[derive(Parser, Debug)]
#[command(
    name = "cir-toxscan",
    version,
    about = "Find NOAEL and LD50 values in CIR ingredient safety reports",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Report site root.
    #[arg(long, global = true, env = "CIR_TOXSCAN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds. No timeout when unset.
    #[arg(long, global = true, env = "CIR_TOXSCAN_TIMEOUT")]
    timeout: Option<u64>,

    /// Catalog pages to load, comma separated.
    #[arg(
        long,
        global = true,
        env = "CIR_TOXSCAN_PAGES",
        value_delimiter = ',',
        default_value = "1,2"
    )]
    pages: Vec<u32>,

    /// Debug logging.
    #[arg(short, long, global = true, env = "CIR_TOXSCAN_VERBOSE")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true, env = "CIR_TOXSCAN_QUIET")]
    quiet: bool,

    /// Disable spinners and progress bars.
    #[arg(long, global = true, env = "CIR_TOXSCAN_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List ingredient names from the catalog.
    List {
        /// Only names containing this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the report PDF URL for an ingredient.
    Link {
        /// Ingredient display name, exactly as listed.
        name: String,
    },
    /// Scan a report for NOAEL and LD50 values.
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    #[command(flatten)]
    source: Source,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Source {
    /// Ingredient display name; resolved through the catalog.
    #[arg(long)]
    ingredient: Option<String>,
    /// Report PDF URL.
    #[arg(long)]
    url: Option<String>,
    /// Local report PDF.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar prints page warnings itself, so library logs are
    // kept to errors while it is active.
    let machine_output = matches!(
        &cli.command,
        Command::Scan(a) if a.format != Format::Text && a.output.is_none()
    );
    let show_progress = !cli.quiet && !cli.no_progress && !machine_output;
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

    let progress_cb: Option<ProgressCallback> = match &cli.command {
        Command::Scan(_) if show_progress => {
            Some(CliProgressCallback::new() as Arc<dyn ScanProgressCallback>)
        }
        _ => None,
    };
    let config = build_config(&cli, progress_cb)?;
    let client = ReportClient::new(config).context("Failed to create HTTP client")?;

    match &cli.command {
        Command::List { filter } => run_list(&client, filter.as_deref(), show_progress).await,
        Command::Link { name } => run_link(&client, name, show_progress).await,
        Command::Scan(args) => run_scan(&client, args, &cli).await,
    }
}

fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ScanConfig> {
    let mut builder = ScanConfig::builder()
        .base_url(&cli.base_url)
        .catalog_pages(cli.pages.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

async fn load_catalog(
    client: &ReportClient,
    show_progress: bool,
) -> Result<Arc<cir_toxscan::Catalog>> {
    let bar = show_progress.then(|| spinner("Catalog", "Loading ingredient list…"));
    let catalog = client.load_catalog().await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    catalog.context("Failed to load ingredient catalog")
}

async fn run_list(client: &ReportClient, filter: Option<&str>, show_progress: bool) -> Result<()> {
    let catalog = load_catalog(client, show_progress).await?;
    let names = match filter {
        Some(q) => catalog.search(q),
        None => catalog.names(),
    };
    for name in &names {
        println!("{name}");
    }
    eprintln!("{}", dim(&format!("{} ingredients", names.len())));
    Ok(())
}

async fn run_link(client: &ReportClient, name: &str, show_progress: bool) -> Result<()> {
    load_catalog(client, show_progress).await?;
    let ingredient = match client.find_ingredient(name).await {
        Ok(i) => i,
        Err(ToxScanError::IngredientNotFound { name }) => {
            eprintln!("{} Ingredient not found: {}", yellow("⚠"), bold(&name));
            return Ok(());
        }
        Err(e) => return Err(e).context("Catalog lookup failed"),
    };
    let url = client
        .resolve_report_link(&ingredient.ingredient_id)
        .await
        .context("Failed to resolve report link")?;
    println!("{url}");
    Ok(())
}

async fn run_scan(client: &ReportClient, args: &ScanArgs, cli: &Cli) -> Result<()> {
    let source = &args.source;

    // ── Resolve source and scan ──────────────────────────────────────────
    let (title, scanned) = if let Some(name) = &source.ingredient {
        let report = match client.scan_ingredient(name).await {
            Ok(r) => r,
            Err(ToxScanError::IngredientNotFound { name }) => {
                eprintln!("{} Ingredient not found: {}", yellow("⚠"), bold(&name));
                return Ok(());
            }
            Err(e) => return Err(e).context("Scan failed"),
        };
        if !cli.quiet {
            eprintln!("{} {}  →  {}", cyan("◆"), bold(name), report.pdf_url);
        }
        (name.clone(), Scanned::Ingredient(report))
    } else if let Some(url) = &source.url {
        let output = client.scan_report(url).await.context("Scan failed")?;
        (url.clone(), Scanned::Document(output))
    } else if let Some(path) = &source.file {
        let output = scan_file(path, client.config())
            .await
            .context("Scan failed")?;
        (path.display().to_string(), Scanned::Document(output))
    } else {
        anyhow::bail!("one of --ingredient, --url or --file is required");
    };
    let output = scanned.output();

    // ── Render ───────────────────────────────────────────────────────────
    let rendered = match args.format {
        Format::Json => {
            let json = match &scanned {
                Scanned::Ingredient(report) => serde_json::to_string_pretty(report),
                Scanned::Document(output) => serde_json::to_string_pretty(output),
            };
            json.context("Failed to serialise output")? + "\n"
        }
        Format::Html => output.to_html_document(&title),
        Format::Text => render_text(output, args.output.is_none()),
    };

    match &args.output {
        Some(path) => {
            write_report(path, &rendered)
                .await
                .context("Failed to write output")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} NOAEL, {} LD50  {}ms  →  {}",
                    green("✔"),
                    output.stats.noael_matches,
                    output.stats.ld50_matches,
                    output.stats.duration_ms,
                    bold(&path.display().to_string()),
                );
            }
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// What a scan produced: the full lookup record, or just the scan of a
/// document given directly.
enum Scanned {
    Ingredient(IngredientReport),
    Document(ScanOutput),
}

impl Scanned {
    fn output(&self) -> &ScanOutput {
        match self {
            Scanned::Ingredient(report) => &report.output,
            Scanned::Document(output) => output,
        }
    }
}

/// Plain-text listing of both match kinds. With `color`, highlight markup
/// becomes ANSI; without it, the markup is dropped.
fn render_text(output: &ScanOutput, color: bool) -> String {
    if output.matches.is_empty() {
        return format!("{NO_MATCHES_MESSAGE}\n");
    }
    let mut out = String::new();
    for kind in ValueKind::ALL {
        let matches = output.matches.get(kind);
        if matches.is_empty() {
            continue;
        }
        let heading = format!("{kind} values found ({}):", matches.len());
        out.push_str(&if color { bold(&heading) } else { heading });
        out.push('\n');
        for m in matches {
            let snippet = render_markup(&m.snippet, color);
            let mut lines = snippet.split('\n');
            let label = format!("p.{:<4}", m.page_num);
            out.push_str(&format!(
                "  {}  {}\n",
                if color { dim(&label) } else { label },
                lines.next().unwrap_or_default()
            ));
            for line in lines {
                out.push_str(&format!("  {:<6}  {}\n", "", line));
            }
        }
        out.push('\n');
    }
    out
}

fn render_markup(snippet: &str, color: bool) -> String {
    let (num_on, kw_on, off) = if color {
        ("\x1b[1;31m", "\x1b[30;43m", "\x1b[0m")
    } else {
        ("", "", "")
    };
    snippet
        .replace(NUMBER_OPEN, num_on)
        .replace(NUMBER_CLOSE, off)
        .replace(KEYWORD_OPEN, kw_on)
        .replace(KEYWORD_CLOSE, off)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use cir_toxscan::{highlight, Match, MatchSet};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn progress_bar_appears_only_for_extraction() {
        let cb = CliProgressCallback::new();
        assert!(cb.bar.is_hidden());
        assert_eq!(cb.bar.length(), None);
        // A failed lookup or download drops the callback here; nothing to clear.

        cb.on_extraction_start(3);
        assert_eq!(cb.bar.length(), Some(3));
        cb.on_page_extracted(1, 10);
        cb.on_page_warning(&PageError::EmptyPage { page: 2 });
        cb.on_page_extracted(3, 10);
        assert_eq!(cb.bar.position(), 3);

        cb.on_extraction_complete(3, 2);
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn scan_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["cir-toxscan", "scan"]).is_err());
        assert!(
            Cli::try_parse_from(["cir-toxscan", "scan", "--file", "a.pdf", "--url", "http://x"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["cir-toxscan", "scan", "--file", "a.pdf", "--pages", "1,3"])
            .unwrap();
        assert_eq!(cli.pages, vec![1, 3]);
    }

    #[test]
    fn plain_rendering_strips_markup() {
        assert_eq!(
            render_markup(&highlight("LD50 2,000 mg/kg"), false),
            "LD50 2,000 mg/kg"
        );
        let colored = render_markup(&highlight("LD50"), true);
        assert_eq!(colored, "\x1b[30;43mLD50\x1b[0m");
    }

    #[test]
    fn text_output_lists_matches_by_page() {
        let output = ScanOutput {
            matches: MatchSet {
                noael: vec![Match {
                    snippet: highlight("Oral study\nNOAEL 50 mg/kg"),
                    page_num: 7,
                }],
                ld50: vec![],
            },
            ..Default::default()
        };
        let text = render_text(&output, false);
        assert!(text.starts_with("NOAEL values found (1):\n"));
        assert!(text.contains("p.7     Oral study\n"));
        assert!(text.contains("NOAEL 50 mg/kg\n"));
        assert!(!text.contains("LD50 values"));
        assert_eq!(render_text(&ScanOutput::default(), false), format!("{NO_MATCHES_MESSAGE}\n"));
    }
}
