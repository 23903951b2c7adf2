//! getwebsite - read any web page in the terminal.
//!
//! # Usage
//!
//! ```bash
//! getwebsite example.com/article
//! getwebsite example.com/article --pipe --width 72
//! getwebsite example.com/article --export article.md
//! ```

use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use getwebsite::app::App;
use getwebsite::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use getwebsite::fetch::{Fetcher, HttpFetcher, normalize_url};
use getwebsite::highlight::{HighlightBackground, SyntectHighlighter, set_background_mode};
use getwebsite::image::{
    EnvCapabilities, FixedCapabilities, HttpRasterizer, ImageRasterizer, NoImages,
    TerminalCapabilities,
};
use getwebsite::layout::{LayoutEngine, MAX_WIDTH};
use getwebsite::{export, extract, perf};

/// Read any web page in the terminal as a clean, navigable document
#[derive(Parser, Debug)]
#[command(name = "getwebsite", version, about, long_about = None)]
struct Cli {
    /// Page to read; https:// is assumed when no scheme is given
    #[arg(value_name = "URL")]
    url: String,

    /// Print the rendered page to stdout instead of opening the reader
    #[arg(short, long)]
    pipe: bool,

    /// Maximum layout width in columns (capped at 90)
    #[arg(short, long, value_name = "N")]
    width: Option<usize>,

    /// Write the page as markdown to FILE
    #[arg(short, long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Show image placeholders only
    #[arg(long)]
    no_images: bool,

    /// Force syntax highlight theme background (light or dark)
    #[arg(long, value_enum, default_value = "auto")]
    theme: ThemeMode,

    /// Log timing of fetch, extraction and layout
    #[arg(long)]
    perf: bool,

    /// Write logs to a file while the reader owns the terminal
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn env_filter(perf_enabled: bool) -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if perf_enabled {
        filter = filter.add_directive("perf=info".parse()?);
    }
    Ok(filter)
}

/// Pipe mode logs to stderr. The reader logs to `debug_log`, or nowhere.
fn init_logging(interactive: bool, debug_log: Option<&Path>, perf_enabled: bool) -> Result<()> {
    let filter = env_filter(perf_enabled)?;
    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }
    if let Some(path) = debug_log {
        let file = File::create(path)
            .with_context(|| format!("Failed to open debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn effective_flags(cli: &Cli, raw_args: &[String]) -> Result<ConfigFlags> {
    let global_path = global_config_path();
    let cli_flags = parse_flag_tokens(raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_override_path())?;
        global_flags.union(&local_flags)
    };
    Ok(file_flags.union(&cli_flags))
}

fn build_engine(images: bool, capabilities: Box<dyn TerminalCapabilities>) -> Result<LayoutEngine> {
    let rasterizer: Box<dyn ImageRasterizer> = if images {
        Box::new(HttpRasterizer::new().context("Failed to build image client")?)
    } else {
        Box::new(NoImages)
    };
    Ok(LayoutEngine::new(
        Box::new(SyntectHighlighter),
        rasterizer,
        capabilities,
    ))
}

/// Fetch once, then export and/or print the layout.
///
/// With an export path the layout is printed only when `print_layout` is set.
fn run_batch(
    url: &str,
    export_path: Option<&Path>,
    print_layout: bool,
    width: usize,
    flags: &ConfigFlags,
) -> Result<()> {
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    eprintln!("Fetching {url}...");
    let bytes = fetcher.fetch(url)?;
    let document = extract::extract(&bytes, url);

    if let Some(path) = export_path {
        std::fs::write(path, export::to_markdown(&document))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Exported to {}", path.display());
        if !print_layout {
            return Ok(());
        }
    }

    let styled = std::io::stdout().is_terminal();
    let capabilities: Box<dyn TerminalCapabilities> = if styled {
        Box::new(EnvCapabilities)
    } else {
        Box::new(FixedCapabilities(false))
    };
    let engine = build_engine(!flags.no_images, capabilities)?;
    let layout = engine.render(&document, width);
    let text = if styled {
        layout.to_ansi(true)
    } else {
        layout.to_plain()
    };

    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// How a run is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Interactive,
    /// Fetch once; `print_layout` is false only for an export to a terminal.
    Batch { print_layout: bool },
}

/// Pipe mode is on with `--pipe` or whenever stdout is not a terminal.
const fn run_mode(pipe_flag: bool, exporting: bool, stdout_is_terminal: bool) -> RunMode {
    let pipe = pipe_flag || !stdout_is_terminal;
    if pipe || exporting {
        RunMode::Batch { print_layout: pipe }
    } else {
        RunMode::Interactive
    }
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let effective = effective_flags(&cli, &raw_args)?;

    let mode = run_mode(
        cli.pipe,
        cli.export.is_some(),
        std::io::stdout().is_terminal(),
    );
    let interactive = mode == RunMode::Interactive;
    init_logging(interactive, effective.debug_log.as_deref(), effective.perf)?;
    perf::set_enabled(effective.perf);

    match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => set_background_mode(None),
        ThemeMode::Light => set_background_mode(Some(HighlightBackground::Light)),
        ThemeMode::Dark => set_background_mode(Some(HighlightBackground::Dark)),
    }

    let url = normalize_url(&cli.url);
    let width = effective.width.map_or(MAX_WIDTH, |w| w.min(MAX_WIDTH));

    if let RunMode::Batch { print_layout } = mode {
        return run_batch(&url, cli.export.as_deref(), print_layout, width, &effective);
    }

    // The ratatui buffer cannot carry inline image escapes.
    let engine = build_engine(!effective.no_images, Box::new(FixedCapabilities(false)))?;
    let mut app = App::new(url).with_engine(engine).with_max_width(width);
    app.run().context("Application error")
}
