//! mdscan - scan Markdown into positioned marks and render it to HTML.
//!
//! This binary provides the CLI interface to the mdscan libraries, reading
//! documents from files or stdin and writing HTML, the mark list, or the
//! reference table to stdout.

mod cli;

use clap::Parser as ClapParser;
use cli::Cli;
use log::{debug, error, info, warn, LevelFilter};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use mdscan_config::Config;
use mdscan_core::{MdscanError, Result, ScanOptions};
use mdscan_parser::{ScanResult, Scanner};
use mdscan_render::{HtmlRenderer, RenderOptions};

fn main() {
    let cli = <Cli as ClapParser>::parse();

    // Handle --paths flag
    if cli.show_paths {
        cli::show_paths();
        return;
    }

    if cli.init_config {
        if let Err(e) = cli::init_config() {
            eprintln!("mdscan: {}", e);
            std::process::exit(1);
        }
        return;
    }

    setup_logging(&cli.log_level);
    info!("mdscan v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli) {
        error!("{}", e);
        eprintln!("mdscan: {}", e);
        std::process::exit(1);
    }
}

/// Set up logging based on the log level argument.
fn setup_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Main application logic.
fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let scanner = Scanner::with_options(scan_options(cli, &config));
    let renderer = HtmlRenderer::new(render_options(cli, &config));
    debug!("Scan options: {:?}", scanner.options());
    debug!("Render options: {:?}", renderer.options());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.should_read_stdin() {
        info!("Reading from stdin");
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        process(cli, &scanner, &renderer, &source, &mut out)?;
    } else {
        for path in &cli.files {
            info!("Processing file: {}", path.display());
            let source = read_file(path)?;
            process(cli, &scanner, &renderer, &source, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Load the user config, then merge any `--config` override.
///
/// A broken user config is reported and replaced by defaults; a broken
/// override is an error, since it was asked for explicitly.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        Config::default()
    });

    if let Some(ref config_arg) = cli.config {
        config.merge(&Config::parse_override(config_arg)?);
        debug!("Merged config override");
    }

    Ok(config)
}

/// Scanner options from config, with command-line flags on top.
fn scan_options(cli: &Cli, config: &Config) -> ScanOptions {
    let mut options = config.scan_options();
    if cli.hard_breaks {
        options.hard_line_breaks = true;
    }
    if cli.no_tables {
        options.tables = false;
    }
    options
}

fn render_options(cli: &Cli, config: &Config) -> RenderOptions {
    let mut options = RenderOptions::from(&config.render);
    if cli.xhtml {
        options.xhtml = true;
    }
    options
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        MdscanError::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Scan one document and write the requested output.
fn process<W: Write>(
    cli: &Cli,
    scanner: &Scanner,
    renderer: &HtmlRenderer,
    source: &str,
    out: &mut W,
) -> Result<()> {
    let result = scanner.scan(source);
    debug!(
        "{} marks, {} references",
        result.marks.len(),
        result.references.len()
    );

    if cli.dumps() {
        return dump(cli, &result, out);
    }

    renderer.render_to(out, source, &result.marks)?;
    if !source.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Write the mark list and/or reference table, one entry per line.
fn dump<W: Write>(cli: &Cli, result: &ScanResult, out: &mut W) -> Result<()> {
    if cli.marks {
        for mark in result.marks.iter() {
            writeln!(out, "{}", mark)?;
        }
    }
    if cli.references {
        for (label, link) in result.references.iter() {
            match &link.title {
                Some(title) => writeln!(out, "[{}]: {} \"{}\"", label, link.target, title)?,
                None => writeln!(out, "[{}]: {}", label, link.target)?,
            }
        }
    }
    Ok(())
}
