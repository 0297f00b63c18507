//! Command-line interface for mdscan.

use clap::Parser;
use std::path::PathBuf;

/// mdscan - scan Markdown into positioned marks and render it to HTML.
#[derive(Parser, Debug)]
#[command(
    name = "mdscan",
    author = "mdscan Contributors",
    version,
    about = "A recursive-descent Markdown scanner with an HTML renderer",
    after_help = "Repository: https://github.com/mdscan/mdscan\n\n\
                  Examples:\n  \
                  cat README.md | mdscan\n  \
                  mdscan document.md > document.html\n  \
                  mdscan --marks notes.md\n  \
                  mdscan -c '[features]\\nTables = false' input.md"
)]
pub struct Cli {
    /// Input files to process (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "loglevel", default_value = "warn")]
    pub log_level: String,

    /// Use a custom config file or inline TOML
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Print the mark list instead of HTML
    #[arg(long = "marks")]
    pub marks: bool,

    /// Print the reference table instead of HTML
    #[arg(long = "references")]
    pub references: bool,

    /// Treat every newline inside a paragraph as a line break
    #[arg(long = "hard-breaks")]
    pub hard_breaks: bool,

    /// Do not recognize pipe tables
    #[arg(long = "no-tables")]
    pub no_tables: bool,

    /// Write void elements XHTML-style (`<br />`)
    #[arg(long = "xhtml")]
    pub xhtml: bool,

    /// Show configuration paths and exit
    #[arg(long = "paths")]
    pub show_paths: bool,

    /// Write the default config file if there is none, print its path and exit
    #[arg(long = "init-config")]
    pub init_config: bool,
}

impl Cli {
    /// Check if we should read from stdin.
    pub fn should_read_stdin(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether HTML output was replaced by a dump.
    pub fn dumps(&self) -> bool {
        self.marks || self.references
    }
}

/// Show paths information.
pub fn show_paths() {
    use mdscan_config::Config;

    let config_path = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not found)".to_string());

    println!("paths:");
    println!("  config                {}", config_path);
}

/// Create the default config file and print where it lives.
pub fn init_config() -> mdscan_core::Result<()> {
    let path = mdscan_config::Config::ensure_config_file()?;
    println!("{}", path.display());
    Ok(())
}
