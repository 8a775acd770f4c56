//! `certgen` - print name certificates for competitors from a registration export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;

use certificate::participants::{read_csv_file, select_names};
use certificate::{generate, BatchReport, CertificateConfig, Eligibility};

#[derive(Parser)]
#[command(version, about = "Create personalized certificates for newcomers")]
struct Cli {
    /// Registration export (CSV with a header row)
    registrations: PathBuf,

    /// Also include competitors whose id was issued in --year
    #[arg(short, long)]
    all: bool,

    /// Year used by --all [default: current year]
    #[arg(long, value_name = "YEAR")]
    year: Option<i32>,

    /// Leave out the parenthesized alternate-script part of names
    #[arg(long)]
    ascii_only: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Template PDF (overrides the configuration)
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Default font file (overrides the configuration)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Directory of fallback fonts (overrides the configuration)
    #[arg(long, value_name = "DIR")]
    fallback_dir: Option<PathBuf>,

    /// Directory the PDF is written to (overrides the configuration)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Event identifier; output is named `<ID>-certificates.pdf`
    #[arg(long)]
    id: Option<String>,

    /// Log per-name layout details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied
    fn load_config(&self) -> Result<CertificateConfig> {
        let mut config = match &self.config {
            Some(path) => CertificateConfig::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => CertificateConfig::default(),
        };

        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(font) = &self.font {
            config.fonts.default = font.clone();
        }
        if let Some(dir) = &self.fallback_dir {
            config.fonts.fallback_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(id) = &self.id {
            config.output.id = Some(id.clone());
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn eligibility(&self) -> Eligibility {
        if self.all {
            Eligibility::with_year(self.year.unwrap_or_else(|| chrono::Local::now().year()))
        } else {
            Eligibility::newcomers()
        }
    }
}

/// Summary line for names the default font cannot draw, if any
fn missing_glyph_hint(report: &BatchReport, default_font: &Path) -> Option<String> {
    let names: Vec<&str> = report.missing_glyphs().map(|s| s.name.as_str()).collect();
    if names.is_empty() {
        return None;
    }
    Some(format!(
        "{} name(s) use characters missing from the default font {}: {}. \
         Put the other-script part in parentheses or choose another default font",
        names.len(),
        default_font.display(),
        names.join(", ")
    ))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.load_config()?;

    let registrations = read_csv_file(&cli.registrations)
        .with_context(|| format!("reading registrations {}", cli.registrations.display()))?;
    let names = select_names(&registrations, cli.eligibility());
    log::info!("{} eligible competitors", names.len());

    let report = generate(&config, &names, cli.ascii_only).context("generating certificates")?;

    for skipped in &report.skipped {
        log::warn!("No certificate for {:?}: {}", skipped.name, skipped.reason);
    }
    if let Some(hint) = missing_glyph_hint(&report, &config.fonts.default) {
        log::warn!("{hint}");
    }
    log::info!(
        "Done: {} written, {} skipped",
        report.written,
        report.skipped.len()
    );

    Ok(())
}
