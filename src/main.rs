use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use svg2drawable::{BatchConverter, BatchOptions, ConvertError, convert_file};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "svg2drawable")]
#[command(about = "Convert SVG icons to Android VectorDrawables", long_about = None)]
struct Cli {
    /// SVG file or directory of SVG files (converted in place)
    input: PathBuf,

    /// Icon name to mark as auto-mirrored (repeatable)
    #[arg(long = "rtl", value_name = "NAME")]
    rtl: Vec<String>,

    /// Mark every icon as auto-mirrored
    #[arg(long)]
    mirror_all: bool,

    /// Number of worker threads
    #[arg(short, long, default_value = "4")]
    concurrency: usize,

    /// Skip path length validation
    #[arg(long)]
    no_validate: bool,

    /// Fail when any path is too long for aapt
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let options = BatchOptions {
        concurrency: cli.concurrency,
        validate: !cli.no_validate,
        strict: cli.strict,
        mirror_all: cli.mirror_all,
    };
    let rtl_names: HashSet<String> = cli.rtl.into_iter().collect();

    if cli.input.is_file() {
        let mirrored = options.auto_mirrored(&cli.input, &rtl_names);
        let result = convert_file(&cli.input, mirrored, &options)?;

        if options.strict
            && let Some(issue) = result.issues.into_iter().find(|i| i.exceeds_critical)
        {
            return Err(ConvertError::PathTooLong {
                file: cli.input,
                issue,
            }
            .into());
        }
        info!(output = %result.output.display(), "converted");
        return Ok(());
    }

    let summary = BatchConverter::new(options).convert(&cli.input, &rtl_names)?;
    if summary.failed > 0 {
        eprintln!(
            "{} converted, {} failed",
            summary.converted, summary.failed
        );
        std::process::exit(1);
    }

    Ok(())
}
