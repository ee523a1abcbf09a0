use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::BufReader;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};
use weblogs_cdn_logs::{Decompressor, ErrorPolicy, build_payload};

#[derive(Debug, clap::Parser)]
struct Options {
    /// The path to the CDN log file to convert
    path: PathBuf,

    /// Skip malformed lines instead of failing
    #[arg(long)]
    collect_errors: bool,

    /// Print the bulk request body instead of a summary
    #[arg(long)]
    print_payload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let options = Options::parse();

    let file = File::open(&options.path)
        .await
        .with_context(|| format!("Failed to open {}", options.path.display()))?;

    let reader = BufReader::new(file);

    let policy = match options.collect_errors {
        true => ErrorPolicy::Collect,
        false => ErrorPolicy::Abort,
    };

    let extension = options
        .path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let summary = match extension {
        "gz" | "zst" => {
            let decompressor = Decompressor::from_extension(reader, Some(extension))?;
            let reader = BufReader::new(decompressor);
            build_payload(reader, policy).await?
        }
        _ => build_payload(reader, policy).await?,
    };

    if options.print_payload {
        print!("{}", summary.payload.as_str());
        return Ok(());
    }

    println!("Number of records: {}", summary.payload.len());
    println!("Number of header lines: {}", summary.skipped_headers);
    println!("Target indices: {:?}", summary.payload.indices());

    for error in &summary.row_errors {
        println!("Skipped line {}: {}", error.line, error.reason);
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    fmt().compact().with_env_filter(env_filter).init();
}
