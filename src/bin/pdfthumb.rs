//! `pdfthumb` — render the first page of a PDF to a PNG file.
//!
//! ```text
//! pdfthumb resume.pdf                     # writes resume.png
//! pdfthumb resume.pdf -o thumb.png --density 2
//! pdfthumb report.pdf --page 3 --json
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use pdfthumb::{convert, thumbnail_name, ConversionConfig, ConversionResult, SourceFile};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pdfthumb",
    version,
    about = "Render the first page of a PDF into a PNG thumbnail"
)]
struct Cli {
    /// Path to the input PDF.
    input: PathBuf,

    /// Output PNG path. Defaults to the input filename with its extension
    /// replaced by `.png`, in the current directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output-density multiplier (2.0 for HiDPI/"retina" targets).
    #[arg(long, default_value_t = 1.0)]
    density: f32,

    /// Page to render, 1-indexed.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Password for encrypted documents.
    #[arg(long)]
    password: Option<String>,

    /// Print a JSON summary instead of human-readable output.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = SourceFile::from_path(&cli.input)
        .with_context(|| format!("Cannot read {}", cli.input.display()))?;

    let mut builder = ConversionConfig::builder()
        .density(cli.density)
        .page(cli.page);
    if let Some(pwd) = &cli.password {
        builder = builder.password(pwd.clone());
    }
    let config = builder.build()?;

    let out_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(thumbnail_name(&file.name)));

    match convert(file, &config).await {
        ConversionResult::Converted { reference, file } => {
            tokio::fs::write(&out_path, file.bytes())
                .await
                .with_context(|| format!("Cannot write {}", out_path.display()))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "input": cli.input,
                        "output": out_path,
                        "name": file.name,
                        "mime": file.mime(),
                        "bytes": file.bytes().len(),
                        "reference": reference.url(),
                    })
                );
            } else {
                println!("{} ({} bytes)", out_path.display(), file.bytes().len());
            }

            // The process is the only consumer; free the blob before exit.
            reference.revoke();
            Ok(())
        }
        ConversionResult::Failed { error } => {
            bail!("{error}");
        }
    }
}
