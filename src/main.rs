use anyhow::{Context, Result};
use chartsmith::{
    summarize, validate_and_repair, ChartRenderer, ResultSet, StatementSanitizer, SystemFonts,
};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chartsmith")]
#[command(about = "Turn generated chart JSON and query results into PNG charts", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Repair chart JSON against a result set and render it to PNG
    Render {
        /// File with the generated chart JSON, or '-' for stdin
        #[arg(long, default_value = "-")]
        spec: String,

        /// CSV file with the query result set
        #[arg(long)]
        data: PathBuf,

        /// Directory the PNG artifact is written to
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,

        /// Print the base64 payload instead of the artifact path
        #[arg(long)]
        base64: bool,
    },
    /// Clean one generated SQL statement
    Sanitize {
        /// Raw generated text; read from stdin when omitted
        text: Option<String>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the artifact path or payload.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Render {
            spec,
            data,
            out_dir,
            base64,
        } => run_render(&spec, &data, &out_dir, base64),
        Command::Sanitize { text } => run_sanitize(text),
    }
}

fn run_render(spec_source: &str, data: &PathBuf, out_dir: &PathBuf, base64: bool) -> Result<()> {
    let raw_spec = read_source(spec_source).context("Failed to read chart JSON")?;
    let table = ResultSet::from_csv_path(data)
        .with_context(|| format!("Failed to read {}", data.display()))?;

    let spec = validate_and_repair(&raw_spec, &table);
    let renderer = ChartRenderer::with_resolver(out_dir, &SystemFonts::default())?;
    let rendered = renderer.render(&spec, &table)?;

    if base64 {
        println!("{}", rendered.png_base64);
    } else {
        println!("{}", rendered.path.display());
    }
    eprintln!("{}", summarize(&spec, &table));

    Ok(())
}

fn run_sanitize(text: Option<String>) -> Result<()> {
    let raw = match text {
        Some(text) => text,
        None => read_source("-").context("Failed to read statement text")?,
    };

    let statement = StatementSanitizer::default().sanitize(&raw);
    println!("{statement}");

    Ok(())
}

/// Reads a whole file, or stdin when the source is '-'.
fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read {source}"))
    }
}
