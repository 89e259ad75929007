use anyhow::{anyhow, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

use semgraph::{make_reader, make_writer, GraphFormatError, ReaderOptions, ReaderType, WriterType};

#[derive(Parser, Debug)]
#[command(name = "convert_graphs")]
#[command(about = "Convert a dependency-parse corpus from one format to another")]
#[command(version)]
struct Args {
    /// Input format: rasp, raspxml, cnc, parseval or tsv
    input_type: String,

    /// Input file or directory
    input_path: PathBuf,

    /// Output format: tsv
    output_type: String,

    /// Output file (compressed when it ends in .gz)
    output_path: PathBuf,

    /// Reader options YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<()> {
    let reader_type: ReaderType = args.input_type.parse()?;
    let writer_type: WriterType = args.output_type.parse()?;
    let options = match &args.config {
        Some(path) => ReaderOptions::from_yaml(path)?,
        None => ReaderOptions::default(),
    };

    let mut reader = make_reader(reader_type, &args.input_path, &options)?;
    let mut writer = make_writer(writer_type, &args.output_path)?;

    let mut sentences = 0usize;
    let mut graphs = 0usize;
    while let Some(sentence) = reader.next_sentence()? {
        graphs += sentence.len();
        sentences += 1;
        writer.write_sentence(&sentence)?;
    }
    writer.close()?;
    reader.close();

    info!(
        "Converted {} sentences ({} graphs) from {} to {}",
        sentences,
        graphs,
        args.input_path.display(),
        args.output_path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(&args) {
        error!("Conversion failed: {}", e);
        if let Some(line) = e.downcast_ref::<GraphFormatError>().and_then(|e| e.line()) {
            error!("Offending line: {}", line);
        }
        return Err(anyhow!("could not convert {}", args.input_path.display()));
    }
    Ok(())
}
