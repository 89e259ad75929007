use anyhow::{anyhow, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

use semgraph::{make_reader, GraphFormatError, ReaderOptions, ReaderType};

#[derive(Parser, Debug)]
#[command(name = "read_graphs")]
#[command(about = "Print the graphs of a dependency-parse corpus")]
#[command(version)]
struct Args {
    /// Input format: rasp, raspxml, cnc, parseval or tsv
    input_type: String,

    /// Input file or directory
    input_path: PathBuf,

    /// Reader options YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many sentences
    #[arg(short, long)]
    limit: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<()> {
    let reader_type: ReaderType = args.input_type.parse()?;
    let options = match &args.config {
        Some(path) => ReaderOptions::from_yaml(path)?,
        None => ReaderOptions::default(),
    };
    let mut reader = make_reader(reader_type, &args.input_path, &options)?;

    let mut count = 0usize;
    while let Some(sentence) = reader.next_sentence()? {
        count += 1;
        println!("=== Sentence {} ({} parses)", count, sentence.len());
        for (i, graph) in sentence.iter().enumerate() {
            println!("--- Parse {}", i + 1);
            print!("{}", graph);
            if let Some(metadata) = graph.metadata_map() {
                let mut keys: Vec<&String> = metadata.keys().collect();
                keys.sort();
                for key in keys {
                    println!("::: {}: {}", key, metadata[key]);
                }
            }
        }
        if args.limit.is_some_and(|limit| count >= limit) {
            break;
        }
    }
    reader.close();
    info!("Read {} sentences from {}", count, args.input_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(&args) {
        error!("Reading failed: {}", e);
        if let Some(line) = e.downcast_ref::<GraphFormatError>().and_then(|e| e.line()) {
            error!("Offending line: {}", line);
        }
        return Err(anyhow!("could not read {}", args.input_path.display()));
    }
    Ok(())
}
