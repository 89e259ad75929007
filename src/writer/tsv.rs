use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::GraphWriter;
use crate::error::{GraphFormatError, Result};
use crate::graph::Graph;
use crate::reader::tsv::{
    GRAPH_END, GRAPH_START, LEMMAS_END, LEMMAS_START, RELATIONS_END, RELATIONS_START,
    SENTENCE_END, SENTENCE_START,
};
use crate::source::is_gzip;

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(out) => out.write(buf),
            Sink::Gzip(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(out) => out.flush(),
            Sink::Gzip(out) => out.flush(),
        }
    }
}

/// Writes graphs in the tab-separated format read by
/// [`crate::reader::TsvGraphReader`]. Paths ending in `.gz` are compressed.
pub struct TsvGraphWriter {
    out: Option<Sink>,
}

impl TsvGraphWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        let out = if is_gzip(path) {
            Sink::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Sink::Plain(file)
        };
        log::info!("Writing TSV graphs to {}", path.display());
        Ok(Self { out: Some(out) })
    }

    fn sink(&mut self) -> Result<&mut Sink> {
        self.out
            .as_mut()
            .ok_or_else(|| GraphFormatError::Io(io::Error::other("writer is closed")))
    }
}

fn write_graph_block(out: &mut impl Write, graph: &Graph) -> Result<()> {
    // Resolve positions before writing anything for this graph.
    let edges = graph.edge_positions()?;

    writeln!(out, "  {}", GRAPH_START)?;
    writeln!(out, "    {}", LEMMAS_START)?;
    for (position, node) in graph.nodes().enumerate() {
        writeln!(out, "    {}\t{}\t{}", position + 1, node.lemma(), node.pos())?;
    }
    writeln!(out, "    {}", LEMMAS_END)?;
    writeln!(out, "    {}", RELATIONS_START)?;
    for (label, head, dep) in edges {
        writeln!(out, "    {}\t{}\t{}", label, head + 1, dep + 1)?;
    }
    writeln!(out, "    {}", RELATIONS_END)?;
    writeln!(out, "  {}", GRAPH_END)?;
    Ok(())
}

impl GraphWriter for TsvGraphWriter {
    fn write_graph(&mut self, graph: &Graph) -> Result<()> {
        self.write_sentence(std::slice::from_ref(graph))
    }

    fn write_sentence(&mut self, graphs: &[Graph]) -> Result<()> {
        let out = self.sink()?;
        writeln!(out, "{}", SENTENCE_START)?;
        if graphs.is_empty() {
            write_graph_block(out, &Graph::new())?;
        }
        for graph in graphs {
            write_graph_block(out, graph)?;
        }
        writeln!(out, "{}", SENTENCE_END)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.out.take() {
            Some(Sink::Plain(mut out)) => out.flush()?,
            Some(Sink::Gzip(out)) => {
                out.finish()?.flush()?;
            }
            None => {}
        }
        Ok(())
    }
}

impl Drop for TsvGraphWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Failed to close TSV writer: {}", e);
        }
    }
}
