//! Graph writers.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GraphFormatError, Result};
use crate::graph::Graph;

pub mod tsv;

pub use tsv::TsvGraphWriter;

pub trait GraphWriter {
    /// Write one graph as a sentence of its own.
    fn write_graph(&mut self, graph: &Graph) -> Result<()>;

    /// Write the parses of one sentence. An empty slice writes one empty graph.
    fn write_sentence(&mut self, graphs: &[Graph]) -> Result<()>;

    /// Flush and release the output. Later writes fail.
    fn close(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterType {
    Tsv,
}

impl WriterType {
    pub const ALL: [WriterType; 1] = [WriterType::Tsv];

    pub fn label(&self) -> &'static str {
        match self {
            WriterType::Tsv => "tsv",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|writer_type| writer_type.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for WriterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WriterType {
    type Err = GraphFormatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| {
            GraphFormatError::Config(format!("unknown writer type '{}', expected: tsv", s))
        })
    }
}

/// Create a writer of the given format at `output`.
pub fn make_writer<P: AsRef<Path>>(
    writer_type: WriterType,
    output: P,
) -> Result<Box<dyn GraphWriter>> {
    match writer_type {
        WriterType::Tsv => Ok(Box::new(TsvGraphWriter::create(output)?)),
    }
}
