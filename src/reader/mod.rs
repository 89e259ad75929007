//! Graph readers for the supported corpus formats.
//!
//! Every format supplies a [`SentenceParser`] that turns the next sentence of
//! its source into graphs. [`BufferedReader`] wraps a parser and keeps one
//! sentence of lookahead, which gives all formats the same [`GraphReader`]
//! behaviour.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GraphFormatError, Result};
use crate::grammar::{EdgeFormat, RelationGrammar};
use crate::graph::Graph;

pub mod cnc;
pub mod parseval;
pub mod rasp;
pub mod rasp_xml;
pub mod resolver;
pub mod tsv;

#[cfg(test)]
mod tests;

pub use cnc::{CncGraphReader, CncParser};
pub use parseval::{ParsevalGraphReader, ParsevalParser};
pub use rasp::{RaspGraphReader, RaspParser};
pub use rasp_xml::{RaspXmlGraphReader, RaspXmlParser};
pub use resolver::NodeResolver;
pub use tsv::{TsvGraphReader, TsvParser};

/// Pull interface shared by all graph readers.
pub trait GraphReader {
    /// Whether `next_graph` or `next_sentence` has something to return.
    fn has_next(&self) -> bool;

    /// The next graph, or `None` at the end of the corpus.
    fn next_graph(&mut self) -> Result<Option<Graph>>;

    /// The graphs of the next sentence, or `None` at the end of the corpus.
    fn next_sentence(&mut self) -> Result<Option<Vec<Graph>>>;

    /// Start again from the beginning of the corpus.
    fn reset(&mut self) -> Result<()>;

    /// Release the source. Later reads return `None` until `reset()`.
    fn close(&mut self);
}

/// Format-specific half of a reader: parses one sentence at a time.
pub trait SentenceParser {
    /// Parse the next sentence into its graphs, best parse first.
    ///
    /// `Ok(None)` means the source is exhausted. An empty list is a sentence
    /// without parses.
    fn parse_sentence(&mut self) -> Result<Option<Vec<Graph>>>;

    /// Rewind the source to its first sentence.
    fn rewind(&mut self) -> Result<()>;

    /// Release the source.
    fn release(&mut self);
}

/// One-sentence lookahead over a [`SentenceParser`].
///
/// A format error raised while reading ahead does not hide the graphs already
/// buffered. It is returned by the call that would have consumed the failed
/// sentence; from then on the reader reports [`GraphFormatError::Poisoned`]
/// until it is reset.
pub struct BufferedReader<P> {
    parser: P,
    all_parses: bool,
    buffer: VecDeque<Graph>,
    deferred: Option<GraphFormatError>,
    poisoned: bool,
}

impl<P: SentenceParser> BufferedReader<P> {
    /// Wrap `parser` and read the first sentence ahead.
    pub fn new(parser: P, all_parses: bool) -> Self {
        let mut reader = Self {
            parser,
            all_parses,
            buffer: VecDeque::new(),
            deferred: None,
            poisoned: false,
        };
        reader.read_ahead();
        reader
    }

    pub fn all_parses(&self) -> bool {
        self.all_parses
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    fn read_ahead(&mut self) {
        match self.parser.parse_sentence() {
            Ok(Some(mut graphs)) => {
                if graphs.is_empty() {
                    graphs.push(Graph::new());
                }
                if !self.all_parses {
                    graphs.truncate(1);
                }
                self.buffer = graphs.into();
            }
            Ok(None) => {}
            Err(e) => {
                log::debug!("Deferring format error found while reading ahead: {}", e);
                self.deferred = Some(e);
            }
        }
    }

    fn take_deferred(&mut self) -> Result<()> {
        if self.poisoned {
            return Err(GraphFormatError::Poisoned);
        }
        if let Some(e) = self.deferred.take() {
            self.poisoned = true;
            return Err(e);
        }
        Ok(())
    }
}

impl<P: SentenceParser> GraphReader for BufferedReader<P> {
    fn has_next(&self) -> bool {
        !self.poisoned && (!self.buffer.is_empty() || self.deferred.is_some())
    }

    fn next_graph(&mut self) -> Result<Option<Graph>> {
        if let Some(graph) = self.buffer.pop_front() {
            if self.buffer.is_empty() {
                self.read_ahead();
            }
            return Ok(Some(graph));
        }
        self.take_deferred()?;
        Ok(None)
    }

    fn next_sentence(&mut self) -> Result<Option<Vec<Graph>>> {
        if !self.buffer.is_empty() {
            let graphs: Vec<Graph> = self.buffer.drain(..).collect();
            self.read_ahead();
            return Ok(Some(graphs));
        }
        self.take_deferred()?;
        Ok(None)
    }

    fn reset(&mut self) -> Result<()> {
        log::debug!("Resetting graph reader");
        self.buffer.clear();
        self.deferred = None;
        self.poisoned = false;
        self.parser.rewind()?;
        self.read_ahead();
        Ok(())
    }

    fn close(&mut self) {
        self.parser.release();
        self.buffer.clear();
        self.deferred = None;
        self.poisoned = false;
    }
}

impl<P: SentenceParser> Iterator for BufferedReader<P> {
    type Item = Result<Graph>;

    /// Stops after yielding the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        self.next_graph().transpose()
    }
}

/// How the XML reader turns lemma readings into nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodePolicy {
    /// One node per surface token: the reading used by a relation, else the first.
    #[default]
    Tokens,
    /// One node per declared lemma reading.
    AllLemmas,
}

/// Reader settings, loadable from YAML.
///
/// ```yaml
/// all_parses: false
/// node_policy: all_lemmas
/// read_metadata: true
/// edge_format: simple
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Return every parse of a sentence, or only the first.
    pub all_parses: bool,
    pub node_policy: NodePolicy,
    /// Attach sentence ids and weighted relations as graph metadata (XML).
    pub read_metadata: bool,
    pub edge_format: EdgeFormat,
    pub grammar: RelationGrammar,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            all_parses: true,
            node_policy: NodePolicy::default(),
            read_metadata: false,
            edge_format: EdgeFormat::default(),
            grammar: RelationGrammar::default(),
        }
    }
}

impl ReaderOptions {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GraphFormatError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml_str)
            .map_err(|e| GraphFormatError::Config(e.to_string()))?;
        options.grammar.validate()?;
        Ok(options)
    }

    pub fn with_all_parses(mut self, all_parses: bool) -> Self {
        self.all_parses = all_parses;
        self
    }

    pub fn with_node_policy(mut self, node_policy: NodePolicy) -> Self {
        self.node_policy = node_policy;
        self
    }

    pub fn with_read_metadata(mut self, read_metadata: bool) -> Self {
        self.read_metadata = read_metadata;
        self
    }

    pub fn with_edge_format(mut self, edge_format: EdgeFormat) -> Self {
        self.edge_format = edge_format;
        self
    }
}

/// The closed set of readable formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderType {
    Rasp,
    RaspXml,
    Cnc,
    Parseval,
    Tsv,
}

impl ReaderType {
    pub const ALL: [ReaderType; 5] = [
        ReaderType::Rasp,
        ReaderType::RaspXml,
        ReaderType::Cnc,
        ReaderType::Parseval,
        ReaderType::Tsv,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReaderType::Rasp => "rasp",
            ReaderType::RaspXml => "raspxml",
            ReaderType::Cnc => "cnc",
            ReaderType::Parseval => "parseval",
            ReaderType::Tsv => "tsv",
        }
    }

    /// Case-insensitive lookup by format label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|reader_type| reader_type.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for ReaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReaderType {
    type Err = GraphFormatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|t| t.label()).collect();
            GraphFormatError::Config(format!(
                "unknown reader type '{}', expected one of: {}",
                s,
                known.join(", ")
            ))
        })
    }
}

/// Open a reader of the given format over a file or directory.
pub fn make_reader<P: AsRef<Path>>(
    reader_type: ReaderType,
    input: P,
    options: &ReaderOptions,
) -> Result<Box<dyn GraphReader>> {
    let input = input.as_ref();
    log::info!("Opening {} reader on {}", reader_type, input.display());
    let reader: Box<dyn GraphReader> = match reader_type {
        ReaderType::Rasp => Box::new(RaspGraphReader::open(input, options)?),
        ReaderType::RaspXml => Box::new(RaspXmlGraphReader::open(input, options)?),
        ReaderType::Cnc => Box::new(CncGraphReader::open(input, options)?),
        ReaderType::Parseval => Box::new(ParsevalGraphReader::open(input, options)?),
        ReaderType::Tsv => Box::new(TsvGraphReader::open(input, options)?),
    };
    Ok(reader)
}
