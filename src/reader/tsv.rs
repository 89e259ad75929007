//! Tab-separated graph files, as written by [`crate::writer::TsvGraphWriter`].
//!
//! ```text
//! <s>
//!   <g>
//!     <lem>
//!     1	cat	NN2
//!     2	sleep	VV0
//!     </lem>
//!     <gr>
//!     ncsubj	2	1
//!     </gr>
//!   </g>
//! </s>
//! ```
//!
//! Sentinel nodes are written as `[[ellip]]` / `[[null]]`, either in the lemma
//! field of a lemma line or in place of an id in a relation line.

use std::path::Path;

use super::{BufferedReader, ReaderOptions, SentenceParser};
use crate::error::{GraphFormatError, Result};
use crate::graph::{Graph, Node, NodeId, ELLIP_LEMMA, NIL_LEMMA};
use crate::source::LineSource;

pub const SENTENCE_START: &str = "<s>";
pub const SENTENCE_END: &str = "</s>";
pub const GRAPH_START: &str = "<g>";
pub const GRAPH_END: &str = "</g>";
pub const LEMMAS_START: &str = "<lem>";
pub const LEMMAS_END: &str = "</lem>";
pub const RELATIONS_START: &str = "<gr>";
pub const RELATIONS_END: &str = "</gr>";
const EMPTY_SENTENCE: &str = "<s></s>";

pub type TsvGraphReader = BufferedReader<TsvParser>;

impl BufferedReader<TsvParser> {
    pub fn open<P: AsRef<Path>>(input: P, options: &ReaderOptions) -> Result<Self> {
        let parser = TsvParser::new(LineSource::open(input, None)?);
        Ok(Self::new(parser, options.all_parses))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Lemmas,
    Relations,
}

pub struct TsvParser {
    lines: LineSource,
}

impl TsvParser {
    pub fn new(lines: LineSource) -> Self {
        Self { lines }
    }
}

fn sentinel(field: &str) -> Option<Node> {
    match field {
        ELLIP_LEMMA => Some(Node::ellip()),
        NIL_LEMMA => Some(Node::nil()),
        _ => None,
    }
}

/// Split a record line into its three tab-separated fields.
fn record<'a>(line: &'a str, what: &str) -> Result<[&'a str; 3]> {
    let fields: Vec<&str> = line.trim_matches([' ', '\r', '\n']).split('\t').collect();
    match fields.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(GraphFormatError::format(
            format!("{} line must have 3 tab-separated fields", what),
            line,
        )),
    }
}

fn read_lemma(graph: &mut Graph, line: &str) -> Result<()> {
    let [id, lemma, pos] = record(line, "Lemma")?;
    let expected = graph.node_count() + 1;
    if id.trim().parse::<usize>().ok() != Some(expected) {
        return Err(GraphFormatError::format(
            format!("Lemma ID does not match its position {}", expected),
            line,
        ));
    }
    match sentinel(lemma) {
        Some(node) => graph.push_node(node),
        None => graph.add_node(lemma, pos),
    };
    Ok(())
}

fn relation_endpoint(
    graph: &mut Graph,
    field: &str,
    lemma_count: usize,
    line: &str,
) -> Result<NodeId> {
    if let Some(node) = sentinel(field) {
        return Ok(graph.alloc_node(node));
    }
    match field.trim().parse::<usize>() {
        Ok(id) if (1..=lemma_count).contains(&id) => Ok(graph.node_ids()[id - 1]),
        _ => Err(GraphFormatError::format(
            format!("Relation refers to unknown lemma ID {}", field),
            line,
        )),
    }
}

fn read_relation(graph: &mut Graph, lemma_count: usize, line: &str) -> Result<()> {
    let [label, head, dep] = record(line, "Relation")?;
    let head = relation_endpoint(graph, head, lemma_count, line)?;
    let dep = relation_endpoint(graph, dep, lemma_count, line)?;
    graph.add_edge(label, head, dep);
    Ok(())
}

fn close_graph(current: &mut Option<(Graph, usize)>, graphs: &mut Vec<Graph>) {
    if let Some((mut graph, _)) = current.take() {
        graph.attach_edge_endpoints();
        graphs.push(graph);
    }
}

impl SentenceParser for TsvParser {
    fn parse_sentence(&mut self) -> Result<Option<Vec<Graph>>> {
        let mut in_sentence = false;
        let mut graphs: Vec<Graph> = Vec::new();
        // The graph being read and its number of lemma lines.
        let mut current: Option<(Graph, usize)> = None;
        let mut section = Section::None;

        while let Some(line) = self.lines.next_line()? {
            match line.trim() {
                "" => {}
                EMPTY_SENTENCE if !in_sentence => return Ok(Some(vec![Graph::new()])),
                SENTENCE_START => {
                    in_sentence = true;
                }
                SENTENCE_END => {
                    close_graph(&mut current, &mut graphs);
                    if graphs.is_empty() {
                        graphs.push(Graph::new());
                    }
                    return Ok(Some(graphs));
                }
                GRAPH_START => {
                    if !in_sentence {
                        return Err(GraphFormatError::format(
                            "Graph outside a sentence",
                            line.as_str(),
                        ));
                    }
                    close_graph(&mut current, &mut graphs);
                    current = Some((Graph::new(), 0));
                    section = Section::None;
                }
                GRAPH_END => {
                    close_graph(&mut current, &mut graphs);
                    section = Section::None;
                }
                LEMMAS_START => section = Section::Lemmas,
                RELATIONS_START => section = Section::Relations,
                LEMMAS_END | RELATIONS_END => section = Section::None,
                _ => match (section, current.as_mut()) {
                    (Section::Lemmas, Some((graph, lemma_count))) => {
                        read_lemma(graph, &line)?;
                        *lemma_count += 1;
                    }
                    (Section::Relations, Some((graph, lemma_count))) => {
                        read_relation(graph, *lemma_count, &line)?;
                    }
                    _ => return Err(GraphFormatError::format("Unexpected line", line.as_str())),
                },
            }
        }

        close_graph(&mut current, &mut graphs);
        if in_sentence || !graphs.is_empty() {
            log::debug!("Emitting unterminated sentence at end of input");
            return Ok(Some(graphs));
        }
        Ok(None)
    }

    fn rewind(&mut self) -> Result<()> {
        self.lines.reset();
        Ok(())
    }

    fn release(&mut self) {
        self.lines.close();
    }
}
