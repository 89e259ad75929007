//! C&C parser output: relation lines followed by a `<c>` line declaring the
//! tokens of the sentence.
//!
//! ```text
//! (ncsubj sleep_1 Cats_0 _)
//! <c> Cats|cat|NNS|I-NP|O|N sleep|sleep|VBP|I-VP|O|S[dcl]\NP .|.|.|O|O|.
//! ```
//!
//! Relation arguments end in `_N`, the 0-based position of the token.

use std::path::Path;

use super::{BufferedReader, ReaderOptions, SentenceParser};
use crate::error::{GraphFormatError, Result};
use crate::grammar::{strip_bars, Relation, RelationGrammar};
use crate::graph::{Graph, Node, NodeId};
use crate::source::LineSource;

const COMMENT_PREFIX: &str = "#";
const TOKEN_LINE_TAG: &str = "<c>";
const TOKEN_FIELDS: usize = 6;

pub type CncGraphReader = BufferedReader<CncParser>;

impl BufferedReader<CncParser> {
    pub fn open<P: AsRef<Path>>(input: P, options: &ReaderOptions) -> Result<Self> {
        let parser = CncParser::new(LineSource::open(input, Some("\n"))?, options.grammar.clone());
        Ok(Self::new(parser, options.all_parses))
    }
}

pub struct CncParser {
    lines: LineSource,
    grammar: RelationGrammar,
}

impl CncParser {
    pub fn new(lines: LineSource, grammar: RelationGrammar) -> Self {
        Self { lines, grammar }
    }

    fn build_graph(&self, token_line: &str, relations: &[String]) -> Result<Graph> {
        let mut graph = Graph::new();
        for token in token_line[TOKEN_LINE_TAG.len()..].split_whitespace() {
            let fields: Vec<&str> = token.split('|').collect();
            if fields.len() != TOKEN_FIELDS {
                return Err(GraphFormatError::format(
                    format!("Token must have {} fields", TOKEN_FIELDS),
                    token,
                ));
            }
            graph.add_node(fields[1], fields[2]);
        }

        for line in relations {
            let relation = Relation::parse_positional(line, &self.grammar)?;
            let head = token_node(&graph, &relation.head, line)?;
            let dep = match &relation.dependent {
                Some(token) => token_node(&graph, token, line)?,
                None => graph.alloc_node(Node::nil()),
            };
            graph.add_edge(relation.relation_type, head, dep);
        }
        graph.attach_edge_endpoints();
        Ok(graph)
    }
}

fn is_token_line(line: &str) -> bool {
    line.strip_prefix(TOKEN_LINE_TAG)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// The listed node for an argument such as `sleep_1`.
fn token_node(graph: &Graph, token: &str, line: &str) -> Result<NodeId> {
    let position = strip_bars(token)
        .rsplit_once('_')
        .and_then(|(_, id)| id.parse::<usize>().ok())
        .ok_or_else(|| GraphFormatError::format(format!("No token id in {}", token), line))?;
    graph.node_ids().get(position).copied().ok_or_else(|| {
        GraphFormatError::format(format!("Token id {} out of range", position), line)
    })
}

impl SentenceParser for CncParser {
    fn parse_sentence(&mut self) -> Result<Option<Vec<Graph>>> {
        let mut relations: Vec<String> = Vec::new();
        let mut graph: Option<Graph> = None;

        while let Some(line) = self.lines.next_line()? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if graph.is_some() {
                    break;
                }
                continue;
            }
            if trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }
            if is_token_line(trimmed) {
                graph = Some(self.build_graph(trimmed, &relations)?);
                relations.clear();
            } else {
                relations.push(trimmed.to_string());
            }
        }

        match (graph, relations.first()) {
            (Some(graph), _) => Ok(Some(vec![graph])),
            (None, Some(line)) => Err(GraphFormatError::format(
                "Relations without a <c> token line",
                line.as_str(),
            )),
            (None, None) => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.lines.reset();
        Ok(())
    }

    fn release(&mut self) {
        self.lines.close();
    }
}
