//! Parseval-style GR files: one blank-line separated block per sentence, with
//! free text lines and bracketed relations over `lemma:index_POS` tokens.
//! Lines starting with `%` are comments.

use std::path::Path;

use super::{BufferedReader, NodeResolver, ReaderOptions, SentenceParser};
use crate::error::Result;
use crate::grammar::{Relation, RelationGrammar};
use crate::graph::{Graph, Node};
use crate::source::LineSource;

const COMMENT_PREFIX: &str = "%";

/// Metadata key holding the non-relation lines of the block.
pub const DATA_KEY: &str = "data";

pub type ParsevalGraphReader = BufferedReader<ParsevalParser>;

impl BufferedReader<ParsevalParser> {
    pub fn open<P: AsRef<Path>>(input: P, options: &ReaderOptions) -> Result<Self> {
        let parser =
            ParsevalParser::new(LineSource::open(input, Some("\n"))?, options.grammar.clone());
        Ok(Self::new(parser, options.all_parses))
    }
}

pub struct ParsevalParser {
    lines: LineSource,
    grammar: RelationGrammar,
    resolver: NodeResolver,
}

impl ParsevalParser {
    pub fn new(lines: LineSource, grammar: RelationGrammar) -> Self {
        Self {
            lines,
            grammar,
            resolver: NodeResolver::new(),
        }
    }

    fn add_relation(&mut self, graph: &mut Graph, line: &str) -> Result<()> {
        let relation = Relation::parse_positional(line, &self.grammar)?;
        let head = self
            .resolver
            .resolve_token(graph, &relation.head, &self.grammar)?;
        let dep = match &relation.dependent {
            Some(token) => self.resolver.resolve_token(graph, token, &self.grammar)?,
            None => graph.alloc_node(Node::nil()),
        };
        graph.add_edge(relation.relation_type, head, dep);
        Ok(())
    }
}

impl SentenceParser for ParsevalParser {
    fn parse_sentence(&mut self) -> Result<Option<Vec<Graph>>> {
        let mut graph = Graph::new();
        let mut data: Vec<String> = Vec::new();
        let mut started = false;
        self.resolver.clear();

        while let Some(line) = self.lines.next_line()? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if started {
                    break;
                }
                continue;
            }
            if trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }
            started = true;
            if trimmed.starts_with('(') {
                self.add_relation(&mut graph, trimmed)?;
            } else {
                data.push(trimmed.to_string());
            }
        }

        if !started {
            return Ok(None);
        }
        self.resolver.finish(&mut graph);
        graph.put_metadata(DATA_KEY, data.join("\n").trim());
        Ok(Some(vec![graph]))
    }

    fn rewind(&mut self) -> Result<()> {
        self.lines.reset();
        self.resolver.clear();
        Ok(())
    }

    fn release(&mut self) {
        self.lines.close();
    }
}
