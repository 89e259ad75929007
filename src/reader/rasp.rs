//! Plain RASP output: a sentence header followed by `gr-list:` sections of
//! bracketed relations, sentences separated by blank lines.
//!
//! ```text
//! (|Cats:1_NN2| |sleep:2_VV0| |.:3_.|) 1 ; (-8.214)
//! gr-list: 1
//! (|ncsubj| |sleep:2_VV0| |cat+s:1_NN2| _)
//! gr-list: 2
//! (|ncsubj| |sleep:2_VV0| |cat+s:1_NN2| _)
//! (|conj| |ellip| |sleep:2_VV0|)
//! ```

use std::path::Path;

use super::{BufferedReader, ReaderOptions, SentenceParser};
use crate::error::Result;
use crate::grammar::{EdgeFormat, Relation, RelationGrammar};
use crate::graph::{Graph, Node};
use crate::reader::NodeResolver;
use crate::source::LineSource;

const GR_LIST_HEADER: &str = "gr-list: ";

/// Metadata key holding the non-relation lines of the sentence.
pub const TEXT_KEY: &str = "text";

pub type RaspGraphReader = BufferedReader<RaspParser>;

impl BufferedReader<RaspParser> {
    pub fn open<P: AsRef<Path>>(input: P, options: &ReaderOptions) -> Result<Self> {
        let parser = RaspParser::new(
            LineSource::open(input, Some("\n"))?,
            options.edge_format,
            options.grammar.clone(),
        );
        Ok(Self::new(parser, options.all_parses))
    }
}

pub struct RaspParser {
    lines: LineSource,
    edge_format: EdgeFormat,
    grammar: RelationGrammar,
    resolver: NodeResolver,
}

impl RaspParser {
    pub fn new(lines: LineSource, edge_format: EdgeFormat, grammar: RelationGrammar) -> Self {
        Self {
            lines,
            edge_format,
            grammar,
            resolver: NodeResolver::new(),
        }
    }

    fn add_relation(&mut self, graph: &mut Graph, line: &str) -> Result<()> {
        let relation = Relation::parse(line, self.edge_format, &self.grammar)?;
        let head = self
            .resolver
            .resolve_token(graph, &relation.head, &self.grammar)?;
        let dep = match &relation.dependent {
            Some(token) if !self.grammar.is_passive(&relation.relation_type) => {
                self.resolver.resolve_token(graph, token, &self.grammar)?
            }
            _ => graph.alloc_node(Node::nil()),
        };
        graph.add_edge(relation.relation_type, head, dep);
        Ok(())
    }

    fn finish_graph(&mut self, graph: Option<Graph>, graphs: &mut Vec<Graph>) {
        if let Some(mut graph) = graph {
            self.resolver.finish(&mut graph);
            graphs.push(graph);
        }
    }
}

impl SentenceParser for RaspParser {
    fn parse_sentence(&mut self) -> Result<Option<Vec<Graph>>> {
        let mut graphs = Vec::new();
        let mut current: Option<Graph> = None;
        let mut in_gr_list = false;
        let mut text: Vec<String> = Vec::new();
        self.resolver.clear();

        while let Some(line) = self.lines.next_line()? {
            let line = line.trim();
            if line.is_empty() {
                if !text.is_empty() {
                    break;
                }
                continue;
            }

            if line.starts_with('(') {
                if let (true, Some(graph)) = (in_gr_list, current.as_mut()) {
                    self.add_relation(graph, line)?;
                    continue;
                }
            } else {
                in_gr_list = line.starts_with(GR_LIST_HEADER);
                if in_gr_list {
                    log::debug!("Opening {}", line);
                    let previous = current.replace(Graph::new());
                    self.finish_graph(previous, &mut graphs);
                    self.resolver.clear();
                }
            }
            text.push(line.to_string());
        }
        self.finish_graph(current, &mut graphs);

        if graphs.is_empty() && text.is_empty() {
            return Ok(None);
        }
        if graphs.is_empty() {
            graphs.push(Graph::new());
        }
        let text = text.join("\n");
        for graph in &mut graphs {
            graph.put_metadata(TEXT_KEY, text.as_str());
        }
        Ok(Some(graphs))
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
