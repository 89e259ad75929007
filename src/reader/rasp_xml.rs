//! RASP XML output.
//!
//! A `sentence` holds a `lemma-list` of `lemma` readings (several readings may
//! share one surface token, `wnum`), one `gr-list` per parse, and optionally
//! `weighted`/`ewg-weighted` sections whose `gr` elements carry weights rather
//! than structure. Which of the two a `gr` is depends on its ancestors, so the
//! parser keeps the stack of open elements.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::{BufferedReader, NodePolicy, ReaderOptions, SentenceParser};
use crate::error::{GraphFormatError, Result};
use crate::grammar::RelationGrammar;
use crate::graph::{Graph, Node, NodeId};
use crate::source::{XmlElement, XmlEvent, XmlSource};

const SENTENCE: &str = "sentence";
const LEMMA: &str = "lemma";
const LEMMA_LIST: &str = "lemma-list";
const GR_LIST: &str = "gr-list";
const GR: &str = "gr";
const GR_WEIGHT: &str = "gr-weight";
const WEIGHTED: [&str; 2] = ["weighted", "ewg-weighted"];

/// Head value emitted by a known generator bug.
const BUG_HEAD: &str = ";";
/// Dependent values emitted by known generator bugs.
const BUG_DEPS: [&str; 2] = ["to", "0"];

pub const SENTENCE_ID_KEY: &str = "sentenceId";
pub const WEIGHTED_GRS_KEY: &str = "weightedGrs";

pub type RaspXmlGraphReader = BufferedReader<RaspXmlParser>;

impl BufferedReader<RaspXmlParser> {
    pub fn open<P: AsRef<Path>>(input: P, options: &ReaderOptions) -> Result<Self> {
        let parser = RaspXmlParser::new(
            XmlSource::open(input)?,
            options.node_policy,
            options.read_metadata,
            options.grammar.clone(),
        );
        Ok(Self::new(parser, options.all_parses))
    }
}

#[derive(Debug, Clone)]
struct LemmaReading {
    lemma: String,
    pos: String,
    wnum: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Lemma(usize),
    Ellip,
    Nil,
}

#[derive(Debug)]
struct PendingEdge {
    label: String,
    head: Endpoint,
    dep: Endpoint,
}

/// Per-sentence state, dropped when the sentence closes.
#[derive(Debug, Default)]
struct SentenceState {
    lemmas: BTreeMap<usize, LemmaReading>,
    edges: Vec<PendingEdge>,
    graphs: Vec<Graph>,
    saw_gr_list: bool,
    weight_part: Option<String>,
    weighted_grs: String,
}

pub struct RaspXmlParser {
    events: XmlSource,
    node_policy: NodePolicy,
    read_metadata: bool,
    grammar: RelationGrammar,
    dom_path: Vec<String>,
    sentence_count: usize,
}

impl RaspXmlParser {
    pub fn new(
        events: XmlSource,
        node_policy: NodePolicy,
        read_metadata: bool,
        grammar: RelationGrammar,
    ) -> Self {
        Self {
            events,
            node_policy,
            read_metadata,
            grammar,
            dom_path: Vec::new(),
            sentence_count: 0,
        }
    }

    fn within(&self, name: &str) -> bool {
        self.dom_path.iter().any(|open| open == name)
    }

    fn within_weighted(&self) -> bool {
        WEIGHTED.iter().any(|name| self.within(name))
    }

    fn start_element(&mut self, element: &XmlElement, state: &mut SentenceState) -> Result<()> {
        match element.name.as_str() {
            LEMMA if self.within(LEMMA_LIST) => read_lemma(element, state),
            GR_LIST if !self.within_weighted() => {
                state.edges.clear();
                state.saw_gr_list = true;
                Ok(())
            }
            GR if self.within_weighted() => {
                state.weight_part = weight_part(element, state);
                Ok(())
            }
            GR if self.within(GR_LIST) => {
                if let Some(edge) = self.read_gr(element, state)? {
                    state.edges.push(edge);
                }
                Ok(())
            }
            GR_WEIGHT if self.within_weighted() => {
                if let Some(part) = &state.weight_part {
                    let weight = element.attribute("weight").unwrap_or_default();
                    state.weighted_grs.push_str(&format!("{}\t{}\n", part, weight));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn read_gr(&self, element: &XmlElement, state: &SentenceState) -> Result<Option<PendingEdge>> {
        let label = required(element, "type")?;
        let head = required(element, "head")?;

        let head = if self.grammar.is_ellip(head) {
            Endpoint::Ellip
        } else {
            match positive(head) {
                Some(id) => Endpoint::Lemma(id),
                None if head == BUG_HEAD => {
                    log::warn!("Skipping relation with bug head: {}", describe(element));
                    return Ok(None);
                }
                None => {
                    return Err(GraphFormatError::format(
                        "Head index out of range",
                        describe(element),
                    ))
                }
            }
        };

        let dep = match element.attribute("dep") {
            None => Endpoint::Nil,
            Some(dep) => match positive(dep) {
                Some(id) => Endpoint::Lemma(id),
                None if BUG_DEPS.contains(&dep) => {
                    log::warn!("Skipping relation with bug dependent: {}", describe(element));
                    return Ok(None);
                }
                None => {
                    return Err(GraphFormatError::format(
                        "Dependent index out of range",
                        describe(element),
                    ))
                }
            },
        };

        for endpoint in [head, dep] {
            if let Endpoint::Lemma(id) = endpoint {
                if !state.lemmas.contains_key(&id) {
                    return Err(GraphFormatError::format(
                        format!("Relation refers to unknown lemma {}", id),
                        describe(element),
                    ));
                }
            }
        }

        Ok(Some(PendingEdge {
            label: label.to_string(),
            head,
            dep,
        }))
    }

    /// Build one graph from the lemma readings and the relations of the last
    /// `gr-list`.
    fn build_graph(&self, state: &SentenceState) -> Result<Graph> {
        let mut graph = Graph::new();
        let mut referenced: HashMap<usize, NodeId> = HashMap::new();

        for edge in &state.edges {
            let head = endpoint_node(&mut graph, &mut referenced, state, edge.head);
            let dep = endpoint_node(&mut graph, &mut referenced, state, edge.dep);
            graph.add_edge(edge.label.as_str(), head, dep);
        }

        match self.node_policy {
            NodePolicy::AllLemmas => {
                for (num, reading) in &state.lemmas {
                    match referenced.get(num) {
                        Some(&id) => graph.attach_node(id),
                        None => graph.add_node(reading.lemma.as_str(), reading.pos.as_str()),
                    };
                }
            }
            NodePolicy::Tokens => {
                for token in tokens(&state.lemmas) {
                    let used: Vec<usize> = token
                        .iter()
                        .copied()
                        .filter(|num| referenced.contains_key(num))
                        .collect();
                    match used.as_slice() {
                        [] => {
                            let reading = &state.lemmas[&token[0]];
                            graph.add_node(reading.lemma.as_str(), reading.pos.as_str());
                        }
                        [num] => {
                            graph.attach_node(referenced[num]);
                        }
                        _ => {
                            let labels: Vec<String> = used
                                .iter()
                                .map(|num| reading_label(&state.lemmas[num]))
                                .collect();
                            return Err(GraphFormatError::format(
                                "Two lemmas of one token are referenced",
                                labels.join(" "),
                            ));
                        }
                    }
                }
            }
        }

        graph.attach_edge_endpoints();
        Ok(graph)
    }

    fn finish_sentence(&mut self, mut state: SentenceState) -> Result<Vec<Graph>> {
        self.sentence_count += 1;
        if !state.saw_gr_list {
            let graph = self.build_graph(&state)?;
            state.graphs.push(graph);
        }
        if self.read_metadata {
            let weighted = state.weighted_grs.trim().to_string();
            for graph in &mut state.graphs {
                graph.put_metadata(SENTENCE_ID_KEY, self.sentence_count.to_string());
                graph.put_metadata(WEIGHTED_GRS_KEY, weighted.as_str());
            }
        }
        Ok(state.graphs)
    }
}

impl SentenceParser for RaspXmlParser {
    fn parse_sentence(&mut self) -> Result<Option<Vec<Graph>>> {
        let mut state: Option<SentenceState> = None;

        while let Some(event) = self.events.next_event()? {
            match event {
                XmlEvent::Start(element) => {
                    if element.name == SENTENCE {
                        state = Some(SentenceState::default());
                    } else if let Some(sentence) = state.as_mut() {
                        self.start_element(&element, sentence)?;
                    } else if element.name == GR_LIST && !self.within_weighted() {
                        return Err(GraphFormatError::format(
                            "gr-list found outside a sentence",
                            describe(&element),
                        ));
                    }
                    self.dom_path.push(element.name);
                }
                XmlEvent::End(name) => {
                    self.dom_path.pop();
                    let Some(sentence) = state.as_mut() else {
                        continue;
                    };
                    match name.as_str() {
                        GR_LIST if !self.within_weighted() => {
                            let graph = self.build_graph(sentence)?;
                            sentence.graphs.push(graph);
                        }
                        GR if self.within_weighted() => sentence.weight_part = None,
                        SENTENCE => {
                            if let Some(sentence) = state.take() {
                                return self.finish_sentence(sentence).map(Some);
                            }
                        }
                        _ => {}
                    }
                }
                XmlEvent::Text(_) => {}
            }
        }

        self.dom_path.clear();
        match state {
            Some(sentence) => self.finish_sentence(sentence).map(Some),
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.events.reset();
        self.dom_path.clear();
        self.sentence_count = 0;
        Ok(())
    }

    fn release(&mut self) {
        self.events.close();
        self.dom_path.clear();
    }
}

fn read_lemma(element: &XmlElement, state: &mut SentenceState) -> Result<()> {
    let lemma = required(element, "lem")?;
    let pos = required(element, "pos")?;
    let num = positive(required(element, "num")?).ok_or_else(|| {
        GraphFormatError::format("Lemma number must be a positive integer", describe(element))
    })?;
    let wnum = positive(required(element, "wnum")?).ok_or_else(|| {
        GraphFormatError::format("Word number must be a positive integer", describe(element))
    })?;

    if state.lemmas.contains_key(&num) {
        return Err(GraphFormatError::format("Duplicate lemma number", describe(element)));
    }
    state.lemmas.insert(
        num,
        LemmaReading {
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            wnum,
        },
    );
    Ok(())
}

/// `type\thead\tdep` of an annotation relation, with lemma ids replaced by
/// their labels where known. Relations with bug tokens are skipped.
fn weight_part(element: &XmlElement, state: &SentenceState) -> Option<String> {
    let head = element.attribute("head").unwrap_or_default();
    let dep = element.attribute("dep").unwrap_or_default();
    if head == BUG_HEAD || BUG_DEPS.contains(&dep) {
        log::warn!("Skipping weighted relation with bug token: {}", describe(element));
        return None;
    }
    let label_of = |value: &str| match positive(value).and_then(|id| state.lemmas.get(&id)) {
        Some(reading) => reading_label(reading),
        None => value.to_string(),
    };
    Some(format!(
        "{}\t{}\t{}",
        element.attribute("type").unwrap_or_default(),
        label_of(head),
        label_of(dep),
    ))
}

fn endpoint_node(
    graph: &mut Graph,
    referenced: &mut HashMap<usize, NodeId>,
    state: &SentenceState,
    endpoint: Endpoint,
) -> NodeId {
    match endpoint {
        Endpoint::Ellip => graph.alloc_node(Node::ellip()),
        Endpoint::Nil => graph.alloc_node(Node::nil()),
        Endpoint::Lemma(num) => *referenced.entry(num).or_insert_with(|| {
            let reading = &state.lemmas[&num];
            graph.alloc_node(Node::new(reading.lemma.as_str(), reading.pos.as_str()))
        }),
    }
}

/// Lemma numbers grouped into surface tokens: consecutive readings with the
/// same word number.
fn tokens(lemmas: &BTreeMap<usize, LemmaReading>) -> Vec<Vec<usize>> {
    let mut tokens: Vec<Vec<usize>> = Vec::new();
    let mut last_wnum = None;
    for (&num, reading) in lemmas {
        match tokens.last_mut() {
            Some(token) if last_wnum == Some(reading.wnum) => token.push(num),
            _ => tokens.push(vec![num]),
        }
        last_wnum = Some(reading.wnum);
    }
    tokens
}

fn reading_label(reading: &LemmaReading) -> String {
    format!("{}_{}", reading.lemma, reading.pos)
}

fn required<'a>(element: &'a XmlElement, name: &str) -> Result<&'a str> {
    element.attribute(name).ok_or_else(|| {
        GraphFormatError::format(
            format!("Element {} is missing attribute {}", element.name, name),
            describe(element),
        )
    })
}

fn positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

fn describe(element: &XmlElement) -> String {
    let mut text = format!("<{}", element.name);
    for (key, value) in &element.attributes {
        text.push_str(&format!(" {}=\"{}\"", key, value));
    }
    text.push('>');
    text
}
