//! Scenarios over the fixture corpora in `sample_corpora/`, run against every
//! reader.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::*;
use crate::writer::{GraphWriter, TsvGraphWriter};

fn corpus(reader_type: ReaderType) -> PathBuf {
    let file = match reader_type {
        ReaderType::Rasp => "rasp/file1.rasp",
        ReaderType::RaspXml => "raspxml/file1.xml",
        ReaderType::Cnc => "cnc/file1_tok.cnc",
        ReaderType::Parseval => "parseval/file1.parseval",
        ReaderType::Tsv => "tsv/file1.tsv",
    };
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("sample_corpora")
        .join(file)
}

fn open(reader_type: ReaderType, options: &ReaderOptions) -> Box<dyn GraphReader> {
    make_reader(reader_type, corpus(reader_type), options).unwrap()
}

fn read_all(reader: &mut dyn GraphReader) -> Vec<Graph> {
    let mut graphs = Vec::new();
    while let Some(graph) = reader.next_graph().unwrap() {
        graphs.push(graph);
    }
    graphs
}

fn node_counts(graphs: &[Graph]) -> Vec<usize> {
    graphs.iter().map(|g| g.node_count()).collect()
}

fn edge_counts(graphs: &[Graph]) -> Vec<usize> {
    graphs.iter().map(|g| g.edge_count()).collect()
}

#[test]
fn test_fixture_shapes() {
    let options = ReaderOptions::default();
    let expected: [(ReaderType, Vec<usize>, Vec<usize>); 5] = [
        (ReaderType::Rasp, vec![2, 3, 11, 11, 5, 5], vec![1, 2, 10, 10, 4, 4]),
        (ReaderType::RaspXml, vec![3, 4, 12, 12, 6, 6], vec![1, 2, 10, 10, 4, 4]),
        (ReaderType::Cnc, vec![3, 12, 6], vec![1, 10, 4]),
        (ReaderType::Parseval, vec![2, 11, 5], vec![1, 10, 4]),
        (ReaderType::Tsv, vec![3, 4, 12, 12, 6, 6], vec![1, 2, 10, 10, 4, 4]),
    ];
    for (reader_type, nodes, edges) in expected {
        let graphs = read_all(open(reader_type, &options).as_mut());
        assert_eq!(node_counts(&graphs), nodes, "{}", reader_type);
        assert_eq!(edge_counts(&graphs), edges, "{}", reader_type);
    }
}

#[test]
fn test_every_endpoint_is_listed() {
    for reader_type in ReaderType::ALL {
        for graph in read_all(open(reader_type, &ReaderOptions::default()).as_mut()) {
            assert!(graph.check_endpoints().is_ok(), "{}: {}", reader_type, graph);
            for edge in graph.edges() {
                assert!(graph.contains(edge.head()));
                assert!(graph.contains(edge.dep()));
            }
        }
    }
}

#[test]
fn test_second_graph_of_first_parse_mode() {
    let options = ReaderOptions::default().with_all_parses(false);
    let mut reader = open(ReaderType::RaspXml, &options);
    reader.next_graph().unwrap();
    let graph = reader.next_graph().unwrap().unwrap();

    assert_eq!(graph.node_count(), 12);
    assert_eq!(graph.edge_count(), 10);
    let edge = &graph.edges()[0];
    assert_eq!(edge.label(), "ncsubj");
    assert_eq!(graph.head(edge).label(), "be_VBZ");
    assert_eq!(graph.dep(edge).label(), "processing_NN1");
}

#[test]
fn test_all_parses_toggle() {
    for reader_type in [ReaderType::Rasp, ReaderType::RaspXml, ReaderType::Tsv] {
        for (all_parses, size) in [(true, 2), (false, 1)] {
            let options = ReaderOptions::default().with_all_parses(all_parses);
            let mut reader = open(reader_type, &options);
            let mut sizes = Vec::new();
            while let Some(sentence) = reader.next_sentence().unwrap() {
                sizes.push(sentence.len());
            }
            assert_eq!(sizes, vec![size; 3], "{} all_parses={}", reader_type, all_parses);
        }
    }
}

#[test]
fn test_next_sentence_returns_the_rest_of_a_sentence() {
    let mut reader = open(ReaderType::Rasp, &ReaderOptions::default());
    let first = reader.next_graph().unwrap().unwrap();
    assert_eq!(first.edge_count(), 1);
    let rest = reader.next_sentence().unwrap().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].edge_count(), 2);
    assert_eq!(reader.next_sentence().unwrap().unwrap().len(), 2);
}

#[test]
fn test_reset_reproduces_the_same_graphs() {
    for reader_type in ReaderType::ALL {
        let mut reader = open(reader_type, &ReaderOptions::default());
        let first: Vec<String> = read_all(reader.as_mut()).iter().map(|g| g.to_string()).collect();
        assert!(!reader.has_next());

        reader.reset().unwrap();
        let second: Vec<String> = read_all(reader.as_mut()).iter().map(|g| g.to_string()).collect();
        assert_eq!(first, second, "{}", reader_type);

        reader.next_graph().unwrap();
        reader.reset().unwrap();
        let third: Vec<String> = read_all(reader.as_mut()).iter().map(|g| g.to_string()).collect();
        assert_eq!(first, third, "{}", reader_type);
    }
}

#[test]
fn test_close_then_reset() {
    let mut reader = open(ReaderType::Parseval, &ReaderOptions::default());
    assert!(reader.has_next());
    reader.close();
    assert!(!reader.has_next());
    assert!(reader.next_graph().unwrap().is_none());
    assert!(reader.next_sentence().unwrap().is_none());
    reader.close();

    reader.reset().unwrap();
    assert_eq!(read_all(reader.as_mut()).len(), 3);
}

#[test]
fn test_bug_relation_is_dropped() {
    let mut reader = open(ReaderType::RaspXml, &ReaderOptions::default());
    let sentence = reader.next_sentence().unwrap().unwrap();
    let labels: Vec<&str> = sentence[1].edges().iter().map(|e| e.label()).collect();
    assert_eq!(labels, vec!["ncsubj", "conj"]);
    assert!(sentence[1].node_at(3).unwrap().is_ellip());
    assert_eq!(sentence[1].node_at(1).unwrap().label(), "sleep_VV0");
}

#[test]
fn test_xml_and_tsv_fixtures_agree() {
    let options = ReaderOptions::default();
    let xml = read_all(open(ReaderType::RaspXml, &options).as_mut());
    let tsv = read_all(open(ReaderType::Tsv, &options).as_mut());
    let xml: Vec<String> = xml.iter().map(|g| g.to_string()).collect();
    let tsv: Vec<String> = tsv.iter().map(|g| g.to_string()).collect();
    assert_eq!(xml, tsv);
}

#[test]
fn test_converting_xml_reproduces_tsv_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("converted.tsv");

    let mut reader = open(ReaderType::RaspXml, &ReaderOptions::default());
    let mut writer = TsvGraphWriter::create(&output).unwrap();
    while let Some(sentence) = reader.next_sentence().unwrap() {
        writer.write_sentence(&sentence).unwrap();
    }
    writer.close().unwrap();

    let converted = fs::read_to_string(&output).unwrap();
    let fixture = fs::read_to_string(corpus(ReaderType::Tsv)).unwrap();
    assert_eq!(converted, fixture);
}

#[test]
fn test_all_lemmas_policy_on_fixture() {
    let options = ReaderOptions::default().with_node_policy(NodePolicy::AllLemmas);
    let graphs = read_all(open(ReaderType::RaspXml, &options).as_mut());
    assert_eq!(node_counts(&graphs), vec![3, 4, 12, 12, 7, 7]);
}

#[test]
fn test_xml_metadata_on_fixture() {
    let options = ReaderOptions::default().with_read_metadata(true);
    let mut reader = open(ReaderType::RaspXml, &options);
    let ids: Vec<String> = read_all(reader.as_mut())
        .iter()
        .map(|g| g.metadata(rasp_xml::SENTENCE_ID_KEY).unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "1", "2", "2", "3", "3"]);

    reader.reset().unwrap();
    let graph = reader.next_graph().unwrap().unwrap();
    assert_eq!(graph.metadata(rasp_xml::SENTENCE_ID_KEY), Some("1"));
    assert_eq!(graph.metadata(rasp_xml::WEIGHTED_GRS_KEY), Some(""));

    reader.next_sentence().unwrap();
    let graph = reader.next_graph().unwrap().unwrap();
    assert_eq!(
        graph.metadata(rasp_xml::WEIGHTED_GRS_KEY),
        Some(
            "ncsubj\tbe_VBZ\tprocessing_NN1\t1.0\n\
             ncmod\tand_CC\tcomputer_NN1\t0.62\n\
             ncmod\tscience_NN1\tcomputer_NN1\t0.38"
        )
    );
}

#[test]
fn test_iterator_interface() {
    let reader = RaspXmlGraphReader::open(corpus(ReaderType::RaspXml), &ReaderOptions::default())
        .unwrap();
    let graphs: Result<Vec<Graph>> = reader.collect();
    assert_eq!(graphs.unwrap().len(), 6);
}

#[test]
fn test_format_error_is_deferred_then_poisons() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.rasp");
    fs::write(
        &path,
        "gr-list: 1\n(|ncsubj| |sleep:2_VV0| |cat+s:1_NN2| _)\n\n\
         gr-list: 1\n(|ncmod| |x:1_X|)\n\n\
         gr-list: 1\n(|det| |field:2_NN1| |a:1_AT1|)\n",
    )
    .unwrap();

    let mut reader = RaspGraphReader::open(&path, &ReaderOptions::default()).unwrap();
    assert_eq!(reader.next_graph().unwrap().unwrap().edge_count(), 1);
    assert!(reader.has_next());

    let err = reader.next_graph().unwrap_err();
    assert_eq!(err.line(), Some("(|ncmod| |x:1_X|)"));
    assert!(!reader.has_next());
    assert!(matches!(reader.next_graph(), Err(GraphFormatError::Poisoned)));
    assert!(matches!(reader.next_sentence(), Err(GraphFormatError::Poisoned)));
    assert!(reader.next().is_none());

    reader.reset().unwrap();
    assert!(reader.has_next());
    assert_eq!(reader.next_graph().unwrap().unwrap().edge_count(), 1);
}

#[test]
fn test_directory_with_gzip_files() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fs::read_to_string(corpus(ReaderType::Parseval)).unwrap();
    let blocks: Vec<&str> = fixture.split("\n\n").collect();
    assert_eq!(blocks.len(), 3);

    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a.parseval"), blocks[0]).unwrap();
    let mut encoder = GzEncoder::new(
        fs::File::create(dir.path().join("b/second.parseval.gz")).unwrap(),
        Compression::default(),
    );
    encoder.write_all(blocks[1].as_bytes()).unwrap();
    encoder.finish().unwrap();
    fs::write(dir.path().join("c.parseval"), blocks[2]).unwrap();

    let mut reader = make_reader(ReaderType::Parseval, dir.path(), &ReaderOptions::default()).unwrap();
    let from_dir: Vec<String> = read_all(reader.as_mut()).iter().map(|g| g.to_string()).collect();
    let from_file: Vec<String> = read_all(open(ReaderType::Parseval, &ReaderOptions::default()).as_mut())
        .iter()
        .map(|g| g.to_string())
        .collect();
    assert_eq!(from_dir, from_file);
}

#[test]
fn test_zero_relation_sentences_yield_one_graph() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        (ReaderType::Rasp, "(|Hello:1_UH|) 1 ; (-1.0)\ngr-list: 1\n"),
        (ReaderType::Cnc, "<c> Hello|hello|UH|O|O|N\n"),
        (ReaderType::Parseval, "Hello\n"),
        (ReaderType::Tsv, "<s>\n</s>\n"),
        (
            ReaderType::RaspXml,
            "<rasp><sentence><lemma-list><lemma num=\"1\" wnum=\"1\" lem=\"hello\" pos=\"UH\"/></lemma-list></sentence></rasp>",
        ),
    ];
    for (reader_type, content) in cases {
        let path = dir.path().join(format!("empty.{}", reader_type));
        fs::write(&path, content).unwrap();
        let mut reader = make_reader(reader_type, &path, &ReaderOptions::default()).unwrap();
        let sentence = reader.next_sentence().unwrap().unwrap();
        assert_eq!(sentence.len(), 1, "{}", reader_type);
        assert_eq!(sentence[0].edge_count(), 0, "{}", reader_type);
        assert!(reader.next_sentence().unwrap().is_none(), "{}", reader_type);
    }
}

#[test]
fn test_missing_input_path() {
    for reader_type in ReaderType::ALL {
        let err = make_reader(reader_type, "no/such/corpus", &ReaderOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, GraphFormatError::InvalidInput(_)));
    }
}

#[test]
fn test_reader_labels() {
    assert_eq!(ReaderType::from_label("RaspXML"), Some(ReaderType::RaspXml));
    assert_eq!(ReaderType::from_label("CNC"), Some(ReaderType::Cnc));
    assert_eq!(ReaderType::from_label("conll"), None);
    assert!("dot".parse::<ReaderType>().is_err());
    for reader_type in ReaderType::ALL {
        assert_eq!(reader_type.label().parse::<ReaderType>().unwrap(), reader_type);
    }
}

#[test]
fn test_options_from_yaml() {
    let options = ReaderOptions::from_yaml_str(
        "all_parses: false\nnode_policy: all_lemmas\nread_metadata: true\nedge_format: simple\n",
    )
    .unwrap();
    assert!(!options.all_parses);
    assert_eq!(options.node_policy, NodePolicy::AllLemmas);
    assert!(options.read_metadata);
    assert_eq!(options.edge_format, EdgeFormat::Simple);
    assert_eq!(options.grammar, RelationGrammar::default());

    assert_eq!(ReaderOptions::from_yaml_str("{}").unwrap(), ReaderOptions::default());
    assert!(ReaderOptions::from_yaml_str("node_policy: every_lemma\n").is_err());
    assert!(ReaderOptions::from_yaml_str(
        "grammar:\n  subtype_relations: [ncsubj]\n  initial_gr_relations: [ncsubj]\n"
    )
    .is_err());
}
