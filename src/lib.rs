pub mod error;
pub mod grammar;
pub mod graph;
pub mod reader;
pub mod source;
pub mod writer;

pub use error::{GraphFormatError, Result};
pub use grammar::{EdgeFormat, Label, Relation, RelationGrammar};
pub use graph::{Edge, Graph, GraphError, Node, NodeId, Sentence};
pub use reader::{make_reader, GraphReader, NodePolicy, ReaderOptions, ReaderType};
pub use writer::{make_writer, GraphWriter, TsvGraphWriter, WriterType};
