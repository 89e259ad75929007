//! Token and relation grammars shared by the readers.
//!
//! - `label`: `lemma+suffix:index_POS` token labels
//! - `relation`: relation records and their arity rules
//! - `config`: the relation-type tables, with YAML loading

pub mod config;
pub mod label;
pub mod relation;

pub use config::{RelationCategory, RelationGrammar};
pub use label::Label;
pub use relation::{split_fields, EdgeFormat, Relation};

/// Remove one pair of enclosing bars (`|token|`), if present.
pub fn strip_bars(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('|') && token.ends_with('|') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}
