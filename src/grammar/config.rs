//! Relation-type tables, loadable from YAML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{GraphFormatError, Result};

/// Relation types whose records carry a subtype before head and dependent.
pub const SUBTYPE_RELATIONS: [&str; 10] = [
    "dependent", "mod", "ncmod", "xmod", "cmod", "arg_mod", "arg", "xcomp", "ccomp", "ta",
];

/// Relation types whose records carry an initial GR after head and dependent.
pub const INITIAL_GR_RELATIONS: [&str; 4] = ["subj", "ncsubj", "xsubj", "csubj"];

pub const PASSIVE_RELATION: &str = "passive";

/// Unindexed token that denotes an elided head.
pub const ELLIP_TOKEN: &str = "ellip";

/// How many arguments a relation type takes, and what they mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationCategory {
    /// Head only; the dependent is absent.
    Passive,
    /// Subtype, head, dependent.
    Subtype,
    /// Head, dependent, initial GR.
    InitialGr,
    /// Head, dependent.
    Plain,
}

/// The closed relation-type sets used by the relation-line grammar.
///
/// The defaults are the tables RASP output is written against; changing them
/// changes which corpora parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationGrammar {
    pub subtype_relations: Vec<String>,
    pub initial_gr_relations: Vec<String>,
    pub passive_relation: String,
    pub ellip_token: String,
}

impl Default for RelationGrammar {
    fn default() -> Self {
        Self {
            subtype_relations: SUBTYPE_RELATIONS.iter().map(|s| s.to_string()).collect(),
            initial_gr_relations: INITIAL_GR_RELATIONS.iter().map(|s| s.to_string()).collect(),
            passive_relation: PASSIVE_RELATION.to_string(),
            ellip_token: ELLIP_TOKEN.to_string(),
        }
    }
}

impl RelationGrammar {
    /// Load a grammar table from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GraphFormatError::Config(format!(
                "grammar file not found: {}",
                path.display()
            )));
        }
        let yaml_str = fs::read_to_string(path)?;
        let grammar = Self::from_yaml_str(&yaml_str)
            .map_err(|e| GraphFormatError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded relation grammar from {}", path.display());
        Ok(grammar)
    }

    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let grammar: RelationGrammar = serde_yaml::from_str(yaml_str)
            .map_err(|e| GraphFormatError::Config(format!("invalid grammar YAML: {}", e)))?;
        grammar.validate()?;
        Ok(grammar)
    }

    /// A type may not take both a subtype and an initial GR.
    pub fn validate(&self) -> Result<()> {
        let overlap: Vec<&str> = self
            .subtype_relations
            .iter()
            .filter(|t| self.initial_gr_relations.contains(*t))
            .map(|t| t.as_str())
            .collect();
        if !overlap.is_empty() {
            return Err(GraphFormatError::Config(format!(
                "relation types listed as both subtype and initial-gr bearing: {:?}",
                overlap
            )));
        }
        if self.passive_relation.is_empty() {
            return Err(GraphFormatError::Config("passive relation type is empty".into()));
        }
        Ok(())
    }

    pub fn category(&self, relation_type: &str) -> RelationCategory {
        if self.is_passive(relation_type) {
            RelationCategory::Passive
        } else if self.has_subtype(relation_type) {
            RelationCategory::Subtype
        } else if self.has_initial_gr(relation_type) {
            RelationCategory::InitialGr
        } else {
            RelationCategory::Plain
        }
    }

    pub fn is_passive(&self, relation_type: &str) -> bool {
        self.passive_relation == relation_type
    }

    pub fn has_subtype(&self, relation_type: &str) -> bool {
        self.subtype_relations.iter().any(|t| t == relation_type)
    }

    pub fn has_initial_gr(&self, relation_type: &str) -> bool {
        self.initial_gr_relations.iter().any(|t| t == relation_type)
    }

    pub fn is_ellip(&self, token: &str) -> bool {
        self.ellip_token == token
    }
}
