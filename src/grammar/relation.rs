//! Grammatical-relation records: `(type arg1 arg2 ...)` or `type arg1 arg2 ...`.

use serde::{Deserialize, Serialize};

use super::config::{RelationCategory, RelationGrammar};
use crate::error::{GraphFormatError, Result};

/// Arity table used when reading relation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeFormat {
    /// Subtype and initial GR fields are expected where the type takes them.
    #[default]
    Full,
    /// Every type but passive takes exactly head and dependent.
    Simple,
}

/// One parsed relation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub relation_type: String,
    pub subtype: Option<String>,
    pub head: String,
    pub dependent: Option<String>,
    pub initial_gr: Option<String>,
}

/// Split a record into its fields.
///
/// Enclosing brackets are removed. Bar-delimited fields (`|ncmod|`) lose their
/// bars, but only when the type field itself is bar-delimited.
pub fn split_fields(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = if line.len() >= 2 && line.starts_with('(') && line.ends_with(')') {
        &line[1..line.len() - 1]
    } else {
        line
    };

    let mut fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    for i in 0..fields.len() {
        let field = &fields[i];
        if field.len() >= 2 && field.starts_with('|') && field.ends_with('|') {
            let stripped = field[1..field.len() - 1].to_string();
            fields[i] = stripped;
        } else if i == 0 {
            break;
        }
    }
    fields
}

impl Relation {
    /// Parse a record, enforcing the arity of its type.
    pub fn parse(line: &str, format: EdgeFormat, grammar: &RelationGrammar) -> Result<Self> {
        let mut fields = split_fields(line).into_iter();
        let relation_type = fields
            .next()
            .ok_or_else(|| GraphFormatError::format("Empty GR", line))?;
        let args: Vec<String> = fields.collect();

        let category = match format {
            EdgeFormat::Simple if grammar.is_passive(&relation_type) => RelationCategory::Passive,
            EdgeFormat::Simple => RelationCategory::Plain,
            EdgeFormat::Full => grammar.category(&relation_type),
        };

        let expected = match category {
            RelationCategory::Passive => 1,
            RelationCategory::Subtype | RelationCategory::InitialGr => 3,
            RelationCategory::Plain => 2,
        };
        if args.len() != expected {
            return Err(GraphFormatError::format("GR has wrong number of arguments", line));
        }

        let mut args = args.into_iter();
        let mut take = || args.next().unwrap_or_default();
        let relation = match category {
            RelationCategory::Passive => Self::new(relation_type, None, take(), None, None),
            RelationCategory::Subtype => {
                let subtype = take();
                let head = take();
                let dependent = take();
                Self::new(relation_type, Some(subtype), head, Some(dependent), None)
            }
            RelationCategory::InitialGr => {
                let head = take();
                let dependent = take();
                let initial_gr = take();
                Self::new(relation_type, None, head, Some(dependent), Some(initial_gr))
            }
            RelationCategory::Plain => {
                let head = take();
                let dependent = take();
                Self::new(relation_type, None, head, Some(dependent), None)
            }
        };
        Ok(relation)
    }

    /// Parse a record by position without enforcing arity.
    ///
    /// Subtype-bearing types with at least three arguments read head and
    /// dependent from the second and third; everything else reads them from
    /// the first and second. A missing dependent is `None`.
    pub fn parse_positional(line: &str, grammar: &RelationGrammar) -> Result<Self> {
        let mut fields = split_fields(line);
        if fields.is_empty() {
            return Err(GraphFormatError::format("Empty GR", line));
        }
        let relation_type = fields.remove(0);

        let subtype = if grammar.has_subtype(&relation_type) && fields.len() >= 3 {
            Some(fields.remove(0))
        } else {
            None
        };
        let mut args = fields.into_iter();
        let head = args
            .next()
            .ok_or_else(|| GraphFormatError::format("GR has no head", line))?;
        let dependent = args.next();
        let initial_gr = if grammar.has_initial_gr(&relation_type) {
            args.next()
        } else {
            None
        };

        Ok(Self::new(relation_type, subtype, head, dependent, initial_gr))
    }

    fn new(
        relation_type: String,
        subtype: Option<String>,
        head: String,
        dependent: Option<String>,
        initial_gr: Option<String>,
    ) -> Self {
        Self {
            relation_type,
            subtype,
            head,
            dependent,
            initial_gr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Relation> {
        Relation::parse(line, EdgeFormat::Full, &RelationGrammar::default())
    }

    #[test]
    fn test_split_fields_strips_bars_when_type_has_them() {
        assert_eq!(
            split_fields("(|ncmod| _ |processing:3_NN1| |Natural:1_JJ|)"),
            vec!["ncmod", "_", "processing:3_NN1", "Natural:1_JJ"]
        );
        assert_eq!(
            split_fields("(ncmod _ |processing:3_NN1| Natural:1_JJ)"),
            vec!["ncmod", "_", "|processing:3_NN1|", "Natural:1_JJ"]
        );
        assert_eq!(split_fields("dobj of_6 science_8"), vec!["dobj", "of_6", "science_8"]);
    }

    #[test]
    fn test_subtype_relation() {
        let relation = parse("(|xcomp| _ |be:4_VBZ| |field:6_NN1|)").unwrap();
        assert_eq!(relation.relation_type, "xcomp");
        assert_eq!(relation.subtype.as_deref(), Some("_"));
        assert_eq!(relation.head, "be:4_VBZ");
        assert_eq!(relation.dependent.as_deref(), Some("field:6_NN1"));
        assert_eq!(relation.initial_gr, None);
    }

    #[test]
    fn test_subtype_relation_arity() {
        let err = parse("(|ncmod| |processing:3_NN1| |Natural:1_JJ|)").unwrap_err();
        assert_eq!(err.line(), Some("(|ncmod| |processing:3_NN1| |Natural:1_JJ|)"));
        assert!(err.to_string().starts_with("GR has wrong number of arguments"));
        assert!(parse("(|ncmod| _ |processing:3_NN1| |Natural:1_JJ|)").is_ok());
    }

    #[test]
    fn test_initial_gr_relation() {
        let relation = parse("(|ncsubj| |be:4_VBZ| |processing:3_NN1| _)").unwrap();
        assert_eq!(relation.head, "be:4_VBZ");
        assert_eq!(relation.dependent.as_deref(), Some("processing:3_NN1"));
        assert_eq!(relation.initial_gr.as_deref(), Some("_"));
        assert!(parse("(|ncsubj| |be:4_VBZ| |processing:3_NN1|)").is_err());
    }

    #[test]
    fn test_passive_relation() {
        let relation = parse("(|passive| |study+ed:4_VVN|)").unwrap();
        assert_eq!(relation.head, "study+ed:4_VVN");
        assert_eq!(relation.dependent, None);
        assert!(parse("(|passive| |study+ed:4_VVN| |x:1_X|)").is_err());
    }

    #[test]
    fn test_plain_relation() {
        let relation = parse("det field:6_NN1 a:5_AT1").unwrap();
        assert_eq!(relation.relation_type, "det");
        assert_eq!(relation.head, "field:6_NN1");
        assert_eq!(relation.dependent.as_deref(), Some("a:5_AT1"));
        assert!(parse("(det field:6_NN1)").is_err());
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_simple_format() {
        let grammar = RelationGrammar::default();
        let relation =
            Relation::parse("(ncmod processing:3_NN1 Natural:1_JJ)", EdgeFormat::Simple, &grammar)
                .unwrap();
        assert_eq!(relation.subtype, None);
        assert_eq!(relation.head, "processing:3_NN1");
        assert!(Relation::parse("(ncmod _ a b)", EdgeFormat::Simple, &grammar).is_err());
        assert!(Relation::parse("(passive a)", EdgeFormat::Simple, &grammar).is_ok());
    }

    #[test]
    fn test_positional() {
        let grammar = RelationGrammar::default();
        let relation = Relation::parse_positional("(xcomp _ be_3 field_5)", &grammar).unwrap();
        assert_eq!(relation.head, "be_3");
        assert_eq!(relation.dependent.as_deref(), Some("field_5"));

        let relation = Relation::parse_positional("(ncsubj be_3 processing_2 _)", &grammar).unwrap();
        assert_eq!(relation.head, "be_3");
        assert_eq!(relation.initial_gr.as_deref(), Some("_"));

        let relation = Relation::parse_positional("(passive study:4_VVN)", &grammar).unwrap();
        assert_eq!(relation.dependent, None);

        assert!(Relation::parse_positional("(conj)", &grammar).is_err());
    }
}
