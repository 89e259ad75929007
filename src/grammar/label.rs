//! Token labels of the form `lemma+suffix:index_POS`.

use regex::Regex;
use std::sync::OnceLock;

use super::strip_bars;

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([^+:_]+)(\+([a-zA-Z]*))?(:([0-9]+))?(_([a-zA-Z0-9]+))?$")
            .expect("label pattern is a valid regex")
    })
}

/// Fields of a parsed token label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub lemma: String,
    pub suffix: Option<String>,
    /// 1-based token index, as written in the corpus.
    pub index: Option<usize>,
    pub pos: Option<String>,
}

impl Label {
    /// Parse a token such as `algorithm+s:6_NN2`, `|be:4_VBZ|` or `ellip`.
    ///
    /// Tokens that do not fit the grammar are kept whole as the lemma.
    pub fn parse(token: &str) -> Self {
        let token = strip_bars(token);
        if let Some(caps) = label_pattern().captures(token) {
            let index = match caps.get(5) {
                Some(m) => match m.as_str().parse::<usize>() {
                    Ok(index) => Some(index),
                    Err(_) => return Self::whole(token),
                },
                None => None,
            };
            return Self {
                lemma: caps[1].to_string(),
                suffix: caps.get(3).map(|m| m.as_str().to_string()),
                index,
                pos: caps.get(7).map(|m| m.as_str().to_string()),
            };
        }
        Self::whole(token)
    }

    fn whole(token: &str) -> Self {
        Self {
            lemma: token.to_string(),
            suffix: None,
            index: None,
            pos: None,
        }
    }

    /// POS, or an empty string when the token had none.
    pub fn pos_or_empty(&self) -> &str {
        self.pos.as_deref().unwrap_or("")
    }
}
