use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::{detector::VariableDetector, message::Message};

pub const WILDCARD: &str = "***";

#[derive(Debug, Clone)]
pub struct Pattern {
    pub pattern_tokens: Vec<String>,
    pub support_count: usize,
    pub pattern_id: String,
    pub short_id: String,
    pub signature: String,
    pub specificity: f64,
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern_tokens == other.pattern_tokens
    }
}
impl Eq for Pattern {}

impl Pattern {
    fn from_tokens(pattern_tokens: Vec<String>, support_count: usize) -> Self {
        let pattern_id = compute_pattern_id(&pattern_tokens);
        let short_id = pattern_id.chars().take(16).collect();
        let signature = pattern_tokens.join(" ");
        let specificity = if pattern_tokens.is_empty() {
            0.0
        } else {
            let non_wildcard = pattern_tokens.iter().filter(|t| t.as_str() != WILDCARD).count();
            non_wildcard as f64 / pattern_tokens.len() as f64
        };
        Self {
            pattern_tokens,
            support_count,
            pattern_id,
            short_id,
            signature,
            specificity,
        }
    }

    pub fn empty() -> Self {
        Self::from_tokens(Vec::new(), 0)
    }

    pub fn matches(&self, message: &Message) -> bool {
        if self.pattern_tokens.len() != message.tokens.len() {
            return false;
        }
        self.pattern_tokens
            .iter()
            .zip(message.tokens.iter())
            .all(|(p, m)| p == WILDCARD || p == m)
    }
}

pub fn synthesize(members: &[Message], detector: &VariableDetector) -> Pattern {
    match members {
        [] => Pattern::empty(),
        [only] => {
            let tokens = only
                .tokens
                .iter()
                .map(|t| {
                    if detector.is_variable(t) {
                        WILDCARD.to_owned()
                    } else {
                        t.clone()
                    }
                })
                .collect();
            Pattern::from_tokens(tokens, 1)
        }
        _ => {
            let template = &members[0].tokens;
            let mut tokens = Vec::with_capacity(template.len());
            for (i, tmpl_tok) in template.iter().enumerate() {
                let variable = if detector.is_variable(tmpl_tok) {
                    true
                } else {
                    members[1..]
                        .iter()
                        .any(|m| i >= m.tokens.len() || m.tokens[i] != *tmpl_tok)
                };
                tokens.push(if variable {
                    WILDCARD.to_owned()
                } else {
                    tmpl_tok.clone()
                });
            }
            Pattern::from_tokens(tokens, members.len())
        }
    }
}

pub fn composite_key(pattern: &Pattern, source: &str, environment: &str) -> String {
    format!("{}:{}:{}", pattern.pattern_id, source, environment)
}

pub fn is_wildcard_token(token: &str) -> bool {
    if token == "*" || token == "<*>" || token == WILDCARD {
        return true;
    }
    token.len() > 2
        && token.starts_with('<')
        && token.ends_with('>')
        && token[1..token.len() - 1].chars().all(|c| c != '>')
}

fn compute_pattern_id(tokens: &[String]) -> String {
    let canonical: Vec<&str> = tokens
        .iter()
        .map(|t| if is_wildcard_token(t) { "*" } else { t.as_str() })
        .collect();
    let joined = canonical.join("\x00");
    let digest = Sha256::digest(joined.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
