use hashbrown::HashSet;

use fancy_regex::Regex;

use crate::{error::ConfigError, misc::compile_into_regex};

pub const DEFAULT_DELIMITERS: &[char] = &['=', ',', ':', ';', '[', ']', '{', '}', '(', ')'];

#[derive(Debug, Clone)]
pub enum Tokenizer {
    Whitespace,
    Delimiter { delimiters: HashSet<char> },
    Regex { pattern: Regex },
    JsonIsh,
}

impl Tokenizer {
    pub fn delimiter_default() -> Self {
        Tokenizer::Delimiter {
            delimiters: DEFAULT_DELIMITERS.iter().copied().collect(),
        }
    }

    pub fn regex_default() -> Self {
        Tokenizer::Regex {
            pattern: compile_into_regex([r"\S+"]),
        }
    }

    pub fn regex(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Tokenizer::Regex {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn delimiter(delimiters: HashSet<char>) -> Self {
        Tokenizer::Delimiter { delimiters }
    }

    pub fn tokenize(&self, line: &str) -> Vec<String> {
        match self {
            Tokenizer::Whitespace => tokenize_whitespace(line),
            Tokenizer::Delimiter { delimiters } => tokenize_delimiter(line, delimiters),
            Tokenizer::Regex { pattern } => tokenize_regex(line, pattern),
            Tokenizer::JsonIsh => tokenize_json_ish(line),
        }
    }
}

fn tokenize_whitespace(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

fn tokenize_delimiter(line: &str, delimiters: &HashSet<char>) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let is_delim = |c: char| c.is_whitespace() || delimiters.contains(&c);
    for (pos, c) in line.char_indices() {
        if is_delim(c) {
            if pos > start {
                tokens.push(line[start..pos].to_owned());
            }
            if delimiters.contains(&c) {
                tokens.push(c.to_string());
            }
            start = pos + c.len_utf8();
        }
    }
    if start < line.len() {
        tokens.push(line[start..].to_owned());
    }
    tokens.retain(|t| !t.is_empty());
    tokens
}

fn tokenize_regex(line: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .find_iter(line)
        .filter_map(Result::ok)
        .map(|m| m.as_str().to_owned())
        .collect()
}

fn tokenize_json_ish(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return tokenize_whitespace(line);
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    let pairs = split_top_level_pairs(inner);
    if pairs.is_empty() && !inner.trim().is_empty() {
        return tokenize_whitespace(line);
    }

    let mut tokens = vec!["{".to_owned()];
    for (i, pair) in pairs.iter().enumerate() {
        let Some((key, value)) = split_key_value(pair) else {
            return tokenize_whitespace(line);
        };
        tokens.push(strip_quotes(key));
        tokens.push(":".to_owned());
        tokens.push(strip_quotes(value));
        if i + 1 < pairs.len() {
            tokens.push(",".to_owned());
        }
    }
    tokens.push("}".to_owned());
    tokens
}

fn split_top_level_pairs(inner: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                let piece = inner[start..i].trim();
                if !piece.is_empty() {
                    pairs.push(piece);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let tail = inner[start..].trim();
    if !tail.is_empty() {
        pairs.push(tail);
    }
    pairs
}

fn split_key_value(pair: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in pair.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                return Some((pair[..i].trim(), pair[i + 1..].trim()));
            }
            _ => {}
        }
    }
    None
}

fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].replace("\\\"", "\"")
    } else {
        s.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_empty_input() {
        assert!(Tokenizer::Whitespace.tokenize("").is_empty());
        assert!(Tokenizer::Whitespace.tokenize("   \t  ").is_empty());
    }

    #[test]
    fn whitespace_splits_runs() {
        let toks = Tokenizer::Whitespace.tokenize("a   b\tc");
        assert_eq!(toks, vec!["a", "b", "c"]);
    }

    #[test]
    fn delimiter_emits_each_delimiter_and_duplicates() {
        let tokenizer = Tokenizer::delimiter_default();
        let toks = tokenizer.tokenize("key=val,key=val");
        assert_eq!(toks, vec!["key", "=", "val", ",", "key", "=", "val"]);
    }

    #[test]
    fn delimiter_drops_whitespace_only_tokens() {
        let tokenizer = Tokenizer::delimiter_default();
        let toks = tokenizer.tokenize("a = b");
        assert_eq!(toks, vec!["a", "=", "b"]);
    }

    #[test]
    fn regex_default_matches_nonwhitespace_runs() {
        let tokenizer = Tokenizer::regex_default();
        let toks = tokenizer.tokenize("abc def  ghi");
        assert_eq!(toks, vec!["abc", "def", "ghi"]);
    }

    #[test]
    fn json_ish_single_field_no_trailing_comma() {
        let toks = Tokenizer::JsonIsh.tokenize(r#"{"user": "alice"}"#);
        assert_eq!(toks, vec!["{", "user", ":", "alice", "}"]);
    }

    #[test]
    fn json_ish_multi_field() {
        let toks = Tokenizer::JsonIsh.tokenize(r#"{"user": "alice", "id": "42"}"#);
        assert_eq!(
            toks,
            vec!["{", "user", ":", "alice", ",", "id", ":", "42", "}"]
        );
    }

    #[test]
    fn json_ish_escaped_quotes() {
        let toks = Tokenizer::JsonIsh.tokenize(r#"{"msg": "say \"hi\""}"#);
        assert_eq!(toks, vec!["{", "msg", ":", "say \"hi\"", "}"]);
    }

    #[test]
    fn json_ish_falls_back_for_non_object() {
        let toks = Tokenizer::JsonIsh.tokenize("plain text line");
        assert_eq!(toks, vec!["plain", "text", "line"]);
    }

    #[test]
    fn null_like_empty_input_yields_empty_sequence() {
        for tokenizer in [
            Tokenizer::Whitespace,
            Tokenizer::delimiter_default(),
            Tokenizer::regex_default(),
            Tokenizer::JsonIsh,
        ] {
            assert!(tokenizer.tokenize("").is_empty());
        }
    }

    #[test]
    fn user_supplied_regex_pattern_compiles() {
        let tokenizer = Tokenizer::regex(r"\d+").unwrap();
        assert_eq!(tokenizer.tokenize("a1 b22 c333"), vec!["1", "22", "333"]);
    }

    #[test]
    fn invalid_user_supplied_regex_surfaces_config_error() {
        assert!(Tokenizer::regex(r"(unclosed").is_err());
    }
}
