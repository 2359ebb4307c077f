use hashbrown::HashSet;

use fancy_regex::Regex;

use crate::misc::compile_into_regex;

const NUMBER_RE: &str = r"[+-]?\d+(?:\.\d+)?";
const TIMESTAMP_RE: &str = r"(?:\d{4}-\d{2}-\d{2}.*)|(?:\d{2}:\d{2}:\d{2})|(?:\d+,\d+)";
const IPV4_RE: &str = r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";
const UUID_RE: &str = r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";
const HASH_RE: &str = r"0x[0-9a-fA-F]+|[0-9a-fA-F]{32,}";

#[derive(Debug, Clone)]
pub enum VariableDetector {
    Standard(StandardDetector),
    Custom(CustomDetector),
    AlwaysVariable,
    NeverVariable,
}

impl VariableDetector {
    pub fn standard() -> Self {
        VariableDetector::Standard(StandardDetector::new(true, true, true, true, true))
    }

    pub fn is_variable(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        match self {
            VariableDetector::Standard(d) => d.is_variable(token),
            VariableDetector::Custom(d) => d.is_variable(token),
            VariableDetector::AlwaysVariable => true,
            VariableDetector::NeverVariable => false,
        }
    }

    pub fn tokens_match(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match self {
            VariableDetector::Standard(d) => d.tokens_match(a, b),
            VariableDetector::Custom(d) => d.is_variable(a) && d.is_variable(b),
            VariableDetector::AlwaysVariable => true,
            VariableDetector::NeverVariable => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Number,
    Timestamp,
    Ipv4,
    Uuid,
    Hash,
}

#[derive(Debug, Clone)]
pub struct StandardDetector {
    numbers: bool,
    timestamps: bool,
    ips: bool,
    uuids: bool,
    hashes: bool,
    number_re: Regex,
    timestamp_re: Regex,
    ipv4_re: Regex,
    uuid_re: Regex,
    hash_re: Regex,
}

impl StandardDetector {
    pub fn new(numbers: bool, timestamps: bool, ips: bool, uuids: bool, hashes: bool) -> Self {
        Self {
            numbers,
            timestamps,
            ips,
            uuids,
            hashes,
            number_re: anchored(NUMBER_RE),
            timestamp_re: anchored(TIMESTAMP_RE),
            ipv4_re: anchored(IPV4_RE),
            uuid_re: anchored(UUID_RE),
            hash_re: anchored(HASH_RE),
        }
    }

    fn class_of(&self, token: &str) -> Option<Class> {
        if self.numbers && full_match(&self.number_re, token) {
            return Some(Class::Number);
        }
        if self.timestamps && full_match(&self.timestamp_re, token) {
            return Some(Class::Timestamp);
        }
        if self.ips && full_match(&self.ipv4_re, token) {
            return Some(Class::Ipv4);
        }
        if self.uuids && full_match(&self.uuid_re, token) {
            return Some(Class::Uuid);
        }
        if self.hashes && full_match(&self.hash_re, token) {
            return Some(Class::Hash);
        }
        None
    }

    fn is_variable(&self, token: &str) -> bool {
        self.class_of(token).is_some()
    }

    fn tokens_match(&self, a: &str, b: &str) -> bool {
        match (self.class_of(a), self.class_of(b)) {
            (Some(Class::Hash), _) | (_, Some(Class::Hash)) => false,
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomDetector {
    patterns: Vec<Regex>,
    constants: HashSet<String>,
    default_to_variable: bool,
}

impl CustomDetector {
    pub fn new(patterns: Vec<Regex>, constants: HashSet<String>, default_to_variable: bool) -> Self {
        Self {
            patterns,
            constants,
            default_to_variable,
        }
    }

    pub fn from_pattern_strings(
        patterns: &[&str],
        constants: HashSet<String>,
        default_to_variable: bool,
    ) -> Result<Self, crate::error::ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns, constants, default_to_variable))
    }

    fn is_variable(&self, token: &str) -> bool {
        if self.constants.contains(token) {
            return false;
        }
        if self.patterns.iter().any(|re| full_match(re, token)) {
            return true;
        }
        self.default_to_variable
    }
}

fn anchored(body: &str) -> Regex {
    compile_into_regex([format!("^(?:{body})$")])
}

fn full_match(re: &Regex, token: &str) -> bool {
    re.is_match(token).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_detects_numbers() {
        let d = VariableDetector::standard();
        assert!(d.is_variable("12345"));
        assert!(d.is_variable("-12.5"));
        assert!(!d.is_variable("abc"));
    }

    #[test]
    fn standard_detects_uuid_case_insensitively() {
        let d = VariableDetector::standard();
        assert!(d.is_variable("550E8400-E29B-41D4-A716-446655440000"));
        assert!(d.is_variable("550e8400-e29b-41d4-a716-446655440000"));
    }

    #[test]
    fn standard_detects_ipv4_without_range_check() {
        let d = VariableDetector::standard();
        assert!(d.is_variable("999.999.999.999"));
    }

    #[test]
    fn standard_detects_hash_forms() {
        let d = VariableDetector::standard();
        assert!(d.is_variable("0xDEADBEEF"));
        assert!(d.is_variable(&"a".repeat(32)));
        assert!(!d.is_variable(&"a".repeat(31)));
    }

    #[test]
    fn standard_empty_token_never_variable() {
        let d = VariableDetector::standard();
        assert!(!d.is_variable(""));
    }

    #[test]
    fn standard_cross_class_tokens_do_not_match() {
        let d = VariableDetector::standard();
        assert!(!d.tokens_match("12345", "10.0.0.1"));
    }

    #[test]
    fn standard_same_class_numbers_match() {
        let d = VariableDetector::standard();
        assert!(d.tokens_match("12345", "67890"));
    }

    #[test]
    fn standard_hashes_never_cross_equivalent() {
        let d = VariableDetector::standard();
        assert!(!d.tokens_match(&"a".repeat(32), &"b".repeat(32)));
    }

    #[test]
    fn custom_constants_override_patterns() {
        let d = CustomDetector::new(
            vec![compile_into_regex([r"^.*$"])],
            ["keep".to_owned()].into_iter().collect(),
            false,
        );
        assert!(!d.is_variable("keep"));
        assert!(d.is_variable("other"));
    }

    #[test]
    fn custom_default_policy_applies_when_no_pattern_or_constant_matches() {
        let d = CustomDetector::new(vec![], HashSet::new(), true);
        assert!(d.is_variable("anything"));
    }

    #[test]
    fn custom_compiles_from_pattern_strings() {
        let d = CustomDetector::from_pattern_strings(&[r"^\d+$"], HashSet::new(), false).unwrap();
        assert!(d.is_variable("123"));
        assert!(!d.is_variable("abc"));
    }

    #[test]
    fn custom_invalid_pattern_string_surfaces_config_error() {
        assert!(CustomDetector::from_pattern_strings(&["(unclosed"], HashSet::new(), false).is_err());
    }

    #[test]
    fn always_variable_matches_everything() {
        let d = VariableDetector::AlwaysVariable;
        assert!(d.is_variable("x"));
        assert!(d.tokens_match("x", "y"));
    }

    #[test]
    fn never_variable_matches_only_equal_strings() {
        let d = VariableDetector::NeverVariable;
        assert!(!d.is_variable("x"));
        assert!(d.tokens_match("x", "x"));
        assert!(!d.tokens_match("x", "y"));
    }
}
