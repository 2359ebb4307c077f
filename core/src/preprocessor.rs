use fancy_regex::Regex;

use crate::misc::compile_into_regex;

const TIMESTAMP_PATTERNS: &[&str] = &[
    // ISO 8601, optional fractional seconds and timezone.
    r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?",
    // syslog "Mon DD HH:MM:SS"
    r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}",
    // Common Log Format "DD/Mon/YYYY:HH:MM:SS +ZZZZ"
    r"\d{2}/(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)/\d{4}:\d{2}:\d{2}:\d{2}\s*[+-]\d{4}",
    // bracketed ISO
    r"\[\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?\]",
    // 10-digit Unix epoch starting 16 or 17
    r"\b1[67]\d{8}\b",
    // "YYYY-MM-DD HH:MM:SS(.ffffff)?" without timezone or "T" separator.
    r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d{1,6})?",
];

const URL_PATTERN: &str = r"(?:https?|ftp)://[^\s]+";

const PATH_PATTERNS: &[&str] = &[
    r"(?:/[\w.\-]+){2,}/?",
    r"[A-Za-z]:\\(?:[\w.\-]+\\?)+",
];

const IPV6_PATTERNS: &[&str] = &[
    r"(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}",
    r"(?:[0-9a-fA-F]{1,4}:)*::(?:[0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{0,4}",
];

const IPV4_PATTERN: &str = r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";

const INTEGER_PATTERN: &str = r"\b\d{4,}\b";
const FLOAT_PATTERN: &str = r"\b\d+\.\d+\b";

#[derive(Debug, Clone)]
pub struct Preprocessor {
    normalize_timestamps: bool,
    normalize_urls: bool,
    normalize_paths: bool,
    normalize_ips: bool,
    normalize_numbers: bool,
    case_sensitive: bool,
    timestamp_re: Regex,
    url_re: Regex,
    path_re: Regex,
    ipv6_re: Regex,
    ipv4_re: Regex,
    integer_re: Regex,
    float_re: Regex,
}

impl Preprocessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        normalize_timestamps: bool,
        normalize_urls: bool,
        normalize_paths: bool,
        normalize_ips: bool,
        normalize_numbers: bool,
        case_sensitive: bool,
    ) -> Self {
        Self {
            normalize_timestamps,
            normalize_urls,
            normalize_paths,
            normalize_ips,
            normalize_numbers,
            case_sensitive,
            timestamp_re: compile_into_regex(TIMESTAMP_PATTERNS.iter().copied()),
            url_re: compile_into_regex([URL_PATTERN]),
            path_re: compile_into_regex(PATH_PATTERNS.iter().copied()),
            ipv6_re: compile_into_regex(IPV6_PATTERNS.iter().copied()),
            ipv4_re: compile_into_regex([IPV4_PATTERN]),
            integer_re: compile_into_regex([INTEGER_PATTERN]),
            float_re: compile_into_regex([FLOAT_PATTERN]),
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.normalize_timestamps
            && !self.normalize_urls
            && !self.normalize_paths
            && !self.normalize_ips
            && !self.normalize_numbers
            && self.case_sensitive
    }

    pub fn process(&self, raw: &str) -> String {
        let mut s = raw.to_owned();
        if self.normalize_timestamps {
            s = replace_all(&self.timestamp_re, &s, "TIMESTAMP");
        }
        if self.normalize_urls {
            s = replace_all(&self.url_re, &s, "URL");
        }
        if self.normalize_paths {
            s = replace_all(&self.path_re, &s, "PATH");
        }
        if self.normalize_ips {
            s = replace_all(&self.ipv6_re, &s, "IP_ADDR");
            s = replace_all(&self.ipv4_re, &s, "IP_ADDR");
        }
        if self.normalize_numbers {
            s = replace_all(&self.float_re, &s, "NUM");
            s = replace_all(&self.integer_re, &s, "NUM");
        }
        if !self.case_sensitive {
            s = s.to_lowercase();
        }
        s
    }
}

fn replace_all(re: &Regex, input: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for m in re.find_iter(input).filter_map(Result::ok) {
        out.push_str(&input[last..m.start()]);
        out.push_str(replacement);
        last = m.end();
    }
    out.push_str(&input[last..]);
    out
}
