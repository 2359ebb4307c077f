use hashbrown::HashSet;

use crate::{detector::VariableDetector, error::ConfigError, preprocessor::Preprocessor, tokenizer::Tokenizer};

/// Frozen, validated engine configuration. Every field is checked once at
/// construction (`EngineConfigBuilder::build`); after that an `EngineConfig`
/// never changes and every consumer can assume its invariants hold.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub similarity_threshold: f64,
    pub min_cluster_size: usize,
    pub max_clusters: usize,
    pub tokenizer: Tokenizer,
    pub variable_detector: VariableDetector,
    pub min_pattern_length: usize,
    pub max_pattern_length: usize,
    pub min_pattern_specificity: f64,
    ignore_tokens: HashSet<String>,
    pub enable_hierarchical_patterns: bool,
    hierarchy_thresholds: Vec<f64>,
    pub(crate) preprocessor: Option<Preprocessor>,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Read-only view; this collection must reject mutation by external
    /// holders, so there is no `&mut` accessor.
    pub fn ignore_tokens(&self) -> &HashSet<String> {
        &self.ignore_tokens
    }

    /// Read-only view; see [`EngineConfig::ignore_tokens`].
    pub fn hierarchy_thresholds(&self) -> &[f64] {
        &self.hierarchy_thresholds
    }
}

/// Fluent `with_*` configuration builder. This engine always
/// produces the same output shape, so there is nothing to toggle at the
/// type level.
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    similarity_threshold: f64,
    min_cluster_size: usize,
    max_clusters: usize,
    tokenizer: Tokenizer,
    variable_detector: VariableDetector,
    min_pattern_length: usize,
    max_pattern_length: usize,
    min_pattern_specificity: f64,
    ignore_tokens: HashSet<String>,
    normalize_timestamps: bool,
    normalize_urls: bool,
    normalize_paths: bool,
    normalize_ips: bool,
    normalize_numbers: bool,
    case_sensitive: bool,
    enable_hierarchical_patterns: bool,
    hierarchy_thresholds: Vec<f64>,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            min_cluster_size: 1,
            max_clusters: 1000,
            tokenizer: Tokenizer::Whitespace,
            variable_detector: VariableDetector::standard(),
            min_pattern_length: 1,
            max_pattern_length: usize::MAX,
            min_pattern_specificity: 0.0,
            ignore_tokens: HashSet::new(),
            normalize_timestamps: false,
            normalize_urls: false,
            normalize_paths: false,
            normalize_ips: false,
            normalize_numbers: false,
            case_sensitive: true,
            enable_hierarchical_patterns: false,
            hierarchy_thresholds: Vec::new(),
        }
    }
}

impl EngineConfigBuilder {
    #[must_use]
    pub fn with_similarity_threshold(mut self, value: f64) -> Self {
        self.similarity_threshold = value;
        self
    }

    #[must_use]
    pub fn with_min_cluster_size(mut self, value: usize) -> Self {
        self.min_cluster_size = value;
        self
    }

    #[must_use]
    pub fn with_max_clusters(mut self, value: usize) -> Self {
        self.max_clusters = value;
        self
    }

    #[must_use]
    pub fn with_tokenizer(mut self, value: Tokenizer) -> Self {
        self.tokenizer = value;
        self
    }

    #[must_use]
    pub fn with_variable_detector(mut self, value: VariableDetector) -> Self {
        self.variable_detector = value;
        self
    }

    #[must_use]
    pub fn with_pattern_length_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_pattern_length = min;
        self.max_pattern_length = max;
        self
    }

    #[must_use]
    pub fn with_min_pattern_specificity(mut self, value: f64) -> Self {
        self.min_pattern_specificity = value;
        self
    }

    #[must_use]
    pub fn with_ignore_tokens(mut self, value: HashSet<String>) -> Self {
        self.ignore_tokens = value;
        self
    }

    #[must_use]
    pub fn with_normalize_timestamps(mut self, value: bool) -> Self {
        self.normalize_timestamps = value;
        self
    }

    #[must_use]
    pub fn with_normalize_urls(mut self, value: bool) -> Self {
        self.normalize_urls = value;
        self
    }

    #[must_use]
    pub fn with_normalize_paths(mut self, value: bool) -> Self {
        self.normalize_paths = value;
        self
    }

    #[must_use]
    pub fn with_normalize_ips(mut self, value: bool) -> Self {
        self.normalize_ips = value;
        self
    }

    #[must_use]
    pub fn with_normalize_numbers(mut self, value: bool) -> Self {
        self.normalize_numbers = value;
        self
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    #[must_use]
    pub fn with_hierarchical_patterns(mut self, enabled: bool, thresholds: Vec<f64>) -> Self {
        self.enable_hierarchical_patterns = enabled;
        self.hierarchy_thresholds = thresholds;
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.similarity_threshold));
        }
        if self.min_cluster_size < 1 {
            return Err(ConfigError::MinClusterSizeTooSmall(self.min_cluster_size));
        }
        if self.max_clusters < 1 {
            return Err(ConfigError::MaxClustersTooSmall(self.max_clusters));
        }
        if self.min_pattern_length < 1 {
            return Err(ConfigError::MinPatternLengthTooSmall(self.min_pattern_length));
        }
        if self.min_pattern_length > self.max_pattern_length {
            return Err(ConfigError::PatternLengthRange {
                min: self.min_pattern_length,
                max: self.max_pattern_length,
            });
        }
        if !(0.0..=1.0).contains(&self.min_pattern_specificity) {
            return Err(ConfigError::SpecificityOutOfRange(self.min_pattern_specificity));
        }
        for t in &self.hierarchy_thresholds {
            if !(0.0..=1.0).contains(t) {
                return Err(ConfigError::HierarchyThresholdOutOfRange(*t));
            }
        }

        let preprocessor = {
            let p = Preprocessor::new(
                self.normalize_timestamps,
                self.normalize_urls,
                self.normalize_paths,
                self.normalize_ips,
                self.normalize_numbers,
                self.case_sensitive,
            );
            if p.is_noop() {
                None
            } else {
                Some(p)
            }
        };

        Ok(EngineConfig {
            similarity_threshold: self.similarity_threshold,
            min_cluster_size: self.min_cluster_size,
            max_clusters: self.max_clusters,
            tokenizer: self.tokenizer,
            variable_detector: self.variable_detector,
            min_pattern_length: self.min_pattern_length,
            max_pattern_length: self.max_pattern_length,
            min_pattern_specificity: self.min_pattern_specificity,
            ignore_tokens: self.ignore_tokens,
            enable_hierarchical_patterns: self.enable_hierarchical_patterns,
            hierarchy_thresholds: self.hierarchy_thresholds,
            preprocessor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        assert!(EngineConfig::builder().build().is_ok());
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let err = EngineConfig::builder()
            .with_similarity_threshold(1.5)
            .build();
        assert!(matches!(err, Err(ConfigError::ThresholdOutOfRange(_))));
    }

    #[test]
    fn rejects_zero_min_cluster_size() {
        let err = EngineConfig::builder().with_min_cluster_size(0).build();
        assert!(matches!(err, Err(ConfigError::MinClusterSizeTooSmall(_))));
    }

    #[test]
    fn rejects_zero_max_clusters() {
        let err = EngineConfig::builder().with_max_clusters(0).build();
        assert!(matches!(err, Err(ConfigError::MaxClustersTooSmall(_))));
    }

    #[test]
    fn rejects_max_pattern_length_below_min() {
        let err = EngineConfig::builder()
            .with_pattern_length_bounds(10, 5)
            .build();
        assert!(matches!(err, Err(ConfigError::PatternLengthRange { .. })));
    }

    #[test]
    fn rejects_specificity_out_of_range() {
        let err = EngineConfig::builder()
            .with_min_pattern_specificity(-0.1)
            .build();
        assert!(matches!(err, Err(ConfigError::SpecificityOutOfRange(_))));
    }

    #[test]
    fn rejects_out_of_range_hierarchy_threshold() {
        let err = EngineConfig::builder()
            .with_hierarchical_patterns(true, vec![0.5, 1.5])
            .build();
        assert!(matches!(
            err,
            Err(ConfigError::HierarchyThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn preprocessor_omitted_when_all_flags_default() {
        let cfg = EngineConfig::builder().build().unwrap();
        assert!(cfg.preprocessor.is_none());
    }

    #[test]
    fn preprocessor_present_when_a_flag_is_set() {
        let cfg = EngineConfig::builder()
            .with_normalize_numbers(true)
            .build()
            .unwrap();
        assert!(cfg.preprocessor.is_some());
    }

    #[test]
    fn ignore_tokens_and_hierarchy_thresholds_are_read_only() {
        let mut ignore = HashSet::new();
        ignore.insert("tid".to_owned());
        let cfg = EngineConfig::builder()
            .with_ignore_tokens(ignore.clone())
            .with_hierarchical_patterns(true, vec![0.5, 0.9])
            .build()
            .unwrap();
        // Only `&` accessors exist; there is no way to obtain `&mut` to
        // these fields from outside the module, so a caller cannot mutate
        // them through the returned config.
        assert_eq!(cfg.ignore_tokens(), &ignore);
        assert_eq!(cfg.hierarchy_thresholds(), &[0.5, 0.9]);
    }
}
