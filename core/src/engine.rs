use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    cluster::Cluster,
    config::EngineConfig,
    detector::VariableDetector,
    message::Message,
    pattern::Pattern,
};

/// A point-in-time count snapshot, derived from live cluster state rather
/// than cached: `total_messages` drops when pruning removes
/// a cluster, unlike the engine's internal admission counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub total_messages: usize,
    pub cluster_count: usize,
    pub pattern_count: usize,
    pub avg_cluster_size: f64,
    pub avg_pattern_specificity: f64,
}

/// Drives the pipeline end-to-end: owns the cluster set, runs online
/// clustering, periodic pruning and resorting, and caches the sorted
/// pattern list.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    detector: Arc<VariableDetector>,
    clusters: Vec<Cluster>,
    patterns: Vec<Pattern>,
    admission_count: usize,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let detector = Arc::new(config.variable_detector.clone());
        Self {
            config,
            detector,
            clusters: Vec::new(),
            patterns: Vec::new(),
            admission_count: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Monotonic count of admissions since the last `clear()`. Drives the
    /// periodic prune (every 100th) and resort (every 50th) ticks; unlike
    /// `Statistics::total_messages` it never drops when clusters are pruned.
    pub fn admission_count(&self) -> usize {
        self.admission_count
    }

    /// Preprocesses and tokenizes a raw line, returning `None` for inputs
    /// that normalize to an empty token sequence (dropped upstream of
    /// `Message`, whose invariant requires a non-empty token sequence for
    /// any admitted message).
    fn build_message(&self, raw: &str) -> Option<Message> {
        if raw.trim().is_empty() {
            return None;
        }
        let processed = match &self.config.preprocessor {
            Some(p) => p.process(raw),
            None => raw.to_owned(),
        };
        let tokens = self.config.tokenizer.tokenize(&processed);
        if tokens.is_empty() {
            return None;
        }
        Some(Message::new(
            raw.to_owned(),
            processed,
            tokens,
            Arc::clone(&self.detector),
        ))
    }

    /// Online clustering admission: first-fit against
    /// existing clusters in creation order, else a new cluster while under
    /// capacity, else an unconditional forced merge into the most similar
    /// cluster.
    ///
    /// `similarity_to` (non-consuming) is used to pick the destination
    /// before `try_admit`/`force_admit` take ownership of `msg`, so a
    /// rejection by one cluster never drops the message before the next
    /// cluster gets a chance at it.
    fn admit(&mut self, msg: Message) {
        for (idx, cluster) in self.clusters.iter_mut().enumerate() {
            if cluster.similarity_to(&msg) >= self.config.similarity_threshold {
                cluster.try_admit(msg, self.config.similarity_threshold);
                tracing::trace!(cluster = idx, "admitted to existing cluster");
                return;
            }
        }
        if self.clusters.len() < self.config.max_clusters {
            self.clusters.push(Cluster::new(msg));
            tracing::trace!(cluster = self.clusters.len() - 1, "opened new cluster");
            return;
        }
        let best = self
            .clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.similarity_to(&msg)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).expect("similarity is never NaN"))
            .map(|(i, _)| i)
            .expect("max_clusters >= 1 guarantees at least one existing cluster");
        tracing::trace!(cluster = best, "forced merge at capacity");
        self.clusters[best].force_admit(msg);
    }

    fn prune(&mut self) {
        let before = self.clusters.len();
        self.clusters
            .retain(|c| c.size() >= self.config.min_cluster_size);
        let removed = before - self.clusters.len();
        if removed > 0 {
            tracing::info!(removed, kept = self.clusters.len(), "pruned small clusters");
        }
    }

    fn resynthesize_patterns(&mut self) {
        let detector = Arc::clone(&self.detector);
        let mut patterns: Vec<Pattern> = self
            .clusters
            .iter_mut()
            .map(|c| c.pattern(&detector))
            .collect();
        patterns.sort_by(|a, b| b.support_count.cmp(&a.support_count));
        tracing::info!(count = patterns.len(), "resorted patterns");
        self.patterns = patterns;
    }

    /// Batch processing: preprocessing/tokenization runs in parallel via
    /// `rayon`, but admission is strictly sequential and order-sensitive.
    /// Finishes with one prune and one resynthesis/sort pass and returns a
    /// defensive copy of the resulting pattern list.
    pub fn process(&mut self, lines: &[String]) -> Vec<Pattern> {
        let messages: Vec<Message> = if lines.len() > 1 {
            lines
                .par_iter()
                .filter_map(|line| self.build_message(line))
                .collect()
        } else {
            lines.iter().filter_map(|line| self.build_message(line)).collect()
        };
        for msg in messages {
            self.admit(msg);
            self.admission_count += 1;
        }
        self.prune();
        self.resynthesize_patterns();
        self.patterns.clone()
    }

    /// Streaming admission of a single line. Fires the periodic prune tick
    /// every 100th admission and the periodic resort tick every 50th (or
    /// immediately, if the pattern list is currently empty).
    pub fn process_log_incremental(&mut self, line: &str) {
        let Some(msg) = self.build_message(line) else {
            return;
        };
        self.admit(msg);
        self.admission_count += 1;
        if self.admission_count % 100 == 0 {
            self.prune();
        }
        if self.patterns.is_empty() || self.admission_count % 50 == 0 {
            self.resynthesize_patterns();
        }
    }

    /// Returns the first pattern (in current sort order) whose `matches`
    /// predicate accepts the preprocessed/tokenized line, or `None`.
    pub fn match_pattern(&self, line: &str) -> Option<&Pattern> {
        let msg = self.build_message(line)?;
        self.patterns.iter().find(|p| p.matches(&msg))
    }

    pub fn statistics(&self) -> Statistics {
        let total_messages: usize = self.clusters.iter().map(|c| c.size()).sum();
        let cluster_count = self.clusters.len();
        let pattern_count = self.patterns.len();
        let avg_cluster_size = if cluster_count == 0 {
            0.0
        } else {
            total_messages as f64 / cluster_count as f64
        };
        let avg_pattern_specificity = if pattern_count == 0 {
            0.0
        } else {
            self.patterns.iter().map(|p| p.specificity).sum::<f64>() / pattern_count as f64
        };
        Statistics {
            total_messages,
            cluster_count,
            pattern_count,
            avg_cluster_size,
            avg_pattern_specificity,
        }
    }

    /// Drops all clusters, messages, and cached patterns; resets the
    /// admission counter to zero.
    pub fn clear(&mut self) {
        self.clusters.clear();
        self.patterns.clear();
        self.admission_count = 0;
    }
}
