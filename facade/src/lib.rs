//! patterloom: a thread-safe streaming/batch facade over
//! [`patterloom_core::Engine`].
//!
//! A single [`std::sync::RwLock`] guards all mutable state. Mutating
//! operations (ingest, `clear`, explicit pattern extraction) take the
//! write side; reads (`get_current_patterns`, `statistics`, `log_count`,
//! `is_anomaly`) take the read side, upgrading to write only when a lazy
//! pattern-snapshot refresh is due.

use std::collections::VecDeque;
use std::sync::RwLock;

use patterloom_core::{Engine, EngineConfig, Pattern, Statistics};

/// Default cap on the batch-mode log buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 100_000;

/// Inputs longer than this are truncated before admission.
pub const MAX_LINE_LENGTH: usize = 10_000;

/// Ingest mode, fixed for the lifetime of a [`PatternEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every `add_log` drives the engine's incremental admission path
    /// immediately; no buffering.
    Streaming,
    /// `add_log`/`add_logs` only buffer raw lines (bounded, FIFO eviction);
    /// `extract_patterns` runs a full batch pass over the buffer.
    Batch,
}

struct State {
    engine: Engine,
    buffer: VecDeque<String>,
    buffer_cap: usize,
    current_patterns: Vec<Pattern>,
    last_pattern_update_count: usize,
}

/// Thread-safe wrapper around an [`Engine`], adding streaming/batch modes,
/// a bounded batch input buffer, and a cached pattern snapshot with a
/// lazy-refresh discipline.
pub struct PatternEngine {
    mode: Mode,
    state: RwLock<State>,
}

impl PatternEngine {
    /// Streaming mode: every ingested line is admitted immediately.
    pub fn streaming(config: EngineConfig) -> Self {
        Self::new(config, Mode::Streaming, DEFAULT_BUFFER_CAPACITY)
    }

    /// Batch mode with the default buffer capacity.
    pub fn batch(config: EngineConfig) -> Self {
        Self::new(config, Mode::Batch, DEFAULT_BUFFER_CAPACITY)
    }

    /// Batch mode with an explicit buffer capacity.
    pub fn batch_with_capacity(config: EngineConfig, buffer_cap: usize) -> Self {
        Self::new(config, Mode::Batch, buffer_cap)
    }

    fn new(config: EngineConfig, mode: Mode, buffer_cap: usize) -> Self {
        Self {
            mode,
            state: RwLock::new(State {
                engine: Engine::new(config),
                buffer: VecDeque::new(),
                buffer_cap,
                current_patterns: Vec::new(),
                last_pattern_update_count: 0,
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Null/whitespace-only input is dropped (returns `None`); input longer
    /// than [`MAX_LINE_LENGTH`] characters is truncated.
    fn sanitize(line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }
        if line.chars().count() > MAX_LINE_LENGTH {
            Some(line.chars().take(MAX_LINE_LENGTH).collect())
        } else {
            Some(line.to_owned())
        }
    }

    /// Ingests one line. Streaming mode admits it immediately and may
    /// refresh the cached snapshot; batch mode only appends it to the
    /// bounded FIFO buffer.
    pub fn add_log(&self, line: &str) {
        let Some(line) = Self::sanitize(line) else {
            tracing::trace!("dropped null/whitespace-only input");
            return;
        };
        let mut state = self.state.write().expect("lock poisoned");
        match self.mode {
            Mode::Streaming => {
                state.engine.process_log_incremental(&line);
                let total = state.engine.admission_count();
                if state.current_patterns.is_empty() || total % 50 == 0 || total == 1 {
                    state.current_patterns = state.engine.patterns().to_vec();
                    state.last_pattern_update_count = total;
                }
            }
            Mode::Batch => push_bounded(&mut state.buffer, line, state.buffer_cap),
        }
    }

    /// Bulk ingest. In streaming mode every line is admitted first, then
    /// the snapshot is refreshed exactly once at the end, instead of the
    /// per-item refresh that `add_log` performs.
    pub fn add_logs(&self, lines: &[String]) {
        let sanitized: Vec<String> = lines.iter().filter_map(|l| Self::sanitize(l)).collect();
        if sanitized.is_empty() {
            return;
        }
        let mut state = self.state.write().expect("lock poisoned");
        match self.mode {
            Mode::Streaming => {
                for line in &sanitized {
                    state.engine.process_log_incremental(line);
                }
                state.current_patterns = state.engine.patterns().to_vec();
                state.last_pattern_update_count = state.engine.admission_count();
            }
            Mode::Batch => {
                for line in sanitized {
                    push_bounded(&mut state.buffer, line, state.buffer_cap);
                }
            }
        }
    }

    /// Batch mode only: runs a full `process` over the current buffer,
    /// replaces the snapshot, and returns a defensive copy.
    pub fn extract_patterns(&self) -> Vec<Pattern> {
        let mut state = self.state.write().expect("lock poisoned");
        let lines: Vec<String> = state.buffer.iter().cloned().collect();
        let patterns = state.engine.process(&lines);
        state.current_patterns = patterns.clone();
        state.last_pattern_update_count = state.engine.admission_count();
        tracing::info!(count = patterns.len(), "extracted patterns from batch buffer");
        patterns
    }

    /// Batch mode: returns a defensive copy of the (possibly stale)
    /// snapshot. Streaming mode: refreshes the snapshot first if the
    /// engine has admitted messages since the last refresh (the lazy
    /// rendezvous).
    pub fn get_current_patterns(&self) -> Vec<Pattern> {
        match self.mode {
            Mode::Batch => self.state.read().expect("lock poisoned").current_patterns.clone(),
            Mode::Streaming => {
                {
                    let state = self.state.read().expect("lock poisoned");
                    if state.engine.admission_count() == state.last_pattern_update_count {
                        return state.current_patterns.clone();
                    }
                }
                let mut state = self.state.write().expect("lock poisoned");
                if state.engine.admission_count() != state.last_pattern_update_count {
                    state.current_patterns = state.engine.patterns().to_vec();
                    state.last_pattern_update_count = state.engine.admission_count();
                }
                state.current_patterns.clone()
            }
        }
    }

    pub fn statistics(&self) -> Statistics {
        self.state.read().expect("lock poisoned").engine.statistics()
    }

    /// Batch mode: number of lines currently buffered. Streaming mode:
    /// total admissions since the last `clear`.
    pub fn log_count(&self) -> usize {
        let state = self.state.read().expect("lock poisoned");
        match self.mode {
            Mode::Batch => state.buffer.len(),
            Mode::Streaming => state.engine.admission_count(),
        }
    }

    /// `false` while the snapshot is empty (cannot decide); otherwise
    /// `true` iff `line` matches none of the current patterns.
    pub fn is_anomaly(&self, line: &str) -> bool {
        if self.get_current_patterns().is_empty() {
            return false;
        }
        let state = self.state.read().expect("lock poisoned");
        state.engine.match_pattern(line).is_none()
    }

    /// Empties the buffer (if any), clears the engine, clears the
    /// snapshot, and resets the watermark.
    pub fn clear(&self) {
        let mut state = self.state.write().expect("lock poisoned");
        state.buffer.clear();
        state.engine.clear();
        state.current_patterns.clear();
        state.last_pattern_update_count = 0;
        tracing::info!("cleared engine state");
    }
}

fn push_bounded(buffer: &mut VecDeque<String>, line: String, cap: usize) {
    if cap == 0 {
        return;
    }
    if buffer.len() >= cap {
        buffer.pop_front();
    }
    buffer.push_back(line);
}
