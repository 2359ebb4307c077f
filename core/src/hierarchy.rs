use rayon::prelude::*;

use crate::{engine::Engine, pattern::{is_wildcard_token, Pattern}};

const DEFAULT_THRESHOLDS: &[f64] = &[0.5, 0.7, 0.9];

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub level: usize,
    pub threshold: f64,
    pub pattern: Pattern,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl HierarchyNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl PartialEq for HierarchyNode {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level
            && self.threshold == other.threshold
            && self.pattern == other.pattern
    }
}

#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<HierarchyNode>,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, idx: usize) -> &HierarchyNode {
        &self.nodes[idx]
    }

    pub fn roots(&self) -> impl Iterator<Item = (usize, &HierarchyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_root())
    }

    pub fn children(&self, idx: usize) -> impl Iterator<Item = (usize, &HierarchyNode)> + '_ {
        self.nodes[idx]
            .children
            .iter()
            .map(move |&c| (c, &self.nodes[c]))
    }

    pub fn get_patterns_at_level(&self, idx: usize, level: usize) -> Vec<&Pattern> {
        self.subtree(idx)
            .into_iter()
            .filter(|&i| self.nodes[i].level == level)
            .map(|i| &self.nodes[i].pattern)
            .collect()
    }

    pub fn get_path_from_root(&self, idx: usize) -> Vec<Pattern> {
        let mut path = Vec::new();
        let mut cur = Some(idx);
        while let Some(i) = cur {
            path.push(self.nodes[i].pattern.clone());
            cur = self.nodes[i].parent;
        }
        path.reverse();
        path
    }

    fn subtree(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.nodes[i].children.iter().copied());
        }
        out
    }
}

impl Engine {
    pub fn extract_hierarchical_patterns(&self) -> Forest {
        let thresholds: Vec<f64> = if self.config().hierarchy_thresholds().is_empty() {
            DEFAULT_THRESHOLDS.to_vec()
        } else {
            self.config().hierarchy_thresholds().to_vec()
        };

        let raw_lines: Vec<String> = self
            .clusters()
            .iter()
            .flat_map(|c| c.members().iter().map(|m| m.raw.clone()))
            .collect();

        let level_patterns: Vec<Vec<Pattern>> = thresholds
            .par_iter()
            .map(|&threshold| {
                let mut cfg = self.config().clone();
                cfg.similarity_threshold = threshold;
                let mut engine = Engine::new(cfg);
                engine.process(&raw_lines)
            })
            .collect();

        build_forest(&thresholds, level_patterns)
    }
}

fn build_forest(thresholds: &[f64], level_patterns: Vec<Vec<Pattern>>) -> Forest {
    let mut nodes: Vec<HierarchyNode> = Vec::new();
    let mut current_level_indices: Vec<usize> = Vec::new();

    if let Some(roots) = level_patterns.first() {
        for p in roots {
            nodes.push(HierarchyNode {
                level: 0,
                threshold: thresholds[0],
                pattern: p.clone(),
                parent: None,
                children: Vec::new(),
            });
            current_level_indices.push(nodes.len() - 1);
        }
    }

    for (level, patterns) in level_patterns.iter().enumerate().skip(1) {
        let mut next_level_indices = Vec::new();
        for p in patterns {
            let mut best: Option<(usize, usize)> = None;
            for &candidate in &current_level_indices {
                let score = common_literal_count(p, &nodes[candidate].pattern);
                if score == 0 {
                    continue;
                }
                match best {
                    Some((_, best_score)) if best_score >= score => {}
                    _ => best = Some((candidate, score)),
                }
            }
            if let Some((parent_idx, _)) = best {
                let node_idx = nodes.len();
                nodes.push(HierarchyNode {
                    level,
                    threshold: thresholds[level],
                    pattern: p.clone(),
                    parent: Some(parent_idx),
                    children: Vec::new(),
                });
                nodes[parent_idx].children.push(node_idx);
                next_level_indices.push(node_idx);
            }
            // No candidate shared a literal token: discarded, no orphans admitted.
        }
        current_level_indices = next_level_indices;
    }

    Forest { nodes }
}

fn common_literal_count(p: &Pattern, parent: &Pattern) -> usize {
    p.pattern_tokens
        .iter()
        .zip(parent.pattern_tokens.iter())
        .filter(|(a, b)| !is_wildcard_token(a) && !is_wildcard_token(b) && a == b)
        .count()
}
