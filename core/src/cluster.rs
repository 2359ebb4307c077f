use std::sync::Arc;

use crate::{
    detector::VariableDetector,
    message::Message,
    pattern::{self, Pattern},
};

#[derive(Debug)]
pub struct Cluster {
    members: Vec<Message>,
    cached_pattern: Option<Pattern>,
}

impl Cluster {
    pub fn new(first: Message) -> Self {
        Self {
            members: vec![first],
            cached_pattern: None,
        }
    }

    pub fn representative(&self) -> &Message {
        &self.members[0]
    }

    pub fn members(&self) -> &[Message] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn try_admit(&mut self, msg: Message, threshold: f64) -> bool {
        if self.representative().similarity(&msg) >= threshold {
            self.members.push(msg);
            self.cached_pattern = None;
            true
        } else {
            false
        }
    }

    pub fn similarity_to(&self, msg: &Message) -> f64 {
        self.representative().similarity(msg)
    }

    pub fn force_admit(&mut self, msg: Message) {
        self.members.push(msg);
        self.cached_pattern = None;
    }

    pub fn pattern(&mut self, detector: &VariableDetector) -> Pattern {
        if let Some(p) = &self.cached_pattern {
            return p.clone();
        }
        let p = pattern::synthesize(&self.members, detector);
        self.cached_pattern = Some(p.clone());
        p
    }
}
