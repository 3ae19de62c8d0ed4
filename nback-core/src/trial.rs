use serde::{Deserialize, Serialize};

use crate::label::{CorrectLabel, Judgment};

/// One number of the sequence together with the participant's response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub index: usize,
    pub value: u8,
    pub correct: CorrectLabel,
    pub answer: Option<Judgment>,
    /// Milliseconds into the trial at which the answer was given.
    pub latency_ms: Option<u64>,
}

/// Verdict shown in the results table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    Correct,
    Incorrect,
    Unanswered,
    NotJudgeable,
}

impl Trial {
    pub fn new(index: usize, value: u8, correct: CorrectLabel) -> Self {
        Self {
            index,
            value,
            correct,
            answer: None,
            latency_ms: None,
        }
    }

    pub fn is_judgeable(&self) -> bool {
        self.correct.is_comparable()
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Records the answer once. Returns false if the trial cannot take it.
    pub fn record(&mut self, judgment: Judgment, latency_ms: u64) -> bool {
        if !self.is_judgeable() || self.is_answered() {
            return false;
        }
        self.answer = Some(judgment);
        self.latency_ms = Some(latency_ms);
        true
    }

    pub fn is_correct(&self) -> bool {
        self.answer.is_some_and(|a| a.matches(self.correct))
    }

    pub fn outcome(&self) -> TrialOutcome {
        match self.answer {
            _ if !self.is_judgeable() => TrialOutcome::NotJudgeable,
            None => TrialOutcome::Unanswered,
            Some(a) if a.matches(self.correct) => TrialOutcome::Correct,
            Some(_) => TrialOutcome::Incorrect,
        }
    }
}
