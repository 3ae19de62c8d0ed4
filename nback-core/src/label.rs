use serde::{Deserialize, Serialize};

/// A judgment the participant can give for a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    Same,
    Different,
}

/// The answer a trial expects, fixed when the sequence is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectLabel {
    Same,
    Different,
    /// No value exists N positions back.
    #[serde(rename = "none")]
    Incomparable,
}

impl Judgment {
    pub fn matches(&self, label: CorrectLabel) -> bool {
        matches!(
            (self, label),
            (Judgment::Same, CorrectLabel::Same) | (Judgment::Different, CorrectLabel::Different)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Same => "same",
            Judgment::Different => "different",
        }
    }
}

impl CorrectLabel {
    /// Derives the expected answer for `value` given the value `n` steps back, if any.
    pub fn compare(value: u8, n_back_value: Option<u8>) -> Self {
        match n_back_value {
            Some(prev) if prev == value => CorrectLabel::Same,
            Some(_) => CorrectLabel::Different,
            None => CorrectLabel::Incomparable,
        }
    }

    pub fn is_comparable(&self) -> bool {
        !matches!(self, CorrectLabel::Incomparable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectLabel::Same => "same",
            CorrectLabel::Different => "different",
            CorrectLabel::Incomparable => "n/a",
        }
    }
}
