use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub const TRIAL_COUNT_BOUNDS: RangeInclusive<usize> = 3..=100;
pub const NUMBER_RANGE_BOUNDS: RangeInclusive<u8> = 2..=9;
pub const N_BACK_BOUNDS: RangeInclusive<usize> = 1..=5;
pub const MIN_RESPONSE_WINDOW_MS: u64 = 500;
pub const MIN_HOLD_MS: u64 = 500;

/// User-adjustable session parameters, persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub trial_count: usize,
    /// Values are drawn from `1..=number_range`.
    pub number_range: u8,
    pub n_back: usize,
    pub max_response_ms: u64,
    /// How long an answered trial stays on screen before advancing.
    pub hold_ms: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trial_count: 10,
            number_range: 4,
            n_back: 2,
            max_response_ms: 5000,
            hold_ms: 1500,
        }
    }
}

impl ExperimentConfig {
    /// Pulls every field back into its allowed range.
    pub fn clamped(self) -> Self {
        Self {
            trial_count: self
                .trial_count
                .clamp(*TRIAL_COUNT_BOUNDS.start(), *TRIAL_COUNT_BOUNDS.end()),
            number_range: self
                .number_range
                .clamp(*NUMBER_RANGE_BOUNDS.start(), *NUMBER_RANGE_BOUNDS.end()),
            n_back: self
                .n_back
                .clamp(*N_BACK_BOUNDS.start(), *N_BACK_BOUNDS.end()),
            max_response_ms: self.max_response_ms.max(MIN_RESPONSE_WINDOW_MS),
            hold_ms: self.hold_ms.max(MIN_HOLD_MS),
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == self.clamped()
    }

    /// Number of trials with a defined correct answer.
    pub fn judgeable_count(&self) -> usize {
        self.trial_count.saturating_sub(self.n_back)
    }
}

/// The editable settings fields, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    TrialCount,
    NumberRange,
    NBack,
    MaxResponseMs,
    HoldMs,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::TrialCount,
        ConfigField::NumberRange,
        ConfigField::NBack,
        ConfigField::MaxResponseMs,
        ConfigField::HoldMs,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConfigField::TrialCount => "Trials",
            ConfigField::NumberRange => "Number range",
            ConfigField::NBack => "N-back",
            ConfigField::MaxResponseMs => "Max answer time (ms)",
            ConfigField::HoldMs => "Hold after answer (ms)",
        }
    }

    pub fn step(&self) -> u64 {
        match self {
            ConfigField::MaxResponseMs | ConfigField::HoldMs => 100,
            _ => 1,
        }
    }

    pub fn value(&self, config: &ExperimentConfig) -> u64 {
        match self {
            ConfigField::TrialCount => config.trial_count as u64,
            ConfigField::NumberRange => config.number_range as u64,
            ConfigField::NBack => config.n_back as u64,
            ConfigField::MaxResponseMs => config.max_response_ms,
            ConfigField::HoldMs => config.hold_ms,
        }
    }

    /// Moves the field by `steps` increments and clamps the result.
    pub fn adjust(&self, config: ExperimentConfig, steps: i64) -> ExperimentConfig {
        let delta = steps.unsigned_abs().saturating_mul(self.step());
        let current = self.value(&config);
        let next = if steps >= 0 {
            current.saturating_add(delta)
        } else {
            current.saturating_sub(delta)
        };
        let mut out = config;
        match self {
            ConfigField::TrialCount => out.trial_count = usize::try_from(next).unwrap_or(usize::MAX),
            ConfigField::NumberRange => out.number_range = u8::try_from(next).unwrap_or(u8::MAX),
            ConfigField::NBack => out.n_back = usize::try_from(next).unwrap_or(usize::MAX),
            ConfigField::MaxResponseMs => out.max_response_ms = next,
            ConfigField::HoldMs => out.hold_ms = next,
        }
        out.clamped()
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
