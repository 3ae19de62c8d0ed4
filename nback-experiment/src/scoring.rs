use nback_core::Trial;
use serde::Serialize;

/// Aggregate statistics over the judgeable trials of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Score {
    pub judgeable: usize,
    pub answered: usize,
    pub correct: usize,
    pub latency_total_ms: u64,
}

impl Score {
    pub fn from_trials(trials: &[Trial]) -> Self {
        trials
            .iter()
            .filter(|t| t.is_judgeable())
            .fold(Score::default(), |mut score, trial| {
                score.judgeable += 1;
                if let Some(latency) = trial.latency_ms {
                    score.answered += 1;
                    score.latency_total_ms += latency;
                }
                if trial.is_correct() {
                    score.correct += 1;
                }
                score
            })
    }

    /// Fraction of judgeable trials answered correctly; 0 when none are judgeable.
    pub fn accuracy(&self) -> f64 {
        if self.judgeable == 0 {
            return 0.0;
        }
        self.correct as f64 / self.judgeable as f64
    }

    pub fn accuracy_percent(&self) -> u32 {
        (self.accuracy() * 100.0).round() as u32
    }

    pub fn mean_latency_ms(&self) -> Option<f64> {
        (self.answered > 0).then(|| self.latency_total_ms as f64 / self.answered as f64)
    }

    pub fn rounded_mean_latency_ms(&self) -> Option<u64> {
        self.mean_latency_ms().map(|ms| ms.round() as u64)
    }
}

/// End-of-session summary, logged as JSON
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub score: Score,
    pub accuracy: f64,
    pub mean_latency_ms: Option<f64>,
    pub trials: &'a [Trial],
}

impl<'a> SessionReport<'a> {
    pub fn new(trials: &'a [Trial]) -> Self {
        let score = Score::from_trials(trials);
        Self {
            score,
            accuracy: score.accuracy(),
            mean_latency_ms: score.mean_latency_ms(),
            trials,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
