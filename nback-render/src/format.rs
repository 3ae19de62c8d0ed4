//! Text shown on screen, kept free of drawing so it can be tested headless.

use nback_core::{Judgment, Trial, TrialOutcome};
use nback_experiment::{ConfigField, ExperimentConfig, Score, SessionState};

pub const TITLE: &str = "try N-back";
pub const JUDGE_LEGEND: &str = "Left arrow = same, Right arrow = different";
pub const RUNNING_KEYS: &str = "ESC: stop";
pub const IDLE_KEYS: &str = "SPACE: start   Up/Down: select   Left/Right: adjust   ESC: quit";
pub const PLACEHOLDER: &str = "—";

pub fn status_line(state: &SessionState) -> String {
    format!("Status: {}", state.phase().as_str())
}

pub fn progress_line(state: &SessionState) -> String {
    format!("Trial: {} / {}", state.position(), state.trials().len())
}

/// The big number in the middle of the screen.
pub fn board_text(state: &SessionState) -> String {
    state
        .current_trial()
        .map_or_else(|| PLACEHOLDER.to_string(), |t| t.value.to_string())
}

pub fn helper_line(state: &SessionState) -> String {
    if state.is_running() && !state.current_is_judgeable() {
        format!(
            "The first {} numbers cannot be compared",
            state.config().n_back
        )
    } else {
        JUDGE_LEGEND.to_string()
    }
}

pub fn accuracy_line(score: &Score) -> String {
    format!(
        "Correct: {} / {} ({}%)",
        score.correct,
        score.judgeable,
        score.accuracy_percent()
    )
}

pub fn latency_line(score: &Score) -> String {
    let mean = score
        .rounded_mean_latency_ms()
        .map_or_else(|| PLACEHOLDER.to_string(), |ms| ms.to_string());
    format!("Average latency: {} ms", mean)
}

pub fn answer_text(answer: Option<Judgment>) -> &'static str {
    answer.map_or(PLACEHOLDER, |a| a.as_str())
}

pub fn latency_text(latency_ms: Option<u64>) -> String {
    latency_ms.map_or_else(|| PLACEHOLDER.to_string(), |ms| ms.to_string())
}

pub fn verdict_text(outcome: TrialOutcome) -> &'static str {
    match outcome {
        TrialOutcome::Correct => "O",
        TrialOutcome::Incorrect => "X",
        TrialOutcome::NotJudgeable => PLACEHOLDER,
        TrialOutcome::Unanswered => "no answer",
    }
}

pub const TABLE_HEADER: [&str; 6] = ["#", "Number", "Correct", "Answer", "Latency (ms)", "Verdict"];

/// One line of the results table
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub cells: [String; 6],
    pub outcome: TrialOutcome,
}

impl ResultRow {
    pub fn from_trial(trial: &Trial) -> Self {
        let outcome = trial.outcome();
        Self {
            cells: [
                (trial.index + 1).to_string(),
                trial.value.to_string(),
                trial.correct.as_str().to_string(),
                answer_text(trial.answer).to_string(),
                latency_text(trial.latency_ms),
                verdict_text(outcome).to_string(),
            ],
            outcome,
        }
    }
}

pub fn result_rows(trials: &[Trial]) -> Vec<ResultRow> {
    trials.iter().map(ResultRow::from_trial).collect()
}

/// Splits `total` rows into (shown, hidden) for `capacity` lines, keeping a
/// line free for the overflow note when rows are hidden.
pub fn visible_rows(total: usize, capacity: usize) -> (usize, usize) {
    if total <= capacity {
        (total, 0)
    } else {
        let shown = capacity.saturating_sub(1);
        (shown, total - shown)
    }
}

pub fn overflow_line(hidden: usize) -> String {
    format!("… {} more", hidden)
}

/// One settings panel line and whether it is the selected field.
pub fn settings_lines(config: &ExperimentConfig, selected: ConfigField) -> Vec<(String, bool)> {
    ConfigField::ALL
        .iter()
        .map(|field| {
            (
                format!("{}: {}", field.label(), field.value(config)),
                *field == selected,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_core::CorrectLabel;
    use nback_experiment::SessionEvent;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn started() -> (SessionState, StdRng) {
        let mut rng = StdRng::seed_from_u64(5);
        let (state, _) = SessionState::new(ExperimentConfig::default())
            .reduce(SessionEvent::Start, &mut rng);
        (state, rng)
    }

    #[test]
    fn lead_in_shows_placeholder_and_zero_progress() {
        let (state, _) = started();
        assert_eq!(board_text(&state), PLACEHOLDER);
        assert_eq!(progress_line(&state), "Trial: 0 / 10");
        assert_eq!(status_line(&state), "Status: running");
        assert_eq!(helper_line(&state), "The first 2 numbers cannot be compared");
    }

    #[test]
    fn first_trial_shows_its_value() {
        let (state, mut rng) = started();
        let (state, _) = state.reduce(SessionEvent::Tick, &mut rng);
        assert_eq!(board_text(&state), state.trials()[0].value.to_string());
        assert_eq!(progress_line(&state), "Trial: 1 / 10");
    }

    #[test]
    fn idle_helper_shows_key_legend() {
        let state = SessionState::default();
        assert_eq!(helper_line(&state), JUDGE_LEGEND);
        assert_eq!(status_line(&state), "Status: stopped");
    }

    #[test]
    fn summary_lines_round_and_fall_back() {
        let score = Score {
            judgeable: 8,
            answered: 3,
            correct: 3,
            latency_total_ms: 2000,
        };
        assert_eq!(accuracy_line(&score), "Correct: 3 / 8 (38%)");
        assert_eq!(latency_line(&score), "Average latency: 667 ms");
        assert_eq!(latency_line(&Score::default()), "Average latency: — ms");
    }

    #[test]
    fn rows_mark_each_outcome() {
        let mut answered = Trial::new(2, 3, CorrectLabel::Same);
        answered.record(Judgment::Different, 750);
        let rows = result_rows(&[
            Trial::new(0, 1, CorrectLabel::Incomparable),
            Trial::new(1, 3, CorrectLabel::Different),
            answered,
        ]);
        assert_eq!(rows[0].cells[5], PLACEHOLDER);
        assert_eq!(rows[1].cells[5], "no answer");
        assert_eq!(
            rows[2].cells,
            ["3", "3", "same", "different", "750", "X"].map(String::from)
        );
        assert_eq!(rows[2].outcome, TrialOutcome::Incorrect);
    }

    #[test]
    fn overflow_reserves_a_line() {
        assert_eq!(visible_rows(10, 12), (10, 0));
        assert_eq!(visible_rows(12, 12), (12, 0));
        assert_eq!(visible_rows(100, 12), (11, 89));
        assert_eq!(visible_rows(5, 0), (0, 5));
    }

    #[test]
    fn settings_lines_flag_selection() {
        let lines = settings_lines(&ExperimentConfig::default(), ConfigField::NBack);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], ("N-back: 2".to_string(), true));
        assert_eq!(lines[3].0, "Max answer time (ms): 5000");
        assert!(!lines[0].1);
    }
}
