use nback_core::{Judgment, SessionPhase, Trial};
use nback_timing::TICK_PERIOD;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::ExperimentConfig;
use crate::scoring::{Score, SessionReport};
use crate::sequence::generate_sequence;

/// Milliseconds credited to the current trial per tick.
pub const TICK_MS: u64 = TICK_PERIOD.as_millis() as u64;

/// Inputs to the session state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    Stop,
    Tick,
    Judge(Judgment),
    Configure(ExperimentConfig),
}

/// Why the session moved on from a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCause {
    /// The tick before the first trial, which advances immediately.
    LeadIn,
    Timeout,
    /// The answer has been held on screen for the hold duration.
    Settled,
}

/// What a single event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Ignored,
    Waiting { elapsed_ms: u64 },
    Started { trials: usize },
    Advanced { index: usize, cause: AdvanceCause },
    Answered { index: usize, judgment: Judgment, latency_ms: u64 },
    Completed { cause: AdvanceCause },
    Stopped { index: Option<usize> },
    Reconfigured,
}

impl Transition {
    /// True when the session left the running phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Transition::Completed { .. } | Transition::Stopped { .. })
    }
}

/// The whole mutable state of one N-back run.
///
/// Every event consumes the state and returns its successor through
/// [`SessionState::reduce`]; nothing mutates fields in place from outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    config: ExperimentConfig,
    trials: Vec<Trial>,
    /// `None` before the first trial is shown.
    current: Option<usize>,
    elapsed_ms: u64,
    phase: SessionPhase,
}

impl SessionState {
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config: config.clamped(),
            ..Self::default()
        }
    }

    pub fn reduce<R: Rng>(self, event: SessionEvent, rng: &mut R) -> (Self, Transition) {
        match event {
            SessionEvent::Start => self.start(rng),
            SessionEvent::Stop => self.stop(),
            SessionEvent::Tick => self.tick(),
            SessionEvent::Judge(judgment) => self.judge(judgment),
            SessionEvent::Configure(config) => self.configure(config),
        }
    }

    fn start<R: Rng>(self, rng: &mut R) -> (Self, Transition) {
        if self.phase.is_running() {
            return (self, Transition::Ignored);
        }
        let trials = generate_sequence(&self.config, rng);
        let count = trials.len();
        let next = Self {
            trials,
            current: None,
            elapsed_ms: 0,
            phase: SessionPhase::Running,
            ..self
        };
        (next, Transition::Started { trials: count })
    }

    fn stop(self) -> (Self, Transition) {
        if !self.phase.is_running() {
            return (self, Transition::Ignored);
        }
        let index = self.current;
        let next = Self {
            phase: SessionPhase::Idle,
            ..self
        };
        (next, Transition::Stopped { index })
    }

    fn tick(self) -> (Self, Transition) {
        if !self.phase.is_running() {
            return (self, Transition::Ignored);
        }
        let elapsed_ms = self.elapsed_ms.saturating_add(TICK_MS);
        let cause = match self.current {
            None => Some(AdvanceCause::LeadIn),
            Some(_) if elapsed_ms >= self.config.max_response_ms => Some(AdvanceCause::Timeout),
            Some(index) => self
                .trials
                .get(index)
                .and_then(|t| t.latency_ms)
                .filter(|answered_at| elapsed_ms >= answered_at.saturating_add(self.config.hold_ms))
                .map(|_| AdvanceCause::Settled),
        };
        let next = Self { elapsed_ms, ..self };
        match cause {
            Some(cause) => next.advance(cause),
            None => (next, Transition::Waiting { elapsed_ms }),
        }
    }

    fn advance(self, cause: AdvanceCause) -> (Self, Transition) {
        let index = self.current.map_or(0, |i| i + 1);
        if index >= self.trials.len() {
            let next = Self {
                phase: SessionPhase::Idle,
                ..self
            };
            return (next, Transition::Completed { cause });
        }
        let next = Self {
            current: Some(index),
            elapsed_ms: 0,
            ..self
        };
        (next, Transition::Advanced { index, cause })
    }

    fn judge(mut self, judgment: Judgment) -> (Self, Transition) {
        if !self.phase.allows_judgment() {
            return (self, Transition::Ignored);
        }
        let Some(index) = self.current else {
            return (self, Transition::Ignored);
        };
        let latency_ms = self.elapsed_ms;
        let recorded = self
            .trials
            .get_mut(index)
            .is_some_and(|trial| trial.record(judgment, latency_ms));
        if !recorded {
            return (self, Transition::Ignored);
        }
        (
            self,
            Transition::Answered {
                index,
                judgment,
                latency_ms,
            },
        )
    }

    fn configure(self, config: ExperimentConfig) -> (Self, Transition) {
        if !self.phase.allows_configuration() {
            return (self, Transition::Ignored);
        }
        let next = Self {
            config: config.clamped(),
            ..self
        };
        (next, Transition::Reconfigured)
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.current.and_then(|i| self.trials.get(i))
    }

    /// One-based position of the current trial, 0 during the lead-in.
    pub fn position(&self) -> usize {
        self.current.map_or(0, |i| i + 1)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whether the trial on screen has a defined answer.
    pub fn current_is_judgeable(&self) -> bool {
        self.current_trial().is_some_and(Trial::is_judgeable)
    }

    /// Results are shown once a session has run and is no longer running.
    pub fn has_results(&self) -> bool {
        !self.is_running() && !self.trials.is_empty()
    }

    pub fn score(&self) -> Score {
        Score::from_trials(&self.trials)
    }
}

/// Owns the session state and its random source, and logs every transition
pub struct ExperimentStateMachine<R: Rng> {
    state: SessionState,
    rng: R,
}

impl<R: Rng> ExperimentStateMachine<R> {
    pub fn new(config: ExperimentConfig, rng: R) -> Self {
        Self {
            state: SessionState::new(config),
            rng,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Transition {
        let state = std::mem::take(&mut self.state);
        let (next, transition) = state.reduce(event, &mut self.rng);
        self.state = next;
        self.log_transition(&transition);
        transition
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn log_transition(&self, transition: &Transition) {
        match transition {
            Transition::Started { trials } => {
                let config = self.state.config();
                info!(
                    trials,
                    n_back = config.n_back,
                    number_range = config.number_range,
                    "session started"
                );
            }
            Transition::Advanced { index, cause } => {
                let value = self.state.trials().get(*index).map(|t| t.value);
                debug!(index, ?value, ?cause, "trial presented");
            }
            Transition::Answered {
                index,
                judgment,
                latency_ms,
            } => {
                debug!(index, judgment = judgment.as_str(), latency_ms, "response recorded");
            }
            Transition::Completed { .. } => {
                info!("session completed");
                self.log_results();
            }
            Transition::Stopped { index } => {
                info!(?index, "session stopped");
                self.log_results();
            }
            Transition::Reconfigured => {
                debug!(config = ?self.state.config(), "configuration updated");
            }
            Transition::Ignored | Transition::Waiting { .. } => {}
        }
    }

    fn log_results(&self) {
        let report = SessionReport::new(self.state.trials());
        info!(
            correct = report.score.correct,
            judgeable = report.score.judgeable,
            accuracy_percent = report.score.accuracy_percent(),
            mean_latency_ms = ?report.score.rounded_mean_latency_ms(),
            "session results"
        );
        match report.to_json() {
            Ok(json) => debug!(report = %json, "session report"),
            Err(e) => warn!("failed to serialize session report: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn running(config: ExperimentConfig) -> (SessionState, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let (state, t) = SessionState::new(config).reduce(SessionEvent::Start, &mut rng);
        assert_eq!(t, Transition::Started { trials: config.clamped().trial_count });
        (state, rng)
    }

    #[test]
    fn lead_in_tick_advances_immediately() {
        let (state, mut rng) = running(ExperimentConfig::default());
        assert_eq!(state.current_index(), None);
        assert_eq!(state.position(), 0);
        let (state, t) = state.reduce(SessionEvent::Tick, &mut rng);
        assert_eq!(
            t,
            Transition::Advanced {
                index: 0,
                cause: AdvanceCause::LeadIn
            }
        );
        assert_eq!(state.elapsed_ms(), 0);
        assert_eq!(state.position(), 1);
    }

    #[test]
    fn tick_accumulates_fixed_period() {
        let (state, mut rng) = running(ExperimentConfig::default());
        let (state, _) = state.reduce(SessionEvent::Tick, &mut rng);
        let (state, t) = state.reduce(SessionEvent::Tick, &mut rng);
        assert_eq!(t, Transition::Waiting { elapsed_ms: 50 });
        assert_eq!(state.elapsed_ms(), 50);
    }

    #[test]
    fn judging_an_incomparable_trial_is_ignored() {
        let (state, mut rng) = running(ExperimentConfig::default());
        let (state, _) = state.reduce(SessionEvent::Tick, &mut rng);
        let (state, t) = state.reduce(SessionEvent::Judge(Judgment::Same), &mut rng);
        assert_eq!(t, Transition::Ignored);
        assert!(!state.current_is_judgeable());
        assert!(state.trials()[0].answer.is_none());
    }

    #[test]
    fn judging_before_the_first_trial_is_ignored() {
        let (state, mut rng) = running(ExperimentConfig::default());
        let (_, t) = state.reduce(SessionEvent::Judge(Judgment::Different), &mut rng);
        assert_eq!(t, Transition::Ignored);
    }

    #[test]
    fn start_while_running_keeps_the_sequence() {
        let (state, mut rng) = running(ExperimentConfig::default());
        let before = state.trials().to_vec();
        let (state, t) = state.reduce(SessionEvent::Start, &mut rng);
        assert_eq!(t, Transition::Ignored);
        assert_eq!(state.trials(), before.as_slice());
    }

    #[test]
    fn configure_is_refused_while_running() {
        let (state, mut rng) = running(ExperimentConfig::default());
        let wider = ExperimentConfig {
            number_range: 9,
            ..ExperimentConfig::default()
        };
        let (state, t) = state.reduce(SessionEvent::Configure(wider), &mut rng);
        assert_eq!(t, Transition::Ignored);
        assert_eq!(state.config().number_range, 4);
    }

    #[test]
    fn configure_while_idle_clamps() {
        let mut rng = StdRng::seed_from_u64(3);
        let state = SessionState::default();
        let wild = ExperimentConfig {
            trial_count: 1000,
            ..ExperimentConfig::default()
        };
        let (state, t) = state.reduce(SessionEvent::Configure(wild), &mut rng);
        assert_eq!(t, Transition::Reconfigured);
        assert_eq!(state.config().trial_count, 100);
    }

    #[test]
    fn stop_when_idle_is_ignored() {
        let mut rng = StdRng::seed_from_u64(3);
        let (state, t) = SessionState::default().reduce(SessionEvent::Stop, &mut rng);
        assert_eq!(t, Transition::Ignored);
        assert!(!state.has_results());
    }
}
