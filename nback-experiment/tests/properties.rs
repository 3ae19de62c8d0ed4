//! Property-based tests for sequence generation and session invariants.

use nback_core::{CorrectLabel, Judgment};
use nback_experiment::{generate_sequence, ExperimentConfig, SessionEvent, SessionState};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Strategy: a configuration inside the allowed bounds.
fn config_strategy() -> impl Strategy<Value = ExperimentConfig> {
    (3usize..=100, 2u8..=9, 1usize..=5, 500u64..=6000, 500u64..=3000).prop_map(
        |(trial_count, number_range, n_back, max_response_ms, hold_ms)| ExperimentConfig {
            trial_count,
            number_range,
            n_back,
            max_response_ms,
            hold_ms,
        },
    )
}

/// Strategy: an input stream weighted towards ticks.
fn event_strategy() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        20 => Just(SessionEvent::Tick),
        3 => Just(SessionEvent::Judge(Judgment::Same)),
        3 => Just(SessionEvent::Judge(Judgment::Different)),
        1 => Just(SessionEvent::Start),
        1 => Just(SessionEvent::Stop),
    ]
}

proptest! {
    // 1. Labels follow the lagged value
    #[test]
    fn labels_match_lagged_values(config in config_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let trials = generate_sequence(&config, &mut rng);
        prop_assert_eq!(trials.len(), config.trial_count);
        for (i, trial) in trials.iter().enumerate() {
            prop_assert!((1..=config.number_range).contains(&trial.value));
            if i < config.n_back {
                prop_assert_eq!(trial.correct, CorrectLabel::Incomparable);
            } else {
                let same = trial.value == trials[i - config.n_back].value;
                prop_assert_eq!(trial.correct == CorrectLabel::Same, same);
            }
        }
    }

    // 2. The index never moves backwards within a run, and stays in bounds
    #[test]
    fn index_is_monotonic(
        config in config_strategy(),
        seed in any::<u64>(),
        events in prop::collection::vec(event_strategy(), 1..600),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (mut state, _) = SessionState::new(config).reduce(SessionEvent::Start, &mut rng);
        for event in events {
            let restart = event == SessionEvent::Start && !state.is_running();
            let before = state.current_index();
            let (next, _) = state.reduce(event, &mut rng);
            state = next;
            if !restart {
                prop_assert!(state.current_index() >= before);
            }
            if let Some(i) = state.current_index() {
                prop_assert!(i < state.trials().len());
            }
        }
    }

    // 3. Answers are write-once and only land on judgeable trials
    #[test]
    fn answers_are_write_once(
        config in config_strategy(),
        seed in any::<u64>(),
        events in prop::collection::vec(event_strategy(), 1..600),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (mut state, _) = SessionState::new(config).reduce(SessionEvent::Start, &mut rng);
        for event in events {
            if event == SessionEvent::Start {
                continue;
            }
            let before = state.trials().to_vec();
            let (next, _) = state.reduce(event, &mut rng);
            state = next;
            for (old, new) in before.iter().zip(state.trials()) {
                if old.answer.is_some() {
                    prop_assert_eq!(old, new);
                }
                if new.answer.is_some() {
                    prop_assert!(new.is_judgeable());
                }
            }
        }
    }

    // 4. Nothing changes once the session is idle, except a restart
    #[test]
    fn idle_session_is_inert(
        config in config_strategy(),
        seed in any::<u64>(),
        events in prop::collection::vec(event_strategy(), 1..200),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (state, _) = SessionState::new(config).reduce(SessionEvent::Start, &mut rng);
        let (state, _) = state.reduce(SessionEvent::Tick, &mut rng);
        let (mut state, _) = state.reduce(SessionEvent::Stop, &mut rng);
        let frozen = state.clone();
        for event in events.into_iter().filter(|e| *e != SessionEvent::Start) {
            let (next, _) = state.reduce(event, &mut rng);
            state = next;
        }
        prop_assert_eq!(state, frozen);
    }
}
