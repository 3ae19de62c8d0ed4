use nback_core::{CorrectLabel, Trial};
use rand::Rng;

use crate::config::ExperimentConfig;

/// Draws a fresh trial sequence for one session.
///
/// Values are uniform in `1..=number_range`; the first `n_back` trials have
/// nothing to compare against and are labelled incomparable.
pub fn generate_sequence<R: Rng>(config: &ExperimentConfig, rng: &mut R) -> Vec<Trial> {
    let range = config.number_range.max(1);
    let mut trials: Vec<Trial> = Vec::with_capacity(config.trial_count);
    for index in 0..config.trial_count {
        let value = rng.random_range(1..=range);
        let lagged = index
            .checked_sub(config.n_back)
            .map(|earlier| trials[earlier].value);
        trials.push(Trial::new(index, value, CorrectLabel::compare(value, lagged)));
    }
    trials
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_config_leaves_two_incomparable_trials() {
        let mut rng = StdRng::seed_from_u64(7);
        let trials = generate_sequence(&ExperimentConfig::default(), &mut rng);
        assert_eq!(trials.len(), 10);
        assert_eq!(trials[0].correct, CorrectLabel::Incomparable);
        assert_eq!(trials[1].correct, CorrectLabel::Incomparable);
        assert_eq!(trials.iter().filter(|t| t.is_judgeable()).count(), 8);
        assert!(trials.iter().all(|t| (1..=4).contains(&t.value)));
        assert!(trials.iter().enumerate().all(|(i, t)| t.index == i));
    }

    #[test]
    fn lag_longer_than_sequence_has_no_judgeable_trials() {
        let config = ExperimentConfig {
            trial_count: 3,
            n_back: 5,
            ..ExperimentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let trials = generate_sequence(&config, &mut rng);
        assert!(trials.iter().all(|t| !t.is_judgeable()));
    }

    #[test]
    fn consecutive_sessions_draw_new_sequences() {
        let config = ExperimentConfig {
            trial_count: 100,
            number_range: 9,
            ..ExperimentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(99);
        let first = generate_sequence(&config, &mut rng);
        let second = generate_sequence(&config, &mut rng);
        assert_ne!(first, second);
    }
}
