pub mod config;
pub mod scoring;
pub mod sequence;
pub mod state;
pub use config::{ConfigField, ExperimentConfig};
pub use scoring::{Score, SessionReport};
pub use sequence::generate_sequence;
pub use state::{AdvanceCause, ExperimentStateMachine, SessionEvent, SessionState, Transition};
