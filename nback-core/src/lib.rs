pub mod label;
pub mod phase;
pub mod trial;

pub use label::{CorrectLabel, Judgment};
pub use phase::SessionPhase;
pub use trial::{Trial, TrialOutcome};
