pub mod ticker;
pub mod timer;

pub use ticker::{Ticker, TICK_PERIOD};
pub use timer::{HighPrecisionTimer, Timer, TimingStats};
