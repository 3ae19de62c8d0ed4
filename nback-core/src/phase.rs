/// Lifecycle of an N-back session
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
}

impl SessionPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, SessionPhase::Running)
    }

    /// Judgment keys are only live while a session runs.
    pub fn allows_judgment(&self) -> bool {
        self.is_running()
    }

    /// Settings can only be edited between sessions.
    pub fn allows_configuration(&self) -> bool {
        matches!(self, SessionPhase::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "stopped",
            SessionPhase::Running => "running",
        }
    }
}
