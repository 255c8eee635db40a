/// Notifications sent from a job to the window that started it, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Status(String),
    Progress(u8),
    FrameSaved { count: u64, filename: String },
    Completed(String),
    Failed(String),
    Stopped,
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerEvent::Completed(_) | WorkerEvent::Failed(_) | WorkerEvent::Stopped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl WorkerState {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            WorkerState::Completed | WorkerState::Failed | WorkerState::Stopped
        )
    }

    /// State after observing `event`. Finished states are final.
    pub fn apply(self, event: &WorkerEvent) -> WorkerState {
        if self.is_finished() {
            return self;
        }
        match event {
            WorkerEvent::Completed(_) => WorkerState::Completed,
            WorkerEvent::Failed(_) => WorkerState::Failed,
            WorkerEvent::Stopped => WorkerState::Stopped,
            WorkerEvent::Status(_) | WorkerEvent::Progress(_) | WorkerEvent::FrameSaved { .. } => {
                WorkerState::Running
            }
        }
    }
}

/// What a job reports when it returns without an error.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Finished normally, with a summary for the user
    Completed(String),
    /// Noticed the cancel flag and bailed out
    Stopped,
}
