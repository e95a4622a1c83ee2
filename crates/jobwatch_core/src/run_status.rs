/// Whether a remote search run is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSignal {
    Started,
    Finished,
}

const START_MARKERS: &[&str] = &["started"];
const FINISH_MARKERS: &[&str] = &["done", "finished", "completed", "error"];

/// Substring classifier over free-form status text, case-insensitive.
///
/// Text carrying both a start and a finish marker classifies as `Finished`.
pub fn classify_status(text: &str) -> Option<RunSignal> {
    let lowered = text.to_lowercase();
    if FINISH_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        Some(RunSignal::Finished)
    } else if START_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        Some(RunSignal::Started)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStatusTracker {
    status: RunStatus,
}

impl RunStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Feeds one status text; returns true when the state changed.
    pub fn observe(&mut self, text: &str) -> bool {
        let next = match (self.status, classify_status(text)) {
            (RunStatus::Idle, Some(RunSignal::Started)) => RunStatus::Running,
            (RunStatus::Running, Some(RunSignal::Finished)) => RunStatus::Idle,
            (current, _) => current,
        };
        let changed = next != self.status;
        self.status = next;
        changed
    }
}
