use jobwatch_core::{
    AppState, AppViewModel, BackendStatus, ConnectionState, JobRowView, JobStage, LogEntry, Notice,
    RunStatus, ScoreBand,
};

/// Turns successive states into console lines, printing each log line once
/// and the status line only when it changes. Reads the state in place; only
/// unseen log lines are visited.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    last_log_seq: u64,
    last_status: Option<String>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, state: &AppState) -> Vec<String> {
        let mut fresh: Vec<&LogEntry> = state
            .logs()
            .iter()
            .rev()
            .take_while(|entry| entry.seq() > self.last_log_seq)
            .collect();
        fresh.reverse();
        let mut lines: Vec<String> = fresh.iter().map(|entry| log_line(entry)).collect();
        if let Some(last) = fresh.last() {
            self.last_log_seq = last.seq();
        }

        let status = status_line(state);
        if self.last_status.as_deref() != Some(status.as_str()) {
            lines.push(status.clone());
            self.last_status = Some(status);
        }
        lines
    }
}

pub fn log_line(entry: &LogEntry) -> String {
    format!(
        "{} [{}] {}",
        entry.at.format("%H:%M:%S"),
        entry.level,
        entry.message
    )
}

pub fn status_line(state: &AppState) -> String {
    let connection = match state.connection() {
        ConnectionState::Connected => "connected",
        ConnectionState::Disconnected => "disconnected",
    };
    let run = match state.run_status() {
        RunStatus::Idle => "idle",
        RunStatus::Running => "running",
    };
    let backend = match state.backend() {
        BackendStatus::Unknown => "unknown",
        BackendStatus::Reachable => "reachable",
        BackendStatus::Unreachable => "unreachable",
    };
    let mut text = format!(
        "-- stream: {} | run: {} | backend: {} | jobs: {} | logs: {}",
        connection,
        run,
        backend,
        state.jobs().len(),
        state.logs().appended_since_clear()
    );
    if let Some(event) = state.last_event() {
        text.push_str(&format!(" | last: {event}"));
    }
    text
}

pub fn notice_line(notice: &Notice) -> String {
    format!("== {}: {}", notice.title, notice.message)
}

pub fn job_table(view: &AppViewModel) -> Vec<String> {
    if view.jobs.is_empty() {
        return vec!["(no jobs yet)".to_string()];
    }
    view.jobs.iter().flat_map(job_card).collect()
}

fn job_card(job: &JobRowView) -> Vec<String> {
    let band = match job.band {
        ScoreBand::High => "HIGH",
        ScoreBand::Mid => "MID ",
        ScoreBand::Low => "LOW ",
    };
    let stage = match job.stage {
        JobStage::Found => "found",
        JobStage::Analyzed => "analyzed",
    };
    let mut lines = vec![format!(
        "{:>3}% {} {} @ {} [{}]",
        job.match_percent, band, job.title, job.company, stage
    )];
    lines.push(format!(
        "     {} | {} | {} | {}",
        job.location, job.job_type, job.experience_level, job.salary
    ));
    if !job.match_reasons.is_empty() {
        lines.push(format!("     + {}", job.match_reasons.join("; ")));
    }
    if !job.red_flags.is_empty() {
        lines.push(format!("     ! {}", job.red_flags.join("; ")));
    }
    if !job.matching_skills.is_empty() || !job.missing_skills.is_empty() {
        lines.push(format!(
            "     skills: have [{}] missing [{}]",
            job.matching_skills.join(", "),
            job.missing_skills.join(", ")
        ));
    }
    if !job.url.is_empty() {
        lines.push(format!("     {}", job.url));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use jobwatch_core::{update, AppState, Msg};
    use pretty_assertions::assert_eq;

    fn frame(state: AppState, text: &str) -> AppState {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let (state, _) = update(
            state,
            Msg::FrameReceived {
                session: 0,
                text: text.to_string(),
                at,
            },
        );
        state
    }

    #[test]
    fn log_lines_are_printed_once() {
        let mut renderer = ConsoleRenderer::new();
        let state = frame(
            AppState::new(),
            r#"{"type":"log","payload":{"level":"warn","msg":"slow page"}}"#,
        );

        let first = renderer.render(&state);
        assert_eq!(first[0], "09:30:00 [WARN] slow page");
        assert!(first[1].starts_with("-- stream: disconnected"));

        assert!(renderer.render(&state).is_empty());

        let state = frame(state, r#"{"type":"status","payload":"search started"}"#);
        let next = renderer.render(&state);
        assert_eq!(next[0], "09:30:00 [INFO] Status: search started");
        assert!(next[1].contains("run: running"));
    }

    #[test]
    fn only_lines_after_the_last_render_are_printed() {
        let mut renderer = ConsoleRenderer::new();
        let mut state = AppState::new();
        for n in 0..3 {
            state = frame(state, &format!(r#"{{"type":"log","payload":{{"msg":"line {n}"}}}}"#));
        }
        assert_eq!(renderer.render(&state).len(), 4);

        let state = frame(state, r#"{"type":"log","payload":{"msg":"line 3"}}"#);
        let lines = renderer.render(&state);
        assert_eq!(lines[0], "09:30:00 [INFO] line 3");
        assert_eq!(lines.len(), 2);

        let (state, _) = update(state, Msg::ClearClicked);
        let lines = renderer.render(&state);
        assert_eq!(lines, vec![status_line(&state)]);
        assert!(lines[0].contains("logs: 0"));

        let state = frame(state, r#"{"type":"log","payload":{"msg":"after clear"}}"#);
        let lines = renderer.render(&state);
        assert_eq!(lines[0], "09:30:00 [INFO] after clear");
    }

    #[test]
    fn job_card_uses_display_defaults() {
        let state = frame(
            AppState::new(),
            r#"{"type":"job_found","payload":{"url":"https://jobs.example.com/1","title":"Rust Dev","match_score":0.91,"salary_normalized":85000}}"#,
        );
        let lines = job_table(&state.view());
        assert_eq!(lines[0], " 91% HIGH Rust Dev @ Confidential [found]");
        assert_eq!(lines[1], "     Remote | FullTime | Mid | $85k / year");
        assert_eq!(lines[2], "     https://jobs.example.com/1");
    }

    #[test]
    fn empty_store_prints_placeholder() {
        assert_eq!(
            job_table(&AppState::new().view()),
            vec!["(no jobs yet)".to_string()]
        );
    }
}
