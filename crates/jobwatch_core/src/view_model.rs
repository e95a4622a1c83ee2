use crate::job::{JobKey, JobStage};
use crate::job_store::StoredJob;
use crate::log_buffer::LogEntry;
use crate::{BackendStatus, ConnectionState, RunStatus};

/// Number of match reasons shown per job.
pub const MAX_REASONS_SHOWN: usize = 4;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub connection: ConnectionState,
    pub run_status: RunStatus,
    pub backend: BackendStatus,
    pub job_count: usize,
    /// Lines appended since the last clear, evicted ones included.
    pub log_count: u64,
    /// Newest first.
    pub jobs: Vec<JobRowView>,
    pub logs: Vec<LogEntry>,
    pub last_event: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Mid,
    Low,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ScoreBand::High
        } else if score >= 0.5 {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }
}

/// Display-ready projection of one stored job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub key: JobKey,
    pub stage: JobStage,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
    pub salary: String,
    pub score: f64,
    pub match_percent: u8,
    pub band: ScoreBand,
    pub url: String,
    pub match_reasons: Vec<String>,
    pub red_flags: Vec<String>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

impl JobRowView {
    pub(crate) fn from_stored(job: &StoredJob) -> Self {
        let record = &job.record;
        let score = clamp01(record.match_score.unwrap_or(0.0));
        Self {
            key: job.key.clone(),
            stage: job.stage,
            title: text_or(record.title.as_deref(), "(untitled)"),
            company: text_or(record.company_display(), "Confidential"),
            location: text_or(record.location.as_deref(), "Remote"),
            job_type: text_or(record.job_type.as_deref(), "FullTime"),
            experience_level: text_or(record.experience_level.as_deref(), "Mid"),
            salary: salary_text(record),
            score,
            match_percent: (score * 100.0).round() as u8,
            band: ScoreBand::from_score(score),
            url: record.url.clone().unwrap_or_default(),
            match_reasons: record
                .match_reasons()
                .iter()
                .take(MAX_REASONS_SHOWN)
                .cloned()
                .collect(),
            red_flags: record.red_flags().to_vec(),
            matching_skills: record.matching_skills().to_vec(),
            missing_skills: record.missing_skills().to_vec(),
        }
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn salary_text(record: &crate::JobRecord) -> String {
    if let Some(value) = record.salary_normalized.filter(|v| *v > 0.0) {
        return format!("${:.0}k / year", value / 1000.0);
    }
    match &record.salary_range {
        Some(range) => format!("{} {}-{}", range.currency, range.min, range.max),
        None => "Not specified".to_string(),
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
