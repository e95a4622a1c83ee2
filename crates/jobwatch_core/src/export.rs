use thiserror::Error;

use crate::job::JobRecord;
use crate::job_store::JobSnapshot;

pub const CSV_HEADER: [&str; 9] = [
    "Title",
    "Company",
    "Match Score",
    "Salary",
    "Remote",
    "Matching Skills",
    "Missing Skills",
    "Red Flags",
    "URL",
];

pub const DEFAULT_EXPORT_PREFIX: &str = "job_hunter";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("no data to export")]
    NoData,
}

/// Renders the snapshot as CSV: an unquoted header, then one fully quoted row per job,
/// newline-joined without a trailing newline.
pub fn render_csv(snapshot: &JobSnapshot) -> Result<String, ExportError> {
    if snapshot.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(CSV_HEADER.join(","));
    lines.extend(snapshot.records().map(render_row));
    Ok(lines.join("\n"))
}

fn render_row(job: &JobRecord) -> String {
    let cells = [
        job.title.clone().unwrap_or_default(),
        job.company_display().unwrap_or_default().to_string(),
        format!("{:.2}", job.match_score.unwrap_or(0.0)),
        salary_cell(job),
        if job.is_remote.unwrap_or(false) { "Yes" } else { "No" }.to_string(),
        job.matching_skills().join("; "),
        job.missing_skills().join("; "),
        job.red_flags().join("; "),
        job.url.clone().unwrap_or_default(),
    ];
    cells
        .iter()
        .map(|cell| quote(cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn salary_cell(job: &JobRecord) -> String {
    if let Some(value) = job.salary_normalized.filter(|v| *v > 0.0) {
        return value.to_string();
    }
    match &job.salary_range {
        Some(range) => format!("{} {}-{}", range.currency, range.min, range.max),
        None => "N/A".to_string(),
    }
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// `<prefix>_<YYYY-MM-DD>.csv`
pub fn export_filename(prefix: &str, date: chrono::NaiveDate) -> String {
    format!("{prefix}_{}.csv", date.format("%Y-%m-%d"))
}
