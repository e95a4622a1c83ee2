use chrono::{NaiveDate, TimeZone, Utc};
use jobwatch_core::{
    export_filename, render_csv, update, AppState, Effect, ExportError, ExportReceipt, JobRecord,
    JobStage, JobStore, LogLevel, Msg, Notice,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn store_with(payloads: Vec<serde_json::Value>) -> JobStore {
    let mut store = JobStore::new();
    for payload in payloads {
        store
            .upsert(JobRecord::from_payload(payload).unwrap(), JobStage::Analyzed)
            .unwrap();
    }
    store
}

#[test]
fn csv_quotes_every_field_and_doubles_quotes() {
    let store = store_with(vec![
        json!({"title": "A \"B\"", "company": "Acme", "match_score": 0.5, "url": "http://x"}),
        json!({"id": "bare"}),
    ]);

    let csv = render_csv(&store.snapshot()).unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Title,Company,Match Score,Salary,Remote,Matching Skills,Missing Skills,Red Flags,URL"
    );
    assert_eq!(
        lines[1],
        r#""A ""B""","Acme","0.50","N/A","No","","","","http://x""#
    );
    assert_eq!(lines[2], r#""","","0.00","N/A","No","","","","""#);
    assert!(!csv.ends_with('\n'));
}

#[test]
fn list_fields_are_joined_and_salary_is_formatted() {
    let store = store_with(vec![
        json!({
            "url": "u1",
            "title": "Rust Dev",
            "company": {"name": "Ferris \"Co\""},
            "match_score": 0.876,
            "salary_normalized": 120000.0,
            "is_remote": true,
            "skills_analysis": {"matching": ["rust", "tokio"], "missing": ["k8s"]},
            "red_flags": ["on-call", "say \"rockstar\""]
        }),
        json!({
            "url": "u2",
            "company_name": "Initech",
            "salary_range": {"min": 50000, "max": 70000, "currency": "EUR"}
        }),
    ]);

    let csv = render_csv(&store.snapshot()).unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(
        lines[1],
        r#""Rust Dev","Ferris ""Co""","0.88","120000","Yes","rust; tokio","k8s","on-call; say ""rockstar""","u1""#
    );
    assert_eq!(
        lines[2],
        r#""","Initech","0.00","EUR 50000-70000","No","","","","u2""#
    );
}

#[test]
fn zero_normalized_salary_falls_back_like_missing() {
    let store = store_with(vec![
        json!({"url": "u1", "salary_normalized": 0}),
        json!({
            "url": "u2",
            "salary_normalized": 0.0,
            "salary_range": {"min": 10, "max": 20, "currency": "USD"}
        }),
    ]);

    let csv = render_csv(&store.snapshot()).unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines[1], r#""","","0.00","N/A","No","","","","u1""#);
    assert_eq!(lines[2], r#""","","0.00","USD 10-20","No","","","","u2""#);
}

#[test]
fn empty_store_signals_no_data() {
    assert_eq!(render_csv(&JobStore::new().snapshot()), Err(ExportError::NoData));
}

#[test]
fn export_filename_uses_prefix_and_iso_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(export_filename("job_hunter", date), "job_hunter_2024-03-09.csv");
}

#[test]
fn export_click_without_jobs_only_raises_notice() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let (mut state, effects) = update(AppState::new(), Msg::ExportClicked { at });

    assert!(effects.is_empty());
    assert_eq!(
        state.take_notice(),
        Some(Notice::new("Export", "No data to export."))
    );
    assert_eq!(state.take_notice(), None);
}

#[test]
fn export_click_with_jobs_emits_write_effect_and_reports_result() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let (state, _) = update(
        AppState::new(),
        Msg::FrameReceived {
            session: 0,
            text: json!({"type": "job_found", "payload": {"url": "u1", "title": "Eng"}})
                .to_string(),
            at,
        },
    );

    let (state, effects) = update(state, Msg::ExportClicked { at });
    let expected_csv = render_csv(&state.snapshot_jobs()).unwrap();
    assert_eq!(
        effects,
        vec![Effect::WriteExport {
            csv: expected_csv,
            rows: 1
        }]
    );

    let (mut state, effects) = update(
        state,
        Msg::ExportFinished {
            result: Ok(ExportReceipt {
                path: "exports/job_hunter_2024-05-01.csv".into(),
                rows: 1,
            }),
            at,
        },
    );
    assert!(effects.is_empty());
    let last = state.logs().all().pop().unwrap();
    assert_eq!(last.level, LogLevel::Success);
    assert!(state.take_notice().unwrap().message.contains("job_hunter_2024-05-01.csv"));

    let (state, _) = update(
        state,
        Msg::ExportFinished {
            result: Err("disk full".into()),
            at,
        },
    );
    let last = state.logs().all().pop().unwrap();
    assert_eq!(last.level, LogLevel::Error);
    assert_eq!(last.message, "Export failed: disk full");
}
