use chrono::{TimeZone, Utc};
use jobwatch_core::{LogBuffer, LogLevel, LOG_CAPACITY};

#[test]
fn buffer_keeps_only_the_most_recent_lines() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut buffer = LogBuffer::new();
    for i in 0..2000 {
        buffer.push(at, LogLevel::Info, format!("line {i}"));
    }

    assert_eq!(LOG_CAPACITY, 1500);
    assert_eq!(buffer.len(), 1500);
    let all = buffer.all();
    assert_eq!(all.first().unwrap().message, "line 500");
    assert_eq!(all.last().unwrap().message, "line 1999");
    assert!(all.windows(2).all(|pair| pair[0].seq() < pair[1].seq()));
    assert_eq!(buffer.appended_since_clear(), 2000);
}

#[test]
fn clear_empties_but_sequence_keeps_growing() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut buffer = LogBuffer::with_capacity(3);
    buffer.push(at, LogLevel::Warn, "a");
    buffer.push(at, LogLevel::Error, "b");
    let last_seq = buffer.all().last().unwrap().seq();

    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.appended_since_clear(), 0);

    buffer.push(at, LogLevel::Success, "c");
    assert!(buffer.all()[0].seq() > last_seq);
}

#[test]
fn level_names_are_mapped() {
    assert_eq!(LogLevel::parse("warn"), LogLevel::Warn);
    assert_eq!(LogLevel::parse("ERROR"), LogLevel::Error);
    assert_eq!(LogLevel::parse("success"), LogLevel::Success);
    assert_eq!(LogLevel::parse("verbose"), LogLevel::Info);
    assert_eq!(LogLevel::Success.to_string(), "SUCCESS");
}
