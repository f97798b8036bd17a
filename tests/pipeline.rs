use std::io::Write;

use chrono::{DateTime, Utc};
use daycare_alerts::alerts::build_dashboard_summary_at;
use daycare_alerts::input::load_dataset;
use daycare_alerts::models::{AlertModule, Severity};
use daycare_alerts::EngineConfig;

const DATASET: &str = r#"{
  "today": "2026-02-02",
  "attendance": {
    "users": [
      {"userId": "u1", "name": "Avery Lee", "standardMinutes": 240},
      {"userId": "u2", "name": "Jules Moreno", "standardMinutes": 240},
      {"userId": "u3", "name": "Kiara Patel"}
    ],
    "visits": {
      "u1": {"status": "checked-out", "providedMinutes": 150},
      "u2": {"status": "absent-today"},
      "u3": {"status": "checked-in", "isEarlyLeave": true}
    }
  },
  "activity": {
    "expectedCount": 4,
    "records": [
      {"personId": "u1", "personName": "Avery Lee", "date": "2026-02-02", "status": "completed"},
      {"personId": "u2", "personName": "Jules Moreno", "date": "2026-02-02", "status": "completed"},
      {"personId": "u3", "personName": "Kiara Patel", "date": "2026-02-02", "status": "in-progress"},
      {"personId": "u4", "personName": "Sam Ito", "date": "2026-02-02", "status": "not-created"},
      {"personId": "u4", "personName": "Sam Ito", "date": "2026-02-01", "status": "not-created"}
    ]
  },
  "irc": {
    "events": [
      {"id": "e1", "title": "Pickup", "extendedProps": {"status": "completed"}},
      {"id": "e2", "title": "Dropoff"},
      {"id": "e3", "title": "Therapy room", "extendedProps": {"status": "some-future-status"}}
    ],
    "resources": [
      {"resourceId": "van-1", "totalHours": 9.5, "isOver": true}
    ]
  },
  "snapshotInputs": [
    {
      "userId": "u2",
      "userName": "Jules Moreno",
      "date": "2026-02-02",
      "attendanceData": {"status": "absent-today"},
      "activityData": {"status": "completed"}
    },
    {
      "userId": "u2",
      "userName": "Jules Moreno",
      "date": "2026-02-02",
      "attendanceData": {"status": "absent-today"},
      "activityData": {"status": "completed"}
    }
  ]
}"#;

fn write_dataset() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DATASET.as_bytes()).unwrap();
    file
}

#[test]
fn dataset_flows_into_sorted_deduplicated_summary() {
    let file = write_dataset();
    let config = EngineConfig::default();
    let now: DateTime<Utc> = "2026-02-02T09:00:00Z".parse().unwrap();

    let params = load_dataset(file.path()).unwrap().into_params(&config, now);
    let summary = build_dashboard_summary_at(&params, &config, now);

    let modules: Vec<_> = summary
        .modules
        .iter()
        .map(|m| (m.name, m.done, m.total, m.rate))
        .collect();
    assert_eq!(
        modules,
        vec![
            (AlertModule::Attendance, 1, 3, 33),
            (AlertModule::Activity, 2, 4, 50),
            (AlertModule::Irc, 1, 3, 33),
        ]
    );

    let ids: Vec<_> = summary.alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "cm-2026-02-02-u2-absence-activity-completed",
            "activity-missing",
            "attendance-discrepancy",
            "irc-low-completion",
            "irc-over-capacity",
            "activity-in-progress",
            "attendance-early-leave",
        ]
    );
    assert_eq!(summary.alerts[0].severity, Severity::Error);
    assert!(summary
        .alerts
        .windows(2)
        .all(|pair| pair[0].severity.rank() >= pair[1].severity.rank()));
    assert_eq!(summary.generated_at, now);
}

#[test]
fn empty_dataset_serializes_with_iso_timestamp() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{}").unwrap();
    let config = EngineConfig::default();
    let now = Utc::now();

    let params = load_dataset(file.path()).unwrap().into_params(&config, now);
    let summary = build_dashboard_summary_at(&params, &config, now);
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["modules"], serde_json::json!([]));
    assert_eq!(json["alerts"], serde_json::json!([]));
    let generated_at = json["generatedAt"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(generated_at).is_ok());
}
