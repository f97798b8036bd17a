//! Cross-module alert mapping and the dashboard alert aggregator.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::models::{
    routes, ActivityInput, Alert, AlertCounts, AlertModule, AttendanceInput, CrossModuleIssue,
    DailyUserSnapshot, DashboardSummary, IrcInput, Severity,
};
use crate::summary::{build_activity_summary, build_attendance_summary, build_irc_summary};

const ISSUE_TITLES: &[(&str, &str)] = &[
    ("absence-activity-completed", "Absent with completed case record"),
    ("completed-attendance-missing-activity", "Case record missing after checkout"),
    ("service-discrepancy-no-behavior-record", "Short service without explanation"),
    ("attending-no-service-time", "Service time not entered"),
    ("absence-provision-provided", "Absent with service provided"),
    ("attended-no-provision-record", "Service provision record missing"),
];

const ISSUE_ROUTES: &[(&str, &str)] = &[
    ("absence-activity-completed", routes::ACTIVITY),
    ("completed-attendance-missing-activity", routes::ACTIVITY),
    ("service-discrepancy-no-behavior-record", routes::ACTIVITY),
    ("attending-no-service-time", routes::ATTENDANCE),
    ("absence-provision-provided", routes::ATTENDANCE),
    ("attended-no-provision-record", routes::ATTENDANCE),
];

fn lookup(table: &[(&str, &'static str)], id: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, value)| *value)
}

pub fn cross_module_alert_id(date: NaiveDate, user_id: &str, issue_id: &str) -> String {
    format!("cm-{date}-{user_id}-{issue_id}")
}

pub fn map_issue_to_dashboard_alert(
    snapshot: &DailyUserSnapshot,
    issue: &CrossModuleIssue,
) -> Alert {
    let title = lookup(ISSUE_TITLES, &issue.id)
        .map(str::to_string)
        .unwrap_or_else(|| issue.message.clone());
    let href = lookup(ISSUE_ROUTES, &issue.id).unwrap_or(routes::DASHBOARD);

    Alert {
        id: cross_module_alert_id(snapshot.date, &snapshot.user_id, &issue.id),
        module: AlertModule::Cross,
        severity: issue.severity,
        title,
        message: format!(
            "{} ({}, {})",
            issue.message,
            snapshot.display_name(),
            snapshot.date
        ),
        href: Some(href.to_string()),
    }
}

pub fn build_cross_module_alerts(snapshots: &[DailyUserSnapshot]) -> Vec<Alert> {
    snapshots
        .iter()
        .flat_map(|snapshot| {
            snapshot
                .cross_module_issues
                .iter()
                .map(move |issue| map_issue_to_dashboard_alert(snapshot, issue))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub attendance: Option<AttendanceInput>,
    #[serde(default)]
    pub activity: Option<ActivityInput>,
    #[serde(default)]
    pub irc: Option<IrcInput>,
    #[serde(default)]
    pub snapshots: Option<Vec<DailyUserSnapshot>>,
}

pub fn build_dashboard_summary(
    params: &DashboardParams,
    config: &EngineConfig,
) -> DashboardSummary {
    build_dashboard_summary_at(params, config, Utc::now())
}

pub fn build_dashboard_summary_at(
    params: &DashboardParams,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let today = params.today.unwrap_or_else(|| now.date_naive());
    let mut modules = Vec::new();
    let mut alerts = Vec::new();

    if let Some(input) = &params.attendance {
        let report = build_attendance_summary(input, config);
        modules.push(report.module);
        alerts.extend(report.alerts);
    }
    if let Some(input) = &params.activity {
        let report = build_activity_summary(input, today, config);
        modules.push(report.module);
        alerts.extend(report.alerts);
    }
    if let Some(input) = &params.irc {
        let report = build_irc_summary(input, config);
        modules.push(report.module);
        alerts.extend(report.alerts);
    }
    if config.cross_module_enabled {
        if let Some(snapshots) = &params.snapshots {
            alerts.extend(build_cross_module_alerts(snapshots));
        }
    }

    let alerts = sort_by_severity(dedupe_alerts(alerts));
    debug!(modules = modules.len(), alerts = alerts.len(), "dashboard summary built");

    DashboardSummary {
        modules,
        alerts,
        generated_at: now,
    }
}

/// Collapses alerts sharing an id, keeping the most severe. Equal severities
/// keep the alert with the smaller `(title, message)`, so the result does not
/// depend on input order. Output is ordered by id.
pub fn dedupe_alerts(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut by_id: BTreeMap<String, Alert> = BTreeMap::new();

    for alert in alerts {
        match by_id.get_mut(&alert.id) {
            Some(existing) => {
                trace!(id = %alert.id, "duplicate alert id");
                if outranks(&alert, existing) {
                    *existing = alert;
                }
            }
            None => {
                by_id.insert(alert.id.clone(), alert);
            }
        }
    }

    by_id.into_values().collect()
}

fn outranks(candidate: &Alert, existing: &Alert) -> bool {
    match candidate.severity.rank().cmp(&existing.severity.rank()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            (&candidate.title, &candidate.message) < (&existing.title, &existing.message)
        }
    }
}

/// Stable sort, most urgent first.
pub fn sort_by_severity(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|alert| std::cmp::Reverse(alert.severity.rank()));
    alerts
}

pub fn get_alert_counts(alerts: &[Alert]) -> AlertCounts {
    alerts.iter().fold(AlertCounts::default(), |mut counts, alert| {
        match alert.severity {
            Severity::Error => counts.error += 1,
            Severity::Warning => counts.warning += 1,
            Severity::Info => counts.info += 1,
        }
        counts.total += 1;
        counts
    })
}

pub fn get_top_alerts(alerts: &[Alert], limit: usize) -> &[Alert] {
    &alerts[..limit.min(alerts.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityFacts, ActivityRecord, ActivityStatus, AttendanceFacts, AttendanceStatus,
        DailyUserSnapshotInput, InvolvedModule, IssueType,
    };
    use crate::rules::RULES;
    use crate::snapshot::build_daily_user_snapshot;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    fn sample_alert(id: &str, severity: Severity) -> Alert {
        Alert {
            id: id.to_string(),
            module: AlertModule::Attendance,
            severity,
            title: id.to_string(),
            message: format!("{} {}", id, severity.as_str()),
            href: None,
        }
    }

    fn absent_but_completed(user_id: &str) -> DailyUserSnapshot {
        build_daily_user_snapshot(
            DailyUserSnapshotInput {
                user_id: user_id.to_string(),
                user_name: Some("Avery Lee".to_string()),
                date: date(),
                attendance_data: Some(AttendanceFacts {
                    status: AttendanceStatus::AbsentToday,
                    ..AttendanceFacts::default()
                }),
                activity_data: Some(ActivityFacts {
                    status: ActivityStatus::Completed,
                    ..ActivityFacts::default()
                }),
                ..DailyUserSnapshotInput::default()
            },
            &EngineConfig::default(),
        )
    }

    fn unknown_issue() -> CrossModuleIssue {
        CrossModuleIssue {
            id: "meal-without-attendance".to_string(),
            issue_type: IssueType::AttendanceActivityMismatch,
            severity: Severity::Info,
            message: "Meal recorded without attendance".to_string(),
            involved_modules: Vec::new(),
            suggested_action: String::new(),
        }
    }

    #[test]
    fn mapped_alert_uses_title_route_and_synthesized_id() {
        let snapshot = absent_but_completed("u1");
        let alert = map_issue_to_dashboard_alert(&snapshot, &snapshot.cross_module_issues[0]);

        assert_eq!(alert.id, "cm-2026-02-02-u1-absence-activity-completed");
        assert_eq!(alert.module, AlertModule::Cross);
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(alert.title, "Absent with completed case record");
        assert_eq!(alert.href.as_deref(), Some(routes::ACTIVITY));
        assert_eq!(
            alert.message,
            "Marked absent but the case record is completed (Avery Lee, 2026-02-02)"
        );
    }

    #[test]
    fn unknown_issue_falls_back_to_message_and_dashboard() {
        let snapshot = absent_but_completed("u1");
        let alert = map_issue_to_dashboard_alert(&snapshot, &unknown_issue());
        assert_eq!(alert.title, "Meal recorded without attendance");
        assert_eq!(alert.href.as_deref(), Some(routes::DASHBOARD));
    }

    #[test]
    fn dedupe_keeps_strictly_higher_severity() {
        let alerts = vec![
            sample_alert("a", Severity::Warning),
            sample_alert("a", Severity::Error),
            sample_alert("a", Severity::Info),
        ];
        let deduped = dedupe_alerts(alerts);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].severity, Severity::Error);
    }

    #[test]
    fn dedupe_equal_severity_ignores_input_order() {
        let mut other = sample_alert("a", Severity::Warning);
        other.message = "9 pending".to_string();
        let first = sample_alert("a", Severity::Warning);

        let forward = dedupe_alerts(vec![first.clone(), other.clone()]);
        let backward = dedupe_alerts(vec![other, first]);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].message, "9 pending");
    }

    #[test]
    fn every_rule_has_a_title_and_route() {
        let snapshot = absent_but_completed("u1");
        for rule in RULES {
            let issue = CrossModuleIssue {
                id: rule.id.to_string(),
                issue_type: rule.issue_type,
                severity: rule.severity,
                message: rule.message.to_string(),
                involved_modules: rule.involved_modules.to_vec(),
                suggested_action: rule.suggested_action.to_string(),
            };
            let alert = map_issue_to_dashboard_alert(&snapshot, &issue);
            let expected_route = if rule.involved_modules.contains(&InvolvedModule::Activity) {
                routes::ACTIVITY
            } else {
                routes::ATTENDANCE
            };

            assert_ne!(alert.title, rule.message, "{} has no title", rule.id);
            assert_eq!(alert.href.as_deref(), Some(expected_route), "{}", rule.id);
            assert_eq!(alert.severity, rule.severity);
        }
    }

    #[test]
    fn sorted_output_is_non_increasing_in_severity() {
        let alerts = vec![
            sample_alert("d", Severity::Info),
            sample_alert("c", Severity::Error),
            sample_alert("b", Severity::Warning),
            sample_alert("a", Severity::Error),
        ];
        let sorted = sort_by_severity(dedupe_alerts(alerts));
        let ids: Vec<_> = sorted.iter().map(|alert| alert.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b", "d"]);
        assert!(sorted
            .windows(2)
            .all(|pair| pair[0].severity.rank() >= pair[1].severity.rank()));
    }

    #[test]
    fn empty_params_yield_empty_summary() {
        let params = DashboardParams::default();
        let summary = build_dashboard_summary(&params, &EngineConfig::default());
        assert!(summary.modules.is_empty());
        assert!(summary.alerts.is_empty());

        let json = serde_json::to_value(&summary).unwrap();
        let generated_at = json["generatedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(generated_at).is_ok());
    }

    #[test]
    fn recurring_issue_for_same_user_collapses() {
        let snapshots = vec![
            absent_but_completed("u1"),
            absent_but_completed("u1"),
            absent_but_completed("u2"),
        ];
        let params = DashboardParams {
            snapshots: Some(snapshots),
            ..DashboardParams::default()
        };
        let summary = build_dashboard_summary(&params, &EngineConfig::default());
        assert_eq!(summary.alerts.len(), 2);
        assert!(summary.alerts.iter().all(|alert| alert.module == AlertModule::Cross));
    }

    #[test]
    fn cross_module_toggle_skips_snapshots() {
        let params = DashboardParams {
            snapshots: Some(vec![absent_but_completed("u1")]),
            ..DashboardParams::default()
        };
        let config = EngineConfig {
            cross_module_enabled: false,
            ..EngineConfig::default()
        };
        assert!(build_dashboard_summary(&params, &config).alerts.is_empty());
    }

    #[test]
    fn module_and_cross_alerts_merge_sorted() {
        let params = DashboardParams {
            today: Some(date()),
            activity: Some(ActivityInput {
                records: vec![
                    ActivityRecord {
                        person_id: "u1".to_string(),
                        person_name: "Avery Lee".to_string(),
                        date: date(),
                        status: ActivityStatus::InProgress,
                    },
                    ActivityRecord {
                        person_id: "u2".to_string(),
                        person_name: "Kiara Patel".to_string(),
                        date: date(),
                        status: ActivityStatus::NotCreated,
                    },
                ],
                expected_count: None,
            }),
            snapshots: Some(vec![absent_but_completed("u3")]),
            ..DashboardParams::default()
        };

        let summary = build_dashboard_summary(&params, &EngineConfig::default());
        assert_eq!(summary.modules.len(), 1);
        assert_eq!(summary.modules[0].name, AlertModule::Activity);
        let severities: Vec<_> = summary.alerts.iter().map(|alert| alert.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning, Severity::Info]);
    }

    #[test]
    fn counts_and_top_alerts() {
        let alerts = sort_by_severity(vec![
            sample_alert("a", Severity::Info),
            sample_alert("b", Severity::Error),
            sample_alert("c", Severity::Warning),
            sample_alert("d", Severity::Warning),
        ]);

        let counts = get_alert_counts(&alerts);
        assert_eq!(
            counts,
            AlertCounts {
                error: 1,
                warning: 2,
                info: 1,
                total: 4
            }
        );

        let top = get_top_alerts(&alerts, EngineConfig::default().top_alerts_limit);
        let ids: Vec<_> = top.iter().map(|alert| alert.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
        assert_eq!(get_top_alerts(&alerts, 10).len(), 4);
    }
}
