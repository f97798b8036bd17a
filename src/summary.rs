use chrono::NaiveDate;
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{
    routes, ActivityInput, ActivityStatus, Alert, AlertModule, AttendanceInput,
    AttendanceStatus, IrcInput, ModuleSummary, Severity,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleReport {
    pub module: ModuleSummary,
    pub alerts: Vec<Alert>,
}

/// `round(done / total * 100)`, or 0 when there is nothing to complete.
pub fn completion_rate(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u32
}

/// True when both minute counts are known, something was provided, and it
/// falls short of `standard * ratio`.
pub fn is_service_discrepancy(provided: Option<u32>, standard: Option<u32>, ratio: f64) -> bool {
    match (provided, standard) {
        (Some(provided), Some(standard)) if provided > 0 => {
            (provided as f64) < standard as f64 * ratio
        }
        _ => false,
    }
}

pub fn build_attendance_summary(input: &AttendanceInput, config: &EngineConfig) -> ModuleReport {
    let total = input.users.len();
    let done = input
        .visits
        .values()
        .filter(|visit| visit.status == AttendanceStatus::CheckedOut)
        .count();

    let discrepancy_count = input
        .users
        .iter()
        .filter(|user| {
            input.visits.get(&user.user_id).is_some_and(|visit| {
                is_service_discrepancy(
                    visit.provided_minutes,
                    user.standard_minutes,
                    config.discrepancy_ratio,
                )
            })
        })
        .count();
    let early_leave_count = input
        .visits
        .values()
        .filter(|visit| visit.is_early_leave)
        .count();

    let mut alerts = Vec::new();

    if discrepancy_count > 0 {
        let severity = if discrepancy_count > config.attendance_discrepancy_error_threshold {
            Severity::Error
        } else {
            Severity::Warning
        };
        alerts.push(Alert {
            id: "attendance-discrepancy".to_string(),
            module: AlertModule::Attendance,
            severity,
            title: "Service time below standard".to_string(),
            message: format!(
                "Below {:.0}% of standard service time: {}",
                config.discrepancy_ratio * 100.0,
                discrepancy_count
            ),
            href: Some(routes::ATTENDANCE.to_string()),
        });
    }

    if early_leave_count > 0 {
        alerts.push(Alert {
            id: "attendance-early-leave".to_string(),
            module: AlertModule::Attendance,
            severity: Severity::Info,
            title: "Early leave".to_string(),
            message: format!("Left early today: {early_leave_count}"),
            href: Some(routes::ATTENDANCE.to_string()),
        });
    }

    debug!(total, done, discrepancy_count, early_leave_count, "attendance summary built");

    ModuleReport {
        module: ModuleSummary {
            name: AlertModule::Attendance,
            label: "Attendance".to_string(),
            total,
            done,
            rate: completion_rate(done, total),
        },
        alerts,
    }
}

pub fn build_activity_summary(
    input: &ActivityInput,
    today: NaiveDate,
    config: &EngineConfig,
) -> ModuleReport {
    let today_records: Vec<_> = input
        .records
        .iter()
        .filter(|record| record.date == today)
        .collect();

    // An expected count of zero means "unknown", so fall back to what was recorded.
    let total = match input.expected_count {
        Some(expected) if expected > 0 => expected,
        _ => today_records.len(),
    };
    let done = today_records
        .iter()
        .filter(|record| record.status == ActivityStatus::Completed)
        .count();

    let missing: Vec<_> = today_records
        .iter()
        .filter(|record| record.status == ActivityStatus::NotCreated)
        .collect();
    let in_progress_count = today_records
        .iter()
        .filter(|record| record.status == ActivityStatus::InProgress)
        .count();

    let mut alerts = Vec::new();

    if !missing.is_empty() {
        let severity = if missing.len() > config.activity_missing_error_threshold {
            Severity::Error
        } else {
            Severity::Warning
        };
        let names: Vec<String> = missing
            .iter()
            .take(config.activity_missing_name_cap)
            .map(|record| format!("{} ({})", record.person_name, record.person_id))
            .collect();
        alerts.push(Alert {
            id: "activity-missing".to_string(),
            module: AlertModule::Activity,
            severity,
            title: "Case records not created".to_string(),
            message: format!(
                "Not created: {}. {}{}",
                missing.len(),
                names.join(", "),
                remainder_suffix(missing.len(), config.activity_missing_name_cap)
            ),
            href: Some(routes::ACTIVITY.to_string()),
        });
    }

    if in_progress_count > 0 {
        alerts.push(Alert {
            id: "activity-in-progress".to_string(),
            module: AlertModule::Activity,
            severity: Severity::Info,
            title: "Case records in progress".to_string(),
            message: format!("Still in progress: {in_progress_count}"),
            href: Some(routes::ACTIVITY.to_string()),
        });
    }

    debug!(
        total,
        done,
        missing = missing.len(),
        in_progress_count,
        "activity summary built"
    );

    ModuleReport {
        module: ModuleSummary {
            name: AlertModule::Activity,
            label: "Case records".to_string(),
            total,
            done,
            rate: completion_rate(done, total),
        },
        alerts,
    }
}

pub fn build_irc_summary(input: &IrcInput, config: &EngineConfig) -> ModuleReport {
    let total = input.events.len();
    let done = input.events.iter().filter(|event| event.is_completed()).count();
    let rate = completion_rate(done, total);

    let over: Vec<_> = input
        .resources
        .iter()
        .filter(|usage| usage.is_over && usage.total_hours > config.irc_over_capacity_hours)
        .collect();

    let mut alerts = Vec::new();

    if !over.is_empty() {
        let severity = if over.len() > config.irc_over_capacity_error_threshold {
            Severity::Error
        } else {
            Severity::Warning
        };
        let names: Vec<String> = over
            .iter()
            .take(config.irc_resource_name_cap)
            .map(|usage| format!("{} ({:.1}h)", usage.resource_id, usage.total_hours))
            .collect();
        alerts.push(Alert {
            id: "irc-over-capacity".to_string(),
            module: AlertModule::Irc,
            severity,
            title: "Resource over capacity".to_string(),
            message: format!(
                "Over {}h: {}. {}{}",
                config.irc_over_capacity_hours,
                over.len(),
                names.join(", "),
                remainder_suffix(over.len(), config.irc_resource_name_cap)
            ),
            href: Some(routes::IRC.to_string()),
        });
    }

    if total > 0 && rate < config.irc_low_completion_rate {
        alerts.push(Alert {
            id: "irc-low-completion".to_string(),
            module: AlertModule::Irc,
            severity: Severity::Warning,
            title: "Low resource completion".to_string(),
            message: format!("Only {rate}% of scheduled events are completed ({done}/{total})"),
            href: Some(routes::IRC.to_string()),
        });
    }

    debug!(total, done, over = over.len(), "irc summary built");

    ModuleReport {
        module: ModuleSummary {
            name: AlertModule::Irc,
            label: "Resource calendar".to_string(),
            total,
            done,
            rate,
        },
        alerts,
    }
}

fn remainder_suffix(count: usize, cap: usize) -> String {
    if count > cap {
        format!(" and {} more", count - cap)
    } else {
        String::new()
    }
}
