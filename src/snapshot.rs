//! Per-user, per-day merge of module facts.
//!
//! A snapshot is rebuilt from its inputs every time; it never gets patched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{
    ActivityFacts, ActivityStatus, AttendanceFacts, AttendanceUser, AttendanceVisit,
    DailyUserSnapshot, DailyUserSnapshotInput, IrcFacts, ServiceProvisionFacts,
};
use crate::rules::detect_cross_module_issues;
use crate::summary::is_service_discrepancy;

pub fn build_daily_user_snapshot(
    input: DailyUserSnapshotInput,
    config: &EngineConfig,
) -> DailyUserSnapshot {
    build_daily_user_snapshot_at(input, config, Utc::now())
}

pub fn build_daily_user_snapshot_at(
    input: DailyUserSnapshotInput,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> DailyUserSnapshot {
    let has_service_discrepancy = input.attendance_data.as_ref().is_some_and(|facts| {
        is_service_discrepancy(
            facts.provided_minutes,
            facts.standard_minutes,
            config.discrepancy_ratio,
        )
    });

    let mut snapshot = DailyUserSnapshot {
        user_id: input.user_id,
        user_name: input.user_name,
        date: input.date,
        attendance_data: input.attendance_data,
        activity_data: input.activity_data,
        irc_data: input.irc_data,
        service_provision_data: input.service_provision_data,
        has_service_discrepancy,
        cross_module_issues: Vec::new(),
        last_updated: now,
    };
    snapshot.cross_module_issues = detect_cross_module_issues(&snapshot);

    debug!(
        user_id = %snapshot.user_id,
        date = %snapshot.date,
        issues = snapshot.cross_module_issues.len(),
        "snapshot built"
    );
    snapshot
}

/// Case-work record as the record-entry screens store it. Every field may be
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<ActivityStatus>,
    #[serde(default)]
    pub problem_behaviors: Vec<String>,
    #[serde(default)]
    pub seizure_count: Option<u32>,
    #[serde(default)]
    pub meal_amount: Option<String>,
}

/// Records already held by the producing modules for one user and day.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistingData<'a> {
    pub case_record: Option<&'a CaseRecord>,
    pub attendance_user: Option<&'a AttendanceUser>,
    pub attendance_visit: Option<&'a AttendanceVisit>,
    pub irc: Option<&'a IrcFacts>,
    pub service_provision: Option<&'a ServiceProvisionFacts>,
}

pub fn build_daily_user_snapshot_from_existing_data(
    user_id: &str,
    date: NaiveDate,
    existing: ExistingData<'_>,
    config: &EngineConfig,
) -> DailyUserSnapshot {
    build_daily_user_snapshot(snapshot_input_from_existing_data(user_id, date, existing), config)
}

pub fn snapshot_input_from_existing_data(
    user_id: &str,
    date: NaiveDate,
    existing: ExistingData<'_>,
) -> DailyUserSnapshotInput {
    let user_name = existing
        .attendance_user
        .map(|user| user.name.clone())
        .or_else(|| existing.case_record.and_then(|record| record.person_name.clone()));

    let attendance_data = existing.attendance_visit.map(|visit| AttendanceFacts {
        status: visit.status,
        provided_minutes: visit.provided_minutes,
        standard_minutes: existing.attendance_user.and_then(|user| user.standard_minutes),
        is_early_leave: visit.is_early_leave,
    });

    let activity_data = existing.case_record.map(|record| ActivityFacts {
        status: record.status.unwrap_or_default(),
        has_problem_behavior: !record.problem_behaviors.is_empty(),
        has_seizure: record.seizure_count.unwrap_or(0) > 0,
        meal: record.meal_amount.clone(),
    });

    DailyUserSnapshotInput {
        user_id: user_id.to_string(),
        user_name,
        date,
        attendance_data,
        activity_data,
        irc_data: existing.irc.cloned(),
        service_provision_data: existing.service_provision.cloned(),
    }
}
