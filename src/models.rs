use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Info => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertModule {
    Attendance,
    Activity,
    Irc,
    Cross,
}

impl AlertModule {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertModule::Attendance => "attendance",
            AlertModule::Activity => "activity",
            AlertModule::Irc => "irc",
            AlertModule::Cross => "cross",
        }
    }
}

/// Modules a cross-module issue can point at. Service provision is not an
/// alert module of its own, so it only appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvolvedModule {
    Attendance,
    Activity,
    Irc,
    Provision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: AlertModule,
    pub label: String,
    pub total: usize,
    pub done: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub module: AlertModule,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub modules: Vec<ModuleSummary>,
    pub alerts: Vec<Alert>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    #[default]
    Pending,
    CheckedIn,
    CheckedOut,
    AbsentToday,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUser {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub standard_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceVisit {
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub provided_minutes: Option<u32>,
    #[serde(default)]
    pub is_early_leave: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub users: Vec<AttendanceUser>,
    /// Today's visit per user id.
    #[serde(default)]
    pub visits: HashMap<String, AttendanceVisit>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    #[default]
    NotCreated,
    InProgress,
    Completed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub person_id: String,
    pub person_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub records: Vec<ActivityRecord>,
    #[serde(default)]
    pub expected_count: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarEventStatus {
    Planned,
    InProgress,
    Completed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventExtension {
    #[serde(default)]
    pub status: Option<CalendarEventStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub extended_props: Option<CalendarEventExtension>,
}

impl CalendarEvent {
    pub fn is_completed(&self) -> bool {
        matches!(
            self.extended_props.as_ref().and_then(|ext| ext.status),
            Some(CalendarEventStatus::Completed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub resource_id: String,
    pub total_hours: f64,
    pub is_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrcInput {
    pub events: Vec<CalendarEvent>,
    /// Per-resource totals, in the order resources should be named in alerts.
    #[serde(default)]
    pub resources: Vec<ResourceUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFacts {
    pub status: AttendanceStatus,
    #[serde(default)]
    pub provided_minutes: Option<u32>,
    #[serde(default)]
    pub standard_minutes: Option<u32>,
    #[serde(default)]
    pub is_early_leave: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFacts {
    pub status: ActivityStatus,
    #[serde(default)]
    pub has_problem_behavior: bool,
    #[serde(default)]
    pub has_seizure: bool,
    #[serde(default)]
    pub meal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrcFacts {
    #[serde(default)]
    pub has_schedule: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionStatus {
    Provided,
    Absent,
    Cancelled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvisionFacts {
    #[serde(default)]
    pub has_record: bool,
    #[serde(default)]
    pub status: Option<ProvisionStatus>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUserSnapshotInput {
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub attendance_data: Option<AttendanceFacts>,
    #[serde(default)]
    pub activity_data: Option<ActivityFacts>,
    #[serde(default)]
    pub irc_data: Option<IrcFacts>,
    #[serde(default)]
    pub service_provision_data: Option<ServiceProvisionFacts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossModuleIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    pub involved_modules: Vec<InvolvedModule>,
    pub suggested_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    AttendanceActivityMismatch,
    ServiceTimeDiscrepancy,
    MissingServiceTime,
    ProvisionMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUserSnapshot {
    pub user_id: String,
    pub user_name: Option<String>,
    pub date: NaiveDate,
    pub attendance_data: Option<AttendanceFacts>,
    pub activity_data: Option<ActivityFacts>,
    pub irc_data: Option<IrcFacts>,
    pub service_provision_data: Option<ServiceProvisionFacts>,
    pub has_service_discrepancy: bool,
    pub cross_module_issues: Vec<CrossModuleIssue>,
    pub last_updated: DateTime<Utc>,
}

impl DailyUserSnapshot {
    /// Name shown to staff; falls back to the id when no name is known.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Deep-link targets used in alert `href`s.
pub mod routes {
    pub const ATTENDANCE: &str = "/daily/attendance";
    pub const ACTIVITY: &str = "/daily/activity";
    pub const IRC: &str = "/irc";
    pub const DASHBOARD: &str = "/dashboard";
}
