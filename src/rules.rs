//! Cross-module consistency rules.
//!
//! The rule set is a closed, ordered table. Every rule is evaluated against the
//! same snapshot regardless of what fired before it, and issues come out in
//! table order. A rule whose inputs are missing from the snapshot does not fire.

use crate::models::{
    ActivityStatus, AttendanceStatus, CrossModuleIssue, DailyUserSnapshot, InvolvedModule,
    IssueType, ProvisionStatus, Severity,
};

pub struct Rule {
    pub id: &'static str,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: &'static str,
    pub involved_modules: &'static [InvolvedModule],
    pub suggested_action: &'static str,
    pub applies: fn(&DailyUserSnapshot) -> bool,
}

impl Rule {
    fn issue(&self) -> CrossModuleIssue {
        CrossModuleIssue {
            id: self.id.to_string(),
            issue_type: self.issue_type,
            severity: self.severity,
            message: self.message.to_string(),
            involved_modules: self.involved_modules.to_vec(),
            suggested_action: self.suggested_action.to_string(),
        }
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        id: "absence-activity-completed",
        issue_type: IssueType::AttendanceActivityMismatch,
        severity: Severity::Error,
        message: "Marked absent but the case record is completed",
        involved_modules: &[InvolvedModule::Attendance, InvolvedModule::Activity],
        suggested_action: "Check whether the absence or the case record is wrong",
        applies: absence_with_completed_activity,
    },
    Rule {
        id: "completed-attendance-missing-activity",
        issue_type: IssueType::AttendanceActivityMismatch,
        severity: Severity::Warning,
        message: "Checked out but no case record has been created",
        involved_modules: &[InvolvedModule::Attendance, InvolvedModule::Activity],
        suggested_action: "Create today's case record",
        applies: checked_out_without_activity,
    },
    Rule {
        id: "service-discrepancy-no-behavior-record",
        issue_type: IssueType::ServiceTimeDiscrepancy,
        severity: Severity::Info,
        message: "Service time is short and no problem behavior was recorded",
        involved_modules: &[InvolvedModule::Attendance, InvolvedModule::Activity],
        suggested_action: "Record the reason for the shortened service time",
        applies: discrepancy_without_behavior_record,
    },
    Rule {
        id: "attending-no-service-time",
        issue_type: IssueType::MissingServiceTime,
        severity: Severity::Warning,
        message: "Checked in but no service time is recorded",
        involved_modules: &[InvolvedModule::Attendance],
        suggested_action: "Enter the provided service time",
        applies: attending_without_service_time,
    },
    Rule {
        id: "absence-provision-provided",
        issue_type: IssueType::ProvisionMismatch,
        severity: Severity::Error,
        message: "Marked absent but the service provision record says provided",
        involved_modules: &[InvolvedModule::Attendance, InvolvedModule::Provision],
        suggested_action: "Correct the attendance or the service provision record",
        applies: absence_with_provided_service,
    },
    Rule {
        id: "attended-no-provision-record",
        issue_type: IssueType::ProvisionMismatch,
        severity: Severity::Warning,
        message: "Attended but no service provision record exists",
        involved_modules: &[InvolvedModule::Attendance, InvolvedModule::Provision],
        suggested_action: "Create the service provision record",
        applies: attended_without_provision_record,
    },
];

pub fn detect_cross_module_issues(snapshot: &DailyUserSnapshot) -> Vec<CrossModuleIssue> {
    RULES
        .iter()
        .filter(|rule| (rule.applies)(snapshot))
        .map(Rule::issue)
        .collect()
}

fn attendance_status(snapshot: &DailyUserSnapshot) -> Option<AttendanceStatus> {
    snapshot.attendance_data.as_ref().map(|facts| facts.status)
}

fn activity_status(snapshot: &DailyUserSnapshot) -> Option<ActivityStatus> {
    snapshot.activity_data.as_ref().map(|facts| facts.status)
}

fn absence_with_completed_activity(snapshot: &DailyUserSnapshot) -> bool {
    attendance_status(snapshot) == Some(AttendanceStatus::AbsentToday)
        && activity_status(snapshot) == Some(ActivityStatus::Completed)
}

fn checked_out_without_activity(snapshot: &DailyUserSnapshot) -> bool {
    attendance_status(snapshot) == Some(AttendanceStatus::CheckedOut)
        && activity_status(snapshot) == Some(ActivityStatus::NotCreated)
}

fn discrepancy_without_behavior_record(snapshot: &DailyUserSnapshot) -> bool {
    snapshot.has_service_discrepancy
        && snapshot
            .activity_data
            .as_ref()
            .is_some_and(|facts| !facts.has_problem_behavior)
}

fn attending_without_service_time(snapshot: &DailyUserSnapshot) -> bool {
    snapshot.attendance_data.as_ref().is_some_and(|facts| {
        facts.status == AttendanceStatus::CheckedIn && facts.provided_minutes.unwrap_or(0) == 0
    })
}

fn absence_with_provided_service(snapshot: &DailyUserSnapshot) -> bool {
    attendance_status(snapshot) == Some(AttendanceStatus::AbsentToday)
        && snapshot
            .service_provision_data
            .as_ref()
            .is_some_and(|provision| {
                provision.has_record && provision.status == Some(ProvisionStatus::Provided)
            })
}

fn attended_without_provision_record(snapshot: &DailyUserSnapshot) -> bool {
    matches!(
        attendance_status(snapshot),
        Some(AttendanceStatus::CheckedIn | AttendanceStatus::CheckedOut)
    ) && !snapshot
        .service_provision_data
        .as_ref()
        .is_some_and(|provision| provision.has_record)
}
