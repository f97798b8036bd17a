use std::fmt::Write;

use crate::alerts::get_alert_counts;
use crate::models::{DailyUserSnapshot, DashboardSummary};

pub fn build_report(summary: &DashboardSummary, snapshots: &[DailyUserSnapshot]) -> String {
    let counts = get_alert_counts(&summary.alerts);
    let mut output = String::new();

    let _ = writeln!(output, "# Daily Operations Report");
    let _ = writeln!(
        output,
        "Generated at {}",
        summary.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Module Completion");

    if summary.modules.is_empty() {
        let _ = writeln!(output, "No module data supplied.");
    } else {
        for module in summary.modules.iter() {
            let _ = writeln!(
                output,
                "- {}: {}/{} done ({}%)",
                module.label, module.done, module.total, module.rate
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Alerts ({} error, {} warning, {} info)",
        counts.error, counts.warning, counts.info
    );

    if summary.alerts.is_empty() {
        let _ = writeln!(output, "No alerts.");
    } else {
        for alert in summary.alerts.iter() {
            let _ = writeln!(
                output,
                "- [{}] {} ({}): {}",
                alert.severity.as_str(),
                alert.title,
                alert.module.as_str(),
                alert.message
            );
        }
    }

    let flagged: Vec<_> = snapshots
        .iter()
        .filter(|snapshot| !snapshot.cross_module_issues.is_empty())
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Cross-Module Issues by User");

    if flagged.is_empty() {
        let _ = writeln!(output, "No cross-module issues detected.");
    } else {
        for snapshot in flagged {
            let _ = writeln!(output, "### {} ({})", snapshot.display_name(), snapshot.date);
            for issue in snapshot.cross_module_issues.iter() {
                let _ = writeln!(
                    output,
                    "- [{}] {}. Suggested: {}",
                    issue.severity.as_str(),
                    issue.message,
                    issue.suggested_action
                );
            }
        }
    }

    output
}
