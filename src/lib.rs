//! Cross-module consistency checks and alert aggregation for the day-care
//! operations dashboard.
//!
//! Module summaries and cross-module issues are computed as pure functions of
//! the records handed in; the only clock read is the assembly timestamp.

pub mod alerts;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod report;
pub mod rules;
pub mod snapshot;
pub mod summary;

pub use alerts::{
    build_dashboard_summary, get_alert_counts, get_top_alerts, map_issue_to_dashboard_alert,
    DashboardParams,
};
pub use config::EngineConfig;
pub use rules::detect_cross_module_issues;
pub use snapshot::{build_daily_user_snapshot, build_daily_user_snapshot_from_existing_data};
