//! Engine thresholds and toggles.
//!
//! Every number the builders compare against lives here so callers can pass a
//! tuned configuration instead of the engine reading ambient state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Provided minutes below `standard * ratio` count as a discrepancy.
    pub discrepancy_ratio: f64,
    pub attendance_discrepancy_error_threshold: usize,
    pub activity_missing_error_threshold: usize,
    pub activity_missing_name_cap: usize,
    pub irc_over_capacity_hours: f64,
    pub irc_over_capacity_error_threshold: usize,
    pub irc_resource_name_cap: usize,
    pub irc_low_completion_rate: u32,
    pub top_alerts_limit: usize,
    pub cross_module_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discrepancy_ratio: 0.8,
            attendance_discrepancy_error_threshold: 3,
            activity_missing_error_threshold: 5,
            activity_missing_name_cap: 5,
            irc_over_capacity_hours: 8.0,
            irc_over_capacity_error_threshold: 2,
            irc_resource_name_cap: 3,
            irc_low_completion_rate: 50,
            top_alerts_limit: 3,
            cross_module_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"ircResourceNameCap": 5, "crossModuleEnabled": false}"#)
                .unwrap();
        assert_eq!(config.irc_resource_name_cap, 5);
        assert!(!config.cross_module_enabled);
        assert_eq!(config.discrepancy_ratio, 0.8);
        assert_eq!(config.top_alerts_limit, 3);
    }
}
