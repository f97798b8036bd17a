use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alerts::DashboardParams;
use crate::config::EngineConfig;
use crate::error::InputError;
use crate::models::{
    ActivityInput, AttendanceInput, AttendanceStatus, AttendanceUser, AttendanceVisit,
    DailyUserSnapshot, DailyUserSnapshotInput, IrcInput,
};
use crate::snapshot::build_daily_user_snapshot_at;

/// One day's worth of module records as exported by the record-keeping screens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDataset {
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub attendance: Option<AttendanceInput>,
    #[serde(default)]
    pub activity: Option<ActivityInput>,
    #[serde(default)]
    pub irc: Option<IrcInput>,
    #[serde(default)]
    pub snapshot_inputs: Option<Vec<DailyUserSnapshotInput>>,
}

impl DashboardDataset {
    pub fn build_snapshots(
        &self,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Vec<DailyUserSnapshot> {
        self.snapshot_inputs
            .iter()
            .flatten()
            .cloned()
            .map(|input| build_daily_user_snapshot_at(input, config, now))
            .collect()
    }

    pub fn into_params(self, config: &EngineConfig, now: DateTime<Utc>) -> DashboardParams {
        let snapshots = self
            .snapshot_inputs
            .is_some()
            .then(|| self.build_snapshots(config, now));

        DashboardParams {
            today: self.today,
            attendance: self.attendance,
            activity: self.activity,
            irc: self.irc,
            snapshots,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_dataset(path: &Path) -> Result<DashboardDataset, InputError> {
    let dataset: DashboardDataset = read_json(path)?;
    debug!(
        path = %path.display(),
        snapshot_inputs = dataset.snapshot_inputs.as_ref().map_or(0, Vec::len),
        "dataset loaded"
    );
    Ok(dataset)
}

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, InputError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Reads today's attendance sheet, one row per user.
pub fn load_attendance_csv(path: &Path) -> Result<AttendanceInput, InputError> {
    #[derive(Deserialize)]
    struct CsvRow {
        user_id: String,
        user_name: String,
        standard_minutes: Option<u32>,
        status: Option<AttendanceStatus>,
        provided_minutes: Option<u32>,
        is_early_leave: Option<bool>,
    }

    let csv_error = |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let mut input = AttendanceInput::default();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(csv_error)?;

        // A row without a status is a registered user with no visit yet.
        if let Some(status) = row.status {
            input.visits.insert(
                row.user_id.clone(),
                AttendanceVisit {
                    status,
                    provided_minutes: row.provided_minutes,
                    is_early_leave: row.is_early_leave.unwrap_or(false),
                },
            );
        }

        input.users.push(AttendanceUser {
            user_id: row.user_id,
            name: row.user_name,
            standard_minutes: row.standard_minutes,
        });
    }

    debug!(
        path = %path.display(),
        users = input.users.len(),
        visits = input.visits.len(),
        "attendance csv loaded"
    );
    Ok(input)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn attendance_csv_rows_become_users_and_visits() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "user_id,user_name,standard_minutes,status,provided_minutes,is_early_leave"
        )
        .unwrap();
        writeln!(file, "u1,Avery Lee,240,checked-out,150,false").unwrap();
        writeln!(file, "u2,Jules Moreno,,checked-in,,").unwrap();
        writeln!(file, "u3,Kiara Patel,300,,,").unwrap();

        let input = load_attendance_csv(file.path()).unwrap();
        assert_eq!(input.users.len(), 3);
        assert_eq!(input.visits.len(), 2);
        assert_eq!(input.users[0].standard_minutes, Some(240));
        assert_eq!(input.visits["u1"].provided_minutes, Some(150));
        assert_eq!(input.visits["u2"].status, AttendanceStatus::CheckedIn);
        assert!(!input.visits["u2"].is_early_leave);
    }

    #[test]
    fn missing_config_file_means_defaults() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
    }

    #[test]
    fn unreadable_dataset_reports_path() {
        let err = load_dataset(Path::new("/nonexistent/day.json")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/day.json"));
    }

    #[test]
    fn dataset_without_snapshot_inputs_has_no_cross_path() {
        let dataset: DashboardDataset = serde_json::from_str(r#"{"today": "2026-02-02"}"#).unwrap();
        let params = dataset.into_params(&EngineConfig::default(), Utc::now());
        assert!(params.snapshots.is_none());
        assert!(params.attendance.is_none());
    }
}
