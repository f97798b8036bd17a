use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use daycare_alerts::alerts::{build_dashboard_summary_at, get_alert_counts, get_top_alerts};
use daycare_alerts::input::{load_attendance_csv, load_config, load_dataset};
use daycare_alerts::report::build_report;

#[derive(Parser)]
#[command(name = "daycare-alerts")]
#[command(about = "Cross-module consistency alerts for the day-care operations dashboard", long_about = None)]
struct Cli {
    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print module completion and the most urgent alerts
    Summary {
        #[arg(long)]
        input: PathBuf,
        /// Replace the dataset's attendance section with a CSV sheet
        #[arg(long)]
        attendance_csv: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        /// Emit the full dashboard summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List cross-module issues per user
    Snapshots {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        user: Option<String>,
    },
    /// Print alert counts by severity
    Counts {
        #[arg(long)]
        input: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load engine config")?;
    let now = Utc::now();

    match cli.command {
        Commands::Summary {
            input,
            attendance_csv,
            limit,
            json,
        } => {
            let mut dataset = load_dataset(&input).context("failed to load dataset")?;
            if let Some(path) = attendance_csv {
                dataset.attendance =
                    Some(load_attendance_csv(&path).context("failed to load attendance CSV")?);
            }
            let params = dataset.into_params(&config, now);
            let summary = build_dashboard_summary_at(&params, &config, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            for module in summary.modules.iter() {
                println!(
                    "{}: {}/{} done ({}%)",
                    module.label, module.done, module.total, module.rate
                );
            }

            if summary.alerts.is_empty() {
                println!("No alerts.");
                return Ok(());
            }

            println!("Top alerts:");
            let limit = limit.unwrap_or(config.top_alerts_limit);
            for alert in get_top_alerts(&summary.alerts, limit) {
                println!(
                    "- [{}] {}: {}",
                    alert.severity.as_str(),
                    alert.title,
                    alert.message
                );
            }
        }
        Commands::Snapshots { input, user } => {
            let dataset = load_dataset(&input).context("failed to load dataset")?;
            let snapshots = dataset.build_snapshots(&config, now);
            let mut printed = 0usize;

            for snapshot in snapshots
                .iter()
                .filter(|snapshot| user.as_deref().map_or(true, |id| snapshot.user_id == id))
            {
                printed += 1;
                println!(
                    "{} ({}) on {}: {} issues",
                    snapshot.display_name(),
                    snapshot.user_id,
                    snapshot.date,
                    snapshot.cross_module_issues.len()
                );
                for issue in snapshot.cross_module_issues.iter() {
                    println!(
                        "  - [{}] {}: {}",
                        issue.severity.as_str(),
                        issue.id,
                        issue.suggested_action
                    );
                }
            }

            if printed == 0 {
                println!("No snapshots matched.");
            }
        }
        Commands::Counts { input } => {
            let params = load_dataset(&input)
                .context("failed to load dataset")?
                .into_params(&config, now);
            let summary = build_dashboard_summary_at(&params, &config, now);
            let counts = get_alert_counts(&summary.alerts);
            println!(
                "error {} / warning {} / info {} (total {})",
                counts.error, counts.warning, counts.info, counts.total
            );
        }
        Commands::Report { input, out } => {
            let params = load_dataset(&input)
                .context("failed to load dataset")?
                .into_params(&config, now);
            let snapshots = params.snapshots.clone().unwrap_or_default();
            let summary = build_dashboard_summary_at(&params, &config, now);
            let report = build_report(&summary, &snapshots);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
