mod add;
mod render;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::services::{
    backup, config::STORE_URL_ENV, export, AppConfig, Aggregator, FileReportCache,
    HttpReportStore, ReportService,
};
use crate::types::{Department, StoreResult, YearMonth};

pub use add::AddArgs;

/// Dental-lab daily production reports
#[derive(Parser)]
#[command(name = "labtally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Debug logging to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 30-day trend and department breakdown (default)
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Monthly item × day matrix
    Matrix {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,

        /// Only this department (name or code)
        #[arg(long)]
        department: Option<Department>,

        /// Output as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Write CSV to this path (default name when the value is omitted)
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        csv: Option<Option<PathBuf>>,
    },

    /// Replace the local cache with the report store contents
    Sync,

    /// List cached reports
    List {
        /// Filter by staff or department name
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Enter a report
    Add(AddArgs),

    /// Re-enter a cached report under its existing id
    Edit {
        #[arg(value_name = "ID")]
        id: String,

        #[command(flatten)]
        report: AddArgs,
    },

    /// Delete a report by id
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete every report locally and in the report store
    Clear {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Export cached reports as CSV
    ExportCsv {
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Write a JSON backup of the local cache
    Backup {
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Restore a JSON backup (replaces the cache unless --merge)
    Restore {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Add only reports whose id is not cached yet
        #[arg(long)]
        merge: bool,
    },
}

type Service = ReportService<FileReportCache, HttpReportStore>;

/// Install the stderr log subscriber. Default level is `warn`, or `debug`
/// for this crate with `--verbose`; `RUST_LOG` wins over both.
fn init_tracing(verbose: bool) {
    let default = if verbose { "labtally=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn report_remote(action: &str, remote: &StoreResult<()>) {
    match remote {
        Ok(()) => println!("{}: report store updated", action),
        Err(e) => eprintln!("{}: local only ({})", action, e),
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        let config = AppConfig::load()?;
        let service: Service = ReportService::new(
            config.cache()?,
            HttpReportStore::new(config.store_url.clone())?,
        );
        let today = Local::now().date_naive();

        match self.command {
            None => Self::dashboard(&service, today, false),
            Some(Commands::Dashboard { json }) => Self::dashboard(&service, today, json),
            Some(Commands::Matrix {
                month,
                department,
                json,
                csv,
            }) => {
                let reports = service.reports()?;
                let month = month.unwrap_or_else(|| YearMonth::of(today));
                let mut matrix =
                    Aggregator::monthly_matrix(&reports, month, today, &config.calendar());
                if let Some(department) = department {
                    matrix.retain_department(department);
                }

                if let Some(path) = csv {
                    let path =
                        path.unwrap_or_else(|| PathBuf::from(export::matrix_csv_file_name(month)));
                    fs::write(&path, export::matrix_csv(&matrix)?)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                } else if json {
                    println!("{}", serde_json::to_string_pretty(&matrix)?);
                } else {
                    print!("{}", render::matrix(&matrix));
                }
                Ok(())
            }
            Some(Commands::Sync) => {
                if !service.store().is_configured() {
                    bail!(
                        "report store is not configured (set {} or storeUrl in {})",
                        STORE_URL_ENV,
                        AppConfig::default_path()?.display()
                    );
                }
                match service.sync()? {
                    Ok(count) => println!("Synced {} reports from the report store", count),
                    Err(e) => eprintln!("Sync failed, local cache kept: {}", e),
                }
                Ok(())
            }
            Some(Commands::List { search, json }) => {
                let reports = service.search(search.as_deref())?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                } else {
                    print!("{}", render::report_list(&reports));
                }
                Ok(())
            }
            Some(Commands::Add(args)) => {
                let outcome = service.submit(args.into_draft()?, Local::now())?;
                println!("Saved report {}", outcome.local.id);
                report_remote("save", &outcome.remote);
                Ok(())
            }
            Some(Commands::Edit { id, report }) => {
                let outcome = service.edit(&id, report.into_draft()?, Local::now())?;
                println!("Updated report {}", outcome.local.id);
                report_remote("save", &outcome.remote);
                Ok(())
            }
            Some(Commands::Delete { id }) => {
                let outcome = service.delete(&id)?;
                if !outcome.local {
                    eprintln!("No cached report with id {}", id);
                }
                report_remote("delete", &outcome.remote);
                Ok(())
            }
            Some(Commands::Clear { yes }) => {
                if !yes {
                    bail!("refusing to delete all reports without --yes");
                }
                let outcome = service.clear_all()?;
                report_remote("clear", &outcome.remote);
                Ok(())
            }
            Some(Commands::ExportCsv { output }) => {
                let reports = service.reports()?;
                if reports.is_empty() {
                    println!("No reports to export");
                    return Ok(());
                }
                let path =
                    output.unwrap_or_else(|| PathBuf::from(export::reports_csv_file_name(today)));
                fs::write(&path, export::reports_csv(&reports)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
                Ok(())
            }
            Some(Commands::Backup { output }) => {
                let path = output.unwrap_or_else(|| {
                    PathBuf::from(export::backup_file_name(Local::now().timestamp_millis()))
                });
                fs::write(&path, backup::export_json(service.cache())?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
                Ok(())
            }
            Some(Commands::Restore { file, merge }) => {
                let mut payload =
                    fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
                if merge {
                    let summary = backup::merge(service.cache(), &mut payload)?;
                    println!(
                        "Merged backup: {} added, {} already present",
                        summary.added, summary.skipped
                    );
                } else {
                    let count = backup::import_replace(service.cache(), &mut payload)?;
                    println!("Restored {} reports", count);
                }
                Ok(())
            }
        }
    }

    fn dashboard(service: &Service, today: NaiveDate, json: bool) -> anyhow::Result<()> {
        let data = Aggregator::dashboard(&service.reports()?, today);
        if json {
            println!("{}", serde_json::to_string_pretty(&data)?);
        } else {
            print!("{}", render::dashboard(&data));
        }
        Ok(())
    }
}
