use std::{path::PathBuf, time::Duration};

use api_types::{budget::BudgetPeriod, expense::TransactionType, report::ExportFormat};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::Period;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/tracker.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service URL including the `/api` prefix.
    pub base_url: String,
    pub session_path: PathBuf,
    pub poll_interval_secs: u64,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001/api".to_string(),
            session_path: PathBuf::from("config/tracker_session.json"),
            poll_interval_secs: client::DEFAULT_POLL_INTERVAL.as_secs(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Dashboard log file, next to the session file.
    pub fn log_path(&self) -> PathBuf {
        self.session_path.with_file_name("tracker.log")
    }
}

#[derive(Debug, Parser)]
#[command(name = "tracker", disable_version_flag = true)]
#[command(about = "Personal expense tracker client")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8001/api).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override where the session is stored.
    #[arg(long, global = true)]
    pub session_path: Option<PathBuf>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in; the password is prompted for.
    Login {
        username: String,
    },
    /// Create an account and log into it.
    Register {
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
    Logout,
    /// Show the stored session.
    Whoami,
    Expenses(Expenses),
    Categories(Categories),
    Budgets(Budgets),
    Alerts(Alerts),
    /// Totals and per-category spending for a period.
    Summary(PeriodArgs),
    /// Chart datasets for a period.
    Charts(PeriodArgs),
    Report(Report),
    /// Interactive budgets/alerts/summary view.
    Dashboard,
}

#[derive(Debug, Args)]
pub struct Expenses {
    #[command(subcommand)]
    pub command: ExpensesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ExpensesCommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<TransactionType>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long = "type", value_parser = parse_kind, default_value = "expense")]
        kind: TransactionType,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<TransactionType>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Debug, Args)]
pub struct Categories {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        goal: Option<String>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        goal: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct Budgets {
    #[command(subcommand)]
    pub command: BudgetsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BudgetsCommand {
    List,
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        limit: String,
        #[arg(long, value_parser = parse_budget_period, default_value = "monthly")]
        period: BudgetPeriod,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        limit: Option<String>,
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
        #[arg(long)]
        inactive: bool,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Debug, Args)]
pub struct Alerts {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    List {
        /// Only show unread alerts.
        #[arg(long)]
        unread: bool,
    },
    /// Mark an alert as read.
    Read {
        id: Uuid,
    },
}

#[derive(Debug, Args)]
pub struct Report {
    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    Summary(PeriodArgs),
    /// Download the report into `--out` (a directory, default `.`).
    Export {
        #[arg(long, value_parser = parse_format, default_value = "csv")]
        format: ExportFormat,
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PeriodArgs {
    /// today, week, month or year.
    #[arg(long, default_value = "month")]
    pub period: Period,
    /// Custom range start; requires `--to`.
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

impl PeriodArgs {
    pub fn resolve(&self) -> Result<Period> {
        match (self.from, self.to) {
            (Some(start), Some(end)) => Ok(Period::custom(start, end)?),
            _ => Ok(self.period),
        }
    }
}

fn parse_kind(raw: &str) -> std::result::Result<TransactionType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "expense" => Ok(TransactionType::Expense),
        "income" => Ok(TransactionType::Income),
        other => Err(format!("unknown type '{other}' (expected expense or income)")),
    }
}

fn parse_budget_period(raw: &str) -> std::result::Result<BudgetPeriod, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "weekly" => Ok(BudgetPeriod::Weekly),
        "monthly" => Ok(BudgetPeriod::Monthly),
        other => Err(format!("unknown period '{other}' (expected weekly or monthly)")),
    }
}

fn parse_format(raw: &str) -> std::result::Result<ExportFormat, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "json" => Ok(ExportFormat::Json),
        other => Err(format!("unknown format '{other}' (expected csv or json)")),
    }
}

/// Layers the config file, `TRACKER_*` environment variables and command
/// line overrides, in that order.
pub fn load(cli: &Cli) -> Result<AppConfig> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("TRACKER"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(session_path) = &cli.session_path {
        settings.session_path = session_path.clone();
    }
    if let Some(level) = &cli.level {
        settings.level = level.clone();
    }

    if settings.base_url.trim().is_empty() {
        return Err(AppError::Usage("base_url must not be empty".to_string()));
    }

    Ok(settings)
}
