//! One-shot subcommands. Each one is a request (or a few) followed by
//! printing the result; failures bubble up to `main`.

mod prompt;

use std::path::Path;

use api_types::{
    alert::Alert,
    budget::{Budget, BudgetUpdate},
    category::CategoryUpdate,
    expense::{Expense, ExpenseUpdate},
};
use client::{AlertCenter, ApiClient, AuthGate};
use engine::{
    BudgetDraft, CategoryDraft, ExpenseDraft, Money, QueryFilter, filters::non_empty,
    validate::positive_amount,
};

use crate::{
    config::{
        AlertsCommand, BudgetsCommand, CategoriesCommand, Command, ExpensesCommand, ReportCommand,
    },
    error::{AppError, Result},
};

/// Handles shared by every subcommand.
#[derive(Clone, Debug)]
pub struct Services {
    pub api: ApiClient,
    pub auth: AuthGate,
    pub alerts: AlertCenter,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthGate::new(api.clone()),
            alerts: AlertCenter::new(api.clone()),
            api,
        }
    }
}

pub async fn run(command: Command, services: &Services) -> Result<()> {
    match command {
        Command::Login { username } => {
            let password = prompt::password("Password: ")?;
            let user = services.auth.login(&username, &password).await?;
            println!("Logged in as {}", user.username);
        }
        Command::Register { username, email } => {
            let password = prompt::new_password()?;
            let user = services
                .auth
                .register(&username, &password, email.as_deref())
                .await?;
            println!("Registered and logged in as {}", user.username);
        }
        Command::Logout => {
            services.auth.logout().await;
            println!("Logged out");
        }
        Command::Whoami => match services.auth.session().user().await {
            Some(user) => match user.email {
                Some(email) => println!("{} <{email}>", user.username),
                None => println!("{}", user.username),
            },
            None => println!("Not logged in"),
        },
        Command::Expenses(args) => expenses(args.command, &services.api).await?,
        Command::Categories(args) => categories(args.command, &services.api).await?,
        Command::Budgets(args) => budgets(args.command, &services.api).await?,
        Command::Alerts(args) => alerts(args.command, &services.alerts).await?,
        Command::Summary(args) => {
            let summary = services.api.summary(args.resolve()?).await?;
            println!("Period:       {}", summary.period);
            println!("Income:       {}", Money::from_major(summary.total_income));
            println!("Expenses:     {}", Money::from_major(summary.total_expenses));
            println!("Balance:      {}", Money::from_major(summary.balance));
            println!("Transactions: {}", summary.transaction_count);
            for (category, amount) in &summary.category_breakdown {
                println!("  {category:<20} {}", Money::from_major(*amount));
            }
        }
        Command::Charts(args) => {
            let charts = services.api.charts(args.resolve()?).await?;
            println!("Expenses by category:");
            for (label, value) in charts
                .pie_chart
                .expenses
                .labels
                .iter()
                .zip(&charts.pie_chart.expenses.data)
            {
                println!("  {label:<20} {}", Money::from_major(*value));
            }
            println!("Daily totals (expenses / income):");
            for ((day, spent), earned) in charts
                .bar_chart
                .labels
                .iter()
                .zip(&charts.bar_chart.expenses)
                .zip(&charts.bar_chart.income)
            {
                println!(
                    "  {day}  {:>12}  {:>12}",
                    Money::from_major(*spent).to_string(),
                    Money::from_major(*earned).to_string()
                );
            }
        }
        Command::Report(args) => report(args.command, &services.api).await?,
        Command::Dashboard => {
            return Err(AppError::Usage(
                "the dashboard is started from main".to_string(),
            ));
        }
    }
    Ok(())
}

async fn expenses(command: ExpensesCommand, api: &ApiClient) -> Result<()> {
    match command {
        ExpensesCommand::List {
            category,
            kind,
            from,
            to,
        } => {
            let filter = QueryFilter {
                category,
                kind,
                start_date: from,
                end_date: to,
                ..QueryFilter::default()
            };
            let expenses = api.expenses(&filter).await?;
            if expenses.is_empty() {
                println!("No transactions");
            }
            for expense in &expenses {
                println!("{}", expense_line(expense));
            }
        }
        ExpensesCommand::Add {
            title,
            amount,
            category,
            kind,
            description,
            date,
        } => {
            let draft = ExpenseDraft {
                title,
                amount,
                category,
                kind,
                description,
                date,
            };
            let expense = api.create_expense(&draft.validate()?).await?;
            println!("Created {}", expense_line(&expense));
        }
        ExpensesCommand::Edit {
            id,
            title,
            amount,
            category,
            kind,
            description,
            date,
        } => {
            let update = ExpenseUpdate {
                title: non_empty(title.as_deref()).map(str::to_string),
                amount: amount
                    .as_deref()
                    .map(|raw| positive_amount(raw, "amount"))
                    .transpose()?
                    .map(Money::to_major),
                category: non_empty(category.as_deref()).map(str::to_string),
                kind,
                description,
                date,
            };
            api.update_expense(id, &update).await?;
            println!("Updated {id}");
        }
        ExpensesCommand::Delete { id } => {
            api.delete_expense(id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

async fn categories(command: CategoriesCommand, api: &ApiClient) -> Result<()> {
    match command {
        CategoriesCommand::List => {
            let categories = api.categories().await?;
            for category in &categories.all {
                let goal = category
                    .goal
                    .map(|goal| format!("  goal {}", Money::from_major(goal)))
                    .unwrap_or_default();
                let origin = if category.is_custom { "custom" } else { "built-in" };
                let id = category.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{} {:<20} {origin:<8}{goal} {id}", category.icon, category.name);
            }
        }
        CategoriesCommand::Add { name, icon, goal } => {
            let known = api.categories().await?;
            let draft = CategoryDraft { name, icon, goal };
            let category = api.create_category(&draft.validate(&known.all)?).await?;
            println!("Created category {} {}", category.icon, category.name);
        }
        CategoriesCommand::Update {
            id,
            name,
            icon,
            goal,
        } => {
            let update = CategoryUpdate {
                name: non_empty(name.as_deref()).map(str::to_string),
                icon: non_empty(icon.as_deref()).map(str::to_string),
                goal: goal
                    .as_deref()
                    .map(|raw| positive_amount(raw, "goal"))
                    .transpose()?
                    .map(Money::to_major),
            };
            api.update_category(id, &update).await?;
            println!("Updated category {id}");
        }
    }
    Ok(())
}

async fn budgets(command: BudgetsCommand, api: &ApiClient) -> Result<()> {
    match command {
        BudgetsCommand::List => {
            let budgets = api.budgets().await?;
            if budgets.is_empty() {
                println!("No budgets");
            }
            for budget in &budgets {
                println!("{}", budget_line(budget));
            }
        }
        BudgetsCommand::Add {
            category,
            limit,
            period,
        } => {
            let draft = BudgetDraft {
                category,
                limit,
                period,
            };
            let budget = api.create_budget(&draft.validate()?).await?;
            println!("Created {}", budget_line(&budget));
        }
        BudgetsCommand::Update {
            id,
            limit,
            active,
            inactive,
        } => {
            let update = BudgetUpdate {
                limit_amount: limit
                    .as_deref()
                    .map(|raw| positive_amount(raw, "limit"))
                    .transpose()?
                    .map(Money::to_major),
                is_active: match (active, inactive) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            if update.limit_amount.is_none() && update.is_active.is_none() {
                return Err(AppError::Usage(
                    "nothing to update (pass --limit, --active or --inactive)".to_string(),
                ));
            }
            api.update_budget(id, &update).await?;
            println!("Updated budget {id}");
        }
        BudgetsCommand::Delete { id } => {
            api.delete_budget(id).await?;
            println!("Deleted budget {id}");
        }
    }
    Ok(())
}

async fn alerts(command: AlertsCommand, center: &AlertCenter) -> Result<()> {
    match command {
        AlertsCommand::List { unread } => {
            center.fetch().await?;
            let snapshot = center.snapshot().await;
            println!("{} unread", snapshot.unread);

            let shown: Vec<Alert> = snapshot
                .alerts
                .iter()
                .filter(|alert| !unread || !alert.is_read)
                .cloned()
                .collect();
            let groups = engine::group_by_type(&shown);
            for (title, alerts) in [("Exceeded", &groups.exceeded), ("Warning", &groups.warning)] {
                if alerts.is_empty() {
                    continue;
                }
                println!("{title} ({})", alerts.len());
                for alert in alerts {
                    println!("{}", alert_line(alert));
                }
            }
        }
        AlertsCommand::Read { id } => {
            center.mark_read(id).await?;
            println!("Marked {id} as read ({} unread)", center.unread_count().await);
        }
    }
    Ok(())
}

async fn report(command: ReportCommand, api: &ApiClient) -> Result<()> {
    match command {
        ReportCommand::Summary(args) => {
            let report = api.report_summary(args.resolve()?).await?;
            let totals = &report.summary;
            println!("Report:       {}", report.report_period);
            println!("Income:       {}", Money::from_major(totals.total_income));
            println!("Expenses:     {}", Money::from_major(totals.total_expenses));
            println!("Net balance:  {}", Money::from_major(totals.net_balance));
            println!("Transactions: {}", totals.total_transactions);
            println!("By category:");
            for (category, stats) in &report.category_breakdown {
                println!(
                    "  {category:<20} spent {:>12}  earned {:>12}  ({} tx)",
                    Money::from_major(stats.spent()).to_string(),
                    Money::from_major(stats.income).to_string(),
                    stats.transactions
                );
            }
            if !report.top_expense_categories.is_empty() {
                println!("Top spending:");
                for (rank, (category, amount)) in report.top_expense_categories.iter().enumerate() {
                    println!("  {}. {category} {}", rank + 1, Money::from_major(*amount));
                }
            }
        }
        ReportCommand::Export {
            format,
            period,
            out,
        } => {
            let export = api.export_report(format, period.resolve()?).await?;
            let path = write_export(&out, &export.filename, &export.bytes)?;
            println!("Saved {} ({} bytes)", path.display(), export.bytes.len());
        }
    }
    Ok(())
}

fn write_export(dir: &Path, filename: &str, bytes: &[u8]) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    tracing::info!("export written to {}", path.display());
    Ok(path)
}

fn expense_line(expense: &Expense) -> String {
    let sign = match expense.kind {
        api_types::expense::TransactionType::Expense => "-",
        api_types::expense::TransactionType::Income => "+",
    };
    let amount = format!("{sign}{}", Money::from_major(expense.amount));
    format!(
        "{} {}  {amount:<11} {:<14} {}",
        expense.id, expense.date, expense.category, expense.title
    )
}

fn budget_line(budget: &Budget) -> String {
    let status = engine::evaluate(budget);
    let state = if budget.is_active { "" } else { " (inactive)" };
    format!(
        "{} {:<16} {} / {} {:>7} {:<8} {}{state}",
        budget.id,
        budget.category,
        Money::from_major(budget.current_spent),
        Money::from_major(budget.limit_amount),
        status.label(),
        status.level.color_class(),
        budget.period.as_str(),
    )
}

fn alert_line(alert: &Alert) -> String {
    let marker = if alert.is_read { " " } else { "●" };
    format!(
        "  {marker} {} {}  {}",
        alert.id,
        alert.created_at.format("%Y-%m-%d %H:%M"),
        alert.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::budget::BudgetPeriod;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn budget(spent: f64, limit: f64) -> Budget {
        Budget {
            id: Uuid::nil(),
            category: "Food".to_string(),
            limit_amount: limit,
            current_spent: spent,
            period: BudgetPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            is_active: true,
            created_at: None,
        }
    }

    #[test]
    fn budget_line_shows_status() {
        let line = budget_line(&budget(85.0, 100.0));
        assert!(line.contains("$85.00 / $100.00"));
        assert!(line.contains("85.0%"));
        assert!(line.contains("warning"));
    }

    #[test]
    fn zero_limit_budget_line_is_finite() {
        let line = budget_line(&budget(5.0, 0.0));
        assert!(line.contains("100.0%"));
        assert!(!line.contains("inf"));
        assert!(!line.contains("NaN"));
    }

    #[test]
    fn export_lands_in_the_output_dir() {
        let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/test_exports")
            .join(Uuid::new_v4().to_string());
        let path = write_export(&dir, "report.csv", b"a,b\n").unwrap();
        assert_eq!(path, dir.join("report.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
