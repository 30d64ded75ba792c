use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body returned by the service for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Acknowledgement returned by update/delete endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub username: String,
        pub password: String,
        pub email: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        pub id: Uuid,
        pub username: String,
        #[serde(default)]
        pub email: Option<String>,
    }

    /// Response of both login and register.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub token: String,
        pub user: User,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        #[default]
        Expense,
        Income,
    }

    impl TransactionType {
        /// Returns the canonical string used in query parameters.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Expense => "expense",
                Self::Income => "income",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: Uuid,
        pub title: String,
        pub amount: f64,
        pub category: String,
        #[serde(rename = "type", default)]
        pub kind: TransactionType,
        #[serde(default)]
        pub description: Option<String>,
        pub date: NaiveDate,
        #[serde(default)]
        pub created_at: Option<NaiveDateTime>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        pub amount: f64,
        pub category: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub description: Option<String>,
        /// Defaults to today on the service side when absent.
        pub date: Option<NaiveDate>,
    }

    /// Partial update: absent fields are left untouched by the service.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub amount: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category: Option<String>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub kind: Option<TransactionType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub message: String,
        pub expense: Expense,
    }
}

pub mod category {
    use super::*;

    /// A category as listed by the service.
    ///
    /// Predefined categories have no `id` and cannot be edited.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        #[serde(default)]
        pub id: Option<Uuid>,
        pub name: String,
        pub icon: String,
        #[serde(default)]
        pub goal: Option<f64>,
        #[serde(default)]
        pub is_custom: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub predefined: Vec<Category>,
        pub custom: Vec<Category>,
        /// `predefined` followed by `custom`.
        pub all: Vec<Category>,
    }

    impl CategoriesResponse {
        pub fn find(&self, name: &str) -> Option<&Category> {
            self.all.iter().find(|category| category.name == name)
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub icon: Option<String>,
        pub goal: Option<f64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub icon: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub goal: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreated {
        pub message: String,
        pub category: Category,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Weekly,
        #[default]
        Monthly,
    }

    impl BudgetPeriod {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Weekly => "weekly",
                Self::Monthly => "monthly",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Budget {
        pub id: Uuid,
        pub category: String,
        pub limit_amount: f64,
        #[serde(default)]
        pub current_spent: f64,
        pub period: BudgetPeriod,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        #[serde(default = "default_active")]
        pub is_active: bool,
        #[serde(default)]
        pub created_at: Option<NaiveDateTime>,
    }

    fn default_active() -> bool {
        true
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category: String,
        pub limit_amount: f64,
        pub period: BudgetPeriod,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub limit_amount: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCreated {
        pub message: String,
        pub budget: Budget,
    }
}

pub mod alert {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AlertType {
        Warning,
        Exceeded,
    }

    /// Notification created by the service when a budget crosses a threshold.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Alert {
        pub id: Uuid,
        #[serde(default)]
        pub budget_id: Option<Uuid>,
        pub alert_type: AlertType,
        pub message: String,
        #[serde(default)]
        pub percentage: f64,
        #[serde(default)]
        pub is_read: bool,
        pub created_at: NaiveDateTime,
    }
}

pub mod analytics {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_expenses: f64,
        pub total_income: f64,
        pub balance: f64,
        #[serde(default)]
        pub category_breakdown: BTreeMap<String, f64>,
        pub transaction_count: u64,
        pub period: String,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Series {
        pub labels: Vec<String>,
        pub data: Vec<f64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PieChart {
        pub expenses: Series,
        pub income: Series,
    }

    /// Daily totals; `labels` are ISO dates in ascending order.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BarChart {
        pub labels: Vec<String>,
        pub expenses: Vec<f64>,
        pub income: Vec<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartData {
        pub pie_chart: PieChart,
        pub bar_chart: BarChart,
        pub period: String,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }
}

pub mod report {
    use std::collections::BTreeMap;

    use super::*;
    use crate::expense::Expense;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportTotals {
        pub total_income: f64,
        pub total_expenses: f64,
        pub net_balance: f64,
        pub total_transactions: u64,
    }

    /// Per-category totals.
    ///
    /// The service reports expense totals under either `expenses` or
    /// `expense`; use [`CategoryStats::spent`] to read them.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryStats {
        #[serde(default)]
        pub expenses: f64,
        #[serde(default)]
        pub expense: f64,
        #[serde(default)]
        pub income: f64,
        #[serde(default)]
        pub transactions: u64,
    }

    impl CategoryStats {
        pub fn spent(&self) -> f64 {
            self.expenses + self.expense
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportSummary {
        pub report_period: String,
        pub summary: ReportTotals,
        #[serde(default)]
        pub category_breakdown: BTreeMap<String, CategoryStats>,
        #[serde(default)]
        pub top_expense_categories: Vec<(String, f64)>,
        #[serde(default)]
        pub transactions: Vec<Expense>,
        pub generated_at: NaiveDateTime,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExportFormat {
        #[default]
        Csv,
        Json,
    }

    impl ExportFormat {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Csv => "csv",
                Self::Json => "json",
            }
        }

        pub fn extension(self) -> &'static str {
            self.as_str()
        }
    }

    /// A downloaded export, kept as raw bytes.
    #[derive(Debug, Clone)]
    pub struct ExportedReport {
        pub filename: String,
        pub content_type: Option<String>,
        pub bytes: Vec<u8>,
    }
}
