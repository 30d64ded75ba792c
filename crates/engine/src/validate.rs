//! Client-side validation of user input.
//!
//! Drafts hold what the user typed; `validate` turns them into request
//! bodies or reports the first missing/invalid field. Nothing is sent to
//! the service until validation passes.

use api_types::{
    budget::{BudgetNew, BudgetPeriod},
    category::{Category, CategoryNew},
    expense::{ExpenseNew, TransactionType},
};
use chrono::NaiveDate;

use crate::{EngineError, Money, ResultEngine, filters::non_empty};

fn required<'a>(value: &'a str, field: &str) -> ResultEngine<&'a str> {
    non_empty(Some(value))
        .ok_or_else(|| EngineError::Validation(format!("{field} is required")))
}

/// Parses a strictly positive amount typed by the user.
pub fn positive_amount(raw: &str, field: &str) -> ResultEngine<Money> {
    let amount: Money = required(raw, field)?.parse()?;
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!("{field} must be > 0")));
    }
    Ok(amount)
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub kind: TransactionType,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpenseDraft {
    pub fn validate(&self) -> ResultEngine<ExpenseNew> {
        let title = required(&self.title, "title")?;
        let amount = positive_amount(&self.amount, "amount")?;
        let category = required(&self.category, "category")?;

        Ok(ExpenseNew {
            title: title.to_string(),
            amount: amount.to_major(),
            category: category.to_string(),
            kind: self.kind,
            description: non_empty(self.description.as_deref()).map(str::to_string),
            date: self.date,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct BudgetDraft {
    pub category: String,
    pub limit: String,
    pub period: BudgetPeriod,
}

impl BudgetDraft {
    pub fn validate(&self) -> ResultEngine<BudgetNew> {
        let category = required(&self.category, "category")?;
        let limit = positive_amount(&self.limit, "limit")?;

        Ok(BudgetNew {
            category: category.to_string(),
            limit_amount: limit.to_major(),
            period: self.period,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: Option<String>,
    pub goal: Option<String>,
}

impl CategoryDraft {
    /// Validates a new category against the currently known ones
    /// (predefined and custom).
    pub fn validate(&self, known: &[Category]) -> ResultEngine<CategoryNew> {
        let name = required(&self.name, "name")?;
        if known.iter().any(|category| category.name.trim() == name) {
            return Err(EngineError::Validation(format!(
                "category '{name}' already exists"
            )));
        }

        let goal = match non_empty(self.goal.as_deref()) {
            Some(raw) => Some(positive_amount(raw, "goal")?.to_major()),
            None => None,
        };

        Ok(CategoryNew {
            name: name.to_string(),
            icon: non_empty(self.icon.as_deref()).map(str::to_string),
            goal,
        })
    }
}
