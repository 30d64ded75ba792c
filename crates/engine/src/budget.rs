//! Budget status evaluation.
//!
//! A budget's status is derived from `(current_spent, limit_amount)` on
//! every render and is never stored: the latest budget snapshot from the
//! service is the only input.
//!
//! | percentage        | level      |
//! |-------------------|------------|
//! | `p < 80`          | `Ok`       |
//! | `80 <= p < 100`   | `Warning`  |
//! | `p >= 100`        | `Exceeded` |

use api_types::budget::Budget;
use serde::Serialize;

/// Percentage at which a budget enters the warning band (inclusive).
pub const WARNING_THRESHOLD: f64 = 80.0;
/// Percentage at which a budget is exceeded (inclusive).
pub const EXCEEDED_THRESHOLD: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Ok,
    Warning,
    Exceeded,
}

impl BudgetLevel {
    /// Classifies a percentage. Callers must pass a finite, non-negative
    /// value; [`evaluate_amounts`] guarantees it.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= EXCEEDED_THRESHOLD {
            Self::Exceeded
        } else if percentage >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Ok
        }
    }

    /// Name of the color class used by the views.
    #[must_use]
    pub fn color_class(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// Spent over limit, times 100. Finite and `>= 0`, unbounded above.
    pub percentage: f64,
    pub level: BudgetLevel,
}

impl BudgetStatus {
    /// Fill ratio for a progress bar, clamped to `[0, 100]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.percentage.min(EXCEEDED_THRESHOLD)
    }

    /// Textual percentage with one decimal, e.g. `85.0%`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

/// Evaluates the status of a budget snapshot.
#[must_use]
pub fn evaluate(budget: &Budget) -> BudgetStatus {
    evaluate_amounts(budget.current_spent, budget.limit_amount)
}

/// Evaluates raw amounts.
///
/// A limit that is zero, negative or not finite cannot be divided by: any
/// positive spend is then `Exceeded` at 100%, no spend is `Ok` at 0%. A
/// negative or non-finite spend counts as nothing spent.
#[must_use]
pub fn evaluate_amounts(current_spent: f64, limit_amount: f64) -> BudgetStatus {
    let spent = if current_spent.is_finite() {
        current_spent.max(0.0)
    } else {
        0.0
    };

    if !limit_amount.is_finite() || limit_amount <= 0.0 {
        let percentage = if spent > 0.0 { EXCEEDED_THRESHOLD } else { 0.0 };
        return BudgetStatus {
            percentage,
            level: BudgetLevel::from_percentage(percentage),
        };
    }

    let mut percentage = spent / limit_amount * 100.0;
    if !percentage.is_finite() {
        // Tiny positive limits can overflow the division.
        percentage = f64::MAX;
    }

    BudgetStatus {
        percentage,
        level: BudgetLevel::from_percentage(percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::budget::BudgetPeriod;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn budget(limit: f64, spent: f64) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            category: "Food & Dining".to_string(),
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
    fn eighty_five_percent_is_warning() {
        let status = evaluate(&budget(100.0, 85.0));
        assert_eq!(status.percentage, 85.0);
        assert_eq!(status.level, BudgetLevel::Warning);
        assert_eq!(status.label(), "85.0%");
    }

    #[test]
    fn full_spend_is_exceeded() {
        let status = evaluate(&budget(100.0, 100.0));
        assert_eq!(status.percentage, 100.0);
        assert_eq!(status.level, BudgetLevel::Exceeded);
    }

    #[test]
    fn thresholds_are_inclusive_low() {
        assert_eq!(evaluate_amounts(79.99, 100.0).level, BudgetLevel::Ok);
        assert_eq!(evaluate_amounts(80.0, 100.0).level, BudgetLevel::Warning);
        assert_eq!(evaluate_amounts(99.99, 100.0).level, BudgetLevel::Warning);
        assert_eq!(evaluate_amounts(100.0, 100.0).level, BudgetLevel::Exceeded);
    }

    #[test]
    fn level_agrees_with_percentage_everywhere() {
        for limit in [1.0, 3.0, 50.0, 100.0, 999.99] {
            for step in 0..=300 {
                let spent = limit * f64::from(step) / 200.0;
                let status = evaluate_amounts(spent, limit);
                let p = status.percentage;
                assert!(p.is_finite() && p >= 0.0);
                let expected = if p >= 100.0 {
                    BudgetLevel::Exceeded
                } else if p >= 80.0 {
                    BudgetLevel::Warning
                } else {
                    BudgetLevel::Ok
                };
                assert_eq!(status.level, expected, "spent={spent} limit={limit}");
            }
        }
    }

    #[test]
    fn zero_limit_never_yields_nan_or_infinity() {
        let spent = evaluate(&budget(0.0, 12.0));
        assert_eq!(spent.percentage, 100.0);
        assert_eq!(spent.level, BudgetLevel::Exceeded);

        let idle = evaluate(&budget(0.0, 0.0));
        assert_eq!(idle.percentage, 0.0);
        assert_eq!(idle.level, BudgetLevel::Ok);

        let weird = evaluate_amounts(f64::INFINITY, f64::NAN);
        assert!(weird.percentage.is_finite());
        assert_eq!(weird.level, BudgetLevel::Ok);
    }

    #[test]
    fn tiny_limit_stays_finite() {
        let status = evaluate_amounts(f64::MAX, f64::MIN_POSITIVE);
        assert!(status.percentage.is_finite());
        assert_eq!(status.level, BudgetLevel::Exceeded);
    }

    #[test]
    fn progress_is_clamped_for_rendering() {
        assert_eq!(evaluate_amounts(250.0, 100.0).progress(), 100.0);
        assert_eq!(evaluate_amounts(250.0, 100.0).percentage, 250.0);
        assert_eq!(evaluate_amounts(-5.0, 100.0).progress(), 0.0);
    }
}
