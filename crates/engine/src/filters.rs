//! Query parameter normalization shared by the list, analytics and report
//! views.
//!
//! Absent, empty and whitespace-only values are never sent: the service
//! applies its "no filter" default when a parameter is missing, whereas an
//! empty string would be matched literally.

use std::{fmt, str::FromStr};

use api_types::expense::TransactionType;
use chrono::NaiveDate;

use crate::EngineError;

/// Reporting window for analytics and report queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    Week,
    #[default]
    Month,
    Year,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Custom { .. } => "custom",
        }
    }

    /// Builds a custom window; `end` must not precede `start`.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::Validation(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self::Custom { start, end })
    }

    /// Next fixed window, used by views that cycle through periods.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Today => Self::Week,
            Self::Week => Self::Month,
            Self::Month => Self::Year,
            Self::Year | Self::Custom { .. } => Self::Today,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { start, end } => write!(f, "{start} to {end}"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for Period {
    type Err = EngineError;

    /// Parses the fixed windows. Custom windows need explicit dates, see
    /// [`Period::custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(EngineError::Validation(format!(
                "unknown period '{other}' (expected today, week, month or year)"
            ))),
        }
    }
}

/// Optional filters for a query. Build with struct update syntax from
/// `QueryFilter::default()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub period: Option<Period>,
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl QueryFilter {
    pub fn for_period(period: Period) -> Self {
        Self {
            period: Some(period),
            ..Self::default()
        }
    }

    /// Query pairs to send, in a stable order.
    ///
    /// A custom period contributes its own `start_date`/`end_date`, which
    /// take precedence over the explicit date fields.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(period) = &self.period {
            pairs.push(("period", period.as_str().to_string()));
        }
        if let Some(category) = non_empty(self.category.as_deref()) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("type", kind.as_str().to_string()));
        }

        let (start, end) = match self.period {
            Some(Period::Custom { start, end }) => (Some(start), Some(end)),
            _ => (self.start_date, self.end_date),
        };
        if let Some(start) = start {
            pairs.push(("start_date", start.to_string()));
        }
        if let Some(end) = end {
            pairs.push(("end_date", end.to_string()));
        }

        pairs
    }
}

/// Trims `value` and drops it when nothing is left.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_category_is_omitted() {
        let filter = QueryFilter {
            category: Some(String::new()),
            kind: Some(TransactionType::Expense),
            ..QueryFilter::default()
        };
        assert_eq!(filter.to_query(), vec![("type", "expense".to_string())]);
    }

    #[test]
    fn whitespace_category_is_omitted_and_real_one_trimmed() {
        let blank = QueryFilter {
            category: Some("   ".to_string()),
            ..QueryFilter::default()
        };
        assert!(blank.to_query().is_empty());

        let set = QueryFilter {
            category: Some(" Travel ".to_string()),
            ..QueryFilter::default()
        };
        assert_eq!(set.to_query(), vec![("category", "Travel".to_string())]);
    }

    #[test]
    fn default_filter_sends_nothing() {
        assert!(QueryFilter::default().to_query().is_empty());
    }

    #[test]
    fn period_only() {
        assert_eq!(
            QueryFilter::for_period(Period::Year).to_query(),
            vec![("period", "year".to_string())]
        );
    }

    #[test]
    fn custom_period_carries_its_dates() {
        let period = Period::custom(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let filter = QueryFilter {
            period: Some(period),
            start_date: Some(date(2023, 1, 1)),
            ..QueryFilter::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("period", "custom".to_string()),
                ("start_date", "2024-01-01".to_string()),
                ("end_date", "2024-01-31".to_string()),
            ]
        );
    }

    #[test]
    fn custom_period_rejects_reversed_range() {
        assert!(Period::custom(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn parses_fixed_periods() {
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!(" year ".parse::<Period>().unwrap(), Period::Year);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn cycling_visits_every_fixed_period() {
        let mut period = Period::Today;
        let mut seen = vec![period];
        for _ in 0..3 {
            period = period.next();
            seen.push(period);
        }
        assert_eq!(
            seen,
            vec![Period::Today, Period::Week, Period::Month, Period::Year]
        );
        assert_eq!(Period::Year.next(), Period::Today);
    }
}
