//! Derived views over the alert list.

use api_types::alert::{Alert, AlertType};

/// Read state of an alert. `Unread -> Read` is the only transition and it
/// happens on the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertState {
    Unread,
    Read,
}

impl From<&Alert> for AlertState {
    fn from(alert: &Alert) -> Self {
        if alert.is_read {
            Self::Read
        } else {
            Self::Unread
        }
    }
}

/// Number of alerts with `is_read == false`.
#[must_use]
pub fn unread_count(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|alert| !alert.is_read).count()
}

/// Alerts split by type for display. Each group keeps the service order.
#[derive(Debug, Default, PartialEq)]
pub struct AlertGroups<'a> {
    pub exceeded: Vec<&'a Alert>,
    pub warning: Vec<&'a Alert>,
}

impl AlertGroups<'_> {
    pub fn is_empty(&self) -> bool {
        self.exceeded.is_empty() && self.warning.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exceeded.len() + self.warning.len()
    }
}

#[must_use]
pub fn group_by_type(alerts: &[Alert]) -> AlertGroups<'_> {
    let mut groups = AlertGroups::default();
    for alert in alerts {
        match alert.alert_type {
            AlertType::Exceeded => groups.exceeded.push(alert),
            AlertType::Warning => groups.warning.push(alert),
        }
    }
    groups
}
