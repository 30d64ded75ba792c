pub mod alerts;
pub mod budgets;
pub mod login;
pub mod summary;
