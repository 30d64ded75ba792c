//! Client-side domain logic.
//!
//! Everything here is pure: the service owns the data and does the heavy
//! computation, the engine only derives what the views need from the latest
//! snapshot (budget status, unread counts, query parameters) and validates
//! user input before it is sent.

pub use alerts::{AlertGroups, AlertState, group_by_type, unread_count};
pub use budget::{
    BudgetLevel, BudgetStatus, EXCEEDED_THRESHOLD, WARNING_THRESHOLD, evaluate, evaluate_amounts,
};
pub use error::EngineError;
pub use filters::{Period, QueryFilter};
pub use money::Money;
pub use validate::{BudgetDraft, CategoryDraft, ExpenseDraft};

pub mod alerts;
pub mod budget;
mod error;
pub mod filters;
mod money;
pub mod validate;

pub type ResultEngine<T> = Result<T, EngineError>;
