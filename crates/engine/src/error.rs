//! The module contains the errors the engine can return.
//!
//! Both variants are client-side validation failures: they are raised before
//! anything is sent to the service.
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
