//! # Household Survey Common Library
//!
//! Shared code for the household survey service:
//! - Survey data model (responses, expense categories)
//! - Common error type
//! - Configuration resolution

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{ExpenseCategory, Expenses, SurveyResponse};
