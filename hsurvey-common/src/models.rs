//! Survey data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five fixed spending buckets tracked per response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Utilities,
    Entertainment,
    SchoolFees,
    Shopping,
    Healthcare,
}

impl ExpenseCategory {
    /// All categories in form/file column order
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Utilities,
        ExpenseCategory::Entertainment,
        ExpenseCategory::SchoolFees,
        ExpenseCategory::Shopping,
        ExpenseCategory::Healthcare,
    ];

    /// Field name used by the form, the fallback file and the expenses document
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::SchoolFees => "school_fees",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Healthcare => "healthcare",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category spending. Every category is always present; absent values read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    #[serde(default)]
    pub utilities: f64,
    #[serde(default)]
    pub entertainment: f64,
    #[serde(default)]
    pub school_fees: f64,
    #[serde(default)]
    pub shopping: f64,
    #[serde(default)]
    pub healthcare: f64,
}

impl Expenses {
    pub fn get(&self, category: ExpenseCategory) -> f64 {
        match category {
            ExpenseCategory::Utilities => self.utilities,
            ExpenseCategory::Entertainment => self.entertainment,
            ExpenseCategory::SchoolFees => self.school_fees,
            ExpenseCategory::Shopping => self.shopping,
            ExpenseCategory::Healthcare => self.healthcare,
        }
    }

    pub fn set(&mut self, category: ExpenseCategory, amount: f64) {
        match category {
            ExpenseCategory::Utilities => self.utilities = amount,
            ExpenseCategory::Entertainment => self.entertainment = amount,
            ExpenseCategory::SchoolFees => self.school_fees = amount,
            ExpenseCategory::Shopping => self.shopping = amount,
            ExpenseCategory::Healthcare => self.healthcare = amount,
        }
    }

    /// Sum across all five categories
    pub fn total(&self) -> f64 {
        ExpenseCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// One submitted survey entry. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub age: i64,
    pub gender: String,
    pub total_income: f64,
    pub expenses: Expenses,
    /// Set at submission, never mutated
    pub timestamp: DateTime<Utc>,
}

impl SurveyResponse {
    pub fn new(age: i64, gender: impl Into<String>, total_income: f64, expenses: Expenses) -> Self {
        Self {
            age,
            gender: gender.into(),
            total_income,
            expenses,
            timestamp: Utc::now(),
        }
    }

    /// Sum of the expense categories (derived, not stored)
    pub fn total_spending(&self) -> f64 {
        self.expenses.total()
    }

    /// Income left after spending (derived, not stored)
    pub fn savings(&self) -> f64 {
        self.total_income - self.total_spending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_expenses() -> Expenses {
        Expenses {
            utilities: 200.0,
            entertainment: 50.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_category_names_match_form_fields() {
        let names: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["utilities", "entertainment", "school_fees", "shopping", "healthcare"]
        );
    }

    #[test]
    fn test_derived_spending_and_savings() {
        let response = SurveyResponse::new(30, "F", 1000.0, sample_expenses());
        assert_eq!(response.total_spending(), 250.0);
        assert_eq!(response.savings(), 750.0);
        assert_eq!(response.total_spending() + response.savings(), response.total_income);
    }

    #[test]
    fn test_savings_can_go_negative() {
        let expenses = Expenses {
            shopping: 1500.0,
            ..Default::default()
        };
        let response = SurveyResponse::new(41, "M", 1000.0, expenses);
        assert_eq!(response.savings(), -500.0);
    }

    #[test]
    fn test_expenses_set_and_get() {
        let mut expenses = Expenses::default();
        for (i, category) in ExpenseCategory::ALL.iter().enumerate() {
            expenses.set(*category, (i + 1) as f64);
        }
        assert_eq!(expenses.get(ExpenseCategory::SchoolFees), 3.0);
        assert_eq!(expenses.total(), 15.0);
    }

    #[test]
    fn test_expenses_document_defaults_missing_categories() {
        let expenses: Expenses = serde_json::from_str(r#"{"utilities": 12.5}"#).unwrap();
        assert_eq!(expenses.utilities, 12.5);
        assert_eq!(expenses.healthcare, 0.0);
        assert_eq!(expenses.total(), 12.5);
    }
}
