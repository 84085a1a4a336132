//! Typed parsing of the intake form

use chrono::{DateTime, Utc};
use hsurvey_common::{ExpenseCategory, Expenses, SurveyResponse};
use serde::Deserialize;
use thiserror::Error;

/// Raw form fields as posted to `/submit`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionForm {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub total_income: Option<String>,
    pub utilities: Option<String>,
    pub entertainment: Option<String>,
    pub school_fees: Option<String>,
    pub shopping: Option<String>,
    pub healthcare: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}, got {value:?}")]
    InvalidNumber {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl SubmissionForm {
    /// Coerce the fields into a response stamped with `timestamp`.
    ///
    /// `age` must be an integer and amounts finite decimals. Expense fields
    /// that are missing or blank count as 0. No range checks are applied.
    pub fn parse(self, timestamp: DateTime<Utc>) -> Result<SurveyResponse, ValidationError> {
        let age_raw = required("age", self.age.as_deref())?;
        let age = age_raw
            .parse::<i64>()
            .map_err(|_| invalid("age", "an integer", age_raw))?;

        let gender = required("gender", self.gender.as_deref())?.to_string();

        let total_income = decimal("total_income", required("total_income", self.total_income.as_deref())?)?;

        let mut expenses = Expenses::default();
        for category in ExpenseCategory::ALL {
            let raw = match category {
                ExpenseCategory::Utilities => self.utilities.as_deref(),
                ExpenseCategory::Entertainment => self.entertainment.as_deref(),
                ExpenseCategory::SchoolFees => self.school_fees.as_deref(),
                ExpenseCategory::Shopping => self.shopping.as_deref(),
                ExpenseCategory::Healthcare => self.healthcare.as_deref(),
            };
            let amount = match raw.map(str::trim).filter(|v| !v.is_empty()) {
                Some(value) => decimal(category.as_str(), value)?,
                None => 0.0,
            };
            expenses.set(category, amount);
        }

        Ok(SurveyResponse {
            age,
            gender,
            total_income,
            expenses,
            timestamp,
        })
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn decimal(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(field, "a decimal number", value))
}

fn invalid(field: &'static str, expected: &'static str, value: &str) -> ValidationError {
    ValidationError::InvalidNumber {
        field,
        expected,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> SubmissionForm {
        let mut form = SubmissionForm::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "age" => form.age = value,
                "gender" => form.gender = value,
                "total_income" => form.total_income = value,
                "utilities" => form.utilities = value,
                "entertainment" => form.entertainment = value,
                "school_fees" => form.school_fees = value,
                "shopping" => form.shopping = value,
                "healthcare" => form.healthcare = value,
                other => panic!("unknown field {other}"),
            }
        }
        form
    }

    #[test]
    fn test_omitted_expenses_default_to_zero() {
        let now = Utc::now();
        let response = form(&[
            ("age", "30"),
            ("gender", "F"),
            ("total_income", "1000"),
            ("utilities", "200"),
            ("entertainment", "50"),
        ])
        .parse(now)
        .unwrap();

        assert_eq!(response.age, 30);
        assert_eq!(response.gender, "F");
        assert_eq!(response.expenses.school_fees, 0.0);
        assert_eq!(response.expenses.shopping, 0.0);
        assert_eq!(response.expenses.healthcare, 0.0);
        assert_eq!(response.total_spending(), 250.0);
        assert_eq!(response.savings(), 750.0);
        assert_eq!(response.timestamp, now);
    }

    #[test]
    fn test_blank_expense_is_zero() {
        let response = form(&[
            ("age", "52"),
            ("gender", "M"),
            ("total_income", "2500.50"),
            ("shopping", "  "),
            ("healthcare", "75.25"),
        ])
        .parse(Utc::now())
        .unwrap();

        assert_eq!(response.expenses.shopping, 0.0);
        assert_eq!(response.expenses.healthcare, 75.25);
        assert_eq!(response.total_income, 2500.5);
    }

    #[test]
    fn test_missing_required_fields() {
        let err = form(&[("gender", "F"), ("total_income", "1")])
            .parse(Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("age"));

        let err = form(&[("age", "30"), ("total_income", "1")])
            .parse(Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("gender"));

        let err = form(&[("age", "30"), ("gender", "F")])
            .parse(Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("total_income"));
    }

    #[test]
    fn test_non_integer_age_rejected() {
        let err = form(&[("age", "30.5"), ("gender", "F"), ("total_income", "1")])
            .parse(Utc::now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumber { field: "age", .. }));
    }

    #[test]
    fn test_non_numeric_amounts_rejected() {
        let err = form(&[("age", "30"), ("gender", "F"), ("total_income", "lots")])
            .parse(Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidNumber { field: "total_income", .. }
        ));

        let err = form(&[
            ("age", "30"),
            ("gender", "F"),
            ("total_income", "100"),
            ("utilities", "NaN"),
        ])
        .parse(Utc::now())
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumber { field: "utilities", .. }));
    }

    #[test]
    fn test_no_range_validation() {
        let response = form(&[("age", "-3"), ("gender", "X"), ("total_income", "-10")])
            .parse(Utc::now())
            .unwrap();
        assert_eq!(response.age, -3);
        assert_eq!(response.total_income, -10.0);
    }
}
