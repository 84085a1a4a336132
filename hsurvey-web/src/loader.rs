//! Data loader: flattens stored responses into a table for reporting

use chrono::{DateTime, Utc};
use hsurvey_common::{ExpenseCategory, SurveyResponse};

use crate::store::TieredStore;

/// Numeric columns of the flattened table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Age,
    TotalIncome,
    Expense(ExpenseCategory),
    TotalSpending,
    Savings,
}

impl Column {
    /// Every numeric column in display order
    pub fn numeric() -> Vec<Column> {
        let mut columns = vec![Column::Age, Column::TotalIncome];
        columns.extend(ExpenseCategory::ALL.iter().map(|c| Column::Expense(*c)));
        columns.push(Column::TotalSpending);
        columns.push(Column::Savings);
        columns
    }

    pub fn name(&self) -> &'static str {
        match self {
            Column::Age => "age",
            Column::TotalIncome => "total_income",
            Column::Expense(category) => category.as_str(),
            Column::TotalSpending => "total_spending",
            Column::Savings => "savings",
        }
    }
}

/// One flattened response
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRow {
    pub timestamp: DateTime<Utc>,
    pub age: i64,
    pub gender: String,
    pub total_income: f64,
    pub expenses: [f64; 5],
    pub total_spending: f64,
    pub savings: f64,
}

impl From<&SurveyResponse> for SurveyRow {
    fn from(response: &SurveyResponse) -> Self {
        let expenses = ExpenseCategory::ALL.map(|c| response.expenses.get(c));
        Self {
            timestamp: response.timestamp,
            age: response.age,
            gender: response.gender.clone(),
            total_income: response.total_income,
            expenses,
            total_spending: response.total_spending(),
            savings: response.savings(),
        }
    }
}

impl SurveyRow {
    pub fn value(&self, column: Column) -> f64 {
        match column {
            Column::Age => self.age as f64,
            Column::TotalIncome => self.total_income,
            Column::Expense(category) => self.expense(category),
            Column::TotalSpending => self.total_spending,
            Column::Savings => self.savings,
        }
    }

    pub fn expense(&self, category: ExpenseCategory) -> f64 {
        // Discriminants follow ExpenseCategory::ALL order
        self.expenses[category as usize]
    }
}

/// Tabular view of every stored response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyTable {
    rows: Vec<SurveyRow>,
}

impl SurveyTable {
    pub fn from_responses(responses: &[SurveyResponse]) -> Self {
        Self {
            rows: responses.iter().map(SurveyRow::from).collect(),
        }
    }

    pub fn rows(&self) -> &[SurveyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of a numeric column, in row order
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|row| row.value(column)).collect()
    }

    pub fn genders(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.gender.as_str()).collect()
    }
}

/// Load every stored response from whichever tier the store yields
pub async fn load_table(store: &TieredStore) -> SurveyTable {
    let responses = store.load_all().await;
    SurveyTable::from_responses(&responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsurvey_common::Expenses;

    fn table() -> SurveyTable {
        let responses = vec![
            SurveyResponse::new(
                30,
                "F",
                1000.0,
                Expenses {
                    utilities: 200.0,
                    entertainment: 50.0,
                    ..Default::default()
                },
            ),
            SurveyResponse::new(
                50,
                "M",
                3000.0,
                Expenses {
                    school_fees: 400.0,
                    healthcare: 100.0,
                    ..Default::default()
                },
            ),
        ];
        SurveyTable::from_responses(&responses)
    }

    #[test]
    fn test_flattened_columns() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column(Column::Age), vec![30.0, 50.0]);
        assert_eq!(table.column(Column::TotalSpending), vec![250.0, 500.0]);
        assert_eq!(table.column(Column::Savings), vec![750.0, 2500.0]);
        assert_eq!(
            table.column(Column::Expense(ExpenseCategory::SchoolFees)),
            vec![0.0, 400.0]
        );
        assert_eq!(table.genders(), vec!["F", "M"]);
    }

    #[test]
    fn test_row_spending_plus_savings_is_income() {
        for row in table().rows() {
            let spent: f64 = row.expenses.iter().sum();
            assert_eq!(spent + row.savings, row.total_income);
        }
    }

    #[test]
    fn test_numeric_column_order() {
        let names: Vec<&str> = Column::numeric().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "age",
                "total_income",
                "utilities",
                "entertainment",
                "school_fees",
                "shopping",
                "healthcare",
                "total_spending",
                "savings"
            ]
        );
    }

    #[test]
    fn test_empty_table() {
        let table = SurveyTable::from_responses(&[]);
        assert!(table.is_empty());
        assert!(table.column(Column::TotalIncome).is_empty());
    }
}
