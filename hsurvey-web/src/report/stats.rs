//! Aggregates over the survey table

use hsurvey_common::ExpenseCategory;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use crate::loader::{Column, SurveyTable};

/// Scalar aggregates shown at the top of the analysis page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_responses: usize,
    pub avg_income: f64,
    pub avg_spending: f64,
    pub avg_age: f64,
    /// Ordered by count descending, then label
    pub gender_counts: Vec<(String, usize)>,
}

impl SummaryStats {
    /// `None` for an empty table
    pub fn compute(table: &SurveyTable) -> Option<Self> {
        if table.is_empty() {
            return None;
        }

        Some(Self {
            total_responses: table.len(),
            avg_income: mean(&table.column(Column::TotalIncome))?,
            avg_spending: mean(&table.column(Column::TotalSpending))?,
            avg_age: mean(&table.column(Column::Age))?,
            gender_counts: value_counts(&table.genders()),
        })
    }
}

/// Descriptive statistics for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined below two values
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Describe every numeric column. Empty for an empty table.
pub fn describe(table: &SurveyTable) -> Vec<ColumnSummary> {
    if table.is_empty() {
        return Vec::new();
    }

    Column::numeric()
        .into_iter()
        .filter_map(|column| {
            let mut values = table.column(column);
            let mean = mean(&values)?;
            let std = sample_std(&values);
            values.sort_by(f64::total_cmp);
            Some(ColumnSummary {
                column: column.name(),
                count: values.len(),
                mean,
                std,
                min: values[0],
                p25: quantile(&values, 0.25),
                p50: quantile(&values, 0.5),
                p75: quantile(&values, 0.75),
                max: values[values.len() - 1],
            })
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Standard deviation with one degree of freedom removed
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Linear-interpolated quantile of already sorted values
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Occurrences per label, most frequent first (ties by label)
pub fn value_counts(labels: &[&str]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(*label).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Mean of every expense category per gender, genders in label order
pub fn category_means_by_gender(table: &SurveyTable) -> Vec<(String, [f64; 5])> {
    let mut groups: BTreeMap<&str, Vec<[f64; 5]>> = BTreeMap::new();
    for row in table.rows() {
        groups.entry(row.gender.as_str()).or_default().push(row.expenses);
    }

    groups
        .into_iter()
        .map(|(gender, rows)| {
            let mut means = [0.0; 5];
            for (index, slot) in means.iter_mut().enumerate() {
                let values: Vec<f64> = rows.iter().map(|r| r[index]).collect();
                *slot = mean(&values).unwrap_or(0.0);
            }
            (gender.to_string(), means)
        })
        .collect()
}

/// Mean income per distinct age, highest mean first (ties by age)
pub fn income_by_age(table: &SurveyTable) -> Vec<(i64, f64)> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        groups.entry(row.age).or_default().push(row.total_income);
    }

    let mut means: Vec<(i64, f64)> = groups
        .into_iter()
        .filter_map(|(age, incomes)| Some((age, mean(&incomes)?)))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    means
}

/// Mean spending per expense category
pub fn category_means(table: &SurveyTable) -> Vec<(ExpenseCategory, f64)> {
    ExpenseCategory::ALL
        .iter()
        .map(|category| {
            let values = table.column(Column::Expense(*category));
            (*category, mean(&values).unwrap_or(0.0))
        })
        .collect()
}

/// One equal-width histogram bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins spanning `[min, max]`, last bin closed.
///
/// A degenerate range is widened by 0.5 on each side, or by a millionth of
/// the value where 0.5 would vanish in rounding.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = min_max(values);
    if lo == hi {
        let pad = 0.5f64.max(lo.abs() * 1e-6);
        lo -= pad;
        hi += pad;
    }
    let width = (hi - lo) / bins as f64;

    let mut result: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - lo) / width).floor() as usize).min(bins - 1);
        result[index].count += 1;
    }
    result
}

/// Gaussian kernel density over `[lo, hi]`, scaled to histogram counts.
///
/// Bandwidth follows Scott's rule. `None` when the data has no spread.
pub fn kde_curve(values: &[f64], lo: f64, hi: f64, bin_width: f64, points: usize) -> Option<Vec<(f64, f64)>> {
    let std = sample_std(values)?;
    if std <= 0.0 || points < 2 || hi <= lo {
        return None;
    }

    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    let step = (hi - lo) / (points - 1) as f64;

    Some(
        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                let density: f64 = values
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
                    * norm;
                (x, density * n * bin_width)
            })
            .collect(),
    )
}

pub fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}
