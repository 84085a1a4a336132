//! Report generator: summary statistics and charts for the analysis page

use base64::Engine as _;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::loader::SurveyTable;

pub mod charts;
pub mod stats;

pub use stats::{ColumnSummary, SummaryStats};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("No data to chart")]
    NoData,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The fixed set of charts, in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    IncomeVsSpending,
    AgeDistribution,
    GenderDistribution,
    SpendingByCategory,
    IncomeDistribution,
    IncomeByAge,
    SpendingByGender,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::IncomeVsSpending,
        ChartKind::AgeDistribution,
        ChartKind::GenderDistribution,
        ChartKind::SpendingByCategory,
        ChartKind::IncomeDistribution,
        ChartKind::IncomeByAge,
        ChartKind::SpendingByGender,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ChartKind::IncomeVsSpending => "income_vs_spending",
            ChartKind::AgeDistribution => "age_distribution",
            ChartKind::GenderDistribution => "gender_distribution",
            ChartKind::SpendingByCategory => "spending_by_category",
            ChartKind::IncomeDistribution => "income_distribution",
            ChartKind::IncomeByAge => "income_by_age",
            ChartKind::SpendingByGender => "spending_by_gender",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::IncomeVsSpending => "Income vs Spending",
            ChartKind::AgeDistribution => "Age Distribution",
            ChartKind::GenderDistribution => "Gender Distribution",
            ChartKind::SpendingByCategory => "Average Spending by Category",
            ChartKind::IncomeDistribution => "Income Distribution",
            ChartKind::IncomeByAge => "Average Income by Age",
            ChartKind::SpendingByGender => "Spending by Gender Across Categories",
        }
    }

    fn render(&self, table: &SurveyTable) -> Result<String, ReportError> {
        match self {
            ChartKind::IncomeVsSpending => charts::income_vs_spending(table),
            ChartKind::AgeDistribution => charts::age_distribution(table),
            ChartKind::GenderDistribution => charts::gender_distribution(table),
            ChartKind::SpendingByCategory => charts::spending_by_category(table),
            ChartKind::IncomeDistribution => charts::income_distribution(table),
            ChartKind::IncomeByAge => charts::income_by_age(table),
            ChartKind::SpendingByGender => charts::spending_by_gender(table),
        }
    }
}

/// One rendered chart
#[derive(Debug, Clone)]
pub struct Chart {
    pub kind: ChartKind,
    pub svg: String,
}

impl Chart {
    /// Inline image source for an `<img>` tag
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.svg)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    /// `None` when there is no data yet
    pub stats: Option<SummaryStats>,
    pub charts: Vec<Chart>,
    pub summary: Vec<ColumnSummary>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.stats.is_none()
    }
}

/// Compute statistics and render every chart.
///
/// An empty table yields an empty report. A chart that fails to render is
/// logged and left out.
pub fn generate(table: &SurveyTable) -> Report {
    let Some(totals) = SummaryStats::compute(table) else {
        return Report::default();
    };

    let charts: Vec<Chart> = ChartKind::ALL
        .iter()
        .filter_map(|kind| match kind.render(table) {
            Ok(svg) => Some(Chart { kind: *kind, svg }),
            Err(e) => {
                error!("Error generating {} chart: {}", kind.key(), e);
                None
            }
        })
        .collect();

    info!(
        "Generated report for {} responses ({} charts)",
        totals.total_responses,
        charts.len()
    );

    Report {
        stats: Some(totals),
        charts,
        summary: stats::describe(table),
    }
}

/// Descriptive summary as CSV, one line per numeric column
pub fn summary_csv(summary: &[ColumnSummary]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"])?;

    for row in summary {
        writer.write_record([
            row.column.to_string(),
            row.count.to_string(),
            row.mean.to_string(),
            row.std.map(|s| s.to_string()).unwrap_or_default(),
            row.min.to_string(),
            row.p25.to_string(),
            row.p50.to_string(),
            row.p75.to_string(),
            row.max.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsurvey_common::{Expenses, SurveyResponse};

    fn table() -> SurveyTable {
        SurveyTable::from_responses(&[
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
                45,
                "M",
                2200.0,
                Expenses {
                    school_fees: 600.0,
                    ..Default::default()
                },
            ),
        ])
    }

    #[test]
    fn test_empty_table_gives_empty_report() {
        let report = generate(&SurveyTable::default());
        assert!(report.is_empty());
        assert!(report.charts.is_empty());
        assert!(report.summary.is_empty());
    }

    #[test]
    fn test_report_has_every_chart_in_order() {
        let report = generate(&table());
        let kinds: Vec<ChartKind> = report.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());
        assert_eq!(report.stats.unwrap().total_responses, 2);
    }

    #[test]
    fn test_data_uri_is_base64_svg() {
        let chart = Chart {
            kind: ChartKind::AgeDistribution,
            svg: "<svg></svg>".to_string(),
        };
        assert_eq!(chart.data_uri(), "data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=");
    }

    #[test]
    fn test_summary_csv() {
        let report = generate(&table());
        let csv = summary_csv(&report.summary).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "column,count,mean,std,min,25%,50%,75%,max");
        assert_eq!(lines.len(), 1 + report.summary.len());
        assert!(lines[1].starts_with("age,2,37.5,"));
    }
}
