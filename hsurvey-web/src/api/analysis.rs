//! Analysis view: statistics, charts and the descriptive summary

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
};
use std::fmt::Write as _;

use super::html::{escape, page};
use crate::error::{ApiError, ApiResult};
use crate::loader::load_table;
use crate::report::{self, ColumnSummary, Report, SummaryStats};
use crate::AppState;

async fn build_report(state: &AppState) -> ApiResult<Report> {
    let table = load_table(&state.store).await;
    // Chart rendering is CPU-bound
    tokio::task::spawn_blocking(move || report::generate(&table))
        .await
        .map_err(|e| ApiError::Internal(format!("Report task failed: {}", e)))
}

/// GET /analysis
pub async fn analysis_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let report = build_report(&state).await?;
    Ok(Html(render_analysis(&report)))
}

/// GET /analysis/summary.csv
pub async fn summary_csv_download(State(state): State<AppState>) -> ApiResult<Response> {
    let report = build_report(&state).await?;
    let body = report::summary_csv(&report.summary)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"summary_statistics.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

fn render_analysis(report: &Report) -> String {
    let mut body = String::from("    <h1>Survey Data Analysis</h1>\n");

    match &report.stats {
        Some(stats) => render_stats(&mut body, stats),
        None => body.push_str("    <p>No data yet. Submit a response first.</p>\n"),
    }

    for chart in &report.charts {
        let title = escape(chart.kind.title());
        let _ = write!(
            body,
            "    <div class=\"chart\" id=\"{key}\">\n        <h2>{title}</h2>\n        <img src=\"{src}\" alt=\"{title}\">\n    </div>\n",
            key = chart.kind.key(),
            src = chart.data_uri(),
        );
    }

    if !report.summary.is_empty() {
        render_summary(&mut body, &report.summary);
    }

    body.push_str("    <p><a href=\"/\" class=\"button\">Back to survey</a></p>\n");
    page("Survey Analysis", &body)
}

fn render_stats(body: &mut String, stats: &SummaryStats) {
    let _ = write!(
        body,
        r#"    <div class="stats">
        <div class="stat">Total responses<strong>{}</strong></div>
        <div class="stat">Average income<strong>${:.2}</strong></div>
        <div class="stat">Average spending<strong>${:.2}</strong></div>
        <div class="stat">Average age<strong>{:.1}</strong></div>
    </div>
"#,
        stats.total_responses, stats.avg_income, stats.avg_spending, stats.avg_age,
    );

    body.push_str("    <h2>Gender breakdown</h2>\n    <ul>\n");
    for (gender, count) in &stats.gender_counts {
        let _ = writeln!(body, "        <li>{}: {}</li>", escape(gender), count);
    }
    body.push_str("    </ul>\n");
}

fn render_summary(body: &mut String, summary: &[ColumnSummary]) {
    body.push_str(
        "    <h2>Summary statistics</h2>\n    <p><a href=\"/analysis/summary.csv\">Download as CSV</a></p>\n    <table>\n        <tr><th>column</th><th>count</th><th>mean</th><th>std</th><th>min</th><th>25%</th><th>50%</th><th>75%</th><th>max</th></tr>\n",
    );
    for row in summary {
        let std = row.std.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            body,
            "        <tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            row.column, row.count, row.mean, std, row.min, row.p25, row.p50, row.p75, row.max,
        );
    }
    body.push_str("    </table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SurveyTable;
    use hsurvey_common::{Expenses, SurveyResponse};

    #[test]
    fn test_empty_report_page() {
        let html = render_analysis(&Report::default());
        assert!(html.contains("No data yet"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_report_page_escapes_labels() {
        let table = SurveyTable::from_responses(&[SurveyResponse::new(
            30,
            "<script>",
            1000.0,
            Expenses::default(),
        )]);
        let html = render_analysis(&report::generate(&table));

        assert!(html.contains("&lt;script&gt;: 1"));
        assert!(!html.contains("<li><script>"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("$1000.00"));
    }
}
