//! Chart rendering with plotters
//!
//! Every chart is drawn into an in-memory SVG document so no system fonts or
//! image codecs are needed.

use hsurvey_common::ExpenseCategory;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::TAU;
use std::ops::Range;

use super::stats;
use super::ReportError;
use crate::loader::{Column, SurveyTable};

const FONT: &str = "sans-serif";
const TITLE_SIZE: i32 = 28;

const AGE_BINS: usize = 10;
const INCOME_BINS: usize = 8;
const KDE_POINTS: usize = 200;

/// Categorical palette (tab10)
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ReportError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        ReportError::Render(e.to_string())
    }
}

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String, ReportError>
where
    F: FnOnce(&Area<'_>) -> Result<(), ReportError>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}

/// Axis range with 5% headroom; a single value gets a unit-wide window
fn padded_range(values: &[f64]) -> Range<f64> {
    let (lo, hi) = stats::min_max(values);
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        return (lo - pad)..(hi + pad);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Reject axis ranges plotters cannot lay out: non-finite bounds, an empty
/// span, or a span too wide to represent
fn axis(range: Range<f64>) -> Result<Range<f64>, ReportError> {
    let span = range.end - range.start;
    if range.start.is_finite() && range.end.is_finite() && span.is_finite() && span > 0.0 {
        Ok(range)
    } else {
        Err(ReportError::Render(format!(
            "unusable axis range {}..{}",
            range.start, range.end
        )))
    }
}

/// Upper bound for a zero-based value axis
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

fn value_label_style() -> TextStyle<'static> {
    TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom))
}

pub fn income_vs_spending(table: &SurveyTable) -> Result<String, ReportError> {
    let income = table.column(Column::TotalIncome);
    let spending = table.column(Column::TotalSpending);
    let x_range = axis(padded_range(&income))?;
    let y_range = axis(padded_range(&spending))?;

    render_svg((1000, 600), |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Income vs Spending", (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Income ($)")
            .y_desc("Spending ($)")
            .draw()?;

        chart.draw_series(
            income
                .iter()
                .zip(&spending)
                .map(|(&x, &y)| Circle::new((x, y), 6, PALETTE[0].filled())),
        )?;
        Ok(())
    })
}

pub fn age_distribution(table: &SurveyTable) -> Result<String, ReportError> {
    distribution(
        &table.column(Column::Age),
        AGE_BINS,
        "Age Distribution of Respondents",
        "Age",
    )
}

pub fn income_distribution(table: &SurveyTable) -> Result<String, ReportError> {
    distribution(
        &table.column(Column::TotalIncome),
        INCOME_BINS,
        "Income Distribution",
        "Income ($)",
    )
}

/// Histogram with a density overlay scaled to counts
fn distribution(values: &[f64], bins: usize, title: &str, x_desc: &str) -> Result<String, ReportError> {
    let bins = stats::histogram(values, bins);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Err(ReportError::NoData);
    };
    let (lo, hi) = (first.lower, last.upper);
    let bin_width = first.upper - first.lower;
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(ReportError::Render(format!("unusable bin width {}", bin_width)));
    }
    let x_range = axis(lo..hi)?;

    let curve = stats::kde_curve(values, lo, hi, bin_width, KDE_POINTS);
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let max_density = curve
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0, f64::max);
    let y_range = axis(0f64..headroom(max_count.max(max_density)))?;

    render_svg((1000, 600), |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc("Count")
            .draw()?;

        chart.draw_series(bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                PALETTE[0].mix(0.6).filled(),
            )
        }))?;
        chart.draw_series(bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                PALETTE[0].stroke_width(1),
            )
        }))?;

        if let Some(curve) = curve {
            chart.draw_series(LineSeries::new(curve, PALETTE[0].stroke_width(2)))?;
        }
        Ok(())
    })
}

pub fn gender_distribution(table: &SurveyTable) -> Result<String, ReportError> {
    let counts = stats::value_counts(&table.genders());
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return Err(ReportError::NoData);
    }

    render_svg((800, 600), |root| {
        let area = root.titled("Gender Distribution", (FONT, TITLE_SIZE))?;
        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;

        let label_style = TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

        // Wedges run counter-clockwise from three o'clock
        let mut start = 0.0;
        for (index, (label, count)) in counts.iter().enumerate() {
            let fraction = *count as f64 / total as f64;
            let sweep = fraction * TAU;
            let color = PALETTE[index % PALETTE.len()];

            area.draw(&Polygon::new(
                wedge(center, radius, start, start + sweep),
                color.filled(),
            ))?;

            let middle = start + sweep / 2.0;
            area.draw(&Text::new(
                label.clone(),
                polar(center, radius * 1.15, middle),
                label_style.clone(),
            ))?;
            area.draw(&Text::new(
                format!("{:.1}%", fraction * 100.0),
                polar(center, radius * 0.6, middle),
                label_style.clone(),
            ))?;

            start += sweep;
        }
        Ok(())
    })
}

fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

fn wedge(center: (i32, i32), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start) / TAU) * 120.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        let angle = start + (end - start) * step as f64 / steps as f64;
        points.push(polar(center, radius, angle));
    }
    points
}

pub fn spending_by_category(table: &SurveyTable) -> Result<String, ReportError> {
    let means = stats::category_means(table);
    let labels: Vec<String> = means.iter().map(|(c, _)| c.as_str().to_string()).collect();
    let values: Vec<f64> = means.iter().map(|(_, v)| *v).collect();

    bar_chart(
        (1200, 600),
        "Average Spending by Category",
        "Category",
        "Average Amount ($)",
        &labels,
        &values,
        true,
    )
}

pub fn income_by_age(table: &SurveyTable) -> Result<String, ReportError> {
    let means = stats::income_by_age(table);
    let labels: Vec<String> = means.iter().map(|(age, _)| age.to_string()).collect();
    let values: Vec<f64> = means.iter().map(|(_, v)| *v).collect();

    bar_chart(
        (1200, 600),
        "Average Income by Age",
        "Age",
        "Average Income ($)",
        &labels,
        &values,
        false,
    )
}

fn bar_chart(
    size: (u32, u32),
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    value_labels: bool,
) -> Result<String, ReportError> {
    if values.is_empty() {
        return Err(ReportError::NoData);
    }
    let y_range = axis(0f64..headroom(values.iter().copied().fold(0.0, f64::max)))?;

    render_svg(size, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..values.len()).into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(values.len() + 1)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(PALETTE[0].filled())
                .margin(10)
                .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
        )?;

        if value_labels {
            let style = value_label_style();
            chart.draw_series(values.iter().enumerate().map(|(i, v)| {
                Text::new(format!("${:.2}", v), (SegmentValue::CenterOf(i), *v), style.clone())
            }))?;
        }
        Ok(())
    })
}

/// Bars per gender segment: one per category plus an empty gap slot
const GROUP_SLOTS: usize = ExpenseCategory::ALL.len() + 1;

/// Slot of the bar for `category_index` within the segment of `group`
fn group_slot(group: usize, category_index: usize) -> usize {
    group * GROUP_SLOTS + category_index
}

/// Side-by-side per-category means for each gender
pub fn spending_by_gender(table: &SurveyTable) -> Result<String, ReportError> {
    let groups = stats::category_means_by_gender(table);
    if groups.is_empty() {
        return Err(ReportError::NoData);
    }
    let slots = groups.len() * GROUP_SLOTS;
    let y_range = axis(
        0f64..headroom(
            groups
                .iter()
                .flat_map(|(_, means)| means.iter().copied())
                .fold(0.0, f64::max),
        ),
    )?;

    // Group labels sit under the middle category bar
    let label_slot = ExpenseCategory::ALL.len() / 2;

    render_svg((1200, 700), |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Average Spending by Gender Across Categories", (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..slots).into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots + 1)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) if i % GROUP_SLOTS == label_slot => groups
                    .get(i / GROUP_SLOTS)
                    .map(|(gender, _)| gender.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc("Gender")
            .y_desc("Average Spending ($)")
            .draw()?;

        for (index, category) in ExpenseCategory::ALL.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            chart
                .draw_series(groups.iter().enumerate().map(|(group, (_, means))| {
                    let slot = group_slot(group, index);
                    Rectangle::new(
                        [
                            (SegmentValue::Exact(slot), 0.0),
                            (SegmentValue::Exact(slot + 1), means[index]),
                        ],
                        color.filled(),
                    )
                }))?
                .label(category.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })
}
