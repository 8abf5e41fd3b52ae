//! Console rendering of an [`AnalysisReport`].

use crate::pipeline::{
    AnalysisOutcome, AnalysisReport, DimensionAnalysis, RegionAnalysis, SummaryAnalysis,
    TrendAnalysis,
};
use crate::types::AggregateGroup;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 60;

/// Plain-text view of an [`AnalysisReport`].
///
/// Write errors from the destination propagate out of `fmt`.
pub struct ReportText<'a>(pub &'a AnalysisReport);

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "VIDEO GAME SALES ANALYSIS ({})", report.year_window)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "Loaded {} records; {} in range",
            report.rows, report.records_in_window
        )?;
        writeln!(f, "Columns available: {}", report.columns.join(", "))?;
        for (field, count) in &report.parse_failures {
            writeln!(f, "Unparseable {} values: {}", field, count)?;
        }

        section(f, "Sales by genre", report.genre.as_ref(), dimension)?;
        section(f, "Platform performance", report.platform.as_ref(), dimension)?;
        section(f, "Publisher rankings", report.publisher.as_ref(), dimension)?;
        section(f, "Regional sales", report.region.as_ref(), region)?;
        section(f, "Sales trend and forecast", report.trend.as_ref(), trend)?;
        section(f, "Sales distribution", report.summary.as_ref(), summary)
    }
}

/// Render a report as plain text for the console.
pub fn render_text(report: &AnalysisReport) -> String {
    ReportText(report).to_string()
}

fn heading(out: &mut impl Write, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title.to_uppercase())?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

fn section<W: Write, T>(
    out: &mut W,
    title: &str,
    outcome: Option<&AnalysisOutcome<T>>,
    render: impl FnOnce(&mut W, &T) -> fmt::Result,
) -> fmt::Result {
    let Some(outcome) = outcome else {
        return Ok(());
    };
    heading(out, title)?;
    match outcome {
        AnalysisOutcome::Available(value) => render(out, value),
        AnalysisOutcome::Unavailable { code, reason } => {
            writeln!(out, "Not available [{}]: {}", code, reason)
        }
    }
}

fn ranked(
    out: &mut impl Write,
    title: &str,
    groups: &[AggregateGroup],
    value: impl Fn(&AggregateGroup) -> String,
) -> fmt::Result {
    if groups.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", title)?;
    for (i, group) in groups.iter().enumerate() {
        writeln!(out, "{:>3}. {:<30} {}", i + 1, group.key, value(group))?;
    }
    Ok(())
}

fn dimension(out: &mut impl Write, analysis: &DimensionAnalysis) -> fmt::Result {
    writeln!(
        out,
        "Records used: {} of {}",
        analysis.cleaning.rows_after, analysis.cleaning.rows_before
    )?;
    ranked(out, "Top by total sales", &analysis.top_by_sales, |g| {
        format!("{:.2} million", g.sum)
    })?;
    ranked(out, "Top by number of titles", &analysis.top_by_count, |g| {
        format!("{} titles", g.count)
    })?;
    ranked(
        out,
        &format!("Top by average sales (min {} titles)", analysis.min_support),
        &analysis.top_by_mean,
        |g| format!("{:.2} million/title", g.mean()),
    )?;

    let share_total = analysis.totals.total;
    if share_total > 0.0 {
        writeln!(out, "Market share:")?;
        for group in &analysis.market_share {
            writeln!(
                out,
                "  {:<30} {:>5.1}%",
                group.key,
                group.sum / share_total * 100.0
            )?;
        }
    }

    writeln!(
        out,
        "Total: {:.2} million across {} groups (average {:.2} per group)",
        analysis.totals.total, analysis.totals.groups, analysis.totals.mean_per_group
    )
}

fn region(out: &mut impl Write, analysis: &RegionAnalysis) -> fmt::Result {
    let breakdown = &analysis.breakdown;
    for (tag, group) in breakdown.groups() {
        let share = breakdown
            .share(tag)
            .map(|s| format!("{:.1}%", s))
            .unwrap_or_else(|| "-".to_string());
        writeln!(out, "  {:<6} {:>10.2} million  {:>6}", tag, group.sum, share)?;
    }
    writeln!(out, "Total: {:.2} million", breakdown.total())
}

fn trend(out: &mut impl Write, analysis: &TrendAnalysis) -> fmt::Result {
    let forecast = &analysis.forecast;
    let model = &forecast.model;
    writeln!(
        out,
        "Years covered: {} to {} ({} years)",
        model.first_year,
        model.last_year,
        forecast.historical.len()
    )?;
    writeln!(out, "Model R-squared: {:.4}", model.r_squared)?;
    writeln!(
        out,
        "Trend: {} ({:+.4} million per year)",
        forecast.direction, model.slope
    )?;
    writeln!(out, "Forecast:")?;
    for point in &forecast.forecast {
        writeln!(out, "  {}: {:.2} million", point.year, point.value)?;
    }
    writeln!(
        out,
        "Average historical sales per year: {:.2} million",
        forecast.historical_mean
    )?;
    if let Some(mean) = forecast.forecast_mean {
        writeln!(out, "Predicted average for forecast years: {:.2} million", mean)?;
    }
    Ok(())
}

fn summary(out: &mut impl Write, analysis: &SummaryAnalysis) -> fmt::Result {
    let d = &analysis.distribution;
    writeln!(out, "Titles: {}", d.records)?;
    writeln!(out, "Total sales: {:.2} million", d.total)?;
    writeln!(out, "Mean: {:.3}  Median: {:.3}", d.mean, d.median)?;
    writeln!(out, "Range: {:.3} - {:.3}", d.min, d.max)?;
    if let Some(bin) = d.bins.iter().max_by_key(|b| b.count) {
        writeln!(
            out,
            "Most titles ({}) sold between {:.3} and {:.3} million",
            bin.count, bin.lower, bin.upper
        )?;
    }
    Ok(())
}
