//! Human-readable rendering of an analysis report

use analysis_lib::anomaly::AlertSeverity;
use analysis_lib::{AnalysisReport, Metric};
use tabled::Tabled;

use crate::output::{
    color_count, color_verdict, format_percentage, format_value, print_heading, print_info,
    print_table, print_warning,
};

/// Row for the descriptive statistics table
#[derive(Tabled)]
struct StatisticsRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Median")]
    median: String,
    #[tabled(rename = "Std Dev")]
    std: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Q1")]
    q1: String,
    #[tabled(rename = "Q3")]
    q3: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Row for the distribution table
#[derive(Tabled)]
struct DistributionRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Shapiro-Wilk p")]
    shapiro_p: String,
    #[tabled(rename = "KS p")]
    ks_p: String,
    #[tabled(rename = "Skewness")]
    skewness: String,
    #[tabled(rename = "Kurtosis")]
    kurtosis: String,
    #[tabled(rename = "Normal")]
    normal: String,
}

/// Row for the hourly CPU table
#[derive(Tabled)]
struct HourlyRow {
    #[tabled(rename = "Hour")]
    hour: u32,
    #[tabled(rename = "CPU Mean")]
    mean: String,
    #[tabled(rename = "CPU Max")]
    max: String,
    #[tabled(rename = "CPU Std")]
    std: String,
}

/// Row for the thresholds table
#[derive(Tabled)]
struct ThresholdRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Warning")]
    warning: String,
    #[tabled(rename = "Critical")]
    critical: String,
}

/// Row for the anomaly table
#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Warnings")]
    warnings: String,
    #[tabled(rename = "Warning %")]
    warning_percentage: String,
    #[tabled(rename = "Critical")]
    critical: String,
    #[tabled(rename = "Critical %")]
    critical_percentage: String,
}

/// Print every report section in pipeline order
pub fn print_report(report: &AnalysisReport) {
    print_statistics(report);
    print_distribution(report);
    print_time_patterns(report);
    print_thresholds(report);
    print_anomalies(report);
    print_recommendations(report);
}

fn print_statistics(report: &AnalysisReport) {
    print_heading("DESCRIPTIVE STATISTICS");
    let rows: Vec<StatisticsRow> = report
        .statistics
        .iter()
        .map(|(metric, s)| StatisticsRow {
            metric: metric.to_string(),
            mean: format_value(s.mean, 2),
            median: format_value(s.median, 2),
            std: format_value(s.std, 2),
            min: format_value(s.min, 2),
            max: format_value(s.max, 2),
            q1: format_value(s.q1, 2),
            q3: format_value(s.q3, 2),
            count: s.count,
        })
        .collect();
    print_table(&rows);
}

fn print_distribution(report: &AnalysisReport) {
    print_heading("DISTRIBUTION ANALYSIS");
    let rows: Vec<DistributionRow> = report
        .distributions
        .iter()
        .map(|(metric, d)| DistributionRow {
            metric: metric.to_string(),
            shapiro_p: d
                .shapiro
                .map(|s| format_value(s.p_value, 4))
                .unwrap_or_else(|| "not computed".to_string()),
            ks_p: format_value(d.ks.p_value, 4),
            skewness: format_value(d.skewness, 4),
            kurtosis: format_value(d.kurtosis, 4),
            normal: color_verdict(d.is_normal),
        })
        .collect();
    print_table(&rows);
}

fn print_time_patterns(report: &AnalysisReport) {
    print_heading("TIME PATTERN ANALYSIS");
    let rows: Vec<HourlyRow> = report
        .time_patterns
        .hourly
        .iter()
        .filter_map(|(hour, metrics)| {
            metrics.get(&Metric::Cpu).map(|s| HourlyRow {
                hour: *hour,
                mean: format_value(s.mean, 2),
                max: format_value(s.max, 2),
                std: format_value(s.std, 2),
            })
        })
        .collect();

    if rows.is_empty() {
        print_warning("No hourly CPU data available");
    } else {
        println!("\nHourly CPU Usage Patterns:");
        print_table(&rows);
    }

    if let Some(daily) = &report.time_patterns.daily {
        print_info(&format!("Daily patterns computed for {} dates", daily.len()));
    }
}

fn print_thresholds(report: &AnalysisReport) {
    print_heading("ALERTNESS THRESHOLDS");
    let rows: Vec<ThresholdRow> = report
        .thresholds
        .iter()
        .map(|(metric, t)| ThresholdRow {
            metric: metric.to_string(),
            method: t.method.label().to_string(),
            warning: format_value(t.warning, 2),
            critical: format_value(t.critical, 2),
        })
        .collect();
    print_table(&rows);
}

fn print_anomalies(report: &AnalysisReport) {
    print_heading("ANOMALY DETECTION");
    let rows: Vec<AnomalyRow> = report
        .anomalies
        .iter()
        .map(|(metric, a)| AnomalyRow {
            metric: metric.to_string(),
            warnings: color_count(a.warning_count, AlertSeverity::Warning),
            warning_percentage: format_percentage(a.warning_percentage),
            critical: color_count(a.critical_count, AlertSeverity::Critical),
            critical_percentage: format_percentage(a.critical_percentage),
        })
        .collect();
    print_table(&rows);
}

fn print_recommendations(report: &AnalysisReport) {
    print_heading("OPTIMIZATION RECOMMENDATIONS");
    if report.recommendations.is_empty() {
        print_info("No recommendations; all metrics are within normal ranges");
        return;
    }
    for (i, rec) in report.recommendations.iter().enumerate() {
        println!("{}. {}", i + 1, rec);
    }
}
