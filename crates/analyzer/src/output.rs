//! Output formatting utilities

use analysis_lib::anomaly::AlertSeverity;
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a rounded table, or a notice when there are no rows
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    println!("{}", Table::new(items).with(Style::rounded()));
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("\n{}", format!("=== {} ===", title).bold());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a number with fixed decimals; undefined values read "n/a"
pub fn format_value(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Format a share of rows as a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Color a count by the severity it represents
pub fn color_count(count: usize, severity: AlertSeverity) -> String {
    let text = count.to_string();
    match (count, severity) {
        (0, _) => text.green().to_string(),
        (_, AlertSeverity::Warning) => text.yellow().to_string(),
        (_, AlertSeverity::Critical) => text.red().to_string(),
    }
}

/// Color a normality verdict
pub fn color_verdict(is_normal: bool) -> String {
    if is_normal {
        "Yes".green().to_string()
    } else {
        "No".yellow().to_string()
    }
}
