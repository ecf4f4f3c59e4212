//! Analyze command - run the pipeline on a file and report the results.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use tabula::{Analyzer, Report, Severity};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate input file exists
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (report, source) = Analyzer::new().analyze_file(&file)?;

    if json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!(
            "{} {} ({}, {} rows x {} columns)",
            "Analyzed".cyan().bold(),
            file.display().to_string().white(),
            source.format,
            source.row_count,
            source.column_count
        );
        print_summary(&report, verbose);
    }

    if let Some(path) = output {
        fs::write(&path, report.to_json_pretty()?)?;
        if !json {
            println!();
            println!(
                "{} {}",
                "Saved report to".green().bold(),
                path.display().to_string().white()
            );
        }
    }

    Ok(())
}

fn print_summary(report: &Report, verbose: bool) {
    let overview = &report.overview;
    println!(
        "  {} numeric, {} categorical, {} missing cells, {} duplicate rows",
        overview.numeric_columns,
        overview.categorical_columns,
        overview.missing_values,
        overview.duplicate_rows
    );

    if verbose && !report.numeric_stats.is_empty() {
        println!();
        println!("{}", "Numeric columns:".yellow().bold());
        for (name, stats) in &report.numeric_stats {
            println!(
                "  {:20} mean {:>12.3}  median {:>12.3}  min {:>12.3}  max {:>12.3}",
                name, stats.mean, stats.median, stats.min, stats.max
            );
        }
    }

    if verbose && !report.categorical_stats.is_empty() {
        println!();
        println!("{}", "Categorical columns:".yellow().bold());
        for (name, stats) in &report.categorical_stats {
            println!(
                "  {:20} {} unique, most common {}",
                name,
                stats.unique_values,
                stats.most_common.as_deref().unwrap_or("-")
            );
        }
    }

    let anomalies = &report.anomalies;
    println!();
    println!(
        "Anomalies: {} isolation forest, {} z-score columns, {} IQR columns",
        anomalies.isolation_forest.count.to_string().white().bold(),
        anomalies.zscore.len().to_string().white().bold(),
        anomalies.iqr.len().to_string().white().bold()
    );
    println!(
        "Found {} strong correlations and {} patterns",
        report.correlations.len().to_string().white().bold(),
        report.patterns.len().to_string().white().bold()
    );

    println!();
    if report.insights.is_empty() {
        println!("{}", "No notable findings - data looks clean!".green());
        return;
    }

    println!("{}", "Insights:".yellow().bold());
    for insight in &report.insights {
        let tag = match insight.severity {
            Severity::High => insight.severity.label().red().bold(),
            Severity::Medium => insight.severity.label().yellow(),
            Severity::Low => insight.severity.label().blue(),
            Severity::Info => insight.severity.label().normal(),
        };
        println!(
            "  [{}] {}: {}",
            tag,
            insight.category.label().dimmed(),
            insight.message
        );
    }
}
