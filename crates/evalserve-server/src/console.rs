//! CLI console utilities

use colored::*;
use evalserve_core::{MetricValue, Report};
use indicatif::{ProgressBar, ProgressStyle};

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print one line per metric, non-finite values dimmed
    pub fn print_report(&self, report: &Report) {
        for (name, value) in report.iter() {
            let rendered = value.to_string();
            let rendered = match value {
                MetricValue::Float(_) if value.is_non_finite() => rendered.dimmed(),
                _ => rendered.cyan().bold(),
            };
            println!("  {:<20} {}", name, rendered);
        }
    }

    /// Progress bar over `total` samples, hidden unless verbose
    pub fn sample_progress(&self, total: u64) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.blue} [{pos}/{len}] {bar:30.cyan/blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}
