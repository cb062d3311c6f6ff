//! Output formatting utilities

use console::{style, Term};
use modelgrab_core::LicenseFilter;
use modelgrab_types::{RunSummary, Settings};

/// Format bytes as human-readable
pub fn format_bytes(bytes: u64) -> String {
    human_bytes::human_bytes(bytes as f64)
}

pub fn print_banner(settings: &Settings) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("{}", style("modelgrab - interactive mode").bold());
    println!("{}", rule);
    println!();
    println!("This will download ONLY these licenses:");
    for token in LicenseFilter::new(&settings.licenses).tokens() {
        println!("  {} {}", style("✓").green(), describe_license(token));
    }
    println!();
}

/// Friendly name for the well-known license tokens
fn describe_license(token: &str) -> String {
    match token {
        "cc0" => "CC0 (Public Domain)".to_string(),
        "by" => "CC-BY (Attribution)".to_string(),
        "free standard" => "Free Standard".to_string(),
        "standard" => "Standard".to_string(),
        other => other.to_uppercase(),
    }
}

pub fn print_selected_licenses(filter: &LicenseFilter) {
    println!();
    println!(
        "{} Will download models with these licenses: {}",
        style("✓").green().bold(),
        filter
    );
    println!();
}

pub fn print_summary(summary: &RunSummary, filter: &LicenseFilter) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", style("Download complete!").bold());
    println!("Successful: {}", style(summary.successful).green());
    println!("Failed/Not downloadable: {}", style(summary.failed).red());
    println!("Skipped (license): {}", style(summary.skipped_license).yellow());
    println!("Total: {}", summary.total);
    if let Some(finished) = summary.finished_at {
        let elapsed = (finished - summary.started_at).num_seconds().max(0) as u64;
        println!("Elapsed: {}", format_elapsed(elapsed));
    }
    println!();
    println!("Allowed licenses: {}", filter);
}

/// Format duration as human-readable
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

pub fn print_cancelled() {
    println!();
    println!();
    println!("{}", style("Download cancelled by user.").yellow());
}

/// Report an error that ended the run, with its full cause chain
pub fn print_error(error: &anyhow::Error) {
    eprintln!();
    eprintln!("{} {}", style("Error occurred:").red().bold(), error);
    eprintln!("{:?}", error);
}

/// Block until Enter is pressed, so a double-clicked terminal stays open
pub fn wait_for_enter() {
    println!();
    println!("Press Enter to close this window...");
    let _ = Term::stdout().read_line();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(59), "59s");
        assert_eq!(format_elapsed(61), "1m 1s");
        assert_eq!(format_elapsed(3725), "1h 2m 5s");
    }

    #[test]
    fn test_describe_license() {
        assert_eq!(describe_license("by"), "CC-BY (Attribution)");
        assert_eq!(describe_license("editorial"), "EDITORIAL");
    }
}
