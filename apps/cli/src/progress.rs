//! Renders run events: one block per model plus a byte progress bar

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use modelgrab_types::{ItemOutcome, RunEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Prints each run decision as it happens
pub struct RunReporter {
    bar: Option<ProgressBar>,
}

impl RunReporter {
    pub fn new() -> Self {
        Self { bar: None }
    }

    pub fn handle_event(&mut self, event: &RunEvent) {
        match event {
            RunEvent::CatalogStarted { username } => {
                println!("Fetching models for user: {}", style(username).bold());
            }

            RunEvent::PageFetched { count, total } => {
                println!("Found {} models (Total: {})", count, total);
            }

            RunEvent::CatalogFetchFailed { status, body } => {
                println!(
                    "{} Error fetching models: {}",
                    style("✗").red().bold(),
                    status
                );
                if !body.is_empty() {
                    println!("{}", style(body).dim());
                }
            }

            RunEvent::CatalogFinished { total } => {
                if *total == 0 {
                    println!("No models found or unable to fetch models");
                } else {
                    println!();
                    println!("Found {} total models", style(total).bold());
                }
            }

            RunEvent::MetadataSaved { path } => {
                if let Some(dir) = path.parent() {
                    println!("Downloading to: {}", dir.display());
                }
                println!("{}", "-".repeat(60));
                println!("Saved metadata to: {}", path.display());
            }

            RunEvent::ItemStarted {
                index,
                total,
                uid,
                name,
                license,
                downloadable,
            } => {
                println!();
                println!("[{}/{}] {}", index, total, style(name).bold());
                println!("  UID: {}", uid);
                println!("  License: {}", license);
                println!("  Downloadable: {}", downloadable);
            }

            RunEvent::ItemProgress {
                downloaded, total, ..
            } => {
                let bar = self.bar.get_or_insert_with(|| {
                    let pb = ProgressBar::new(total.unwrap_or(0));
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("  [{bar:40.cyan/blue}] {percent:>3}% {bytes}/{total_bytes} ({bytes_per_sec})")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("█▓▒░  "),
                    );
                    pb
                });
                if let Some(total) = total {
                    bar.set_length(*total);
                }
                bar.set_position(*downloaded);
            }

            RunEvent::ItemFinished { outcome, .. } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                print_outcome(outcome);
            }

            RunEvent::RunFinished { .. } => {}
        }
    }

    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn print_outcome(outcome: &ItemOutcome) {
    match outcome {
        ItemOutcome::Downloaded { path, bytes } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            println!(
                "  {} Success! Saved to: {} ({})",
                style("✓").green().bold(),
                style(name).cyan(),
                crate::output::format_bytes(*bytes)
            );
        }
        ItemOutcome::AlreadyPresent { bytes, .. } => {
            println!(
                "  {} Already exists ({} bytes) - Skipping",
                style("⊙").yellow(),
                bytes
            );
        }
        ItemOutcome::SkippedLicense { .. } => {
            println!("  {} Skipped: License not in allowed list", style("○").dim());
        }
        ItemOutcome::Failed { reason } => {
            println!("  {} Failed: {}", style("✗").red().bold(), reason);
        }
    }
}

/// Render events from `rx` on a background task until the sender side closes
pub fn spawn_reporter(mut rx: mpsc::UnboundedReceiver<RunEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reporter = RunReporter::new();
        while let Some(event) = rx.recv().await {
            reporter.handle_event(&event);
        }
        reporter.finish();
    })
}
