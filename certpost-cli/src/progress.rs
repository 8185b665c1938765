//! Terminal progress rendering
//!
//! Consumes [`ProgressEvent`]s from a `ChannelProgressSink` receiver and draws
//! them with `indicatif` on stderr. A spinner is shown while directories are
//! scanned; it turns into a bar once file processing starts and the total is known.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use certpost_core::types::{ProgressEvent, ProgressKind};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

/// Spawn a task that renders progress events until the sender side is dropped.
pub fn spawn_progress_renderer(mut rx: mpsc::Receiver<ProgressEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new_spinner();
        bar.set_style(style(SPINNER_TEMPLATE));
        let mut processing = false;

        while let Some(event) = rx.recv().await {
            if event.kind == ProgressKind::Processing && !processing {
                processing = true;
                bar.set_style(style(BAR_TEMPLATE));
            }

            match event.kind {
                ProgressKind::Scanning => bar.tick(),
                ProgressKind::Processing => {
                    bar.set_length(event.total_count as u64);
                    bar.set_position(event.completed_count as u64);
                }
            }
            bar.set_message(describe(&event));
        }

        bar.finish_and_clear();
    })
}

/// One-line status text for an event.
pub fn describe(event: &ProgressEvent) -> String {
    match event.kind {
        ProgressKind::Scanning => format!(
            "Scanning {} ({} files found)",
            event.current_path, event.completed_count
        ),
        ProgressKind::Processing => format!("Processing {}", event.current_path),
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}
