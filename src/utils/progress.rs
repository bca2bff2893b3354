use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a digest loads. A hidden tracker does nothing, which
/// keeps `--quiet` and piped output clean.
#[derive(Clone)]
pub struct ProgressTracker {
    progress_bar: Option<ProgressBar>,
    label: String,
}

impl ProgressTracker {
    pub fn new(label: &str, visible: bool) -> Self {
        let progress_bar = visible.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(label.to_string());
            pb
        });
        Self {
            progress_bar,
            label: label.to_string(),
        }
    }

    pub fn update_message(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("{} - {}", self.label, message));
        }
    }

    pub fn finish(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
            log::debug!("{}: {}", self.label, message);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.progress_bar.is_some()
    }
}
