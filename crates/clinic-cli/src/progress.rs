use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::ui;

const TICK: Duration = Duration::from_millis(120);

/// Stderr spinner for a single AI call. Inert when stderr is not a terminal
/// or `--quiet` is set.
pub struct Progress(Option<ProgressBar>);

impl Progress {
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        if !ui::prefs().spinner {
            return Self(None);
        }
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner()
            .with_style(style)
            .with_message(message.to_string());
        bar.enable_steady_tick(TICK);
        Self(Some(bar))
    }

    /// Remove the spinner once the response arrived.
    pub fn finish_clear(&self) {
        if let Some(bar) = &self.0 {
            bar.finish_and_clear();
        }
    }

    /// Leave `message` in place of the spinner.
    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.0 {
            bar.abandon_with_message(message.to_string());
        }
    }
}
