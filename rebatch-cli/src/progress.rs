//! Progress bar shared by the renaming commands.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar on stderr; hidden when `hidden` is set or stderr is not a terminal
pub fn create_progress_bar(len: u64, message: &str, hidden: bool) -> ProgressBar {
    let pb = if hidden {
        ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden())
    } else {
        ProgressBar::new(len)
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
