//! Progress indicators for long-running commands.
//!
//! Bars draw to stderr so `--json` output on stdout stays parseable.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Progress bar for `total` items, or a hidden one when `visible` is false.
///
/// The length may be zero here and set later with `set_length`.
pub fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .map(|style| style.progress_chars(PROGRESS_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
