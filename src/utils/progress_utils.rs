use indicatif::{ProgressBar, ProgressStyle};

/// Returns a progress bar for `len` steps, or `None` when there is nothing
/// to track or the caller has progress output disabled.
pub fn progress_bar(len: u64, msg: String, enabled: bool) -> Option<ProgressBar> {
    if !enabled || len == 0 {
        return None;
    }

    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message(msg);

    Some(bar)
}
